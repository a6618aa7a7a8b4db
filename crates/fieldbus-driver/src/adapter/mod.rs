// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Driver adapter implementations and the construction factory.
//!
//! The family set is closed: construction is an exhaustive match on
//! [`ProtocolFamily`], never a runtime type lookup.

use fieldbus_core::{DriverAdapter, FaultNotifier, ProtocolFamily};

use crate::config::{AdapterConfig, EndpointConfig};
use crate::error::{FieldbusError, FieldbusResult};

mod delta;
mod mewtocol;
mod modbus;

pub use delta::DeltaAsciiAdapter;
pub use mewtocol::MewtocolAdapter;
pub use modbus::{Framing, ModbusAdapter};

// =============================================================================
// Factory
// =============================================================================

/// Builds the adapter for `family` on the given endpoint.
///
/// Fails with a configuration error when the endpoint kind does not
/// carry the family (a serial family on a TCP endpoint and so on).
pub fn build_adapter(
    family: ProtocolFamily,
    endpoint: EndpointConfig,
    config: AdapterConfig,
    notifier: FaultNotifier,
) -> FieldbusResult<Box<dyn DriverAdapter>> {
    match (family, endpoint) {
        (ProtocolFamily::ModbusTcp, EndpointConfig::Tcp(tcp)) => {
            Ok(Box::new(ModbusAdapter::tcp(tcp, config, notifier)?))
        }
        (ProtocolFamily::ModbusUdp, EndpointConfig::Udp(udp)) => {
            Ok(Box::new(ModbusAdapter::udp(udp, config, notifier)?))
        }
        (ProtocolFamily::ModbusAscii, EndpointConfig::Serial(serial)) => {
            Ok(Box::new(ModbusAdapter::ascii(serial, config, notifier)?))
        }
        (ProtocolFamily::DeltaAscii, EndpointConfig::Serial(serial)) => {
            Ok(Box::new(DeltaAsciiAdapter::new(serial, config, notifier)?))
        }
        (ProtocolFamily::Mewtocol, EndpointConfig::Serial(serial)) => {
            Ok(Box::new(MewtocolAdapter::new(serial, config, notifier)?))
        }
        (family, endpoint) => Err(FieldbusError::Configuration(format!(
            "{} cannot run on a {} endpoint",
            family,
            match endpoint {
                EndpointConfig::Tcp(_) => "tcp",
                EndpointConfig::Udp(_) => "udp",
                EndpointConfig::Serial(_) => "serial",
            }
        ))),
    }
}

/// Builds an adapter from a JSON endpoint description, for callers that
/// keep channel configuration as loose values.
pub fn build_adapter_from_json(
    family: ProtocolFamily,
    endpoint_json: &str,
    config: AdapterConfig,
    notifier: FaultNotifier,
) -> FieldbusResult<Box<dyn DriverAdapter>> {
    let endpoint: EndpointConfig = serde_json::from_str(endpoint_json)
        .map_err(|e| FieldbusError::Configuration(format!("bad endpoint config: {}", e)))?;
    build_adapter(family, endpoint, config, notifier)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SerialConfig, TcpConfig};

    #[test]
    fn test_factory_builds_each_family() {
        let tcp = EndpointConfig::Tcp(TcpConfig::new("10.0.0.5", 502));
        let serial = EndpointConfig::Serial(SerialConfig::new("/dev/ttyUSB0"));

        let adapter = build_adapter(
            ProtocolFamily::ModbusTcp,
            tcp,
            AdapterConfig::default(),
            FaultNotifier::disabled(),
        )
        .unwrap();
        assert_eq!(adapter.family(), ProtocolFamily::ModbusTcp);
        // Boxed adapters render through the capability trait.
        assert!(format!("{:?}", adapter).contains("ModbusAdapter"));

        for family in [
            ProtocolFamily::ModbusAscii,
            ProtocolFamily::DeltaAscii,
            ProtocolFamily::Mewtocol,
        ] {
            let adapter = build_adapter(
                family,
                serial.clone(),
                AdapterConfig::default(),
                FaultNotifier::disabled(),
            )
            .unwrap();
            assert_eq!(adapter.family(), family);
        }
    }

    #[test]
    fn test_factory_rejects_mismatched_endpoint() {
        let err = build_adapter(
            ProtocolFamily::Mewtocol,
            EndpointConfig::Tcp(TcpConfig::new("10.0.0.5", 502)),
            AdapterConfig::default(),
            FaultNotifier::disabled(),
        )
        .unwrap_err();
        assert!(matches!(err, FieldbusError::Configuration(_)));
    }

    #[test]
    fn test_factory_from_json() {
        let adapter = build_adapter_from_json(
            ProtocolFamily::ModbusUdp,
            r#"{"transport":"udp","host":"192.168.0.9","port":502}"#,
            AdapterConfig::default(),
            FaultNotifier::disabled(),
        )
        .unwrap();
        assert_eq!(adapter.family(), ProtocolFamily::ModbusUdp);

        assert!(build_adapter_from_json(
            ProtocolFamily::ModbusUdp,
            r#"{"transport":"carrier-pigeon"}"#,
            AdapterConfig::default(),
            FaultNotifier::disabled(),
        )
        .is_err());
    }
}
