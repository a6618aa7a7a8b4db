// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Delta DVP adapter.
//!
//! Speaks Modbus ASCII on the wire; addressing uses Delta device
//! notation (`D100`, `M10`, `X17`) resolved through the DVP device
//! table before the request is built. `s=` and `x=` prefixes keep their
//! usual meaning, so `s=2;D100` targets station 2.

use async_trait::async_trait;

use fieldbus_core::{
    ConnectionState, DataKind, DriverAdapter, DriverResult, FaultNotifier, ProtocolFamily, Value,
};

use crate::address::{self, ElementAddress};
use crate::config::{AdapterConfig, SerialConfig};
use crate::device::{translate_dvp, DeviceClass};
use crate::error::{AddressError, FieldbusResult};
use crate::transport::SerialTransport;
use crate::types::FunctionCode;

use super::modbus::{Framing, ModbusAdapter};

// =============================================================================
// DeltaAsciiAdapter
// =============================================================================

/// Delta DVP PLC adapter over Modbus ASCII.
#[derive(Debug)]
pub struct DeltaAsciiAdapter {
    station: u8,
    inner: ModbusAdapter<SerialTransport>,
}

impl DeltaAsciiAdapter {
    /// Creates a Delta adapter on a serial line.
    pub fn new(
        endpoint: SerialConfig,
        config: AdapterConfig,
        notifier: FaultNotifier,
    ) -> FieldbusResult<Self> {
        endpoint.validate()?;
        let station = config.station;
        let inner = ModbusAdapter::with_transport(
            SerialTransport::new(endpoint),
            Framing::Ascii,
            ProtocolFamily::DeltaAscii,
            "DeltaAsciiAdapter",
            config,
            notifier,
        );
        Ok(Self { station, inner })
    }

    /// Resolves device notation into a wire address.
    ///
    /// Device-table offsets are absolute, so the one-based correction
    /// never applies here.
    fn resolve(&self, raw: &str) -> Result<(ElementAddress, DeviceClass), AddressError> {
        let (station, function, rest) = address::split_prefixes(raw)?;
        let device = translate_dvp(rest)?;
        let function = function.unwrap_or(match device.class {
            DeviceClass::Bit => FunctionCode::ReadCoil,
            DeviceClass::Word => FunctionCode::ReadHoldingRegister,
        });
        let addr = ElementAddress::new(station.unwrap_or(self.station), function, device.offset);
        Ok((addr, device.class))
    }
}

#[async_trait]
impl DriverAdapter for DeltaAsciiAdapter {
    async fn connect(&self) -> DriverResult<()> {
        self.inner.connect().await
    }

    async fn disconnect(&self) -> DriverResult<()> {
        self.inner.disconnect().await
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }

    async fn connection_state(&self) -> ConnectionState {
        self.inner.connection_state().await
    }

    async fn read(&self, address: &str, count: u16, kind: DataKind) -> DriverResult<Vec<Value>> {
        let (addr, class) = self.resolve(address)?;
        if kind == DataKind::Bool || class == DeviceClass::Bit {
            let bits = self.inner.read_bits_at(addr, count).await?;
            return Ok(bits.into_iter().map(Value::Bool).collect());
        }
        Ok(self.inner.read_at(addr, count, kind).await?)
    }

    async fn read_discrete(&self, address: &str, count: u16) -> DriverResult<Vec<bool>> {
        let (addr, _) = self.resolve(address)?;
        Ok(self.inner.read_bits_at(addr, count).await?)
    }

    async fn write(&self, address: &str, value: Value) -> DriverResult<()> {
        let (addr, _) = self.resolve(address)?;
        Ok(self.inner.write_at(addr, &value).await?)
    }

    fn family(&self) -> ProtocolFamily {
        ProtocolFamily::DeltaAscii
    }

    fn display_name(&self) -> String {
        self.inner.display_name()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> DeltaAsciiAdapter {
        DeltaAsciiAdapter::new(
            SerialConfig::new("/dev/ttyUSB0"),
            AdapterConfig::builder().station(3).build(),
            FaultNotifier::disabled(),
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_word_device() {
        let (addr, class) = adapter().resolve("D100").unwrap();
        assert_eq!(addr.station, 3);
        assert_eq!(addr.function, FunctionCode::ReadHoldingRegister);
        assert_eq!(addr.offset, 0x1000 + 100);
        assert_eq!(class, DeviceClass::Word);
    }

    #[test]
    fn test_resolve_bit_device_with_station() {
        let (addr, class) = adapter().resolve("s=7;M10").unwrap();
        assert_eq!(addr.station, 7);
        assert_eq!(addr.function, FunctionCode::ReadCoil);
        assert_eq!(addr.offset, 0x080A);
        assert_eq!(class, DeviceClass::Bit);
    }

    #[test]
    fn test_resolve_unknown_device() {
        assert!(matches!(
            adapter().resolve("Q5"),
            Err(AddressError::UnknownDevice(_))
        ));
    }

    #[tokio::test]
    async fn test_disconnected_fails_fast() {
        let a = adapter();
        let err = a.read("D0", 1, DataKind::UInt16).await.unwrap_err();
        assert!(matches!(err, fieldbus_core::DriverError::NotConnected { .. }));
    }
}
