// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Driver adapter capability trait.
//!
//! Upper layers (polling engines, tag scanners) depend on
//! [`DriverAdapter`] only; the concrete protocol behind it is selected
//! by a [`ProtocolFamily`] value at construction time. The family set is
//! closed on purpose: adding a protocol means adding a variant and a
//! factory arm, not registering a type by name at runtime.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DriverResult;
use crate::state::ConnectionState;
use crate::value::{DataKind, Value};

// =============================================================================
// ProtocolFamily
// =============================================================================

/// The closed set of supported protocol drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolFamily {
    /// Modbus TCP (MBAP framing over TCP).
    ModbusTcp,
    /// Modbus over UDP datagrams (MBAP framing).
    ModbusUdp,
    /// Modbus ASCII over a serial line.
    ModbusAscii,
    /// Delta DVP PLC, Modbus ASCII with device-notation addressing.
    DeltaAscii,
    /// Panasonic Mewtocol over a serial line.
    Mewtocol,
}

impl ProtocolFamily {
    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ModbusTcp => "modbus_tcp",
            Self::ModbusUdp => "modbus_udp",
            Self::ModbusAscii => "modbus_ascii",
            Self::DeltaAscii => "delta_ascii",
            Self::Mewtocol => "mewtocol",
        }
    }

    /// Returns `true` if this family runs over a serial line.
    pub fn is_serial(&self) -> bool {
        matches!(self, Self::ModbusAscii | Self::DeltaAscii | Self::Mewtocol)
    }
}

impl fmt::Display for ProtocolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ProtocolFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "modbus_tcp" | "modbustcp" => Ok(Self::ModbusTcp),
            "modbus_udp" | "modbusudp" => Ok(Self::ModbusUdp),
            "modbus_ascii" | "modbusascii" => Ok(Self::ModbusAscii),
            "delta_ascii" | "deltaascii" => Ok(Self::DeltaAscii),
            "mewtocol" | "panasonic" => Ok(Self::Mewtocol),
            other => Err(format!("unknown protocol family: {}", other)),
        }
    }
}

// =============================================================================
// DriverAdapter Trait
// =============================================================================

/// Uniform master-side access to one field device.
///
/// # Thread Safety
///
/// Implementations are `Send + Sync`; request/response exchanges are
/// serialized internally, so a shared adapter never interleaves frames
/// on the wire.
///
/// # Failure Model
///
/// Operations fail fast when the connection is not established. No
/// method retries on its own; recovery is the caller's reconnect.
#[async_trait]
pub trait DriverAdapter: Send + Sync + fmt::Debug {
    // =========================================================================
    // Connection Management
    // =========================================================================

    /// Establishes the connection, tearing down any previous link first.
    async fn connect(&self) -> DriverResult<()>;

    /// Closes the connection and releases the underlying resource.
    async fn disconnect(&self) -> DriverResult<()>;

    /// Probes availability by running a full connect attempt.
    ///
    /// This is a real connection probe, not a cached state check. On
    /// success the adapter is left connected.
    async fn is_available(&self) -> bool;

    /// Returns the current connection state.
    async fn connection_state(&self) -> ConnectionState;

    // =========================================================================
    // Data Access
    // =========================================================================

    /// Reads `count` elements of `kind` starting at `address`.
    ///
    /// `address` uses the driver's element grammar, e.g. `"s=2;x=3;100"`
    /// for Modbus or `"D100"` for Delta device notation. Values are
    /// returned in ascending address order.
    async fn read(&self, address: &str, count: u16, kind: DataKind) -> DriverResult<Vec<Value>>;

    /// Reads `count` discrete bits (coils or inputs) starting at `address`.
    async fn read_discrete(&self, address: &str, count: u16) -> DriverResult<Vec<bool>>;

    /// Writes one value to `address`.
    async fn write(&self, address: &str, value: Value) -> DriverResult<()>;

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Protocol family of this adapter.
    fn family(&self) -> ProtocolFamily;

    /// Endpoint description for logs, e.g. `"10.0.0.5:502"` or `"COM3"`.
    fn display_name(&self) -> String;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_parse() {
        assert_eq!("modbus_tcp".parse::<ProtocolFamily>().unwrap(), ProtocolFamily::ModbusTcp);
        assert_eq!("panasonic".parse::<ProtocolFamily>().unwrap(), ProtocolFamily::Mewtocol);
        assert!("profinet".parse::<ProtocolFamily>().is_err());
    }

    #[test]
    fn test_family_is_serial() {
        assert!(ProtocolFamily::DeltaAscii.is_serial());
        assert!(!ProtocolFamily::ModbusUdp.is_serial());
    }
}
