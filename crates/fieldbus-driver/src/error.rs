// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error taxonomy of the wire-protocol engine.
//!
//! Each failure domain keeps its own enum; [`FieldbusError`] is the
//! crate-level umbrella that adapters convert into
//! [`fieldbus_core::DriverError`] at the capability boundary.

use thiserror::Error;

use fieldbus_core::DriverError;

/// Result alias used throughout this crate.
pub type FieldbusResult<T> = Result<T, FieldbusError>;

// =============================================================================
// TransportError
// =============================================================================

/// Failures of the raw byte channel.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The operation did not complete within the configured window.
    #[error("timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// The peer refused, reset, or never accepted the connection.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Any other I/O failure on an established channel.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The channel is not open.
    #[error("transport not open: {0}")]
    NotOpen(String),

    /// The transport does not implement the requested primitive.
    #[error("not supported: {0}")]
    NotSupported(&'static str),
}

impl TransportError {
    /// Returns `true` if a reconnect may clear the condition.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotSupported(_))
    }
}

// =============================================================================
// AddressError
// =============================================================================

/// Failures interpreting an element address string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The string does not match the address grammar.
    #[error("invalid address format: {0}")]
    InvalidFormat(String),

    /// A device prefix has no entry in the device table.
    #[error("unknown device: {0}")]
    UnknownDevice(String),
}

// =============================================================================
// FrameError
// =============================================================================

/// Failures validating a wire frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Checksum of a received frame does not match its contents.
    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch {
        /// Checksum computed over the received contents.
        expected: u8,
        /// Checksum carried by the frame.
        actual: u8,
    },

    /// A write acknowledgment does not echo the request.
    #[error("echo mismatch in write acknowledgment")]
    EchoMismatch,

    /// The frame is shorter than its declared length.
    #[error("truncated frame: declared {declared} bytes, got {actual}")]
    TruncatedFrame {
        /// Byte count the frame declares.
        declared: usize,
        /// Bytes actually present.
        actual: usize,
    },

    /// A response carries the wrong transaction or station identity.
    #[error("frame identity mismatch: {0}")]
    IdentityMismatch(String),

    /// The frame does not parse at all.
    #[error("malformed frame: {0}")]
    Malformed(String),
}

// =============================================================================
// ExceptionCode
// =============================================================================

/// Modbus exception codes reported by a slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionCode {
    /// 0x01, function code not supported by the slave.
    IllegalFunction,
    /// 0x02, data address outside the slave's range.
    IllegalDataAddress,
    /// 0x03, value not acceptable for the addressed register.
    IllegalDataValue,
    /// 0x04, unrecoverable failure inside the slave.
    SlaveDeviceFailure,
    /// 0x05, request accepted, long-running processing started.
    Acknowledge,
    /// 0x06, slave busy with a long-running command.
    SlaveDeviceBusy,
    /// 0x08, memory parity check failed in the slave.
    MemoryParityError,
    /// 0x0A, gateway path unavailable.
    GatewayPathUnavailable,
    /// 0x0B, gateway target failed to respond.
    GatewayTargetFailed,
    /// Any other code.
    Other(u8),
}

impl ExceptionCode {
    /// Maps a raw exception byte.
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => Self::IllegalFunction,
            0x02 => Self::IllegalDataAddress,
            0x03 => Self::IllegalDataValue,
            0x04 => Self::SlaveDeviceFailure,
            0x05 => Self::Acknowledge,
            0x06 => Self::SlaveDeviceBusy,
            0x08 => Self::MemoryParityError,
            0x0A => Self::GatewayPathUnavailable,
            0x0B => Self::GatewayTargetFailed,
            other => Self::Other(other),
        }
    }

    /// Raw exception byte.
    pub fn code(&self) -> u8 {
        match self {
            Self::IllegalFunction => 0x01,
            Self::IllegalDataAddress => 0x02,
            Self::IllegalDataValue => 0x03,
            Self::SlaveDeviceFailure => 0x04,
            Self::Acknowledge => 0x05,
            Self::SlaveDeviceBusy => 0x06,
            Self::MemoryParityError => 0x08,
            Self::GatewayPathUnavailable => 0x0A,
            Self::GatewayTargetFailed => 0x0B,
            Self::Other(code) => *code,
        }
    }

    /// Standard description of the code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::IllegalFunction => "illegal function",
            Self::IllegalDataAddress => "illegal data address",
            Self::IllegalDataValue => "illegal data value",
            Self::SlaveDeviceFailure => "slave device failure",
            Self::Acknowledge => "acknowledge",
            Self::SlaveDeviceBusy => "slave device busy",
            Self::MemoryParityError => "memory parity error",
            Self::GatewayPathUnavailable => "gateway path unavailable",
            Self::GatewayTargetFailed => "gateway target device failed to respond",
            Self::Other(_) => "unknown exception",
        }
    }
}

impl std::fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#04x} ({})", self.code(), self.description())
    }
}

// =============================================================================
// TransformError
// =============================================================================

/// Failures converting payload bytes to or from typed values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// The requested kind cannot be produced by this operation.
    #[error("unsupported kind for this operation: {0}")]
    UnsupportedKind(&'static str),

    /// The payload is shorter than `count` elements require.
    #[error("truncated payload: need {needed} bytes, got {actual}")]
    Truncated {
        /// Bytes required for the requested element count.
        needed: usize,
        /// Bytes actually present.
        actual: usize,
    },
}

// =============================================================================
// FieldbusError
// =============================================================================

/// Crate-level umbrella over every failure domain.
#[derive(Debug, Error)]
pub enum FieldbusError {
    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Address interpretation failure.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// Frame validation failure.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Protocol-level exception from the slave.
    #[error("modbus exception {0}")]
    ModbusException(ExceptionCode),

    /// Vendor protocol error response (Mewtocol `!` frame).
    #[error("device protocol error code {0}")]
    DeviceProtocol(u8),

    /// Payload conversion failure.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Operation issued while the connection is absent.
    #[error("not connected: {0}")]
    NotConnected(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl FieldbusError {
    /// Returns `true` if a caller-driven reconnect and retry may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            Self::Frame(_) | Self::NotConnected(_) => true,
            Self::Address(_)
            | Self::ModbusException(_)
            | Self::DeviceProtocol(_)
            | Self::Transform(_)
            | Self::Configuration(_) => false,
        }
    }
}

impl From<FieldbusError> for DriverError {
    fn from(err: FieldbusError) -> Self {
        match err {
            FieldbusError::Transport(e) => {
                let retryable = e.is_retryable();
                DriverError::transport(e.to_string(), retryable)
            }
            FieldbusError::Address(e) => DriverError::address(e.to_string()),
            FieldbusError::Frame(e) => DriverError::frame(e.to_string()),
            FieldbusError::ModbusException(code) => {
                DriverError::device_exception(code.code(), code.description())
            }
            FieldbusError::DeviceProtocol(code) => {
                DriverError::device_exception(code, "device protocol error")
            }
            FieldbusError::Transform(e) => DriverError::transform(e.to_string()),
            FieldbusError::NotConnected(endpoint) => DriverError::not_connected(endpoint),
            FieldbusError::Configuration(msg) => DriverError::configuration(msg),
        }
    }
}

impl From<AddressError> for DriverError {
    fn from(err: AddressError) -> Self {
        FieldbusError::from(err).into()
    }
}

impl From<TransportError> for DriverError {
    fn from(err: TransportError) -> Self {
        FieldbusError::from(err).into()
    }
}

impl From<FrameError> for DriverError {
    fn from(err: FrameError) -> Self {
        FieldbusError::from(err).into()
    }
}

impl From<TransformError> for DriverError {
    fn from(err: TransformError) -> Self {
        FieldbusError::from(err).into()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_code_mapping() {
        assert_eq!(ExceptionCode::from_code(0x02), ExceptionCode::IllegalDataAddress);
        assert_eq!(ExceptionCode::from_code(0x02).description(), "illegal data address");
        assert_eq!(ExceptionCode::from_code(0x7F), ExceptionCode::Other(0x7F));
        assert_eq!(ExceptionCode::Other(0x7F).code(), 0x7F);
    }

    #[test]
    fn test_retryability() {
        let timeout: FieldbusError =
            TransportError::Timeout(std::time::Duration::from_secs(1)).into();
        assert!(timeout.is_retryable());

        let exception = FieldbusError::ModbusException(ExceptionCode::IllegalDataValue);
        assert!(!exception.is_retryable());
    }

    #[test]
    fn test_into_driver_error() {
        let err: DriverError =
            FieldbusError::ModbusException(ExceptionCode::IllegalDataAddress).into();
        match err {
            DriverError::DeviceException { code, .. } => assert_eq!(code, 2),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
