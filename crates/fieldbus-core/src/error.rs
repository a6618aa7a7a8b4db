// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Driver-facing error type.
//!
//! Protocol crates keep their own detailed taxonomies and convert into
//! [`DriverError`] at the adapter boundary, so callers handle one shape
//! regardless of the protocol family behind it.

use thiserror::Error;

/// Result alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

// =============================================================================
// DriverError
// =============================================================================

/// Unified error surfaced by every driver adapter.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The underlying transport failed (timeout, refusal, I/O fault).
    #[error("transport error: {message}")]
    Transport {
        /// Human-readable description.
        message: String,
        /// Whether the failure is worth retrying after a reconnect.
        retryable: bool,
    },

    /// An element address string could not be interpreted.
    #[error("address error: {message}")]
    Address {
        /// Human-readable description.
        message: String,
    },

    /// A wire frame was malformed, corrupted, or inconsistent.
    #[error("frame error: {message}")]
    Frame {
        /// Human-readable description.
        message: String,
    },

    /// The remote device answered with a protocol-level exception.
    #[error("device exception {code}: {message}")]
    DeviceException {
        /// Protocol exception code as reported by the device.
        code: u8,
        /// Human-readable description.
        message: String,
    },

    /// Payload bytes could not be converted to or from typed values.
    #[error("transform error: {message}")]
    Transform {
        /// Human-readable description.
        message: String,
    },

    /// The operation was issued while the connection was not established.
    #[error("not connected: {endpoint}")]
    NotConnected {
        /// Endpoint description of the adapter.
        endpoint: String,
    },

    /// Configuration was invalid or incomplete.
    #[error("configuration error: {message}")]
    Configuration {
        /// Human-readable description.
        message: String,
    },

    /// The requested operation is not supported by this adapter.
    #[error("not supported: {operation}")]
    NotSupported {
        /// Name of the unsupported operation.
        operation: String,
    },
}

impl DriverError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>, retryable: bool) -> Self {
        Self::Transport { message: message.into(), retryable }
    }

    /// Creates an address error.
    pub fn address(message: impl Into<String>) -> Self {
        Self::Address { message: message.into() }
    }

    /// Creates a frame error.
    pub fn frame(message: impl Into<String>) -> Self {
        Self::Frame { message: message.into() }
    }

    /// Creates a device exception error.
    pub fn device_exception(code: u8, message: impl Into<String>) -> Self {
        Self::DeviceException { code, message: message.into() }
    }

    /// Creates a transform error.
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform { message: message.into() }
    }

    /// Creates a not-connected error.
    pub fn not_connected(endpoint: impl Into<String>) -> Self {
        Self::NotConnected { endpoint: endpoint.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Creates a not-supported error.
    pub fn not_supported(operation: impl Into<String>) -> Self {
        Self::NotSupported { operation: operation.into() }
    }

    /// Returns `true` if a caller-driven reconnect and retry may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { retryable, .. } => *retryable,
            Self::NotConnected { .. } => true,
            Self::Frame { .. } => true,
            Self::Address { .. }
            | Self::DeviceException { .. }
            | Self::Transform { .. }
            | Self::Configuration { .. }
            | Self::NotSupported { .. } => false,
        }
    }

    /// Stable category label for logging and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Address { .. } => "address",
            Self::Frame { .. } => "frame",
            Self::DeviceException { .. } => "device_exception",
            Self::Transform { .. } => "transform",
            Self::NotConnected { .. } => "not_connected",
            Self::Configuration { .. } => "configuration",
            Self::NotSupported { .. } => "not_supported",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
