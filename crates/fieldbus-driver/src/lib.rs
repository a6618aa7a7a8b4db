// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # fieldbus-driver
//!
//! Master-side field-protocol engine: Modbus TCP/UDP/ASCII, Delta DVP
//! and Panasonic Mewtocol drivers behind the uniform
//! [`DriverAdapter`](fieldbus_core::DriverAdapter) capability set.
//!
//! The engine builds bit-exact request frames, validates responses
//! (checksums, exception codes, transaction ids, write echoes), decodes
//! register payloads into typed values under configurable byte-order
//! rules, and manages fragile physical connections with a fail-fast,
//! no-auto-retry posture.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      DriverAdapter impls                        │
//! │      (ModbusAdapter / DeltaAsciiAdapter / MewtocolAdapter)      │
//! └─────────────────────────────────────────────────────────────────┘
//!        │ address parse          │ frame codec        │ transform
//!        ▼                        ▼                    ▼
//! ┌──────────────┐   ┌─────────────────────┐   ┌───────────────────┐
//! │ address /    │   │ frame::{pdu, mbap,  │   │  ByteTransform    │
//! │ device table │   │ ascii, mewtocol}    │   │  (DataFormat)     │
//! └──────────────┘   └─────────────────────┘   └───────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Session<T: Transport>                      │
//! │     (state machine, message ids, turnaround, fault events)      │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!            ┌─────────────────┼─────────────────┐
//!            ▼                 ▼                 ▼
//!   ┌──────────────┐   ┌──────────────┐  ┌─────────────────┐
//!   │ TcpTransport │   │ UdpTransport │  │ SerialTransport │
//!   └──────────────┘   └──────────────┘  └─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fieldbus_core::{DataKind, DriverAdapter, FaultNotifier};
//! use fieldbus_driver::adapter::ModbusAdapter;
//! use fieldbus_driver::config::{AdapterConfig, TcpConfig};
//!
//! let adapter = ModbusAdapter::tcp(
//!     TcpConfig::new("192.168.1.100", 502),
//!     AdapterConfig::builder().station(1).build(),
//!     FaultNotifier::disabled(),
//! )?;
//!
//! adapter.connect().await?;
//! let values = adapter.read("s=1;x=3;100", 2, DataKind::Float32).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod adapter;
pub mod address;
pub mod config;
pub mod device;
pub mod error;
pub mod frame;
pub mod session;
pub mod transform;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use adapter::{
    build_adapter,
    build_adapter_from_json,
    DeltaAsciiAdapter,
    MewtocolAdapter,
    ModbusAdapter,
};
pub use address::{AddressDefaults, ElementAddress};
pub use config::{
    AdapterConfig,
    AdapterConfigBuilder,
    DataBits,
    EndpointConfig,
    Parity,
    SerialConfig,
    StopBits,
    TcpConfig,
    UdpConfig,
};
pub use error::{
    AddressError,
    ExceptionCode,
    FieldbusError,
    FieldbusResult,
    FrameError,
    TransformError,
    TransportError,
};
pub use session::Session;
pub use transform::ByteTransform;
pub use transport::{SerialTransport, TcpTransport, Transport, UdpTransport};
pub use types::{DataFormat, FunctionCode};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
