// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # fieldbus-core
//!
//! Protocol-agnostic foundation of the fieldbus driver layer.
//!
//! This crate defines the vocabulary every protocol crate speaks:
//!
//! - **Values**: [`Value`] tagged variant and [`DataKind`] wire types
//! - **State**: [`ConnectionState`] lifecycle machine
//! - **Errors**: [`DriverError`] unified adapter error
//! - **Faults**: [`FaultEvent`] / [`FaultNotifier`] explicit observer channel
//! - **Capability**: [`DriverAdapter`] trait and the closed [`ProtocolFamily`] set
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Polling / tag layer                        │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       DriverAdapter                             │
//! │        (connect / read / read_discrete / write / state)         │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              Protocol crates (fieldbus-driver, ...)             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod error;
pub mod notify;
pub mod state;
pub mod value;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::{DriverAdapter, ProtocolFamily};
pub use error::{DriverError, DriverResult};
pub use notify::{FaultEvent, FaultNotifier};
pub use state::ConnectionState;
pub use value::{DataKind, Value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
