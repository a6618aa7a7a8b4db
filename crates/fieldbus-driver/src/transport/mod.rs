// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Raw byte channels.
//!
//! A [`Transport`] is a duplex byte pipe with no protocol knowledge:
//! it opens, closes, writes whole frames, and reads either exact byte
//! counts (binary framing) or delimiter-terminated lines (ASCII
//! framing). Retry policy lives above, in the session.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::TransportError;

mod serial;
mod tcp;
mod udp;

pub use serial::{LineTerminator, SerialTransport};
pub use tcp::TcpTransport;
pub use udp::UdpTransport;

// =============================================================================
// Transport Trait
// =============================================================================

/// Duplex byte channel over a socket or serial line.
///
/// Implementations hold at most one underlying handle; `open` discards
/// any previous handle before creating a fresh one, so a half-dead
/// connection is never reused.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens the channel, replacing any existing handle.
    async fn open(&mut self) -> Result<(), TransportError>;

    /// Closes the channel and drops the handle.
    async fn close(&mut self);

    /// Returns `true` if a handle is currently held.
    fn is_open(&self) -> bool;

    /// Writes one complete frame.
    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Reads exactly `n` bytes within the configured read window.
    async fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, TransportError>;

    /// Reads one delimiter-terminated line (ASCII transports only).
    async fn read_line(&mut self) -> Result<String, TransportError> {
        Err(TransportError::NotSupported("line-delimited reads"))
    }

    /// Pause between writing a request and reading its response.
    fn turnaround(&self) -> Duration {
        Duration::ZERO
    }

    /// Endpoint description for logs.
    fn display_name(&self) -> String;
}
