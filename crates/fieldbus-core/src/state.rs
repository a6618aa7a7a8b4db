// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Connection lifecycle state shared by all driver adapters.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ConnectionState
// =============================================================================

/// Lifecycle state of a device connection.
///
/// Transitions: `Disconnected -> Connecting -> Connected` on success,
/// `Connecting -> Disconnected` on a failed attempt, and
/// `Connected -> Broken` when an established link fails mid-operation.
/// `Broken` is left only through an explicit reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection has been established, or it was closed deliberately.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The link is established and operational.
    Connected,
    /// The link was established and then failed.
    Broken,
}

impl ConnectionState {
    /// Returns `true` if operations may be issued.
    pub fn is_operational(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` if the state records a past failure.
    pub fn is_faulted(&self) -> bool {
        matches!(self, Self::Broken)
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::Disconnected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Broken => "broken",
        };
        write!(f, "{}", s)
    }
}

// =============================================================================
// Tests
// =============================================================================
