// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Fault notification channel.
//!
//! Adapters report communication faults to whoever constructed them
//! through an explicit [`FaultNotifier`] handle instead of a global
//! hook. A notifier without a subscriber is valid and silently drops
//! events, so adapters never need to special-case "nobody listening".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

// =============================================================================
// FaultEvent
// =============================================================================

/// A communication fault reported by a driver adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultEvent {
    /// Adapter type name that raised the fault, e.g. `"ModbusTcpAdapter"`.
    pub source: String,
    /// Human-readable fault description.
    pub message: String,
    /// When the fault was observed.
    pub at: DateTime<Utc>,
}

impl FaultEvent {
    /// Creates a fault event stamped with the current time.
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            at: Utc::now(),
        }
    }
}

// =============================================================================
// FaultNotifier
// =============================================================================

/// Cloneable handle adapters use to publish [`FaultEvent`]s.
#[derive(Debug, Clone)]
pub struct FaultNotifier {
    tx: Option<mpsc::UnboundedSender<FaultEvent>>,
}

impl FaultNotifier {
    /// Creates a notifier with a subscriber, returning the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<FaultEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Creates a notifier that discards every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Publishes a fault. Dropped receivers are ignored.
    pub fn raise(&self, source: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(source = %source, fault = %message, "communication fault");
        if let Some(tx) = &self.tx {
            let _ = tx.send(FaultEvent::new(source, message));
        }
    }
}

impl Default for FaultNotifier {
    fn default() -> Self {
        Self::disabled()
    }
}

// =============================================================================
// Tests
// =============================================================================
