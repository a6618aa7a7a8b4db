// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Connection and session management.
//!
//! [`Session`] owns one transport, the [`ConnectionState`] machine, and
//! the wrapping 16-bit message-id counter. It provides one-shot
//! request/response round trips for each framing style; the adapter
//! serializes access with its own mutex, so the session itself never
//! sees concurrent round trips.
//!
//! Failure posture: no operation retries. An operation issued while the
//! session is not connected fails fast without touching the transport.
//! A transport failure on an established link marks the session
//! `Broken` and reports through the fault notifier; recovery is the
//! caller's explicit reconnect.

use tokio::time::sleep;

use fieldbus_core::{ConnectionState, FaultNotifier};

use crate::error::{FieldbusError, FieldbusResult, FrameError};
use crate::frame::{ascii, mbap};
use crate::transport::Transport;

// =============================================================================
// Session
// =============================================================================

/// One logical master/slave session over an exclusively owned transport.
#[derive(Debug)]
pub struct Session<T: Transport> {
    transport: T,
    state: ConnectionState,
    message_id: u16,
    notifier: FaultNotifier,
    source: &'static str,
}

impl<T: Transport> Session<T> {
    /// Creates a disconnected session.
    ///
    /// `source` names the owning adapter in fault events.
    pub fn new(transport: T, notifier: FaultNotifier, source: &'static str) -> Self {
        Self {
            transport,
            state: ConnectionState::Disconnected,
            message_id: 0,
            notifier,
            source,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Endpoint description of the owned transport.
    pub fn display_name(&self) -> String {
        self.transport.display_name()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Connects, discarding any previous transport handle first.
    pub async fn connect(&mut self) -> FieldbusResult<()> {
        self.state = ConnectionState::Connecting;
        self.transport.close().await;
        match self.transport.open().await {
            Ok(()) => {
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(err) => {
                self.state = ConnectionState::Disconnected;
                self.notifier.raise(self.source, err.to_string());
                Err(err.into())
            }
        }
    }

    /// Closes the transport and returns to `Disconnected`.
    pub async fn disconnect(&mut self) {
        self.transport.close().await;
        self.state = ConnectionState::Disconnected;
    }

    /// Availability probe: a full connect attempt, leaving the session
    /// connected on success.
    pub async fn probe(&mut self) -> bool {
        self.connect().await.is_ok()
    }

    // =========================================================================
    // Round Trips
    // =========================================================================

    /// Next transaction id. Wraps at the 16-bit boundary and is never
    /// reset by a reconnect.
    fn next_message_id(&mut self) -> u16 {
        self.message_id = self.message_id.wrapping_add(1);
        self.message_id
    }

    fn ensure_connected(&self) -> FieldbusResult<()> {
        if self.state.is_operational() {
            Ok(())
        } else {
            Err(FieldbusError::NotConnected(self.transport.display_name()))
        }
    }

    fn fail(&mut self, err: impl Into<FieldbusError>) -> FieldbusError {
        let err = err.into();
        self.state = ConnectionState::Broken;
        self.notifier.raise(self.source, err.to_string());
        err
    }

    async fn pause_turnaround(&self) {
        let pause = self.transport.turnaround();
        if !pause.is_zero() {
            sleep(pause).await;
        }
    }

    /// Sends a PDU in an MBAP envelope and returns the response PDU.
    pub async fn round_trip_mbap(&mut self, unit: u8, pdu: &[u8]) -> FieldbusResult<Vec<u8>> {
        self.ensure_connected()?;
        let tid = self.next_message_id();
        let frame = mbap::pack(tid, unit, pdu);

        if let Err(err) = self.transport.write_frame(&frame).await {
            return Err(self.fail(err));
        }
        self.pause_turnaround().await;

        let header_bytes = match self.transport.read_exact(mbap::HEADER_LEN).await {
            Ok(bytes) => bytes,
            Err(err) => return Err(self.fail(err)),
        };
        let header = mbap::parse_header(&header_bytes)?;
        mbap::validate_identity(&header, tid, unit)?;

        let body = match self.transport.read_exact(header.length as usize - 1).await {
            Ok(bytes) => bytes,
            Err(err) => return Err(self.fail(err)),
        };
        Ok(body)
    }

    /// Sends a PDU in an ASCII envelope and returns the response PDU.
    pub async fn round_trip_ascii(&mut self, station: u8, pdu: &[u8]) -> FieldbusResult<Vec<u8>> {
        self.ensure_connected()?;
        let line = ascii::encode(station, pdu);

        if let Err(err) = self.transport.write_frame(line.as_bytes()).await {
            return Err(self.fail(err));
        }
        self.pause_turnaround().await;

        let response = match self.transport.read_line().await {
            Ok(line) => line,
            Err(err) => return Err(self.fail(err)),
        };
        let (echo_station, response_pdu) = ascii::decode(&response)?;
        if echo_station != station {
            return Err(FrameError::IdentityMismatch(format!(
                "station {} does not answer request for station {}",
                echo_station, station
            ))
            .into());
        }
        Ok(response_pdu)
    }

    /// Sends a raw line frame and returns the raw response line, for
    /// vendor codecs with their own envelope (Mewtocol).
    pub async fn round_trip_line(&mut self, line: &str) -> FieldbusResult<String> {
        self.ensure_connected()?;

        if let Err(err) = self.transport.write_frame(line.as_bytes()).await {
            return Err(self.fail(err));
        }
        self.pause_turnaround().await;

        match self.transport.read_line().await {
            Ok(response) => Ok(response),
            Err(err) => Err(self.fail(err)),
        }
    }
}

#[cfg(test)]
impl Session<crate::testing::MockTransport> {
    pub(crate) fn transport_mut(&mut self) -> &mut crate::testing::MockTransport {
        &mut self.transport
    }
}

// =============================================================================
// Tests
// =============================================================================
