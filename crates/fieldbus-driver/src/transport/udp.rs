// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Modbus UDP byte channel.
//!
//! UDP is datagram-oriented while the session layer reads in exact
//! byte counts, so each received datagram is buffered and drained
//! through [`Transport::read_exact`].

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::config::UdpConfig;
use crate::error::TransportError;

use super::Transport;

const MAX_DATAGRAM: usize = 512;

// =============================================================================
// UdpTransport
// =============================================================================

/// Connected UDP socket transport.
#[derive(Debug)]
pub struct UdpTransport {
    config: UdpConfig,
    socket: Option<UdpSocket>,
    buffer: VecDeque<u8>,
}

impl UdpTransport {
    /// Creates a closed transport.
    pub fn new(config: UdpConfig) -> Self {
        Self { config, socket: None, buffer: VecDeque::new() }
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        self.socket = None;
        self.buffer.clear();
        let endpoint = self.config.endpoint();

        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket
            .connect(&endpoint)
            .await
            .map_err(|e| TransportError::ConnectionFailed(format!("{}: {}", endpoint, e)))?;

        tracing::info!(endpoint = %endpoint, "udp transport opened");
        self.socket = Some(socket);
        Ok(())
    }

    async fn close(&mut self) {
        if self.socket.take().is_some() {
            self.buffer.clear();
            tracing::debug!(endpoint = %self.config.endpoint(), "udp transport closed");
        }
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        // A new request invalidates any unread remainder of the
        // previous response datagram.
        self.buffer.clear();
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| TransportError::NotOpen(self.config.endpoint()))?;
        socket.send(frame).await?;
        Ok(())
    }

    async fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, TransportError> {
        let window = self.config.read_timeout;
        let Self { config, socket, buffer } = self;
        let socket = socket
            .as_ref()
            .ok_or_else(|| TransportError::NotOpen(config.endpoint()))?;

        while buffer.len() < n {
            let mut datagram = [0u8; MAX_DATAGRAM];
            let received = timeout(window, socket.recv(&mut datagram))
                .await
                .map_err(|_| TransportError::Timeout(window))??;
            buffer.extend(&datagram[..received]);
        }
        Ok(buffer.drain(..n).collect())
    }

    fn display_name(&self) -> String {
        self.config.endpoint()
    }
}

// =============================================================================
// Tests
// =============================================================================
