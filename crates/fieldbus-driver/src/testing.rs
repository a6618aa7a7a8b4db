// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Scripted transport for unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use crate::error::TransportError;
use crate::transport::Transport;

/// In-memory transport that records writes and replays scripted
/// responses, for exercising sessions and adapters without a device.
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Every frame written, in order.
    pub writes: Vec<Vec<u8>>,
    /// Number of write/read calls that reached the transport.
    pub io_operations: usize,
    bytes: VecDeque<u8>,
    lines: VecDeque<String>,
    open: bool,
    /// When `true`, `open` fails with a connection error.
    pub fail_open: bool,
    /// When `true`, the next write fails with an I/O error.
    pub fail_next_write: bool,
    turnaround: Duration,
}

impl MockTransport {
    /// Creates a closed mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues response bytes served through `read_exact`.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend(bytes);
    }

    /// Queues a response line served through `read_line`.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
    }

    /// Sets the reported turnaround pause.
    pub fn set_turnaround(&mut self, turnaround: Duration) {
        self.turnaround = turnaround;
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        self.open = false;
        if self.fail_open {
            return Err(TransportError::ConnectionFailed("mock: refused".into()));
        }
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.io_operations += 1;
        if !self.open {
            return Err(TransportError::NotOpen("mock".into()));
        }
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock: broken pipe",
            )));
        }
        self.writes.push(frame.to_vec());
        Ok(())
    }

    async fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, TransportError> {
        self.io_operations += 1;
        if !self.open {
            return Err(TransportError::NotOpen("mock".into()));
        }
        if self.bytes.len() < n {
            return Err(TransportError::Timeout(Duration::from_millis(1)));
        }
        Ok(self.bytes.drain(..n).collect())
    }

    async fn read_line(&mut self) -> Result<String, TransportError> {
        self.io_operations += 1;
        if !self.open {
            return Err(TransportError::NotOpen("mock".into()));
        }
        self.lines
            .pop_front()
            .ok_or(TransportError::Timeout(Duration::from_millis(1)))
    }

    fn turnaround(&self) -> Duration {
        self.turnaround
    }

    fn display_name(&self) -> String {
        "mock".into()
    }
}
