// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Serial line byte channel.
//!
//! Carries both Modbus ASCII (CRLF-terminated lines) and Mewtocol
//! (CR-terminated lines). The configured turnaround pause is surfaced
//! through [`Transport::turnaround`] and awaited by the session between
//! write and read.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use crate::config::{DataBits, Parity, SerialConfig, StopBits};
use crate::error::TransportError;

use super::Transport;

// =============================================================================
// LineTerminator
// =============================================================================

/// Line delimiter of the framing carried over this port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    /// CR LF, Modbus ASCII.
    CrLf,
    /// CR only, Mewtocol.
    Cr,
}

// =============================================================================
// SerialTransport
// =============================================================================

/// Serial port transport built on `tokio-serial`.
pub struct SerialTransport {
    config: SerialConfig,
    terminator: LineTerminator,
    stream: Option<SerialStream>,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("line", &self.config.line_description())
            .field("terminator", &self.terminator)
            .field("open", &self.stream.is_some())
            .finish()
    }
}

impl SerialTransport {
    /// Creates a closed transport for CRLF-terminated framing.
    pub fn new(config: SerialConfig) -> Self {
        Self::with_terminator(config, LineTerminator::CrLf)
    }

    /// Creates a closed transport with an explicit line terminator.
    pub fn with_terminator(config: SerialConfig, terminator: LineTerminator) -> Self {
        Self { config, terminator, stream: None }
    }

    fn stream_mut(&mut self) -> Result<&mut SerialStream, TransportError> {
        let port = self.config.port.clone();
        self.stream.as_mut().ok_or(TransportError::NotOpen(port))
    }
}

fn convert_data_bits(bits: DataBits) -> tokio_serial::DataBits {
    match bits {
        DataBits::Seven => tokio_serial::DataBits::Seven,
        DataBits::Eight => tokio_serial::DataBits::Eight,
    }
}

fn convert_parity(parity: Parity) -> tokio_serial::Parity {
    match parity {
        Parity::None => tokio_serial::Parity::None,
        Parity::Odd => tokio_serial::Parity::Odd,
        Parity::Even => tokio_serial::Parity::Even,
    }
}

fn convert_stop_bits(bits: StopBits) -> tokio_serial::StopBits {
    match bits {
        StopBits::One => tokio_serial::StopBits::One,
        StopBits::Two => tokio_serial::StopBits::Two,
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        self.stream = None;

        let stream = tokio_serial::new(&self.config.port, self.config.baud_rate)
            .data_bits(convert_data_bits(self.config.data_bits))
            .parity(convert_parity(self.config.parity))
            .stop_bits(convert_stop_bits(self.config.stop_bits))
            .open_native_async()
            .map_err(|e| {
                TransportError::ConnectionFailed(format!("{}: {}", self.config.port, e))
            })?;

        tracing::info!(line = %self.config.line_description(), "serial transport opened");
        self.stream = Some(stream);
        Ok(())
    }

    async fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!(port = %self.config.port, "serial transport closed");
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        let stream = self.stream_mut()?;
        stream.write_all(frame).await?;
        stream.flush().await?;
        Ok(())
    }

    async fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, TransportError> {
        let window = self.config.read_timeout;
        let stream = self.stream_mut()?;
        let mut buf = vec![0u8; n];
        timeout(window, stream.read_exact(&mut buf))
            .await
            .map_err(|_| TransportError::Timeout(window))??;
        Ok(buf)
    }

    async fn read_line(&mut self) -> Result<String, TransportError> {
        let window = self.config.read_timeout;
        let terminator = self.terminator;
        let stream = self.stream_mut()?;

        let line = timeout(window, async {
            let mut line = Vec::new();
            loop {
                let byte = stream.read_u8().await?;
                line.push(byte);
                let done = match terminator {
                    LineTerminator::Cr => byte == b'\r',
                    LineTerminator::CrLf => byte == b'\n',
                };
                if done {
                    return Ok::<_, std::io::Error>(line);
                }
            }
        })
        .await
        .map_err(|_| TransportError::Timeout(window))??;

        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    fn turnaround(&self) -> Duration {
        self.config.turnaround
    }

    fn display_name(&self) -> String {
        self.config.line_description()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_conversion() {
        assert_eq!(convert_data_bits(DataBits::Seven), tokio_serial::DataBits::Seven);
        assert_eq!(convert_parity(Parity::Even), tokio_serial::Parity::Even);
        assert_eq!(convert_stop_bits(StopBits::Two), tokio_serial::StopBits::Two);
    }

    #[tokio::test]
    async fn test_open_missing_port() {
        let mut transport = SerialTransport::new(SerialConfig::new("/dev/nonexistent-port"));
        assert!(matches!(
            transport.open().await.unwrap_err(),
            TransportError::ConnectionFailed(_)
        ));
        assert!(!transport.is_open());
    }

    #[tokio::test]
    async fn test_operations_require_open() {
        let mut transport = SerialTransport::with_terminator(
            SerialConfig::new("COM99"),
            LineTerminator::Cr,
        );
        assert!(matches!(
            transport.write_frame(b":00\r\n").await.unwrap_err(),
            TransportError::NotOpen(_)
        ));
        assert!(matches!(
            transport.read_line().await.unwrap_err(),
            TransportError::NotOpen(_)
        ));
        assert_eq!(transport.turnaround(), std::time::Duration::from_millis(100));
    }
}
