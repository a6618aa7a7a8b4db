// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Modbus TCP byte channel.

use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::TcpConfig;
use crate::error::TransportError;

use super::Transport;

// =============================================================================
// TcpTransport
// =============================================================================

/// TCP stream transport with bounded connect and read windows.
#[derive(Debug)]
pub struct TcpTransport {
    config: TcpConfig,
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Creates a closed transport.
    pub fn new(config: TcpConfig) -> Self {
        Self { config, stream: None }
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream, TransportError> {
        let endpoint = self.config.endpoint();
        self.stream
            .as_mut()
            .ok_or(TransportError::NotOpen(endpoint))
    }
}

fn map_connect_error(err: io::Error, endpoint: &str) -> TransportError {
    match err.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected => {
            TransportError::ConnectionFailed(format!("{}: {}", endpoint, err))
        }
        _ => TransportError::Io(err),
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        // Never reuse a stale handle.
        self.stream = None;
        let endpoint = self.config.endpoint();

        let stream = timeout(self.config.connect_timeout, TcpStream::connect(&endpoint))
            .await
            .map_err(|_| TransportError::Timeout(self.config.connect_timeout))?
            .map_err(|e| map_connect_error(e, &endpoint))?;
        stream.set_nodelay(true)?;

        tracing::info!(endpoint = %endpoint, "tcp transport opened");
        self.stream = Some(stream);
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
            tracing::debug!(endpoint = %self.config.endpoint(), "tcp transport closed");
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

    fn display_name(&self) -> String {
        self.config.endpoint()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_open_and_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut peer, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4];
            peer.read_exact(&mut buf).await.unwrap();
            peer.write_all(&buf).await.unwrap();
        });

        let mut transport = TcpTransport::new(TcpConfig::new("127.0.0.1", addr.port()));
        assert!(!transport.is_open());
        transport.open().await.unwrap();
        assert!(transport.is_open());

        transport.write_frame(&[1, 2, 3, 4]).await.unwrap();
        let echo = transport.read_exact(4).await.unwrap();
        assert_eq!(echo, vec![1, 2, 3, 4]);

        transport.close().await;
        assert!(!transport.is_open());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to find a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut transport = TcpTransport::new(TcpConfig::new("127.0.0.1", addr.port()));
        let err = transport.open().await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::ConnectionFailed(_) | TransportError::Timeout(_)
        ));
    }

    #[tokio::test]
    async fn test_read_without_open() {
        let mut transport = TcpTransport::new(TcpConfig::new("127.0.0.1", 502));
        assert!(matches!(
            transport.read_exact(1).await.unwrap_err(),
            TransportError::NotOpen(_)
        ));
    }

    #[tokio::test]
    async fn test_read_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_peer, _) = listener.accept().await.unwrap();
            // Hold the connection open without sending anything.
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        });

        let mut config = TcpConfig::new("127.0.0.1", addr.port());
        config.read_timeout = std::time::Duration::from_millis(50);
        let mut transport = TcpTransport::new(config);
        transport.open().await.unwrap();
        assert!(matches!(
            transport.read_exact(1).await.unwrap_err(),
            TransportError::Timeout(_)
        ));
    }
}
