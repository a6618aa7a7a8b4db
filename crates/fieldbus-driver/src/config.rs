// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Driver configuration.
//!
//! All structs deserialize from the channel/device configuration kept by
//! the excluded studio layer. Durations accept humantime strings
//! (`"3s"`, `"500ms"`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{FieldbusError, FieldbusResult};
use crate::types::DataFormat;

// =============================================================================
// Serial Port Settings
// =============================================================================

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataBits {
    /// 7 data bits (common for ASCII framing).
    #[serde(rename = "7")]
    Seven,
    /// 8 data bits.
    #[serde(rename = "8")]
    Eight,
}

impl DataBits {
    /// Numeric bit count.
    pub fn bits(&self) -> u8 {
        match self {
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }
}

impl Default for DataBits {
    fn default() -> Self {
        Self::Eight
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    /// No parity bit.
    None,
    /// Odd parity.
    Odd,
    /// Even parity.
    Even,
}

impl Parity {
    /// Single-character notation (`N`, `O`, `E`).
    pub fn char(&self) -> char {
        match self {
            Self::None => 'N',
            Self::Odd => 'O',
            Self::Even => 'E',
        }
    }
}

impl Default for Parity {
    fn default() -> Self {
        Self::None
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBits {
    /// One stop bit.
    #[serde(rename = "1")]
    One,
    /// Two stop bits.
    #[serde(rename = "2")]
    Two,
}

impl Default for StopBits {
    fn default() -> Self {
        Self::One
    }
}

// =============================================================================
// TcpConfig
// =============================================================================

/// Modbus TCP endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcpConfig {
    /// Hostname or IP address of the device.
    pub host: String,

    /// TCP port, conventionally 502.
    #[serde(default = "default_modbus_port")]
    pub port: u16,

    /// Bound on the connect attempt.
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Bound on each response read.
    #[serde(with = "humantime_serde", default = "default_read_timeout")]
    pub read_timeout: Duration,
}

fn default_modbus_port() -> u16 {
    502
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(3)
}

impl TcpConfig {
    /// Creates a config with default timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: default_connect_timeout(),
            read_timeout: default_read_timeout(),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> FieldbusResult<()> {
        if self.host.is_empty() {
            return Err(FieldbusError::Configuration("host must not be empty".into()));
        }
        if self.connect_timeout.is_zero() || self.read_timeout.is_zero() {
            return Err(FieldbusError::Configuration("timeouts must be non-zero".into()));
        }
        Ok(())
    }

    /// `host:port` endpoint string.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// UdpConfig
// =============================================================================

/// Modbus UDP endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UdpConfig {
    /// Hostname or IP address of the device.
    pub host: String,

    /// UDP port, conventionally 502.
    #[serde(default = "default_modbus_port")]
    pub port: u16,

    /// Bound on each response datagram.
    #[serde(with = "humantime_serde", default = "default_read_timeout")]
    pub read_timeout: Duration,
}

impl UdpConfig {
    /// Creates a config with default timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            read_timeout: default_read_timeout(),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> FieldbusResult<()> {
        if self.host.is_empty() {
            return Err(FieldbusError::Configuration("host must not be empty".into()));
        }
        if self.read_timeout.is_zero() {
            return Err(FieldbusError::Configuration("read_timeout must be non-zero".into()));
        }
        Ok(())
    }

    /// `host:port` endpoint string.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// SerialConfig
// =============================================================================

/// Serial line configuration shared by the ASCII and Mewtocol drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Port name, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,

    /// Baud rate.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Data bits per character.
    #[serde(default)]
    pub data_bits: DataBits,

    /// Parity mode.
    #[serde(default)]
    pub parity: Parity,

    /// Stop bits.
    #[serde(default)]
    pub stop_bits: StopBits,

    /// Inactivity window for response reads.
    #[serde(with = "humantime_serde", default = "default_read_timeout")]
    pub read_timeout: Duration,

    /// Pause between sending a request and reading the response,
    /// covering slow slave turnaround on the shared line.
    #[serde(with = "humantime_serde", default = "default_turnaround")]
    pub turnaround: Duration,
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_turnaround() -> Duration {
    Duration::from_millis(100)
}

impl SerialConfig {
    /// Creates a config with `9600 8N1` defaults.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: default_baud_rate(),
            data_bits: DataBits::default(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            read_timeout: default_read_timeout(),
            turnaround: default_turnaround(),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> FieldbusResult<()> {
        if self.port.is_empty() {
            return Err(FieldbusError::Configuration("serial port must not be empty".into()));
        }
        if self.baud_rate == 0 {
            return Err(FieldbusError::Configuration("baud_rate must be non-zero".into()));
        }
        if self.read_timeout.is_zero() {
            return Err(FieldbusError::Configuration("read_timeout must be non-zero".into()));
        }
        Ok(())
    }

    /// Short line description, e.g. `COM3@9600-8N1`.
    pub fn line_description(&self) -> String {
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        format!(
            "{}@{}-{}{}{}",
            self.port,
            self.baud_rate,
            self.data_bits.bits(),
            self.parity.char(),
            stop
        )
    }
}

// =============================================================================
// EndpointConfig
// =============================================================================

/// Transport selector for factory-style construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum EndpointConfig {
    /// TCP socket endpoint.
    Tcp(TcpConfig),
    /// UDP datagram endpoint.
    Udp(UdpConfig),
    /// Serial line endpoint.
    Serial(SerialConfig),
}

impl EndpointConfig {
    /// Validates the wrapped configuration.
    pub fn validate(&self) -> FieldbusResult<()> {
        match self {
            Self::Tcp(c) => c.validate(),
            Self::Udp(c) => c.validate(),
            Self::Serial(c) => c.validate(),
        }
    }
}

// =============================================================================
// AdapterConfig
// =============================================================================

/// Protocol-level settings shared by all adapter families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Default slave station used when the address string omits `s=`.
    #[serde(default = "default_station")]
    pub station: u8,

    /// When `false`, a parsed offset is decremented once so one-based
    /// documentation addressing maps onto the zero-based wire.
    #[serde(default = "default_true")]
    pub address_start_with_zero: bool,

    /// Multi-register word/byte order.
    #[serde(default)]
    pub data_format: DataFormat,

    /// Reverse 2-byte pairs of string payloads.
    #[serde(default)]
    pub string_reverse: bool,
}

fn default_station() -> u8 {
    1
}

fn default_true() -> bool {
    true
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            station: default_station(),
            address_start_with_zero: default_true(),
            data_format: DataFormat::default(),
            string_reverse: false,
        }
    }
}

impl AdapterConfig {
    /// Builder entry point.
    pub fn builder() -> AdapterConfigBuilder {
        AdapterConfigBuilder::default()
    }
}

/// Builder for [`AdapterConfig`].
#[derive(Debug, Default)]
pub struct AdapterConfigBuilder {
    station: Option<u8>,
    address_start_with_zero: Option<bool>,
    data_format: Option<DataFormat>,
    string_reverse: Option<bool>,
}

impl AdapterConfigBuilder {
    /// Sets the default station.
    pub fn station(mut self, station: u8) -> Self {
        self.station = Some(station);
        self
    }

    /// Sets the zero-based addressing flag.
    pub fn address_start_with_zero(mut self, flag: bool) -> Self {
        self.address_start_with_zero = Some(flag);
        self
    }

    /// Sets the word/byte order.
    pub fn data_format(mut self, format: DataFormat) -> Self {
        self.data_format = Some(format);
        self
    }

    /// Sets string pair reversal.
    pub fn string_reverse(mut self, flag: bool) -> Self {
        self.string_reverse = Some(flag);
        self
    }

    /// Finalizes the configuration.
    pub fn build(self) -> AdapterConfig {
        AdapterConfig {
            station: self.station.unwrap_or_else(default_station),
            address_start_with_zero: self.address_start_with_zero.unwrap_or(true),
            data_format: self.data_format.unwrap_or_default(),
            string_reverse: self.string_reverse.unwrap_or(false),
        }
    }
}

impl fmt::Display for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "station={} zero_based={} format={} string_reverse={}",
            self.station, self.address_start_with_zero, self.data_format, self.string_reverse
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
