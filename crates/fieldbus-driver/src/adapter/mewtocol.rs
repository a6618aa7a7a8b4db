// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Panasonic Mewtocol adapter.
//!
//! Addresses name either a data register (`DT100`) or a contact
//! (`R10.1`, `X0.5`, `Y2.A`) where the bit index is a hex digit. An
//! `s=` prefix overrides the configured station.

use async_trait::async_trait;
use tokio::sync::Mutex;

use fieldbus_core::{
    ConnectionState, DataKind, DriverAdapter, DriverResult, FaultNotifier, ProtocolFamily, Value,
};

use crate::address;
use crate::config::{AdapterConfig, SerialConfig};
use crate::error::{AddressError, FieldbusResult, FrameError};
use crate::frame::mewtocol;
use crate::session::Session;
use crate::transform::ByteTransform;
use crate::transport::{LineTerminator, SerialTransport};

const MAX_BATCH_WORDS: u16 = 120;

// =============================================================================
// Address Targets
// =============================================================================

/// A resolved Mewtocol target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// DT data register word offset.
    Data(u16),
    /// Contact point: area letter, word offset, bit index.
    Contact { area: char, word: u16, bit: u8 },
}

fn parse_target(rest: &str) -> Result<Target, AddressError> {
    let upper = rest.trim().to_ascii_uppercase();
    if let Some(digits) = upper.strip_prefix("DT").or_else(|| upper.strip_prefix('D')) {
        let word: u16 = digits
            .parse()
            .map_err(|_| AddressError::InvalidFormat(format!("bad data address '{}'", rest)))?;
        return Ok(Target::Data(word));
    }
    let mut chars = upper.chars();
    let area = chars
        .next()
        .ok_or_else(|| AddressError::InvalidFormat("empty address".into()))?;
    if !matches!(area, 'R' | 'X' | 'Y') {
        return Err(AddressError::UnknownDevice(format!("device prefix '{}'", area)));
    }
    let body = chars.as_str();
    let (word_text, bit) = match body.split_once('.') {
        Some((word, bit_text)) => {
            let bit = u8::from_str_radix(bit_text, 16)
                .ok()
                .filter(|b| *b < 16)
                .ok_or_else(|| {
                    AddressError::InvalidFormat(format!("bad bit index in '{}'", rest))
                })?;
            (word, bit)
        }
        None => (body, 0),
    };
    let word: u16 = word_text
        .parse()
        .map_err(|_| AddressError::InvalidFormat(format!("bad contact word in '{}'", rest)))?;
    Ok(Target::Contact { area, word, bit })
}

// =============================================================================
// MewtocolAdapter
// =============================================================================

/// Panasonic Mewtocol master adapter over a serial line.
#[derive(Debug)]
pub struct MewtocolAdapter {
    config: AdapterConfig,
    transform: ByteTransform,
    session: Mutex<Session<SerialTransport>>,
}

impl MewtocolAdapter {
    /// Creates a Mewtocol adapter.
    pub fn new(
        endpoint: SerialConfig,
        config: AdapterConfig,
        notifier: FaultNotifier,
    ) -> FieldbusResult<Self> {
        endpoint.validate()?;
        let transport = SerialTransport::with_terminator(endpoint, LineTerminator::Cr);
        let transform = ByteTransform::new(config.data_format, config.string_reverse);
        Ok(Self {
            config,
            transform,
            session: Mutex::new(Session::new(transport, notifier, "MewtocolAdapter")),
        })
    }

    fn resolve(&self, raw: &str) -> Result<(u8, Target), AddressError> {
        let (station, function, rest) = address::split_prefixes(raw)?;
        if function.is_some() {
            return Err(AddressError::InvalidFormat(
                "x= function codes do not apply to mewtocol".into(),
            ));
        }
        Ok((station.unwrap_or(self.config.station), parse_target(rest)?))
    }

    async fn exchange(
        &self,
        session: &mut Session<SerialTransport>,
        station: u8,
        command: &str,
        echo: &str,
    ) -> FieldbusResult<String> {
        let line = mewtocol::encode_command(station, command);
        let response = session.round_trip_line(&line).await?;
        let body = mewtocol::decode_response(&response, station)?;
        Ok(mewtocol::strip_echo(&body, echo)?.to_string())
    }

    async fn read_words(&self, station: u8, start: u16, total: u16) -> FieldbusResult<Vec<u16>> {
        if total > 0 && start.checked_add(total - 1).is_none() {
            return Err(AddressError::InvalidFormat(format!(
                "data span {}+{} leaves the register space",
                start, total
            ))
            .into());
        }
        let mut words = Vec::with_capacity(total as usize);
        let mut done: u16 = 0;
        let mut session = self.session.lock().await;
        while done < total {
            let chunk = (total - done).min(MAX_BATCH_WORDS);
            let command = mewtocol::read_data_command(start + done, chunk)?;
            let data = self.exchange(&mut session, station, &command, "RD").await?;
            let mut part = mewtocol::hex_to_words(&data)?;
            if part.len() != chunk as usize {
                return Err(FrameError::TruncatedFrame {
                    declared: chunk as usize * 2,
                    actual: part.len() * 2,
                }
                .into());
            }
            words.append(&mut part);
            done += chunk;
        }
        Ok(words)
    }

    async fn read_contacts(
        &self,
        station: u8,
        area: char,
        word: u16,
        bit: u8,
        count: u16,
    ) -> FieldbusResult<Vec<bool>> {
        let mut bits = Vec::with_capacity(count as usize);
        let mut session = self.session.lock().await;
        for i in 0..count {
            let absolute = word as u32 * 16 + bit as u32 + i as u32;
            let command =
                mewtocol::read_contact_command(area, (absolute / 16) as u16, (absolute % 16) as u8);
            let data = self.exchange(&mut session, station, &command, "RC").await?;
            match data.as_str() {
                "0" => bits.push(false),
                "1" => bits.push(true),
                other => {
                    return Err(FrameError::Malformed(format!("contact state '{}'", other)).into())
                }
            }
        }
        Ok(bits)
    }

    fn words_for(kind: DataKind, count: u16) -> FieldbusResult<u16> {
        let total = match kind {
            DataKind::String => (count as u32).div_ceil(2),
            other => count as u32 * other.register_count() as u32,
        };
        u16::try_from(total).map_err(|_| {
            AddressError::InvalidFormat(format!(
                "{} elements of {} exceed the data register space",
                count, kind
            ))
            .into()
        })
    }
}

#[async_trait]
impl DriverAdapter for MewtocolAdapter {
    async fn connect(&self) -> DriverResult<()> {
        let mut session = self.session.lock().await;
        session.connect().await.map_err(Into::into)
    }

    async fn disconnect(&self) -> DriverResult<()> {
        let mut session = self.session.lock().await;
        session.disconnect().await;
        Ok(())
    }

    async fn is_available(&self) -> bool {
        let mut session = self.session.lock().await;
        session.probe().await
    }

    async fn connection_state(&self) -> ConnectionState {
        self.session.lock().await.state()
    }

    async fn read(&self, address: &str, count: u16, kind: DataKind) -> DriverResult<Vec<Value>> {
        let (station, target) = self.resolve(address)?;
        match (target, kind) {
            (Target::Contact { area, word, bit }, _) => {
                let bits = self.read_contacts(station, area, word, bit, count).await?;
                Ok(bits.into_iter().map(Value::Bool).collect())
            }
            (Target::Data(_), DataKind::Bool) => {
                Err(AddressError::InvalidFormat("bool reads need a contact address".into()).into())
            }
            (Target::Data(start), kind) => {
                let total = Self::words_for(kind, count)?;
                let words = self.read_words(station, start, total).await?;
                let mut payload = Vec::with_capacity(words.len() * 2);
                for word in words {
                    payload.extend_from_slice(&word.to_be_bytes());
                }
                Ok(self.transform.decode(kind, &payload, count)?)
            }
        }
    }

    async fn read_discrete(&self, address: &str, count: u16) -> DriverResult<Vec<bool>> {
        let (station, target) = self.resolve(address)?;
        match target {
            Target::Contact { area, word, bit } => {
                Ok(self.read_contacts(station, area, word, bit, count).await?)
            }
            Target::Data(_) => {
                Err(AddressError::InvalidFormat("discrete reads need a contact address".into())
                    .into())
            }
        }
    }

    async fn write(&self, address: &str, value: Value) -> DriverResult<()> {
        let (station, target) = self.resolve(address)?;
        match (target, &value) {
            (Target::Contact { area, word, bit }, Value::Bool(state)) => {
                let command = mewtocol::write_contact_command(area, word, bit, *state);
                let mut session = self.session.lock().await;
                self.exchange(&mut session, station, &command, "WC").await?;
                Ok(())
            }
            (Target::Contact { .. }, _) => {
                Err(AddressError::InvalidFormat("contacts accept bool values only".into()).into())
            }
            (Target::Data(_), Value::Bool(_)) => {
                Err(AddressError::InvalidFormat("bool writes need a contact address".into()).into())
            }
            (Target::Data(start), other) => {
                let payload = self.transform.encode(other)?;
                let words: Vec<u16> = payload
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                if words.is_empty() {
                    return Err(AddressError::InvalidFormat(
                        "empty write payload".into(),
                    )
                    .into());
                }
                let command = mewtocol::write_data_command(start, &words)?;
                let mut session = self.session.lock().await;
                self.exchange(&mut session, station, &command, "WD").await?;
                Ok(())
            }
        }
    }

    fn family(&self) -> ProtocolFamily {
        ProtocolFamily::Mewtocol
    }

    fn display_name(&self) -> String {
        match self.session.try_lock() {
            Ok(session) => session.display_name(),
            Err(_) => ProtocolFamily::Mewtocol.name().to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
