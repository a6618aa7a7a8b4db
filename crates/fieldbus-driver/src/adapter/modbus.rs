// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Modbus driver adapters.
//!
//! One adapter type serves the three Modbus flavors; the transport and
//! the [`Framing`] style are fixed at construction. Reads longer than
//! [`pdu::MAX_BATCH_REGISTERS`] registers (or [`pdu::MAX_BATCH_BITS`]
//! bits) are split into sequential sub-requests whose payloads are
//! concatenated in ascending offset order; the first failing
//! sub-request aborts the whole read.

use async_trait::async_trait;
use tokio::sync::Mutex;

use fieldbus_core::{
    ConnectionState, DataKind, DriverAdapter, DriverResult, FaultNotifier, ProtocolFamily, Value,
};

use crate::address::{self, AddressDefaults, ElementAddress};
use crate::config::{AdapterConfig, SerialConfig, TcpConfig, UdpConfig};
use crate::error::{AddressError, FieldbusResult};
use crate::frame::pdu;
use crate::session::Session;
use crate::transform::{unpack_bits, ByteTransform};
use crate::transport::{SerialTransport, TcpTransport, Transport, UdpTransport};
use crate::types::FunctionCode;

// =============================================================================
// Framing
// =============================================================================

/// Envelope style of the wire frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Binary MBAP envelope (TCP/UDP).
    Mbap,
    /// Hex ASCII envelope with LRC (serial).
    Ascii,
}

// =============================================================================
// ModbusAdapter
// =============================================================================

/// Modbus master adapter over one exclusively owned transport.
#[derive(Debug)]
pub struct ModbusAdapter<T: Transport> {
    family: ProtocolFamily,
    framing: Framing,
    config: AdapterConfig,
    transform: ByteTransform,
    session: Mutex<Session<T>>,
}

impl ModbusAdapter<TcpTransport> {
    /// Creates a Modbus TCP adapter.
    pub fn tcp(
        endpoint: TcpConfig,
        config: AdapterConfig,
        notifier: FaultNotifier,
    ) -> FieldbusResult<Self> {
        endpoint.validate()?;
        Ok(Self::with_transport(
            TcpTransport::new(endpoint),
            Framing::Mbap,
            ProtocolFamily::ModbusTcp,
            "ModbusTcpAdapter",
            config,
            notifier,
        ))
    }
}

impl ModbusAdapter<UdpTransport> {
    /// Creates a Modbus UDP adapter.
    pub fn udp(
        endpoint: UdpConfig,
        config: AdapterConfig,
        notifier: FaultNotifier,
    ) -> FieldbusResult<Self> {
        endpoint.validate()?;
        Ok(Self::with_transport(
            UdpTransport::new(endpoint),
            Framing::Mbap,
            ProtocolFamily::ModbusUdp,
            "ModbusUdpAdapter",
            config,
            notifier,
        ))
    }
}

impl ModbusAdapter<SerialTransport> {
    /// Creates a Modbus ASCII adapter over a serial line.
    pub fn ascii(
        endpoint: SerialConfig,
        config: AdapterConfig,
        notifier: FaultNotifier,
    ) -> FieldbusResult<Self> {
        endpoint.validate()?;
        Ok(Self::with_transport(
            SerialTransport::new(endpoint),
            Framing::Ascii,
            ProtocolFamily::ModbusAscii,
            "ModbusAsciiAdapter",
            config,
            notifier,
        ))
    }
}

impl<T: Transport> ModbusAdapter<T> {
    pub(crate) fn with_transport(
        transport: T,
        framing: Framing,
        family: ProtocolFamily,
        source: &'static str,
        config: AdapterConfig,
        notifier: FaultNotifier,
    ) -> Self {
        let transform = ByteTransform::new(config.data_format, config.string_reverse);
        Self {
            family,
            framing,
            config,
            transform,
            session: Mutex::new(Session::new(transport, notifier, source)),
        }
    }

    fn defaults(&self, function: FunctionCode) -> AddressDefaults {
        AddressDefaults::new(self.config.station, function)
            .with_zero_based(self.config.address_start_with_zero)
    }

    async fn round_trip(
        &self,
        session: &mut Session<T>,
        station: u8,
        request: &[u8],
    ) -> FieldbusResult<Vec<u8>> {
        match self.framing {
            Framing::Mbap => session.round_trip_mbap(station, request).await,
            Framing::Ascii => session.round_trip_ascii(station, request).await,
        }
    }

    fn total_registers(kind: DataKind, count: u16) -> FieldbusResult<u16> {
        let total = match kind {
            // For strings the count is the byte length.
            DataKind::String => (count as u32).div_ceil(2),
            other => count as u32 * other.register_count() as u32,
        };
        u16::try_from(total).map_err(|_| {
            AddressError::InvalidFormat(format!(
                "{} elements of {} exceed the 16-bit register space",
                count, kind
            ))
            .into()
        })
    }

    /// Batched register read at a resolved address.
    pub(crate) async fn read_at(
        &self,
        addr: ElementAddress,
        count: u16,
        kind: DataKind,
    ) -> FieldbusResult<Vec<Value>> {
        let total = Self::total_registers(kind, count)?;
        let mut payload = Vec::with_capacity(total as usize * 2);
        let mut done: u16 = 0;

        let mut session = self.session.lock().await;
        while done < total {
            let chunk = (total - done).min(pdu::MAX_BATCH_REGISTERS);
            let chunk_addr = addr.offset_add(done)?;
            let request = pdu::build_read(&chunk_addr, chunk);
            let response = self.round_trip(&mut session, chunk_addr.station, &request).await?;
            let part = pdu::parse_read_payload(&response, chunk_addr.function)?;
            payload.extend_from_slice(&part);
            done += chunk;
        }
        drop(session);

        Ok(self.transform.decode(kind, &payload, count)?)
    }

    /// Batched bit read at a resolved address.
    pub(crate) async fn read_bits_at(
        &self,
        addr: ElementAddress,
        count: u16,
    ) -> FieldbusResult<Vec<bool>> {
        let mut bits = Vec::with_capacity(count as usize);
        let mut done: u16 = 0;

        let mut session = self.session.lock().await;
        while done < count {
            let chunk = (count - done).min(pdu::MAX_BATCH_BITS);
            let chunk_addr = addr.offset_add(done)?;
            let request = pdu::build_read(&chunk_addr, chunk);
            let response = self.round_trip(&mut session, chunk_addr.station, &request).await?;
            let payload = pdu::parse_read_payload(&response, chunk_addr.function)?;
            bits.extend(unpack_bits(&payload, chunk)?);
            done += chunk;
        }
        Ok(bits)
    }

    /// Write at a resolved address, with echo validation.
    pub(crate) async fn write_at(&self, addr: ElementAddress, value: &Value) -> FieldbusResult<()> {
        let request = match value {
            Value::Bool(bit) => pdu::build_write_single_coil(addr.offset, *bit),
            other => {
                let payload = self.transform.encode(other)?;
                if payload.len() == 2 {
                    pdu::build_write_single_register(addr.offset, [payload[0], payload[1]])
                } else {
                    pdu::build_write_multiple_registers(addr.offset, &payload)?
                }
            }
        };
        let mut session = self.session.lock().await;
        let response = self.round_trip(&mut session, addr.station, &request).await?;
        drop(session);
        pdu::validate_write_echo(&request, &response)
    }
}

#[async_trait]
impl<T: Transport + std::fmt::Debug> DriverAdapter for ModbusAdapter<T> {
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
        if kind == DataKind::Bool {
            let addr = address::parse(address, &self.defaults(FunctionCode::ReadCoil))?;
            let bits = self.read_bits_at(addr, count).await?;
            return Ok(bits.into_iter().map(Value::Bool).collect());
        }
        let addr = address::parse(address, &self.defaults(FunctionCode::ReadHoldingRegister))?;
        Ok(self.read_at(addr, count, kind).await?)
    }

    async fn read_discrete(&self, address: &str, count: u16) -> DriverResult<Vec<bool>> {
        let addr = address::parse(address, &self.defaults(FunctionCode::ReadCoil))?;
        Ok(self.read_bits_at(addr, count).await?)
    }

    async fn write(&self, address: &str, value: Value) -> DriverResult<()> {
        let addr = address::parse(address, &self.defaults(FunctionCode::ReadHoldingRegister))?;
        Ok(self.write_at(addr, &value).await?)
    }

    fn family(&self) -> ProtocolFamily {
        self.family
    }

    fn display_name(&self) -> String {
        // The session owns the transport; state() callers hold no lock
        // here, so use the endpoint recorded at construction.
        match self.session.try_lock() {
            Ok(session) => session.display_name(),
            Err(_) => self.family.name().to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{ascii, mbap};
    use crate::testing::MockTransport;
    use crate::types::DataFormat;

    fn mock_adapter(framing: Framing, config: AdapterConfig) -> ModbusAdapter<MockTransport> {
        ModbusAdapter::with_transport(
            MockTransport::new(),
            framing,
            ProtocolFamily::ModbusTcp,
            "MockAdapter",
            config,
            FaultNotifier::disabled(),
        )
    }

    async fn push_mbap(adapter: &ModbusAdapter<MockTransport>, tid: u16, unit: u8, pdu: &[u8]) {
        adapter
            .session
            .lock()
            .await
            .transport_mut()
            .push_bytes(&mbap::pack(tid, unit, pdu));
    }

    #[tokio::test]
    async fn test_read_holding_registers() {
        let adapter = mock_adapter(Framing::Mbap, AdapterConfig::default());
        adapter.connect().await.unwrap();
        push_mbap(&adapter, 1, 1, &[0x03, 0x04, 0x00, 0x2A, 0x00, 0x07]).await;

        let values = adapter.read("0", 2, DataKind::UInt16).await.unwrap();
        assert_eq!(values, vec![Value::UInt16(42), Value::UInt16(7)]);
    }

    #[tokio::test]
    async fn test_read_respects_address_overrides() {
        let adapter = mock_adapter(Framing::Mbap, AdapterConfig::default());
        adapter.connect().await.unwrap();
        push_mbap(&adapter, 1, 2, &[0x04, 0x02, 0x01, 0x00]).await;

        let values = adapter.read("s=2;x=4;100", 1, DataKind::UInt16).await.unwrap();
        assert_eq!(values, vec![Value::UInt16(0x0100)]);

        // The request carried station 2, FC 04, offset 100.
        let mut session = adapter.session.lock().await;
        let frame = session.transport_mut().writes[0].clone();
        assert_eq!(frame[6], 2);
        assert_eq!(&frame[7..12], &[0x04, 0x00, 0x64, 0x00, 0x01]);
    }

    #[tokio::test]
    async fn test_batched_read_splits_and_concatenates() {
        let adapter = mock_adapter(Framing::Mbap, AdapterConfig::default());
        adapter.connect().await.unwrap();

        // 300 registers: 120 + 120 + 60, ascending offsets.
        {
            let mut session = adapter.session.lock().await;
            let t = session.transport_mut();
            let mut chunk1 = vec![0x03, 0xF0];
            chunk1.extend(std::iter::repeat([0x00, 0x01]).take(120).flatten());
            t.push_bytes(&mbap::pack(1, 1, &chunk1));
            let mut chunk2 = vec![0x03, 0xF0];
            chunk2.extend(std::iter::repeat([0x00, 0x02]).take(120).flatten());
            t.push_bytes(&mbap::pack(2, 1, &chunk2));
            let mut chunk3 = vec![0x03, 0x78];
            chunk3.extend(std::iter::repeat([0x00, 0x03]).take(60).flatten());
            t.push_bytes(&mbap::pack(3, 1, &chunk3));
        }

        let values = adapter.read("0", 300, DataKind::UInt16).await.unwrap();
        assert_eq!(values.len(), 300);
        assert_eq!(values[0], Value::UInt16(1));
        assert_eq!(values[120], Value::UInt16(2));
        assert_eq!(values[240], Value::UInt16(3));

        // Three requests at offsets 0, 120, 240 with no gaps.
        let mut session = adapter.session.lock().await;
        let writes = session.transport_mut().writes.clone();
        assert_eq!(writes.len(), 3);
        assert_eq!(&writes[0][7..12], &[0x03, 0x00, 0x00, 0x00, 0x78]);
        assert_eq!(&writes[1][7..12], &[0x03, 0x00, 0x78, 0x00, 0x78]);
        assert_eq!(&writes[2][7..12], &[0x03, 0x00, 0xF0, 0x00, 0x3C]);
    }

    #[tokio::test]
    async fn test_batched_read_aborts_on_sub_failure() {
        let adapter = mock_adapter(Framing::Mbap, AdapterConfig::default());
        adapter.connect().await.unwrap();

        // First chunk answers, second one is an exception.
        {
            let mut session = adapter.session.lock().await;
            let t = session.transport_mut();
            let mut chunk1 = vec![0x03, 0xF0];
            chunk1.extend(std::iter::repeat([0x00, 0x01]).take(120).flatten());
            t.push_bytes(&mbap::pack(1, 1, &chunk1));
            t.push_bytes(&mbap::pack(2, 1, &[0x83, 0x02]));
        }

        let err = adapter.read("0", 150, DataKind::UInt16).await.unwrap_err();
        match err {
            fieldbus_core::DriverError::DeviceException { code, .. } => assert_eq!(code, 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_batched_bit_read_splits() {
        let adapter = mock_adapter(Framing::Mbap, AdapterConfig::default());
        adapter.connect().await.unwrap();

        // 2100 coils: 2000 + 100, ascending offsets.
        {
            let mut session = adapter.session.lock().await;
            let t = session.transport_mut();
            let mut chunk1 = vec![0x01, 0xFA];
            chunk1.extend(std::iter::repeat(0xFFu8).take(250));
            t.push_bytes(&mbap::pack(1, 1, &chunk1));
            let mut chunk2 = vec![0x01, 0x0D];
            chunk2.extend(std::iter::repeat(0x00u8).take(13));
            t.push_bytes(&mbap::pack(2, 1, &chunk2));
        }

        let bits = adapter.read_discrete("0", 2100).await.unwrap();
        assert_eq!(bits.len(), 2100);
        assert!(bits[0]);
        assert!(!bits[2000]);

        let mut session = adapter.session.lock().await;
        let writes = session.transport_mut().writes.clone();
        assert_eq!(writes.len(), 2);
        assert_eq!(&writes[0][7..12], &[0x01, 0x00, 0x00, 0x07, 0xD0]);
        assert_eq!(&writes[1][7..12], &[0x01, 0x07, 0xD0, 0x00, 0x64]);
    }

    #[tokio::test]
    async fn test_read_float_with_format() {
        let config = AdapterConfig::builder().data_format(DataFormat::Cdab).build();
        let adapter = mock_adapter(Framing::Mbap, config);
        adapter.connect().await.unwrap();
        // 50.0f32 = 0x42480000, CDAB on the wire: 00 00 42 48.
        push_mbap(&adapter, 1, 1, &[0x03, 0x04, 0x00, 0x00, 0x42, 0x48]).await;

        let values = adapter.read("0", 1, DataKind::Float32).await.unwrap();
        assert_eq!(values, vec![Value::Float32(50.0)]);
    }

    #[tokio::test]
    async fn test_read_discrete() {
        let adapter = mock_adapter(Framing::Mbap, AdapterConfig::default());
        adapter.connect().await.unwrap();
        push_mbap(&adapter, 1, 1, &[0x01, 0x01, 0x05]).await;

        let bits = adapter.read_discrete("0", 4).await.unwrap();
        assert_eq!(bits, vec![true, false, true, false]);
    }

    #[tokio::test]
    async fn test_write_single_register_echo() {
        let adapter = mock_adapter(Framing::Mbap, AdapterConfig::default());
        adapter.connect().await.unwrap();
        push_mbap(&adapter, 1, 1, &[0x06, 0x00, 0x10, 0x12, 0x34]).await;

        adapter.write("16", Value::UInt16(0x1234)).await.unwrap();
    }

    #[tokio::test]
    async fn test_write_echo_mismatch() {
        let adapter = mock_adapter(Framing::Mbap, AdapterConfig::default());
        adapter.connect().await.unwrap();
        // Echo carries a different value.
        push_mbap(&adapter, 1, 1, &[0x06, 0x00, 0x10, 0x12, 0x35]).await;

        let err = adapter.write("16", Value::UInt16(0x1234)).await.unwrap_err();
        assert!(matches!(err, fieldbus_core::DriverError::Frame { .. }));
    }

    #[tokio::test]
    async fn test_write_bool_as_coil() {
        let adapter = mock_adapter(Framing::Mbap, AdapterConfig::default());
        adapter.connect().await.unwrap();
        push_mbap(&adapter, 1, 1, &[0x05, 0x00, 0x07, 0xFF, 0x00]).await;

        adapter.write("7", Value::Bool(true)).await.unwrap();
        let mut session = adapter.session.lock().await;
        assert_eq!(&session.transport_mut().writes[0][7..], &[0x05, 0x00, 0x07, 0xFF, 0x00]);
    }

    #[tokio::test]
    async fn test_write_multi_register_value() {
        let adapter = mock_adapter(Framing::Mbap, AdapterConfig::default());
        adapter.connect().await.unwrap();
        // FC16 echo: fc, offset, quantity.
        push_mbap(&adapter, 1, 1, &[0x10, 0x00, 0x00, 0x00, 0x02]).await;

        adapter.write("0", Value::UInt32(0x1234_5678)).await.unwrap();
        let mut session = adapter.session.lock().await;
        assert_eq!(
            &session.transport_mut().writes[0][7..],
            &[0x10, 0x00, 0x00, 0x00, 0x02, 0x04, 0x12, 0x34, 0x56, 0x78]
        );
    }

    #[tokio::test]
    async fn test_write_oversized_string_rejected() {
        let adapter = mock_adapter(Framing::Mbap, AdapterConfig::default());
        adapter.connect().await.unwrap();

        // 300 bytes is 150 registers, past the single-write ceiling.
        let err = adapter.write("0", Value::String("x".repeat(300))).await.unwrap_err();
        assert!(matches!(err, fieldbus_core::DriverError::Frame { .. }));

        // Nothing reached the wire.
        let mut session = adapter.session.lock().await;
        assert!(session.transport_mut().writes.is_empty());
    }

    #[tokio::test]
    async fn test_read_while_disconnected_fails_fast() {
        let adapter = mock_adapter(Framing::Mbap, AdapterConfig::default());
        let err = adapter.read("0", 1, DataKind::UInt16).await.unwrap_err();
        assert!(matches!(err, fieldbus_core::DriverError::NotConnected { .. }));
        let mut session = adapter.session.lock().await;
        assert_eq!(session.transport_mut().io_operations, 0);
    }

    #[tokio::test]
    async fn test_ascii_framing_round_trip() {
        let adapter = mock_adapter(Framing::Ascii, AdapterConfig::default());
        adapter.connect().await.unwrap();
        {
            let mut session = adapter.session.lock().await;
            session
                .transport_mut()
                .push_line(ascii::encode(0x01, &[0x03, 0x02, 0x00, 0x2A]));
        }

        let values = adapter.read("0", 1, DataKind::UInt16).await.unwrap();
        assert_eq!(values, vec![Value::UInt16(42)]);
    }

    #[tokio::test]
    async fn test_one_based_addressing() {
        let config = AdapterConfig::builder().address_start_with_zero(false).build();
        let adapter = mock_adapter(Framing::Mbap, config);
        adapter.connect().await.unwrap();
        push_mbap(&adapter, 1, 1, &[0x03, 0x02, 0x00, 0x01]).await;

        adapter.read("100", 1, DataKind::UInt16).await.unwrap();
        let mut session = adapter.session.lock().await;
        // Offset 100 becomes 99 on the wire.
        assert_eq!(&session.transport_mut().writes[0][7..12], &[0x03, 0x00, 0x63, 0x00, 0x01]);
    }
}
