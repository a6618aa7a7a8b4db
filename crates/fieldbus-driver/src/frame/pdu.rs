// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Modbus PDU construction and response validation.
//!
//! A PDU is the function code plus its data, independent of the MBAP or
//! ASCII envelope around it. Builders produce owned byte images that are
//! never mutated after construction; validators check the exception bit,
//! the declared byte count, and write-acknowledgment echoes.

use crate::address::ElementAddress;
use crate::error::{ExceptionCode, FieldbusError, FrameError};
use crate::transform::pack_bits;
use crate::types::FunctionCode;

/// Register ceiling of a single read request; longer reads are split by
/// the adapter into sequential sub-requests.
pub const MAX_BATCH_REGISTERS: u16 = 120;

/// Bit ceiling of a single coil or discrete-input read (FC 01/02).
pub const MAX_BATCH_BITS: u16 = 2000;

/// Register ceiling of a multiple-registers write (FC 16).
pub const MAX_WRITE_REGISTERS: u16 = 123;

/// Coil ceiling of a multiple-coils write (FC 15).
pub const MAX_WRITE_COILS: u16 = 1968;

const EXCEPTION_BIT: u8 = 0x80;

// =============================================================================
// Request Builders
// =============================================================================

/// Builds a read request PDU (FC 01..04).
pub fn build_read(addr: &ElementAddress, count: u16) -> Vec<u8> {
    let mut pdu = Vec::with_capacity(5);
    pdu.push(addr.function.code());
    pdu.extend_from_slice(&addr.offset.to_be_bytes());
    pdu.extend_from_slice(&count.to_be_bytes());
    pdu
}

/// Builds a single-coil write PDU (FC 05).
pub fn build_write_single_coil(offset: u16, value: bool) -> Vec<u8> {
    let mut pdu = Vec::with_capacity(5);
    pdu.push(FunctionCode::WriteSingleCoil.code());
    pdu.extend_from_slice(&offset.to_be_bytes());
    pdu.extend_from_slice(if value { &[0xFF, 0x00] } else { &[0x00, 0x00] });
    pdu
}

/// Builds a single-register write PDU (FC 06).
pub fn build_write_single_register(offset: u16, value: [u8; 2]) -> Vec<u8> {
    let mut pdu = Vec::with_capacity(5);
    pdu.push(FunctionCode::WriteSingleRegister.code());
    pdu.extend_from_slice(&offset.to_be_bytes());
    pdu.extend_from_slice(&value);
    pdu
}

/// Builds a multiple-coils write PDU (FC 15), bits packed low-bit-first.
///
/// The quantity must stay in `1..=`[`MAX_WRITE_COILS`]; the byte-count
/// field is a single byte on the wire.
pub fn build_write_multiple_coils(offset: u16, bits: &[bool]) -> Result<Vec<u8>, FieldbusError> {
    if bits.is_empty() || bits.len() > MAX_WRITE_COILS as usize {
        return Err(FrameError::Malformed(format!(
            "{} coils outside the 1..={} write range",
            bits.len(),
            MAX_WRITE_COILS
        ))
        .into());
    }
    let packed = pack_bits(bits);
    let mut pdu = Vec::with_capacity(6 + packed.len());
    pdu.push(FunctionCode::WriteMultipleCoils.code());
    pdu.extend_from_slice(&offset.to_be_bytes());
    pdu.extend_from_slice(&(bits.len() as u16).to_be_bytes());
    pdu.push(packed.len() as u8);
    pdu.extend_from_slice(&packed);
    Ok(pdu)
}

/// Builds a multiple-registers write PDU (FC 16) from an even-length
/// register payload.
///
/// The quantity must stay in `1..=`[`MAX_WRITE_REGISTERS`]; the
/// byte-count field is a single byte on the wire.
pub fn build_write_multiple_registers(
    offset: u16,
    payload: &[u8],
) -> Result<Vec<u8>, FieldbusError> {
    if payload.len() % 2 != 0 {
        return Err(FrameError::Malformed(format!(
            "odd register payload length {}",
            payload.len()
        ))
        .into());
    }
    let register_count = payload.len() / 2;
    if register_count == 0 || register_count > MAX_WRITE_REGISTERS as usize {
        return Err(FrameError::Malformed(format!(
            "{} registers outside the 1..={} write range",
            register_count, MAX_WRITE_REGISTERS
        ))
        .into());
    }
    let mut pdu = Vec::with_capacity(6 + payload.len());
    pdu.push(FunctionCode::WriteMultipleRegisters.code());
    pdu.extend_from_slice(&offset.to_be_bytes());
    pdu.extend_from_slice(&(register_count as u16).to_be_bytes());
    pdu.push(payload.len() as u8);
    pdu.extend_from_slice(payload);
    Ok(pdu)
}

// =============================================================================
// Response Validation
// =============================================================================

/// Rejects a PDU whose function byte carries the exception bit.
pub fn check_exception(pdu: &[u8]) -> Result<(), FieldbusError> {
    if pdu.len() >= 2 && pdu[0] & EXCEPTION_BIT != 0 {
        return Err(FieldbusError::ModbusException(ExceptionCode::from_code(pdu[1])));
    }
    Ok(())
}

/// Extracts the data payload of a read response PDU.
///
/// Validates the exception bit, the echoed function code, and the
/// declared byte count against the bytes actually present.
pub fn parse_read_payload(pdu: &[u8], expected: FunctionCode) -> Result<Vec<u8>, FieldbusError> {
    if pdu.len() < 2 {
        return Err(FrameError::TruncatedFrame { declared: 2, actual: pdu.len() }.into());
    }
    check_exception(pdu)?;
    if pdu[0] != expected.code() {
        return Err(FrameError::IdentityMismatch(format!(
            "expected {}, got function byte {:#04x}",
            expected, pdu[0]
        ))
        .into());
    }
    let declared = pdu[1] as usize;
    let payload = &pdu[2..];
    if payload.len() < declared {
        return Err(FrameError::TruncatedFrame { declared, actual: payload.len() }.into());
    }
    Ok(payload[..declared].to_vec())
}

/// Validates a write acknowledgment against the request it echoes.
///
/// FC 05/06 echo the full request; FC 15/16 echo function, offset and
/// quantity. Anything else is an [`FrameError::EchoMismatch`].
pub fn validate_write_echo(request: &[u8], response: &[u8]) -> Result<(), FieldbusError> {
    check_exception(response)?;
    let echo_len = match request.first() {
        Some(&code)
            if code == FunctionCode::WriteSingleCoil.code()
                || code == FunctionCode::WriteSingleRegister.code() =>
        {
            5
        }
        Some(&code)
            if code == FunctionCode::WriteMultipleCoils.code()
                || code == FunctionCode::WriteMultipleRegisters.code() =>
        {
            5
        }
        _ => return Err(FrameError::Malformed("not a write request".into()).into()),
    };
    if response.len() < echo_len || response[..echo_len] != request[..echo_len] {
        return Err(FrameError::EchoMismatch.into());
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
