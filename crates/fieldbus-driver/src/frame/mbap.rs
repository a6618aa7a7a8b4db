// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! MBAP envelope for Modbus TCP/UDP.
//!
//! Wire layout: `[tid:u16][pid:u16 = 0][length:u16][unit:u8][pdu...]`
//! where `length` counts the unit byte plus the PDU.

use crate::error::{FieldbusError, FrameError};

/// Bytes of the MBAP header preceding the unit identifier.
pub const HEADER_LEN: usize = 7;

/// Modbus protocol identifier; always zero.
const PROTOCOL_ID: u16 = 0;

// =============================================================================
// Header
// =============================================================================

/// Parsed MBAP header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Transaction identifier echoed by the slave.
    pub transaction_id: u16,
    /// Remaining frame bytes after the length field, including the unit byte.
    pub length: u16,
    /// Unit (station) identifier.
    pub unit: u8,
}

/// Wraps a PDU in an MBAP envelope.
pub fn pack(transaction_id: u16, unit: u8, pdu: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + pdu.len());
    frame.extend_from_slice(&transaction_id.to_be_bytes());
    frame.extend_from_slice(&PROTOCOL_ID.to_be_bytes());
    frame.extend_from_slice(&((pdu.len() + 1) as u16).to_be_bytes());
    frame.push(unit);
    frame.extend_from_slice(pdu);
    frame
}

/// Parses and validates the 7-byte MBAP header of a response.
pub fn parse_header(bytes: &[u8]) -> Result<Header, FieldbusError> {
    if bytes.len() < HEADER_LEN {
        return Err(FrameError::TruncatedFrame { declared: HEADER_LEN, actual: bytes.len() }.into());
    }
    let protocol_id = u16::from_be_bytes([bytes[2], bytes[3]]);
    if protocol_id != PROTOCOL_ID {
        return Err(FrameError::Malformed(format!("protocol id {:#06x}", protocol_id)).into());
    }
    let length = u16::from_be_bytes([bytes[4], bytes[5]]);
    if length < 2 {
        return Err(FrameError::Malformed(format!("mbap length {}", length)).into());
    }
    Ok(Header {
        transaction_id: u16::from_be_bytes([bytes[0], bytes[1]]),
        length,
        unit: bytes[6],
    })
}

/// Checks the response identity against the request it answers.
pub fn validate_identity(
    header: &Header,
    expected_tid: u16,
    expected_unit: u8,
) -> Result<(), FieldbusError> {
    if header.transaction_id != expected_tid {
        return Err(FrameError::IdentityMismatch(format!(
            "transaction id {} does not answer request {}",
            header.transaction_id, expected_tid
        ))
        .into());
    }
    if header.unit != expected_unit {
        return Err(FrameError::IdentityMismatch(format!(
            "unit {} does not answer request for unit {}",
            header.unit, expected_unit
        ))
        .into());
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
