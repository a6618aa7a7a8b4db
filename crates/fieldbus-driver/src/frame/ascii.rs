// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Modbus ASCII envelope.
//!
//! Wire layout: `':' + hex(station, pdu..., lrc) + CRLF` with every
//! byte rendered as two uppercase hex characters. The LRC is the two's
//! complement of the byte sum over station and PDU. An exception
//! response is the shortest legal frame: station, function|0x80, code,
//! LRC, which is 10 characters on the wire including the CR.

use crate::error::{FieldbusError, FrameError};

/// On-wire character length of an exception frame, `:` through CR.
pub const EXCEPTION_FRAME_CHARS: usize = 10;

// =============================================================================
// LRC
// =============================================================================

/// Longitudinal redundancy check: two's complement of the byte sum.
pub fn lrc(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    sum.wrapping_neg()
}

// =============================================================================
// Encode / Decode
// =============================================================================

/// Encodes station and PDU into a complete ASCII frame line.
pub fn encode(station: u8, pdu: &[u8]) -> String {
    let mut body = Vec::with_capacity(pdu.len() + 2);
    body.push(station);
    body.extend_from_slice(pdu);
    body.push(lrc(&body));

    let mut line = String::with_capacity(3 + body.len() * 2);
    line.push(':');
    for byte in &body {
        line.push_str(&format!("{:02X}", byte));
    }
    line.push_str("\r\n");
    line
}

/// Decodes a received ASCII line into station and PDU.
///
/// Verifies the leading `:`, the hex body, and the trailing LRC. The
/// returned PDU may still carry the exception bit; callers route it
/// through the PDU validators.
pub fn decode(line: &str) -> Result<(u8, Vec<u8>), FieldbusError> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    // Lossy UTF-8 decoding turns line noise into multibyte replacement
    // characters; the hex body is indexed byte-wise below.
    if !trimmed.is_ascii() {
        return Err(FrameError::Malformed("non-ascii frame".into()).into());
    }
    let hex = trimmed
        .strip_prefix(':')
        .ok_or_else(|| FrameError::Malformed("missing ':' frame start".into()))?;
    if hex.len() % 2 != 0 {
        return Err(FrameError::Malformed("odd hex digit count".into()).into());
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        let byte = u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| FrameError::Malformed(format!("bad hex at {}", i)))?;
        bytes.push(byte);
    }
    // Minimum frame: station, function, exception code, LRC.
    if bytes.len() < 4 {
        return Err(FrameError::TruncatedFrame { declared: 4, actual: bytes.len() }.into());
    }
    let (body, checksum) = bytes.split_at(bytes.len() - 1);
    let expected = lrc(body);
    if checksum[0] != expected {
        return Err(FrameError::ChecksumMismatch { expected, actual: checksum[0] }.into());
    }
    Ok((body[0], body[1..].to_vec()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExceptionCode;
    use crate::frame::pdu;
    use crate::types::FunctionCode;

    #[test]
    fn test_lrc_deterministic() {
        let payload = [0x01, 0x03, 0x00, 0x6B];
        let a = lrc(&payload);
        assert_eq!(a, lrc(&payload));
        // Two's complement: sum + lrc wraps to zero.
        let sum = payload.iter().fold(a, |acc, b| acc.wrapping_add(*b));
        assert_eq!(sum, 0);
    }

    #[test]
    fn test_encode_reference_frame() {
        // Read 3 holding registers at 0x006B from station 1.
        let line = encode(0x01, &[0x03, 0x00, 0x6B, 0x00, 0x03]);
        assert_eq!(line, ":0103006B00038E\r\n");
    }

    #[test]
    fn test_decode_round_trip() {
        let line = encode(0x11, &[0x03, 0x02, 0x12, 0x34]);
        let (station, pdu_bytes) = decode(&line).unwrap();
        assert_eq!(station, 0x11);
        assert_eq!(pdu_bytes, vec![0x03, 0x02, 0x12, 0x34]);
    }

    #[test]
    fn test_bit_flip_rejected() {
        let line = encode(0x01, &[0x03, 0x02, 0x12, 0x34]);
        // Flip one hex digit of the payload.
        let corrupted = line.replacen("12", "13", 1);
        assert!(matches!(
            decode(&corrupted).unwrap_err(),
            FieldbusError::Frame(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_exception_frame_shape() {
        // Station 1, FC3 exception, illegal data address.
        let body = [0x01u8, 0x83, 0x02];
        let line = encode(body[0], &body[1..]);
        assert_eq!(line.len() - 1, EXCEPTION_FRAME_CHARS, "through the CR");

        let (_, pdu_bytes) = decode(&line).unwrap();
        let err = pdu::parse_read_payload(&pdu_bytes, FunctionCode::ReadHoldingRegister)
            .unwrap_err();
        match err {
            FieldbusError::ModbusException(code) => {
                assert_eq!(code, ExceptionCode::IllegalDataAddress);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_lines() {
        assert!(decode("0103006B").is_err());
        assert!(decode(":0103XX").is_err());
        assert!(decode(":010\r\n").is_err());
    }

    #[test]
    fn test_line_noise_rejected() {
        // A noise byte on the serial line surfaces as U+FFFD after the
        // transport's lossy decode.
        assert!(matches!(
            decode(":\u{FFFD}0").unwrap_err(),
            FieldbusError::Frame(FrameError::Malformed(_))
        ));
        assert!(decode(":0103\u{FFFD}B00038E\r\n").is_err());
    }
}
