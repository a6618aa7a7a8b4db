// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Panasonic Mewtocol command frames.
//!
//! Request layout: `'%' + station(2 decimal) + '#' + command + BCC + CR`
//! where BCC is the XOR of every preceding character rendered as two
//! uppercase hex digits. Responses answer with `'%' + station + '$'`
//! followed by the command echo and data, or `'%' + station + '!'` and
//! a two-digit error code. Register data travels as four hex characters
//! per word, low byte first.

use crate::error::{AddressError, FieldbusError, FrameError};

// =============================================================================
// BCC
// =============================================================================

/// Block check character: XOR over the frame characters.
pub fn bcc(text: &str) -> u8 {
    text.bytes().fold(0u8, |acc, b| acc ^ b)
}

// =============================================================================
// Encode / Decode
// =============================================================================

/// Encodes a command into a complete frame line.
pub fn encode_command(station: u8, command: &str) -> String {
    let head = format!("%{:02}#{}", station, command);
    format!("{}{:02X}\r", head, bcc(&head))
}

/// Decodes a response line into the body after `$`.
///
/// The returned body still starts with the two-character command echo;
/// callers strip it with [`strip_echo`]. A `!` response surfaces as
/// [`FieldbusError::DeviceProtocol`].
pub fn decode_response(line: &str, expected_station: u8) -> Result<String, FieldbusError> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if !trimmed.is_ascii() {
        return Err(FrameError::Malformed("non-ascii frame".into()).into());
    }
    let rest = trimmed
        .strip_prefix('%')
        .ok_or_else(|| FrameError::Malformed("missing '%' frame start".into()))?;
    if rest.len() < 3 {
        return Err(FrameError::TruncatedFrame { declared: 4, actual: trimmed.len() }.into());
    }
    let station: u8 = rest[..2]
        .parse()
        .map_err(|_| FrameError::Malformed(format!("bad station field '{}'", &rest[..2])))?;
    if station != expected_station {
        return Err(FrameError::IdentityMismatch(format!(
            "station {} does not answer request for station {}",
            station, expected_station
        ))
        .into());
    }
    match &rest[2..3] {
        "$" => {
            if trimmed.len() < 2 {
                return Err(FrameError::TruncatedFrame { declared: 2, actual: trimmed.len() }.into());
            }
            let (head, check) = trimmed.split_at(trimmed.len() - 2);
            let actual = u8::from_str_radix(check, 16)
                .map_err(|_| FrameError::Malformed(format!("bad bcc field '{}'", check)))?;
            let expected = bcc(head);
            if actual != expected {
                return Err(FrameError::ChecksumMismatch { expected, actual }.into());
            }
            Ok(head[4..].to_string())
        }
        "!" => {
            let code: u8 = rest
                .get(3..5)
                .and_then(|c| c.parse().ok())
                .ok_or_else(|| FrameError::Malformed("bad error code field".into()))?;
            Err(FieldbusError::DeviceProtocol(code))
        }
        other => Err(FrameError::Malformed(format!("unexpected response marker '{}'", other)).into()),
    }
}

/// Strips the two-character command echo off a response body.
pub fn strip_echo<'a>(body: &'a str, expected: &str) -> Result<&'a str, FieldbusError> {
    body.strip_prefix(expected).ok_or_else(|| {
        FrameError::IdentityMismatch(format!(
            "response echoes '{}', expected '{}'",
            &body[..body.len().min(2)],
            expected
        ))
        .into()
    })
}

// =============================================================================
// Commands
// =============================================================================

/// Read data-area words `start ..= start + count - 1` (`RD` command, DT area).
///
/// The span must cover at least one word and stay inside the 16-bit
/// register space.
pub fn read_data_command(start: u16, count: u16) -> Result<String, FieldbusError> {
    let end = span_end(start, count)?;
    Ok(format!("RDD{:05}{:05}", start, end))
}

/// Write data-area words starting at `start` (`WD` command, DT area).
pub fn write_data_command(start: u16, words: &[u16]) -> Result<String, FieldbusError> {
    let count = u16::try_from(words.len()).map_err(|_| {
        AddressError::InvalidFormat(format!(
            "{} words exceed the data register space",
            words.len()
        ))
    })?;
    let end = span_end(start, count)?;
    Ok(format!("WDD{:05}{:05}{}", start, end, words_to_hex(words)))
}

fn span_end(start: u16, count: u16) -> Result<u16, FieldbusError> {
    count
        .checked_sub(1)
        .and_then(|span| start.checked_add(span))
        .ok_or_else(|| {
            AddressError::InvalidFormat(format!(
                "data span {}+{} leaves the register space",
                start, count
            ))
            .into()
        })
}

/// Read one contact (`RCS` command), e.g. area `R`, word 10, bit 1.
pub fn read_contact_command(area: char, word: u16, bit: u8) -> String {
    format!("RCS{}{:03}{:X}", area, word, bit)
}

/// Write one contact (`WCS` command).
pub fn write_contact_command(area: char, word: u16, bit: u8, value: bool) -> String {
    format!("WCS{}{:03}{:X}{}", area, word, bit, if value { '1' } else { '0' })
}

// =============================================================================
// Word Hex
// =============================================================================

/// Renders words as Mewtocol hex, low byte first.
pub fn words_to_hex(words: &[u16]) -> String {
    let mut out = String::with_capacity(words.len() * 4);
    for word in words {
        let [hi, lo] = word.to_be_bytes();
        out.push_str(&format!("{:02X}{:02X}", lo, hi));
    }
    out
}

/// Parses Mewtocol hex back into words.
pub fn hex_to_words(text: &str) -> Result<Vec<u16>, FieldbusError> {
    if text.len() % 4 != 0 {
        return Err(FrameError::Malformed(format!("data length {} not word aligned", text.len())).into());
    }
    let mut words = Vec::with_capacity(text.len() / 4);
    for i in (0..text.len()).step_by(4) {
        let lo = u8::from_str_radix(&text[i..i + 2], 16)
            .map_err(|_| FrameError::Malformed(format!("bad hex at {}", i)))?;
        let hi = u8::from_str_radix(&text[i + 2..i + 4], 16)
            .map_err(|_| FrameError::Malformed(format!("bad hex at {}", i + 2)))?;
        words.push(u16::from_be_bytes([hi, lo]));
    }
    Ok(words)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_command() {
        let line = encode_command(1, "RDD0010000101");
        assert!(line.starts_with("%01#RDD0010000101"));
        assert!(line.ends_with('\r'));
        // BCC over everything before the two hex digits.
        let head = &line[..line.len() - 3];
        let check = &line[line.len() - 3..line.len() - 1];
        assert_eq!(u8::from_str_radix(check, 16).unwrap(), bcc(head));
    }

    #[test]
    fn test_decode_data_response() {
        // One word, value 0x1234 -> "3412" on the wire.
        let head = "%01$RD3412";
        let line = format!("{}{:02X}\r", head, bcc(head));
        let body = decode_response(&line, 1).unwrap();
        let data = strip_echo(&body, "RD").unwrap();
        assert_eq!(hex_to_words(data).unwrap(), vec![0x1234]);
    }

    #[test]
    fn test_error_response() {
        let err = decode_response("%01!26\r", 1).unwrap_err();
        assert!(matches!(err, FieldbusError::DeviceProtocol(26)));
    }

    #[test]
    fn test_station_mismatch() {
        let head = "%02$RD3412";
        let line = format!("{}{:02X}\r", head, bcc(head));
        assert!(decode_response(&line, 1).is_err());
    }

    #[test]
    fn test_bcc_rejects_corruption() {
        let head = "%01$RD3412";
        let line = format!("{}{:02X}\r", head, bcc(head) ^ 0x01);
        assert!(matches!(
            decode_response(&line, 1).unwrap_err(),
            FieldbusError::Frame(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_word_hex_round_trip() {
        let words = vec![0x1234, 0x00FF];
        let hex = words_to_hex(&words);
        assert_eq!(hex, "3412FF00");
        assert_eq!(hex_to_words(&hex).unwrap(), words);
    }

    #[test]
    fn test_data_commands() {
        assert_eq!(read_data_command(100, 2).unwrap(), "RDD0010000101");
        assert_eq!(write_data_command(100, &[0x1234]).unwrap(), "WDD00100001003412");
    }

    #[test]
    fn test_data_span_bounds() {
        assert!(read_data_command(65535, 1).is_ok());
        assert!(read_data_command(65535, 2).is_err());
        assert!(read_data_command(0, 0).is_err());
        assert!(write_data_command(100, &[]).is_err());
        assert!(write_data_command(65535, &[1, 2]).is_err());
    }

    #[test]
    fn test_contact_commands() {
        assert_eq!(read_contact_command('R', 10, 1), "RCSR0101");
        assert_eq!(write_contact_command('Y', 0, 5, true), "WCSY00051");
    }
}
