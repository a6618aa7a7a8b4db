// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Element address parsing.
//!
//! Addresses use the grammar `[s=<0-255>;][x=<func>;]<offset>` where
//! `s=` overrides the configured station, `x=` overrides the default
//! function code, and `<offset>` is a decimal element offset. Vendor
//! device notation (`D100`, `X17`) is translated by the device table
//! before this parser runs.

use std::fmt;

use crate::error::AddressError;
use crate::types::FunctionCode;

// =============================================================================
// AddressDefaults
// =============================================================================

/// Per-adapter defaults applied when an address omits segments.
#[derive(Debug, Clone, Copy)]
pub struct AddressDefaults {
    /// Station used when `s=` is absent.
    pub station: u8,
    /// Function code used when `x=` is absent.
    pub function: FunctionCode,
    /// When `false`, offsets are one-based and decremented once here.
    pub zero_based: bool,
}

impl AddressDefaults {
    /// Creates defaults with zero-based offsets.
    pub fn new(station: u8, function: FunctionCode) -> Self {
        Self { station, function, zero_based: true }
    }

    /// Sets the zero-based flag.
    pub fn with_zero_based(mut self, zero_based: bool) -> Self {
        self.zero_based = zero_based;
        self
    }
}

// =============================================================================
// ElementAddress
// =============================================================================

/// A fully resolved element address.
///
/// The offset is already normalized to the zero-based wire convention;
/// normalization happens exactly once, at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementAddress {
    /// Slave station identifier.
    pub station: u8,
    /// Operation selector.
    pub function: FunctionCode,
    /// Zero-based element offset.
    pub offset: u16,
}

impl ElementAddress {
    /// Creates an address from already-normalized parts.
    pub fn new(station: u8, function: FunctionCode, offset: u16) -> Self {
        Self { station, function, offset }
    }

    /// Returns a copy advanced by `delta` elements, for batched reads.
    pub fn offset_add(&self, delta: u16) -> Result<Self, AddressError> {
        let offset = self.offset.checked_add(delta).ok_or_else(|| {
            AddressError::InvalidFormat(format!(
                "offset {} + {} exceeds the 16-bit address space",
                self.offset, delta
            ))
        })?;
        Ok(Self { offset, ..*self })
    }

    /// Returns a copy with a different function code, keeping station
    /// and offset (write paths reuse the parsed read address).
    pub fn with_function(&self, function: FunctionCode) -> Self {
        Self { function, ..*self }
    }
}

impl fmt::Display for ElementAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s={};x={};{}", self.station, self.function.code(), self.offset)
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Splits optional `s=`/`x=` prefixes off `raw`.
///
/// Returns the overrides and the remaining offset text. The remaining
/// text is not interpreted here, so device-notation callers can route
/// it through their device table.
pub fn split_prefixes(raw: &str) -> Result<(Option<u8>, Option<FunctionCode>, &str), AddressError> {
    let mut rest = raw.trim();
    let mut station = None;
    let mut function = None;

    loop {
        let lower = rest.as_bytes();
        if lower.len() >= 2 && (lower[0] | 0x20) == b's' && lower[1] == b'=' {
            let (value, tail) = take_segment(&rest[2..], raw)?;
            let parsed: u16 = value
                .parse()
                .map_err(|_| AddressError::InvalidFormat(format!("bad station in '{}'", raw)))?;
            let parsed = u8::try_from(parsed)
                .map_err(|_| AddressError::InvalidFormat(format!("station out of range in '{}'", raw)))?;
            station = Some(parsed);
            rest = tail;
        } else if lower.len() >= 2 && (lower[0] | 0x20) == b'x' && lower[1] == b'=' {
            let (value, tail) = take_segment(&rest[2..], raw)?;
            let code: u8 = value
                .parse()
                .map_err(|_| AddressError::InvalidFormat(format!("bad function code in '{}'", raw)))?;
            function = Some(FunctionCode::from_code(code)?);
            rest = tail;
        } else {
            break;
        }
    }

    if rest.is_empty() {
        return Err(AddressError::InvalidFormat(format!("missing offset in '{}'", raw)));
    }
    Ok((station, function, rest))
}

fn take_segment<'a>(after_eq: &'a str, raw: &str) -> Result<(&'a str, &'a str), AddressError> {
    match after_eq.find(';') {
        Some(pos) => Ok((&after_eq[..pos], &after_eq[pos + 1..])),
        None => Err(AddressError::InvalidFormat(format!("missing ';' after segment in '{}'", raw))),
    }
}

/// Parses a complete Modbus-style address.
pub fn parse(raw: &str, defaults: &AddressDefaults) -> Result<ElementAddress, AddressError> {
    let (station, function, offset_text) = split_prefixes(raw)?;
    let offset = parse_offset(offset_text, raw)?;
    let offset = normalize_offset(offset, defaults.zero_based, raw)?;
    Ok(ElementAddress {
        station: station.unwrap_or(defaults.station),
        function: function.unwrap_or(defaults.function),
        offset,
    })
}

fn parse_offset(text: &str, raw: &str) -> Result<u16, AddressError> {
    text.parse::<u16>()
        .map_err(|_| AddressError::InvalidFormat(format!("bad offset '{}' in '{}'", text, raw)))
}

/// Applies the one-time one-based to zero-based correction.
pub fn normalize_offset(offset: u16, zero_based: bool, raw: &str) -> Result<u16, AddressError> {
    if zero_based {
        Ok(offset)
    } else {
        offset.checked_sub(1).ok_or_else(|| {
            AddressError::InvalidFormat(format!("offset 0 is invalid for one-based addressing: '{}'", raw))
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> AddressDefaults {
        AddressDefaults::new(1, FunctionCode::ReadHoldingRegister)
    }

    #[test]
    fn test_full_address() {
        let addr = parse("s=2;x=4;100", &defaults()).unwrap();
        assert_eq!(addr.station, 2);
        assert_eq!(addr.function, FunctionCode::ReadInputRegister);
        assert_eq!(addr.offset, 100);
    }

    #[test]
    fn test_defaults_applied() {
        let addr = parse("100", &defaults()).unwrap();
        assert_eq!(addr.station, 1);
        assert_eq!(addr.function, FunctionCode::ReadHoldingRegister);
        assert_eq!(addr.offset, 100);
    }

    #[test]
    fn test_function_only() {
        let addr = parse("x=1;7", &defaults()).unwrap();
        assert_eq!(addr.station, 1);
        assert_eq!(addr.function, FunctionCode::ReadCoil);
        assert_eq!(addr.offset, 7);
    }

    #[test]
    fn test_unknown_function_code() {
        let err = parse("s=2;x=9;100", &defaults()).unwrap_err();
        assert!(matches!(err, AddressError::InvalidFormat(_)));
    }

    #[test]
    fn test_malformed_segments() {
        assert!(parse("s=2x=3;100", &defaults()).is_err());
        assert!(parse("s=300;100", &defaults()).is_err());
        assert!(parse("s=2;", &defaults()).is_err());
        assert!(parse("abc", &defaults()).is_err());
    }

    #[test]
    fn test_one_based_normalization() {
        let one_based = defaults().with_zero_based(false);
        assert_eq!(parse("100", &one_based).unwrap().offset, 99);
        assert!(parse("0", &one_based).is_err());
        // Applied once at parse time only.
        let addr = parse("100", &one_based).unwrap();
        assert_eq!(addr.offset_add(10).unwrap().offset, 109);
    }

    #[test]
    fn test_offset_add_overflow() {
        let addr = ElementAddress::new(1, FunctionCode::ReadHoldingRegister, u16::MAX);
        assert!(addr.offset_add(1).is_err());
    }
}
