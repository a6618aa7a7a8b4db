// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Delta DVP device table.
//!
//! Delta PLCs expose their device areas through Modbus offsets. The
//! table below maps symbolic device notation (`D100`, `M10`, `X17`) to
//! the DVP-series Modbus offset, including the split high ranges of the
//! M and D areas. X and Y device numbers are octal.

use crate::error::AddressError;

// =============================================================================
// Device Table
// =============================================================================

/// Access granularity of a translated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// Bit device, accessed through coil/discrete function codes.
    Bit,
    /// Word device, accessed through register function codes.
    Word,
}

/// A device-table translation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceAddress {
    /// Modbus offset of the device element.
    pub offset: u16,
    /// Bit or word granularity.
    pub class: DeviceClass,
}

struct AreaEntry {
    prefix: char,
    class: DeviceClass,
    octal: bool,
    // (first device number of the range, range length, modbus base)
    ranges: &'static [(u32, u32, u16)],
}

const DVP_AREAS: &[AreaEntry] = &[
    AreaEntry { prefix: 'S', class: DeviceClass::Bit, octal: false, ranges: &[(0, 1024, 0x0000)] },
    AreaEntry { prefix: 'X', class: DeviceClass::Bit, octal: true, ranges: &[(0, 0o400, 0x0400)] },
    AreaEntry { prefix: 'Y', class: DeviceClass::Bit, octal: true, ranges: &[(0, 0o400, 0x0500)] },
    AreaEntry { prefix: 'T', class: DeviceClass::Word, octal: false, ranges: &[(0, 256, 0x0600)] },
    AreaEntry {
        prefix: 'M',
        class: DeviceClass::Bit,
        octal: false,
        ranges: &[(0, 1536, 0x0800), (1536, 2560, 0xB000)],
    },
    AreaEntry { prefix: 'C', class: DeviceClass::Word, octal: false, ranges: &[(0, 256, 0x0E00)] },
    AreaEntry {
        prefix: 'D',
        class: DeviceClass::Word,
        octal: false,
        ranges: &[(0, 4096, 0x1000), (4096, 8096, 0x9000)],
    },
];

/// Translates Delta DVP device notation into a Modbus offset.
pub fn translate_dvp(text: &str) -> Result<DeviceAddress, AddressError> {
    let text = text.trim();
    let mut chars = text.chars();
    let prefix = chars
        .next()
        .ok_or_else(|| AddressError::InvalidFormat("empty device address".into()))?
        .to_ascii_uppercase();
    let digits = chars.as_str();

    let area = DVP_AREAS
        .iter()
        .find(|a| a.prefix == prefix)
        .ok_or_else(|| AddressError::UnknownDevice(format!("device prefix '{}'", prefix)))?;

    let radix = if area.octal { 8 } else { 10 };
    let number = u32::from_str_radix(digits, radix).map_err(|_| {
        AddressError::InvalidFormat(format!("bad device number '{}' for area {}", digits, prefix))
    })?;

    for (start, len, base) in area.ranges {
        if number >= *start && number < start + len {
            let offset = base + (number - start) as u16;
            return Ok(DeviceAddress { offset, class: area.class });
        }
    }
    Err(AddressError::InvalidFormat(format!(
        "device number {}{} out of range",
        prefix, number
    )))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_areas() {
        assert_eq!(translate_dvp("D100").unwrap(), DeviceAddress { offset: 0x1000 + 100, class: DeviceClass::Word });
        assert_eq!(translate_dvp("D4096").unwrap().offset, 0x9000);
        assert_eq!(translate_dvp("T5").unwrap().offset, 0x0605);
        assert_eq!(translate_dvp("C3").unwrap().offset, 0x0E03);
    }

    #[test]
    fn test_bit_areas() {
        assert_eq!(translate_dvp("S0").unwrap(), DeviceAddress { offset: 0x0000, class: DeviceClass::Bit });
        assert_eq!(translate_dvp("M10").unwrap().offset, 0x080A);
        assert_eq!(translate_dvp("M1536").unwrap().offset, 0xB000);
    }

    #[test]
    fn test_octal_contacts() {
        // X17 octal = 15 decimal
        assert_eq!(translate_dvp("X17").unwrap().offset, 0x0400 + 0o17);
        assert_eq!(translate_dvp("Y2").unwrap().offset, 0x0502);
        assert!(translate_dvp("X8").is_err());
    }

    #[test]
    fn test_unknown_prefix() {
        assert!(matches!(translate_dvp("W100"), Err(AddressError::UnknownDevice(_))));
        assert!(matches!(translate_dvp("D"), Err(AddressError::InvalidFormat(_))));
    }
}
