// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Protocol-level value types: function codes and register byte order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;

// =============================================================================
// FunctionCode
// =============================================================================

/// Modbus function codes supported by the drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionCode {
    /// FC 01, read coils.
    ReadCoil,
    /// FC 02, read discrete inputs.
    ReadDiscrete,
    /// FC 03, read holding registers.
    ReadHoldingRegister,
    /// FC 04, read input registers.
    ReadInputRegister,
    /// FC 05, write a single coil.
    WriteSingleCoil,
    /// FC 06, write a single register.
    WriteSingleRegister,
    /// FC 15, write multiple coils.
    WriteMultipleCoils,
    /// FC 16, write multiple registers.
    WriteMultipleRegisters,
}

impl FunctionCode {
    /// Wire function-code byte.
    pub fn code(&self) -> u8 {
        match self {
            Self::ReadCoil => 0x01,
            Self::ReadDiscrete => 0x02,
            Self::ReadHoldingRegister => 0x03,
            Self::ReadInputRegister => 0x04,
            Self::WriteSingleCoil => 0x05,
            Self::WriteSingleRegister => 0x06,
            Self::WriteMultipleCoils => 0x0F,
            Self::WriteMultipleRegisters => 0x10,
        }
    }

    /// Maps a wire byte back to a function code.
    pub fn from_code(code: u8) -> Result<Self, AddressError> {
        match code {
            0x01 => Ok(Self::ReadCoil),
            0x02 => Ok(Self::ReadDiscrete),
            0x03 => Ok(Self::ReadHoldingRegister),
            0x04 => Ok(Self::ReadInputRegister),
            0x05 => Ok(Self::WriteSingleCoil),
            0x06 => Ok(Self::WriteSingleRegister),
            0x0F => Ok(Self::WriteMultipleCoils),
            0x10 => Ok(Self::WriteMultipleRegisters),
            other => Err(AddressError::InvalidFormat(format!(
                "unknown function code: {}",
                other
            ))),
        }
    }

    /// Returns `true` for bit-granular (coil/discrete) operations.
    pub fn is_bit_access(&self) -> bool {
        matches!(
            self,
            Self::ReadCoil | Self::ReadDiscrete | Self::WriteSingleCoil | Self::WriteMultipleCoils
        )
    }

    /// Returns `true` for read operations.
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            Self::ReadCoil | Self::ReadDiscrete | Self::ReadHoldingRegister | Self::ReadInputRegister
        )
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FC{:02}", self.code())
    }
}

// =============================================================================
// DataFormat
// =============================================================================

/// Word/byte order of multi-register numeric values.
///
/// The letters name byte positions of a 32-bit example `0x12345678`
/// transmitted as registers: `A=0x12, B=0x34, C=0x56, D=0x78`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataFormat {
    /// Big-endian, no reordering.
    Abcd,
    /// Bytes swapped within each 16-bit word.
    Badc,
    /// 16-bit words swapped, bytes within words kept.
    Cdab,
    /// Full byte reversal, little-endian.
    Dcba,
}

impl DataFormat {
    /// Reorders `group` (4 or 8 bytes of one value, as received in
    /// big-endian register order) into big-endian byte order.
    ///
    /// The transposition is an involution, so the same call also maps
    /// big-endian bytes into wire order for encoding.
    pub fn rearrange(&self, group: &[u8]) -> Vec<u8> {
        match self {
            Self::Abcd => group.to_vec(),
            Self::Badc => group
                .chunks_exact(2)
                .flat_map(|w| [w[1], w[0]])
                .collect(),
            Self::Cdab => group
                .chunks_exact(2)
                .rev()
                .flat_map(|w| [w[0], w[1]])
                .collect(),
            Self::Dcba => group.iter().rev().copied().collect(),
        }
    }
}

impl Default for DataFormat {
    fn default() -> Self {
        Self::Abcd
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Abcd => "ABCD",
            Self::Badc => "BADC",
            Self::Cdab => "CDAB",
            Self::Dcba => "DCBA",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DataFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ABCD" => Ok(Self::Abcd),
            "BADC" => Ok(Self::Badc),
            "CDAB" => Ok(Self::Cdab),
            "DCBA" => Ok(Self::Dcba),
            other => Err(format!("unknown data format: {}", other)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
