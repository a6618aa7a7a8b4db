// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Payload byte conversion.
//!
//! [`ByteTransform`] turns the raw register payload of a response into
//! typed [`Value`]s and typed values back into wire bytes. Multi-word
//! numerics pass through the configured [`DataFormat`] transposition;
//! 16-bit values are unaffected by it. Bits unpack low-bit-first per
//! byte. Strings are raw character bytes with an optional 2-byte pair
//! reversal.

use fieldbus_core::{DataKind, Value};

use crate::error::TransformError;
use crate::types::DataFormat;

// =============================================================================
// Bit Packing
// =============================================================================

/// Unpacks `count` bits, low-bit-first per byte.
pub fn unpack_bits(payload: &[u8], count: u16) -> Result<Vec<bool>, TransformError> {
    let needed = (count as usize).div_ceil(8);
    if payload.len() < needed {
        return Err(TransformError::Truncated { needed, actual: payload.len() });
    }
    let mut bits = Vec::with_capacity(count as usize);
    for i in 0..count as usize {
        bits.push(payload[i / 8] & (1 << (i % 8)) != 0);
    }
    Ok(bits)
}

/// Packs bits low-bit-first into `ceil(len/8)` bytes.
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; bits.len().div_ceil(8)];
    for (i, bit) in bits.iter().enumerate() {
        if *bit {
            bytes[i / 8] |= 1 << (i % 8);
        }
    }
    bytes
}

// =============================================================================
// ByteTransform
// =============================================================================

/// Converts register payloads to and from typed values under one
/// byte-order configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteTransform {
    /// Multi-register word/byte order.
    pub data_format: DataFormat,
    /// Reverse 2-byte pairs of string payloads.
    pub string_reverse: bool,
}

impl ByteTransform {
    /// Creates a transform.
    pub fn new(data_format: DataFormat, string_reverse: bool) -> Self {
        Self { data_format, string_reverse }
    }

    /// Decodes `count` elements of `kind` from `payload`.
    ///
    /// For `DataKind::String`, `count` is the string byte length and a
    /// single `Value::String` is returned.
    pub fn decode(
        &self,
        kind: DataKind,
        payload: &[u8],
        count: u16,
    ) -> Result<Vec<Value>, TransformError> {
        match kind {
            DataKind::Bool => {
                let bits = unpack_bits(payload, count)?;
                Ok(bits.into_iter().map(Value::Bool).collect())
            }
            DataKind::Int16 => self
                .scalar_groups(payload, count, 2)?
                .map(|g| Ok(Value::Int16(i16::from_be_bytes([g[0], g[1]]))))
                .collect(),
            DataKind::UInt16 => self
                .scalar_groups(payload, count, 2)?
                .map(|g| Ok(Value::UInt16(u16::from_be_bytes([g[0], g[1]]))))
                .collect(),
            DataKind::Int32 => self.decode_wide(payload, count, 4, |b| {
                Value::Int32(i32::from_be_bytes(b.try_into().unwrap()))
            }),
            DataKind::UInt32 => self.decode_wide(payload, count, 4, |b| {
                Value::UInt32(u32::from_be_bytes(b.try_into().unwrap()))
            }),
            DataKind::Float32 => self.decode_wide(payload, count, 4, |b| {
                Value::Float32(f32::from_be_bytes(b.try_into().unwrap()))
            }),
            DataKind::Int64 => self.decode_wide(payload, count, 8, |b| {
                Value::Int64(i64::from_be_bytes(b.try_into().unwrap()))
            }),
            DataKind::UInt64 => self.decode_wide(payload, count, 8, |b| {
                Value::UInt64(u64::from_be_bytes(b.try_into().unwrap()))
            }),
            DataKind::Float64 => self.decode_wide(payload, count, 8, |b| {
                Value::Float64(f64::from_be_bytes(b.try_into().unwrap()))
            }),
            DataKind::String => {
                let needed = count as usize;
                if payload.len() < needed {
                    return Err(TransformError::Truncated { needed, actual: payload.len() });
                }
                let mut bytes = payload[..needed].to_vec();
                if self.string_reverse {
                    reverse_pairs(&mut bytes);
                }
                let text = String::from_utf8_lossy(&bytes)
                    .trim_end_matches('\0')
                    .to_string();
                Ok(vec![Value::String(text)])
            }
        }
    }

    /// Encodes one value into register payload bytes.
    ///
    /// Booleans have no register image; coil writes pack bits at the
    /// frame layer instead.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, TransformError> {
        match value {
            Value::Bool(_) => Err(TransformError::UnsupportedKind(
                "bool is written through coil function codes",
            )),
            Value::Int16(v) => Ok(v.to_be_bytes().to_vec()),
            Value::UInt16(v) => Ok(v.to_be_bytes().to_vec()),
            Value::Int32(v) => Ok(self.data_format.rearrange(&v.to_be_bytes())),
            Value::UInt32(v) => Ok(self.data_format.rearrange(&v.to_be_bytes())),
            Value::Float32(v) => Ok(self.data_format.rearrange(&v.to_be_bytes())),
            Value::Int64(v) => Ok(self.data_format.rearrange(&v.to_be_bytes())),
            Value::UInt64(v) => Ok(self.data_format.rearrange(&v.to_be_bytes())),
            Value::Float64(v) => Ok(self.data_format.rearrange(&v.to_be_bytes())),
            Value::String(s) => {
                let mut bytes = s.as_bytes().to_vec();
                if bytes.len() % 2 != 0 {
                    bytes.push(0);
                }
                if self.string_reverse {
                    reverse_pairs(&mut bytes);
                }
                Ok(bytes)
            }
        }
    }

    fn scalar_groups<'a>(
        &self,
        payload: &'a [u8],
        count: u16,
        width: usize,
    ) -> Result<impl Iterator<Item = &'a [u8]>, TransformError> {
        let needed = count as usize * width;
        if payload.len() < needed {
            return Err(TransformError::Truncated { needed, actual: payload.len() });
        }
        Ok(payload[..needed].chunks_exact(width))
    }

    fn decode_wide(
        &self,
        payload: &[u8],
        count: u16,
        width: usize,
        make: impl Fn(&[u8]) -> Value,
    ) -> Result<Vec<Value>, TransformError> {
        let groups = self.scalar_groups(payload, count, width)?;
        Ok(groups
            .map(|g| make(&self.data_format.rearrange(g)))
            .collect())
    }
}

impl Default for ByteTransform {
    fn default() -> Self {
        Self::new(DataFormat::Abcd, false)
    }
}

fn reverse_pairs(bytes: &mut [u8]) {
    for pair in bytes.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_bits_low_first() {
        // 0b0000_0101 -> bits 0 and 2 set
        let bits = unpack_bits(&[0x05], 4).unwrap();
        assert_eq!(bits, vec![true, false, true, false]);
        assert!(unpack_bits(&[0x05], 9).is_err());
    }

    #[test]
    fn test_pack_unpack_round_trip() {
        let bits = vec![true, false, false, true, true, false, true, false, true];
        let packed = pack_bits(&bits);
        assert_eq!(packed.len(), 2);
        assert_eq!(unpack_bits(&packed, bits.len() as u16).unwrap(), bits);
    }

    #[test]
    fn test_decode_u16_ignores_format() {
        let t = ByteTransform::new(DataFormat::Dcba, false);
        let values = t.decode(DataKind::UInt16, &[0x12, 0x34, 0x00, 0x07], 2).unwrap();
        assert_eq!(values, vec![Value::UInt16(0x1234), Value::UInt16(7)]);
    }

    #[test]
    fn test_decode_u32_formats() {
        let wire = [0x12, 0x34, 0x56, 0x78];
        let expect = [
            (DataFormat::Abcd, 0x1234_5678u32),
            (DataFormat::Badc, 0x3412_7856),
            (DataFormat::Cdab, 0x5678_1234),
            (DataFormat::Dcba, 0x7856_3412),
        ];
        for (fmt, value) in expect {
            let t = ByteTransform::new(fmt, false);
            let decoded = t.decode(DataKind::UInt32, &wire, 1).unwrap();
            assert_eq!(decoded, vec![Value::UInt32(value)], "{fmt}");
        }
    }

    #[test]
    fn test_encode_decode_identity() {
        for fmt in [DataFormat::Abcd, DataFormat::Badc, DataFormat::Cdab, DataFormat::Dcba] {
            let t = ByteTransform::new(fmt, false);
            let bytes = t.encode(&Value::Float64(-273.15)).unwrap();
            let back = t.decode(DataKind::Float64, &bytes, 1).unwrap();
            assert_eq!(back, vec![Value::Float64(-273.15)]);
        }
    }

    #[test]
    fn test_decode_float32_big_endian() {
        // 0x42480000 = 50.0
        let t = ByteTransform::default();
        let values = t.decode(DataKind::Float32, &[0x42, 0x48, 0x00, 0x00], 1).unwrap();
        assert_eq!(values, vec![Value::Float32(50.0)]);
    }

    #[test]
    fn test_truncated_payload() {
        let t = ByteTransform::default();
        let err = t.decode(DataKind::UInt32, &[0x00, 0x01], 1).unwrap_err();
        assert_eq!(err, TransformError::Truncated { needed: 4, actual: 2 });
    }

    #[test]
    fn test_string_reverse_pairs() {
        let t = ByteTransform::new(DataFormat::Abcd, true);
        let values = t.decode(DataKind::String, b"BADC", 4).unwrap();
        assert_eq!(values, vec![Value::String("ABCD".into())]);

        let encoded = t.encode(&Value::String("ABCD".into())).unwrap();
        assert_eq!(encoded, b"BADC");
    }

    #[test]
    fn test_encode_bool_rejected() {
        let t = ByteTransform::default();
        assert!(matches!(
            t.encode(&Value::Bool(true)),
            Err(TransformError::UnsupportedKind(_))
        ));
    }
}
