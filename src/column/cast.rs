//! The column factory: build a column of one logical type from another.
//!
//! Numeric conversions are plain `as` casts applied element by element. They are
//! deliberately lossy: wide → narrow integers keep the low bits, floats truncate
//! toward zero (saturating outside the target range), and large integers round
//! when they land in a float.

use std::sync::Arc;

use log::debug;

use crate::column::element::Numeric;
use crate::column::{Column, ColumnData, Dictionary, TypedColumn};
use crate::error::{ColumnError, Result};
use crate::types::LogicalType;

fn cast_slice<S: Numeric, T: Numeric>(src: &[S]) -> TypedColumn<T> {
    src.iter().map(|&s| T::from_prim(s.to_prim())).collect()
}

fn cast_numeric<S: Numeric>(src: &[S], to: LogicalType) -> Option<ColumnData> {
    Some(match to {
        LogicalType::Int8 => ColumnData::Int8(cast_slice(src)),
        LogicalType::Int16 => ColumnData::Int16(cast_slice(src)),
        LogicalType::Int32 => ColumnData::Int32(cast_slice(src)),
        LogicalType::Int64 => ColumnData::Int64(cast_slice(src)),
        LogicalType::UInt8 => ColumnData::UInt8(cast_slice(src)),
        LogicalType::UInt16 => ColumnData::UInt16(cast_slice(src)),
        LogicalType::UInt32 => ColumnData::UInt32(cast_slice(src)),
        LogicalType::UInt64 => ColumnData::UInt64(cast_slice(src)),
        LogicalType::Float32 => ColumnData::Float32(cast_slice(src)),
        LogicalType::Float64 => ColumnData::Float64(cast_slice(src)),
        LogicalType::Utf8 | LogicalType::Blob => return None,
    })
}

fn decode_codes(codes: &[u32], dict: &Dictionary) -> TypedColumn<String> {
    codes
        .iter()
        .map(|&code| dict.word(code).map_or_else(|| code.to_string(), str::to_string))
        .collect()
}

impl Column {
    /// Build a column of type `to` from `source`.
    ///
    /// Supported pairings: any numeric type to any numeric type (lossy casts),
    /// same-type copies, string ↔ blob (byte copy, invalid UTF-8 replaced), and a
    /// dictionary-coded `uint32` column to strings. The result keeps the source's
    /// dictionary only when it stays `uint32`, and its timestamp formatter only
    /// when it stays numeric.
    ///
    /// # Errors
    /// [`ColumnError::IncompatibleType`] for any other pairing.
    pub fn create(name: impl Into<String>, source: &Self, to: LogicalType) -> Result<Self> {
        let from = source.logical_type();
        let incompatible = ColumnError::IncompatibleType { from, to };

        let data = match (source.data(), to) {
            (ColumnData::UInt32(codes), LogicalType::Utf8) => match source.dictionary() {
                Some(dict) => ColumnData::Utf8(decode_codes(codes.as_slice(), dict)),
                None => return Err(incompatible),
            },
            (ColumnData::Utf8(c), LogicalType::Utf8) => ColumnData::Utf8(c.clone()),
            (ColumnData::Blob(c), LogicalType::Blob) => ColumnData::Blob(c.clone()),
            (ColumnData::Utf8(c), LogicalType::Blob) => {
                ColumnData::Blob(c.as_slice().iter().map(|s| s.as_bytes().to_vec()).collect())
            }
            (ColumnData::Blob(c), LogicalType::Utf8) => ColumnData::Utf8(
                c.as_slice()
                    .iter()
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .collect(),
            ),
            (data, to) => {
                with_numeric!(data, c => cast_numeric(c.as_slice(), to), _ => None)
                    .ok_or(incompatible)?
            }
        };

        debug!("created {to} column from {from} ({} rows)", data.len());
        let mut out = Self::new(name, data);
        if to == LogicalType::UInt32 {
            if let Some(dict) = source.dictionary() {
                out = out.with_dictionary(Arc::clone(dict))?;
            }
        }
        if to.is_numeric() {
            if let Some(f) = source.timestamp_formatter() {
                out = out.with_timestamp_formatter(Arc::clone(f));
            }
        }
        Ok(out)
    }

    /// Materialise a dictionary-coded column as strings. Codes missing from the
    /// dictionary decode to their decimal text.
    ///
    /// # Errors
    /// [`ColumnError::IncompatibleType`] if the column has no dictionary.
    pub fn decode(&self) -> Result<Self> {
        Self::create(self.name(), self, LogicalType::Utf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn wide_to_narrow_keeps_low_bits() {
        let src = Column::new("v", vec![256i32, 257, -1]);
        let out = Column::create("v", &src, LogicalType::UInt8).unwrap();
        assert_eq!(out.get(0), Some(Value::UInt8(0)));
        assert_eq!(out.get(1), Some(Value::UInt8(1)));
        assert_eq!(out.get(2), Some(Value::UInt8(255)));
    }

    #[test]
    fn int_to_float_widens() {
        let src = Column::new("v", vec![3u16, 7]);
        let out = Column::create("v", &src, LogicalType::Float64).unwrap();
        assert_eq!(out.get(1), Some(Value::from(7.0f64)));
    }

    #[test]
    fn strings_do_not_become_numbers() {
        let src = Column::new("s", vec!["1"]);
        let err = Column::create("s", &src, LogicalType::Int32).unwrap_err();
        assert!(matches!(
            err,
            ColumnError::IncompatibleType { from: LogicalType::Utf8, to: LogicalType::Int32 }
        ));
    }

    #[test]
    fn categorical_decodes_to_strings() {
        let cat = Column::categorical("c", ["x", "y", "x"]);
        let s = cat.decode().unwrap();
        assert_eq!(s.logical_type(), LogicalType::Utf8);
        assert_eq!(s.get(2), Some(Value::from("x")));
        assert!(Column::new("n", vec![0u32]).decode().is_err());
    }

    #[test]
    fn string_blob_round_trip() {
        let s = Column::new("s", vec!["hi"]);
        let b = Column::create("b", &s, LogicalType::Blob).unwrap();
        assert_eq!(b.get(0), Some(Value::Blob(b"hi".to_vec())));
        let back = Column::create("s", &b, LogicalType::Utf8).unwrap();
        assert_eq!(back, s);
    }
}
