//! Element traits: what a column buffer needs from the values it stores.
//!
//! [`Element`] is implemented by every storable type (the ten numeric primitives,
//! `String`, and `Vec<u8>` for blobs). [`Numeric`] adds the arithmetic view used by
//! SUM/AVG/VARIANCE and by the casting factory.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::io::{self, Write};

use crate::types::{LogicalType, Value};

/// A value that can live in a column buffer.
pub trait Element: Clone + Default + Debug + PartialEq + Send + Sync + 'static {
    /// Logical type of a column holding this element.
    const LOGICAL: LogicalType;

    /// Total order used by sort, segment, min/max and merge.
    fn compare(&self, other: &Self) -> Ordering;

    fn to_value(&self) -> Value;

    /// Convert a scalar into this element, applying the lossy numeric casts.
    /// Returns `None` when the value's kind cannot be represented at all.
    fn from_value(v: &Value) -> Option<Self>;

    /// Append this element to the binary stream.
    fn write_binary(&self, out: &mut dyn Write) -> io::Result<()>;

    /// Write this element as text.
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Widest lossless representation of a numeric element, used for casting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Prim {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl Prim {
    fn of_value(v: &Value) -> Option<Self> {
        Some(match *v {
            Value::Int8(x) => Self::Signed(x.into()),
            Value::Int16(x) => Self::Signed(x.into()),
            Value::Int32(x) => Self::Signed(x.into()),
            Value::Int64(x) => Self::Signed(x),
            Value::UInt8(x) => Self::Unsigned(x.into()),
            Value::UInt16(x) => Self::Unsigned(x.into()),
            Value::UInt32(x) => Self::Unsigned(x.into()),
            Value::UInt64(x) => Self::Unsigned(x),
            Value::Float32(x) => Self::Float(x.0.into()),
            Value::Float64(x) => Self::Float(x.0),
            Value::Utf8(_) | Value::Blob(_) => return None,
        })
    }
}

/// Arithmetic element types.
pub trait Numeric: Element + Copy {
    fn to_prim(self) -> Prim;

    /// `as`-cast from the widened representation: bit truncation between integer
    /// widths, truncation toward zero from floats.
    fn from_prim(p: Prim) -> Self;

    fn to_f64(self) -> f64;

    /// Addition in the storage type; integers wrap.
    fn add(self, other: Self) -> Self;

    fn from_f64(v: f64) -> Self {
        Self::from_prim(Prim::Float(v))
    }

    fn from_count(n: usize) -> Self {
        Self::from_prim(Prim::Unsigned(n as u64))
    }
}

macro_rules! impl_integer {
    ($($t:ty => $variant:ident, $prim:ident, $wide:ty);* $(;)?) => {
        $(
            impl Element for $t {
                const LOGICAL: LogicalType = LogicalType::$variant;

                #[inline]
                fn compare(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }

                fn to_value(&self) -> Value {
                    Value::$variant(*self)
                }

                fn from_value(v: &Value) -> Option<Self> {
                    Prim::of_value(v).map(Self::from_prim)
                }

                fn write_binary(&self, out: &mut dyn Write) -> io::Result<()> {
                    out.write_all(&self.to_ne_bytes())
                }

                fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
                    write!(out, "{self}")
                }
            }

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap, clippy::cast_lossless)]
            impl Numeric for $t {
                #[inline]
                fn to_prim(self) -> Prim {
                    Prim::$prim(self as $wide)
                }

                #[inline]
                fn from_prim(p: Prim) -> Self {
                    match p {
                        Prim::Signed(v) => v as Self,
                        Prim::Unsigned(v) => v as Self,
                        Prim::Float(v) => v as Self,
                    }
                }

                #[inline]
                #[allow(clippy::cast_precision_loss)]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn add(self, other: Self) -> Self {
                    self.wrapping_add(other)
                }
            }
        )*
    };
}

impl_integer!(
    i8 => Int8, Signed, i64;
    i16 => Int16, Signed, i64;
    i32 => Int32, Signed, i64;
    i64 => Int64, Signed, i64;
    u8 => UInt8, Unsigned, u64;
    u16 => UInt16, Unsigned, u64;
    u32 => UInt32, Unsigned, u64;
    u64 => UInt64, Unsigned, u64;
);

macro_rules! impl_float {
    ($($t:ty => $variant:ident);* $(;)?) => {
        $(
            impl Element for $t {
                const LOGICAL: LogicalType = LogicalType::$variant;

                #[inline]
                fn compare(&self, other: &Self) -> Ordering {
                    self.total_cmp(other)
                }

                fn to_value(&self) -> Value {
                    Value::$variant((*self).into())
                }

                fn from_value(v: &Value) -> Option<Self> {
                    Prim::of_value(v).map(Self::from_prim)
                }

                fn write_binary(&self, out: &mut dyn Write) -> io::Result<()> {
                    out.write_all(&self.to_ne_bytes())
                }

                fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
                    write!(out, "{self}")
                }
            }

            #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_lossless)]
            impl Numeric for $t {
                #[inline]
                fn to_prim(self) -> Prim {
                    Prim::Float(self as f64)
                }

                #[inline]
                fn from_prim(p: Prim) -> Self {
                    match p {
                        Prim::Signed(v) => v as Self,
                        Prim::Unsigned(v) => v as Self,
                        Prim::Float(v) => v as Self,
                    }
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn add(self, other: Self) -> Self {
                    self + other
                }
            }
        )*
    };
}

impl_float!(f32 => Float32; f64 => Float64);

impl Element for String {
    const LOGICAL: LogicalType = LogicalType::Utf8;

    #[inline]
    fn compare(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }

    fn to_value(&self) -> Value {
        Value::Utf8(self.clone())
    }

    fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::Utf8(s) => Some(s.clone()),
            Value::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
            _ => None,
        }
    }

    /// NUL-terminated byte run.
    fn write_binary(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.as_bytes())?;
        out.write_all(&[0])
    }

    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "\"{self}\"")
    }
}

/// Blob records are padded to this alignment in the binary format.
pub const BLOB_ALIGN: usize = 8;

impl Element for Vec<u8> {
    const LOGICAL: LogicalType = LogicalType::Blob;

    #[inline]
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }

    fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::Blob(b) => Some(b.clone()),
            Value::Utf8(s) => Some(s.as_bytes().to_vec()),
            _ => None,
        }
    }

    /// 8-byte little-endian length, payload, zero padding to the next 8-byte boundary.
    fn write_binary(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(&(self.len() as u64).to_le_bytes())?;
        out.write_all(self)?;
        let pad = (BLOB_ALIGN - self.len() % BLOB_ALIGN) % BLOB_ALIGN;
        out.write_all(&[0u8; BLOB_ALIGN][..pad])
    }

    /// Lowercase hex.
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        for byte in self {
            write!(out, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_casts_truncate_bits() {
        assert_eq!(i8::from_prim(300i32.to_prim()), 44);
        assert_eq!(u8::from_prim((-1i64).to_prim()), 255);
        assert_eq!(u16::from_prim(70_000u32.to_prim()), 70_000u32 as u16);
    }

    #[test]
    fn float_to_int_truncates_toward_zero() {
        assert_eq!(i32::from_prim(2.9f64.to_prim()), 2);
        assert_eq!(i32::from_prim((-2.9f32).to_prim()), -2);
    }

    #[test]
    fn blob_binary_is_padded() {
        let mut out = Vec::new();
        vec![1u8, 2, 3].write_binary(&mut out).unwrap();
        assert_eq!(out.len(), 16);
        assert_eq!(&out[..8], &3u64.to_le_bytes());
        assert_eq!(&out[8..11], &[1, 2, 3]);
        assert!(out[11..].iter().all(|&b| b == 0));
    }

    #[test]
    fn string_binary_is_nul_terminated() {
        let mut out = Vec::new();
        "ab".to_string().write_binary(&mut out).unwrap();
        assert_eq!(out, b"ab\0");
    }
}
