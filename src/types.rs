//! Logical types, scalar values and aggregate operator tags.

use std::fmt;
use std::str::FromStr;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// The storage type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Utf8,
    Blob,
}

impl LogicalType {
    /// Every logical type, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
        Self::Utf8,
        Self::Blob,
    ];

    /// `true` for the integer and floating point types.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Utf8 | Self::Blob)
    }

    /// Width in bytes of one element in the binary format, `None` for variable width.
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Int8 | Self::UInt8 => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float32 => Some(4),
            Self::Int64 | Self::UInt64 | Self::Float64 => Some(8),
            Self::Utf8 | Self::Blob => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Utf8 => "string",
            Self::Blob => "blob",
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single element of any logical type.
///
/// Floats are wrapped in [`OrderedFloat`] so a `Value` is `Ord` and `Hash`. That
/// order is close to, but not the same as, the IEEE total order columns sort by:
/// `OrderedFloat` treats `-0.0` and `+0.0` as equal and folds every NaN into one
/// value, while column operations keep both zeros (and NaN signs) apart.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(OrderedFloat<f32>),
    Float64(OrderedFloat<f64>),
    Utf8(String),
    Blob(Vec<u8>),
}

impl Value {
    #[must_use]
    pub const fn logical_type(&self) -> LogicalType {
        match self {
            Self::Int8(_) => LogicalType::Int8,
            Self::Int16(_) => LogicalType::Int16,
            Self::Int32(_) => LogicalType::Int32,
            Self::Int64(_) => LogicalType::Int64,
            Self::UInt8(_) => LogicalType::UInt8,
            Self::UInt16(_) => LogicalType::UInt16,
            Self::UInt32(_) => LogicalType::UInt32,
            Self::UInt64(_) => LogicalType::UInt64,
            Self::Float32(_) => LogicalType::Float32,
            Self::Float64(_) => LogicalType::Float64,
            Self::Utf8(_) => LogicalType::Utf8,
            Self::Blob(_) => LogicalType::Blob,
        }
    }

    /// Numeric view of the value; `None` for strings and blobs.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        Some(match self {
            Self::Int8(v) => f64::from(*v),
            Self::Int16(v) => f64::from(*v),
            Self::Int32(v) => f64::from(*v),
            Self::Int64(v) => *v as f64,
            Self::UInt8(v) => f64::from(*v),
            Self::UInt16(v) => f64::from(*v),
            Self::UInt32(v) => f64::from(*v),
            Self::UInt64(v) => *v as f64,
            Self::Float32(v) => f64::from(v.0),
            Self::Float64(v) => v.0,
            Self::Utf8(_) | Self::Blob(_) => return None,
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{}", v.0),
            Self::Float64(v) => write!(f, "{}", v.0),
            Self::Utf8(s) => write!(f, "\"{s}\""),
            Self::Blob(b) => {
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

value_from!(
    i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64,
    u8 => UInt8, u16 => UInt16, u32 => UInt32, u64 => UInt64,
    f32 => Float32, f64 => Float64,
    String => Utf8, Vec<u8> => Blob,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Utf8(v.to_string())
    }
}

/// The aggregate operator a value column is reduced (and later re-combined) with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggOp {
    /// First element of the segment.
    Nil,
    /// Segment length.
    Cnt,
    Sum,
    Avg,
    Min,
    Max,
    VarPop,
    VarSamp,
    StdPop,
    StdSamp,
    /// Number of distinct values.
    Distinct,
    Median,
    /// String join in current order.
    Concat,
}

impl AggOp {
    /// Operators whose partial results can be combined directly by a merge.
    #[must_use]
    pub const fn is_mergeable(self) -> bool {
        matches!(self, Self::Nil | Self::Cnt | Self::Sum | Self::Min | Self::Max)
    }

    /// Operators that need arithmetic on the element type.
    #[must_use]
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Sum
                | Self::Avg
                | Self::VarPop
                | Self::VarSamp
                | Self::StdPop
                | Self::StdSamp
        )
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Cnt => "count",
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
            Self::VarPop => "varpop",
            Self::VarSamp => "varsamp",
            Self::StdPop => "stdpop",
            Self::StdSamp => "stdsamp",
            Self::Distinct => "distinct",
            Self::Median => "median",
            Self::Concat => "concat",
        }
    }
}

impl fmt::Display for AggOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggOp {
    type Err = String;

    /// Accepts the operator names used by SQL front ends, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "nil" | "" => Self::Nil,
            "cnt" | "count" => Self::Cnt,
            "sum" => Self::Sum,
            "avg" | "average" => Self::Avg,
            "min" => Self::Min,
            "max" => Self::Max,
            "varpop" | "var_pop" => Self::VarPop,
            "varsamp" | "var_samp" | "variance" | "var" => Self::VarSamp,
            "stdpop" | "stddev_pop" => Self::StdPop,
            "stdsamp" | "stddev_samp" | "stddev" | "std" => Self::StdSamp,
            "distinct" | "countdistinct" => Self::Distinct,
            "median" => Self::Median,
            "concat" | "group_concat" => Self::Concat,
            other => return Err(format!("unknown aggregate operator `{other}`")),
        })
    }
}
