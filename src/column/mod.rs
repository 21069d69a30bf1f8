//! Typed columns.
//!
//! A [`Column`] is a named, type-erased handle over one [`TypedColumn<T>`] buffer.
//! Operations dispatch once on the logical type and then run fully monomorphised
//! code over the concrete element type:
//!
//! - element access: [`get`](Column::get), [`compare`](Column::compare),
//!   [`equal_to`](Column::equal_to), [`swap`](Column::swap)
//! - numeric summaries: [`min`](Column::min), [`max`](Column::max), [`sum`](Column::sum)
//! - reshaping: [`truncate`](Column::truncate), [`reorder`](Column::reorder),
//!   [`gather`](Column::gather)
//! - construction with casts: [`create`](Column::create)
//!
//! Sorting, segmenting, reducing, selection and serialization live in their own
//! modules as further `impl Column` blocks.
//!
//! ```
//! use colagg::{Column, LogicalType, Value};
//!
//! let src = Column::new("x", vec![1.9f64, -2.7, 300.0]);
//! let narrow = Column::create("x8", &src, LogicalType::Int8).unwrap();
//! assert_eq!(narrow.get(0), Some(Value::Int8(1)));
//! assert_eq!(narrow.get(1), Some(Value::Int8(-2)));
//! ```

mod cast;
mod dictionary;
mod element;
mod typed;

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

pub use dictionary::Dictionary;
pub use element::{BLOB_ALIGN, Element, Numeric, Prim};
pub(crate) use typed::permute_slice;
pub use typed::TypedColumn;

use crate::error::{ColumnError, Result};
use crate::serialize::TimestampFormatter;
use crate::types::{LogicalType, Value};

/// The buffer of a column, one variant per logical type.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Int8(TypedColumn<i8>),
    Int16(TypedColumn<i16>),
    Int32(TypedColumn<i32>),
    Int64(TypedColumn<i64>),
    UInt8(TypedColumn<u8>),
    UInt16(TypedColumn<u16>),
    UInt32(TypedColumn<u32>),
    UInt64(TypedColumn<u64>),
    Float32(TypedColumn<f32>),
    Float64(TypedColumn<f64>),
    Utf8(TypedColumn<String>),
    Blob(TypedColumn<Vec<u8>>),
}

macro_rules! data_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<TypedColumn<$t>> for ColumnData {
                fn from(c: TypedColumn<$t>) -> Self {
                    Self::$variant(c)
                }
            }

            impl From<Vec<$t>> for ColumnData {
                fn from(v: Vec<$t>) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

data_from!(
    i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64,
    u8 => UInt8, u16 => UInt16, u32 => UInt32, u64 => UInt64,
    f32 => Float32, f64 => Float64,
    String => Utf8, Vec<u8> => Blob,
);

impl From<Vec<&str>> for ColumnData {
    fn from(v: Vec<&str>) -> Self {
        Self::Utf8(v.into_iter().map(String::from).collect())
    }
}

impl ColumnData {
    /// Empty buffer of the given type.
    #[must_use]
    pub fn empty(ty: LogicalType) -> Self {
        Self::with_capacity(ty, 0)
    }

    #[must_use]
    pub fn with_capacity(ty: LogicalType, capacity: usize) -> Self {
        match ty {
            LogicalType::Int8 => Self::Int8(TypedColumn::with_capacity(capacity)),
            LogicalType::Int16 => Self::Int16(TypedColumn::with_capacity(capacity)),
            LogicalType::Int32 => Self::Int32(TypedColumn::with_capacity(capacity)),
            LogicalType::Int64 => Self::Int64(TypedColumn::with_capacity(capacity)),
            LogicalType::UInt8 => Self::UInt8(TypedColumn::with_capacity(capacity)),
            LogicalType::UInt16 => Self::UInt16(TypedColumn::with_capacity(capacity)),
            LogicalType::UInt32 => Self::UInt32(TypedColumn::with_capacity(capacity)),
            LogicalType::UInt64 => Self::UInt64(TypedColumn::with_capacity(capacity)),
            LogicalType::Float32 => Self::Float32(TypedColumn::with_capacity(capacity)),
            LogicalType::Float64 => Self::Float64(TypedColumn::with_capacity(capacity)),
            LogicalType::Utf8 => Self::Utf8(TypedColumn::with_capacity(capacity)),
            LogicalType::Blob => Self::Blob(TypedColumn::with_capacity(capacity)),
        }
    }

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

    #[must_use]
    pub fn len(&self) -> usize {
        with_data!(self, c => c.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named column: typed buffer plus optional dictionary and timestamp formatter.
#[derive(Clone)]
pub struct Column {
    name: String,
    data: ColumnData,
    dictionary: Option<Arc<Dictionary>>,
    formatter: Option<Arc<dyn TimestampFormatter>>,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("data", &self.data)
            .field("dictionary", &self.dictionary.as_ref().map(|d| d.len()))
            .field("timestamp", &self.formatter.is_some())
            .finish()
    }
}

/// Columns compare by name, contents and dictionary; formatters are ignored.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.data == other.data && self.dictionary == other.dictionary
    }
}

impl Column {
    pub fn new(name: impl Into<String>, data: impl Into<ColumnData>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            dictionary: None,
            formatter: None,
        }
    }

    /// Empty column of the given type.
    pub fn empty(name: impl Into<String>, ty: LogicalType) -> Self {
        Self::new(name, ColumnData::empty(ty))
    }

    /// Build a column of type `ty` from scalars, casting each one.
    ///
    /// # Errors
    /// [`ColumnError::IncompatibleType`] on the first value that cannot be cast.
    pub fn from_values(name: impl Into<String>, ty: LogicalType, values: &[Value]) -> Result<Self> {
        let mut col = Self::new(name, ColumnData::with_capacity(ty, values.len()));
        for v in values {
            col.push(v)?;
        }
        Ok(col)
    }

    /// Dictionary-encode strings into a `uint32` categorical column.
    pub fn categorical<'a, I>(name: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut dict = Dictionary::new();
        let codes = dict.encode(words);
        Self {
            name: name.into(),
            data: ColumnData::UInt32(codes.into()),
            dictionary: Some(Arc::new(dict)),
            formatter: None,
        }
    }

    /// Attach a dictionary. Only `uint32` columns carry codes.
    ///
    /// # Errors
    /// [`ColumnError::IncompatibleType`] if the column is not `uint32`.
    pub fn with_dictionary(mut self, dict: Arc<Dictionary>) -> Result<Self> {
        if self.logical_type() != LogicalType::UInt32 {
            return Err(ColumnError::IncompatibleType {
                from: self.logical_type(),
                to: LogicalType::UInt32,
            });
        }
        self.dictionary = Some(dict);
        Ok(self)
    }

    /// Mark the column as unix time, printed through `formatter` in text output.
    #[must_use]
    pub fn with_timestamp_formatter(mut self, formatter: Arc<dyn TimestampFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub const fn logical_type(&self) -> LogicalType {
        self.data.logical_type()
    }

    #[must_use]
    pub const fn data(&self) -> &ColumnData {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut ColumnData {
        &mut self.data
    }

    #[must_use]
    pub fn into_data(self) -> ColumnData {
        self.data
    }

    #[must_use]
    pub fn dictionary(&self) -> Option<&Arc<Dictionary>> {
        self.dictionary.as_ref()
    }

    #[must_use]
    pub fn timestamp_formatter(&self) -> Option<&Arc<dyn TimestampFormatter>> {
        self.formatter.as_ref()
    }

    pub(crate) fn clear_dictionary(&mut self) {
        self.dictionary = None;
    }

    pub(crate) fn clear_formatter(&mut self) {
        self.formatter = None;
    }

    pub(crate) fn set_data(&mut self, data: ColumnData) {
        self.data = data;
    }

    /// Same name, dictionary and formatter, different buffer.
    pub(crate) fn with_same_metadata(&self, data: ColumnData) -> Self {
        Self {
            name: self.name.clone(),
            data,
            dictionary: self.dictionary.clone(),
            formatter: self.formatter.clone(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element `i` as a scalar; `None` past the end.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<Value> {
        with_data!(&self.data, c => c.get(i).map(Element::to_value))
    }

    /// Append one value, cast into the column's type.
    ///
    /// # Errors
    /// [`ColumnError::IncompatibleType`] if the value cannot be cast (for example a
    /// string into a numeric column).
    pub fn push(&mut self, v: &Value) -> Result<()> {
        if with_data!(&mut self.data, c => c.push_value(v)) {
            Ok(())
        } else {
            Err(ColumnError::IncompatibleType {
                from: v.logical_type(),
                to: self.logical_type(),
            })
        }
    }

    /// Order of rows `i` and `j`; `None` if either is out of range.
    #[must_use]
    pub fn compare(&self, i: usize, j: usize) -> Option<Ordering> {
        with_data!(&self.data, c => c.compare(i, j))
    }

    /// Order of row `i` here against row `j` of `other`; `None` when the types
    /// differ or a row is out of range.
    #[must_use]
    pub fn compare_with(&self, i: usize, other: &Self, j: usize) -> Option<Ordering> {
        zip_data!(&self.data, &other.data, (a, b) => a.compare_with(i, b, j), _ => None)
    }

    /// Whether row `i` of this column equals row `j` of `other`. A type mismatch
    /// or an out-of-range row is simply `false`.
    #[must_use]
    pub fn equal_to(&self, other: &Self, i: usize, j: usize) -> bool {
        self.compare_with(i, other, j) == Some(Ordering::Equal)
    }

    /// # Errors
    /// [`ColumnError::OutOfRange`] if either row does not exist.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        with_data!(&mut self.data, c => c.swap(i, j))
    }

    /// Smallest element; `None` for empty or non-numeric columns.
    #[must_use]
    pub fn min(&self) -> Option<Value> {
        with_numeric!(&self.data, c => c.min().map(|v| v.to_value()), _ => None)
    }

    /// Largest element; `None` for empty or non-numeric columns.
    #[must_use]
    pub fn max(&self) -> Option<Value> {
        with_numeric!(&self.data, c => c.max().map(|v| v.to_value()), _ => None)
    }

    /// Sum of all elements as `f64`; `None` for non-numeric columns.
    #[must_use]
    pub fn sum(&self) -> Option<f64> {
        with_numeric!(&self.data, c => Some(c.sum()), _ => None)
    }

    /// Keep `min(keep, len - start)` rows starting at `start`, in their original
    /// order. Returns the new row count; `start >= len` empties the column.
    pub fn truncate(&mut self, keep: usize, start: usize) -> usize {
        with_data!(&mut self.data, c => c.truncate(keep, start))
    }

    /// Row `i` becomes the old row `perm[i]`.
    ///
    /// # Errors
    /// [`ColumnError::InvalidPermutation`] if `perm` is not a permutation of the rows.
    pub fn reorder(&mut self, perm: &[usize]) -> Result<()> {
        with_data!(&mut self.data, c => c.reorder(perm))
    }

    /// Row `start + k` becomes the old row `perm[k]` (absolute indices).
    ///
    /// # Errors
    /// [`ColumnError::InvalidPermutation`] if `perm` does not permute that range.
    pub fn permute_range(&mut self, start: usize, perm: &[usize]) -> Result<()> {
        with_data!(&mut self.data, c => c.permute_range(start, perm))
    }

    /// New column with the listed rows, in the listed order.
    ///
    /// # Errors
    /// [`ColumnError::OutOfRange`] if a row does not exist.
    pub fn gather(&self, rows: &[usize]) -> Result<Self> {
        let data = with_data!(&self.data, c => ColumnData::from(c.gather(rows)?));
        Ok(self.with_same_metadata(data))
    }
}
