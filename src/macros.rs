//! Dispatch macros over [`ColumnData`](crate::column::ColumnData).
//!
//! Each macro expands to one `match` arm per concrete element type so the body is
//! monomorphised for every type without spelling out twelve copies by hand.

/// Bind the typed buffer of any variant and evaluate `$body` with it.
macro_rules! with_data {
    ($data:expr, $c:ident => $body:expr) => {
        match $data {
            $crate::column::ColumnData::Int8($c) => $body,
            $crate::column::ColumnData::Int16($c) => $body,
            $crate::column::ColumnData::Int32($c) => $body,
            $crate::column::ColumnData::Int64($c) => $body,
            $crate::column::ColumnData::UInt8($c) => $body,
            $crate::column::ColumnData::UInt16($c) => $body,
            $crate::column::ColumnData::UInt32($c) => $body,
            $crate::column::ColumnData::UInt64($c) => $body,
            $crate::column::ColumnData::Float32($c) => $body,
            $crate::column::ColumnData::Float64($c) => $body,
            $crate::column::ColumnData::Utf8($c) => $body,
            $crate::column::ColumnData::Blob($c) => $body,
        }
    };
}

/// Like [`with_data!`] but only for the numeric variants; strings and blobs take `$other`.
macro_rules! with_numeric {
    ($data:expr, $c:ident => $body:expr, _ => $other:expr) => {
        match $data {
            $crate::column::ColumnData::Int8($c) => $body,
            $crate::column::ColumnData::Int16($c) => $body,
            $crate::column::ColumnData::Int32($c) => $body,
            $crate::column::ColumnData::Int64($c) => $body,
            $crate::column::ColumnData::UInt8($c) => $body,
            $crate::column::ColumnData::UInt16($c) => $body,
            $crate::column::ColumnData::UInt32($c) => $body,
            $crate::column::ColumnData::UInt64($c) => $body,
            $crate::column::ColumnData::Float32($c) => $body,
            $crate::column::ColumnData::Float64($c) => $body,
            _ => $other,
        }
    };
}

/// Bind two buffers of the *same* variant; mismatched variants take `$other`.
macro_rules! zip_data {
    ($a:expr, $b:expr, ($x:ident, $y:ident) => $body:expr, _ => $other:expr) => {
        match ($a, $b) {
            ($crate::column::ColumnData::Int8($x), $crate::column::ColumnData::Int8($y)) => $body,
            ($crate::column::ColumnData::Int16($x), $crate::column::ColumnData::Int16($y)) => $body,
            ($crate::column::ColumnData::Int32($x), $crate::column::ColumnData::Int32($y)) => $body,
            ($crate::column::ColumnData::Int64($x), $crate::column::ColumnData::Int64($y)) => $body,
            ($crate::column::ColumnData::UInt8($x), $crate::column::ColumnData::UInt8($y)) => $body,
            ($crate::column::ColumnData::UInt16($x), $crate::column::ColumnData::UInt16($y)) => $body,
            ($crate::column::ColumnData::UInt32($x), $crate::column::ColumnData::UInt32($y)) => $body,
            ($crate::column::ColumnData::UInt64($x), $crate::column::ColumnData::UInt64($y)) => $body,
            ($crate::column::ColumnData::Float32($x), $crate::column::ColumnData::Float32($y)) => $body,
            ($crate::column::ColumnData::Float64($x), $crate::column::ColumnData::Float64($y)) => $body,
            ($crate::column::ColumnData::Utf8($x), $crate::column::ColumnData::Utf8($y)) => $body,
            ($crate::column::ColumnData::Blob($x), $crate::column::ColumnData::Blob($y)) => $body,
            _ => $other,
        }
    };
}
