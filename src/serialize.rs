//! Flat binary and text output for columns.
//!
//! Binary layout, column by column:
//! - fixed-width numbers: raw native-endian array
//! - strings: each value followed by a NUL byte
//! - blobs: 8-byte little-endian length, payload, zero padding to an 8-byte boundary
//!
//! Text output renders a single element: numbers with their default `Display`,
//! strings double-quoted, blobs as hex. Dictionary-coded columns print the decoded
//! word, and columns carrying a [`TimestampFormatter`] print through it.

use std::io::{self, Write};

use chrono::DateTime;

use crate::column::{Column, ColumnData, Element, Numeric, TypedColumn};
use crate::error::{ColumnError, Result};

/// Renders unix-time values for text output.
pub trait TimestampFormatter: Send + Sync {
    /// Write `unix_seconds` in this formatter's notation.
    ///
    /// # Errors
    /// Propagates write failures.
    fn format(&self, unix_seconds: f64, out: &mut dyn Write) -> io::Result<()>;
}

/// Layout used by [`UtcTimestampFormatter`].
pub const UTC_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `YYYY-MM-DD HH:MM:SS` in UTC. Fractional seconds are dropped; instants chrono
/// cannot represent (and NaN or infinities) are written as the raw number.
#[derive(Clone, Copy, Debug, Default)]
pub struct UtcTimestampFormatter;

impl TimestampFormatter for UtcTimestampFormatter {
    #[allow(clippy::cast_possible_truncation)]
    fn format(&self, unix_seconds: f64, out: &mut dyn Write) -> io::Result<()> {
        let secs = unix_seconds.floor();
        let instant = secs
            .is_finite()
            .then(|| DateTime::from_timestamp(secs as i64, 0))
            .flatten();
        match instant {
            Some(t) => write!(out, "{}", t.format(UTC_TIMESTAMP_FORMAT)),
            None => write!(out, "{unix_seconds}"),
        }
    }
}

fn write_all_binary<T: Element>(col: &TypedColumn<T>, out: &mut dyn Write) -> Result<usize> {
    for (written, v) in col.as_slice().iter().enumerate() {
        v.write_binary(out)
            .map_err(|source| ColumnError::Write { written, source })?;
    }
    Ok(col.len())
}

fn write_timestamp<T: Numeric>(
    col: &TypedColumn<T>,
    i: usize,
    f: &dyn TimestampFormatter,
    out: &mut dyn Write,
) -> Option<io::Result<()>> {
    col.get(i).map(|v| f.format(v.to_f64(), out))
}

impl Column {
    /// Write every element in the flat binary layout. Returns the number of
    /// elements written.
    ///
    /// # Errors
    /// [`ColumnError::Write`] with the count of elements fully written before the
    /// failing one. The stream position is then unspecified; truncate and retry.
    pub fn write_binary<W: Write>(&self, out: &mut W) -> Result<usize> {
        with_data!(self.data(), c => write_all_binary(c, out))
    }

    /// Write element `i` as text.
    ///
    /// # Errors
    /// [`ColumnError::OutOfRange`] if the row does not exist, or
    /// [`ColumnError::Write`] (with `written` 0) if the stream fails.
    pub fn write_text(&self, out: &mut dyn Write, i: usize) -> Result<()> {
        let len = self.len();
        let wrap = |source: io::Error| ColumnError::Write { written: 0, source };
        let out_of_range = ColumnError::OutOfRange { index: i, len };

        if let (Some(dict), ColumnData::UInt32(codes)) = (self.dictionary(), self.data()) {
            let code = *codes.get(i).ok_or(out_of_range)?;
            return match dict.word(code) {
                Some(word) => write!(out, "\"{word}\""),
                None => write!(out, "{code}"),
            }
            .map_err(wrap);
        }
        if let Some(f) = self.timestamp_formatter() {
            let f = f.as_ref();
            let res = with_numeric!(self.data(), c => write_timestamp(c, i, f, out), _ => None);
            if let Some(res) = res {
                return res.map_err(wrap);
            }
        }
        let res = with_data!(self.data(), c => c.get(i).map(|v| v.write_text(out)));
        res.ok_or(out_of_range)?.map_err(wrap)
    }

    /// Element `i` rendered as text, `None` past the end.
    #[must_use]
    pub fn text(&self, i: usize) -> Option<String> {
        let mut buf = Vec::new();
        self.write_text(&mut buf, i).ok()?;
        Some(String::from_utf8_lossy(&buf).into_owned())
    }
}
