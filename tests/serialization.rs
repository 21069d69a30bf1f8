use std::fs;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use colagg::testing::{blob_column, sales_columns};
use colagg::{AggOp, Column, ColumnError, GroupBy, TimestampFormatter, UtcTimestampFormatter};

#[test]
fn blob_records_are_length_prefixed_and_padded() -> Result<()> {
    let c = blob_column();
    let mut buf = Vec::new();
    assert_eq!(c.write_binary(&mut buf)?, 5);

    // "abc": 8 + 3 + 5 pad, empty: 8, 8 bytes: 8 + 8, "abc": 16, 9 bytes: 8 + 9 + 7 pad
    assert_eq!(buf.len(), 16 + 8 + 16 + 16 + 24);
    assert_eq!(&buf[..8], &3u64.to_le_bytes());
    assert_eq!(&buf[8..11], b"abc");
    assert_eq!(&buf[11..16], &[0; 5]);
    assert_eq!(&buf[16..24], &0u64.to_le_bytes());
    Ok(())
}

#[test]
fn table_binary_to_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("table.bin");

    let t = GroupBy::new([0])
        .aggregate(2, AggOp::Sum)
        .execute(&sales_columns())?;
    let mut file = fs::File::create(&path)?;
    let written = t.write_binary(&mut file)?;
    file.flush()?;

    assert_eq!(written, t.rows() * 2);
    let bytes = fs::read(&path)?;
    // region strings "east\0north\0west\0" followed by three int32 sums
    assert_eq!(&bytes[..16], b"east\0north\0west\0");
    let sums: Vec<i32> = bytes[16..]
        .chunks_exact(4)
        .map(|b| i32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    assert_eq!(sums, vec![10, 13, 16]);
    Ok(())
}

#[test]
fn table_text_to_file() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    let t = GroupBy::new([1])
        .aggregate(3, AggOp::Max)
        .aggregate(4, AggOp::Min)
        .execute(&sales_columns())?;
    assert_eq!(t.write_text(file.as_file_mut())?, 3);
    file.flush()?;

    let text = fs::read_to_string(file.path())?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "\"apple\", 1.75, 2023-11-14 22:13:20",
            "\"pear\", 2.5, 2023-11-14 22:23:20",
            "\"plum\", 3.25, 2023-11-15 00:13:20",
        ]
    );
    Ok(())
}

struct FailingWriter {
    budget: usize,
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() > self.budget {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "out of space"));
        }
        self.budget -= buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn failing_stream_reports_elements_written() {
    let c = blob_column();
    // room for "abc" (16 bytes) and the empty record (8 bytes) only
    let err = c
        .write_binary(&mut FailingWriter { budget: 24 })
        .err()
        .and_then(|e| e.written());
    assert_eq!(err, Some(2));

    let n = Column::new("n", vec![1u32, 2, 3]);
    let err = n.write_binary(&mut FailingWriter { budget: 5 }).unwrap_err();
    assert!(matches!(err, ColumnError::Write { written: 1, .. }));
}

struct EpochSeconds;

impl TimestampFormatter for EpochSeconds {
    fn format(&self, unix_seconds: f64, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "@{unix_seconds}")
    }
}

#[test]
fn pluggable_timestamp_formatter() {
    let c = Column::new("t", vec![86_400u32]).with_timestamp_formatter(Arc::new(EpochSeconds));
    assert_eq!(c.text(0).as_deref(), Some("@86400"));

    let utc = Column::new("t", vec![86_399.9f64]).with_timestamp_formatter(Arc::new(UtcTimestampFormatter));
    assert_eq!(utc.text(0).as_deref(), Some("1970-01-01 23:59:59"));
}
