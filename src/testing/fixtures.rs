//! Pre-built datasets for common testing scenarios.

use std::sync::Arc;

use crate::column::Column;
use crate::serialize::UtcTimestampFormatter;

/// A small sales ledger as aligned columns:
/// `region` (string), `product` (categorical `uint32`), `units` (`int32`),
/// `price` (`float64`), `sold_at` (`int64` unix seconds with a UTC formatter).
///
/// # Example
///
/// ```
/// use colagg::testing::sales_columns;
///
/// let cols = sales_columns();
/// assert_eq!(cols.len(), 5);
/// assert!(cols.iter().all(|c| c.len() == 10));
/// ```
#[must_use]
pub fn sales_columns() -> Vec<Column> {
    vec![
        Column::new(
            "region",
            vec![
                "west", "east", "west", "north", "east", "west", "north", "east", "west", "east",
            ],
        ),
        Column::categorical(
            "product",
            [
                "apple", "pear", "apple", "plum", "apple", "pear", "pear", "plum", "apple", "pear",
            ],
        ),
        Column::new("units", vec![3i32, 5, 1, 7, 2, 4, 6, 1, 8, 2]),
        Column::new(
            "price",
            vec![1.5f64, 2.0, 1.5, 3.25, 1.75, 2.0, 2.25, 3.0, 1.5, 2.5],
        ),
        Column::new(
            "sold_at",
            vec![
                1_700_000_000i64,
                1_700_000_600,
                1_700_003_600,
                1_700_007_200,
                1_700_010_000,
                1_700_086_400,
                1_700_090_000,
                1_700_093_600,
                1_700_172_800,
                1_700_176_400,
            ],
        )
        .with_timestamp_formatter(Arc::new(UtcTimestampFormatter)),
    ]
}

/// Sensor readings with heavy key duplication: `sensor` (`uint16`, 3 distinct
/// values) and `reading` (`float32`), 60 rows.
#[must_use]
pub fn duplicate_heavy_readings() -> Vec<Column> {
    let sensors: Vec<u16> = (0..60u16).map(|i| [7, 3, 7, 9, 7][usize::from(i % 5)]).collect();
    let readings: Vec<f32> = (0..60u16).map(|i| f32::from(i % 13) * 0.5).collect();
    vec![Column::new("sensor", sensors), Column::new("reading", readings)]
}

/// Variable-length payloads including empty and 8-byte-aligned ones.
#[must_use]
pub fn blob_column() -> Column {
    Column::new(
        "payload",
        vec![
            b"abc".to_vec(),
            Vec::new(),
            b"12345678".to_vec(),
            b"abc".to_vec(),
            vec![0xff; 9],
        ],
    )
}
