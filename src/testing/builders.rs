//! Test data builders for creating columns and grouped tables.
//!
//! [`TableBuilder`] assembles a [`GroupedTable`] column by column. The
//! `pseudo_random_*` functions generate reproducible data from a fixed-seed
//! linear congruential generator, so property-style tests stay deterministic.

use crate::column::{Column, ColumnData};
use crate::error::Result;
use crate::table::GroupedTable;
use crate::types::AggOp;

/// Builder for [`GroupedTable`]s.
///
/// Key columns always come first in the built table, whatever order the calls
/// were made in.
///
/// # Example
///
/// ```
/// use colagg::testing::TableBuilder;
/// use colagg::{AggOp, Value};
///
/// let t = TableBuilder::new()
///     .key("region", vec!["east", "west"])
///     .value("sales", vec![3u32, 9], AggOp::Sum)
///     .build()
///     .unwrap();
/// assert_eq!(t.row(1), Some(vec![Value::from("west"), Value::UInt32(9)]));
/// ```
#[derive(Debug, Default)]
pub struct TableBuilder {
    keys: Vec<Column>,
    values: Vec<(Column, AggOp)>,
}

impl TableBuilder {
    /// Create a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key column.
    #[must_use]
    pub fn key(mut self, name: &str, data: impl Into<ColumnData>) -> Self {
        self.keys.push(Column::new(name, data));
        self
    }

    /// Add a value column produced by `op`.
    #[must_use]
    pub fn value(mut self, name: &str, data: impl Into<ColumnData>, op: AggOp) -> Self {
        self.values.push((Column::new(name, data), op));
        self
    }

    /// Add a ready-made key column (for example a categorical one).
    #[must_use]
    pub fn key_column(mut self, column: Column) -> Self {
        self.keys.push(column);
        self
    }

    /// Build the table.
    ///
    /// # Errors
    /// Fails if the columns differ in length.
    pub fn build(self) -> Result<GroupedTable> {
        let key_arity = self.keys.len();
        let (values, ops): (Vec<Column>, Vec<AggOp>) = self.values.into_iter().unzip();
        let mut columns = self.keys;
        columns.extend(values);
        GroupedTable::new(columns, key_arity, ops)
    }
}

/// The generator behind every `pseudo_random_*` function.
struct Lcg(u32);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        self.0 / 65536
    }
}

/// Generate deterministic integers in `[min, max)` using a simple LCG.
///
/// # Example
///
/// ```
/// use colagg::testing::pseudo_random_i64;
///
/// let data = pseudo_random_i64(10, 0, 100);
/// assert_eq!(data.len(), 10);
/// assert!(data.iter().all(|&v| (0..100).contains(&v)));
/// ```
#[must_use]
pub fn pseudo_random_i64(count: usize, min: i64, max: i64) -> Vec<i64> {
    let mut rng = Lcg(12345);
    let range = (max - min).max(1);
    (0..count).map(|_| min + i64::from(rng.next()) % range).collect()
}

/// Generate deterministic floats in `[min, max)`, quantised to 1/1000 of the range.
#[must_use]
pub fn pseudo_random_f64(count: usize, min: f64, max: f64) -> Vec<f64> {
    let mut rng = Lcg(777);
    (0..count)
        .map(|_| min + (max - min) * f64::from(rng.next() % 1000) / 1000.0)
        .collect()
}

/// Generate deterministic strings drawn from `distinct` words `w0`, `w1`, ...
///
/// # Example
///
/// ```
/// use colagg::testing::pseudo_random_words;
///
/// let words = pseudo_random_words(50, 4);
/// assert!(words.iter().all(|w| ["w0", "w1", "w2", "w3"].contains(&w.as_str())));
/// ```
#[must_use]
pub fn pseudo_random_words(count: usize, distinct: u32) -> Vec<String> {
    let mut rng = Lcg(54321);
    let distinct = distinct.max(1);
    (0..count).map(|_| format!("w{}", rng.next() % distinct)).collect()
}

/// Split `data` into `parts` contiguous chunks of near-equal size, as an
/// external partitioner would before a fan-in.
#[must_use]
pub fn partition_evenly<T: Clone>(data: &[T], parts: usize) -> Vec<Vec<T>> {
    let parts = parts.max(1);
    let size = data.len().div_ceil(parts).max(1);
    data.chunks(size).map(<[T]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generators_are_reproducible() {
        assert_eq!(pseudo_random_i64(20, -5, 5), pseudo_random_i64(20, -5, 5));
        assert!(pseudo_random_i64(100, -5, 5).iter().all(|v| (-5..5).contains(v)));
        assert!(pseudo_random_f64(100, 1.0, 2.0).iter().all(|v| (1.0..2.0).contains(v)));
    }

    #[test]
    fn partitions_cover_input() {
        let parts = partition_evenly(&[1, 2, 3, 4, 5], 2);
        assert_eq!(parts, vec![vec![1, 2, 3], vec![4, 5]]);
        assert!(partition_evenly::<i32>(&[], 3).is_empty());
    }

    #[test]
    fn builder_puts_keys_first() {
        let t = TableBuilder::new()
            .value("v", vec![1i64], AggOp::Max)
            .key("k", vec!["a"])
            .build()
            .unwrap();
        assert_eq!(t.key_columns()[0].name(), "k");
        assert_eq!(t.value_ops(), &[AggOp::Max]);
    }
}
