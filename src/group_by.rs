//! The group-by driver: rows in, one [`GroupedTable`] out.
//!
//! Grouping works column by column on copies of the input:
//! 1. sort the first key column, carrying every other selected column along
//! 2. segment it
//! 3. for each further key, sort inside the current segments and segment again
//!    against the current boundaries
//! 4. reduce every key column with `Nil` and every value column with its operator
//!
//! With no key columns the whole input is one group (or no group at all when
//! the input is empty).
//!
//! ```
//! use colagg::{AggOp, Column, GroupBy, Value};
//!
//! let region = Column::new("region", vec!["west", "east", "west"]);
//! let amount = Column::new("amount", vec![10i64, 5, 7]);
//!
//! let out = GroupBy::new([0])
//!     .aggregate(1, AggOp::Sum)
//!     .execute(&[region, amount])
//!     .unwrap();
//!
//! assert_eq!(out.rows(), 2);
//! assert_eq!(out.row(1), Some(vec![Value::from("west"), Value::Int64(17)]));
//! ```

use anyhow::{Context, Result, bail};
use log::debug;

use crate::column::Column;
use crate::config::EngineConfig;
use crate::segment::Boundaries;
use crate::sort::Sorter;
use crate::table::GroupedTable;
use crate::types::AggOp;

/// A group-by request: key column indices plus `(column, operator)` pairs.
#[derive(Clone, Debug, Default)]
pub struct GroupBy {
    keys: Vec<usize>,
    aggregates: Vec<(usize, AggOp)>,
    config: EngineConfig,
}

impl GroupBy {
    /// Group by the given input columns, in order of significance.
    pub fn new(keys: impl IntoIterator<Item = usize>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Add a value column aggregated with `op`. A column may be listed more than
    /// once, and may also be a key.
    #[must_use]
    pub fn aggregate(mut self, column: usize, op: AggOp) -> Self {
        self.aggregates.push((column, op));
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn keys(&self) -> &[usize] {
        &self.keys
    }

    #[must_use]
    pub fn aggregates(&self) -> &[(usize, AggOp)] {
        &self.aggregates
    }

    /// Run the grouping over `columns`. The inputs are not modified.
    ///
    /// # Errors
    /// Fails if an index names no column, if the referenced columns differ in
    /// length, or if a kernel step rejects its input.
    pub fn execute(&self, columns: &[Column]) -> Result<GroupedTable> {
        let selected: Vec<usize> = self
            .keys
            .iter()
            .copied()
            .chain(self.aggregates.iter().map(|&(c, _)| c))
            .collect();
        let mut work = Vec::with_capacity(selected.len());
        for &c in &selected {
            let col = columns
                .get(c)
                .with_context(|| format!("column index {c} out of range ({} columns)", columns.len()))?;
            work.push(col.clone());
        }
        let rows = work.first().map_or(0, Column::len);
        if let Some(bad) = work.iter().find(|c| c.len() != rows) {
            bail!(
                "column {} has {} rows, expected {rows}",
                bad.name(),
                bad.len()
            );
        }

        let bounds = self.group(&mut work)?;

        let cfg = &self.config;
        let key_count = self.keys.len();
        let ops = self.aggregates.iter().map(|&(_, op)| op);
        let per_column = std::iter::repeat_n(AggOp::Nil, key_count).chain(ops);
        for (col, op) in work.iter_mut().zip(per_column) {
            col.reduce_with(&bounds, op, cfg)
                .with_context(|| format!("reducing column {} with {op}", col.name()))?;
        }
        debug!(
            "grouped {rows} rows by {key_count} keys into {} groups",
            bounds.groups()
        );

        let ops = self.aggregates.iter().map(|&(_, op)| op).collect();
        Ok(GroupedTable::new(work, key_count, ops)?)
    }

    /// Sort and segment the key columns at the front of `work`, permuting every
    /// later column along.
    fn group(&self, work: &mut [Column]) -> Result<Boundaries> {
        let rows = work.first().map_or(0, Column::len);
        let mut bounds = Boundaries::single(rows);
        for p in 0..self.keys.len() {
            let (head, tail) = work.split_at_mut(p + 1);
            let key = &mut head[p];
            {
                let mut sorter = Sorter::new(key)
                    .with_companions(tail.iter_mut())
                    .with_config(&self.config);
                let sorted = if p == 0 {
                    sorter.sort_all()
                } else {
                    sorter.sort_segments(&bounds)
                };
                sorted.with_context(|| format!("sorting key column {p}"))?;
            }
            let prior = (p > 0).then_some(&bounds);
            bounds = key
                .segment(prior)
                .with_context(|| format!("segmenting key column {p}"))?;
        }
        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn bad_index_is_an_error() {
        let c = Column::new("c", vec![1i32]);
        assert!(GroupBy::new([3]).execute(&[c]).is_err());
    }

    #[test]
    fn ragged_columns_are_an_error() {
        let a = Column::new("a", vec![1i32, 2]);
        let b = Column::new("b", vec![1i32]);
        assert!(GroupBy::new([0]).aggregate(1, AggOp::Sum).execute(&[a, b]).is_err());
    }

    #[test]
    fn no_keys_gives_one_group() {
        let v = Column::new("v", vec![2i32, 3, 4]);
        let t = GroupBy::new([]).aggregate(0, AggOp::Sum).execute(&[v]).unwrap();
        assert_eq!(t.rows(), 1);
        assert_eq!(t.row(0), Some(vec![Value::Int32(9)]));
    }

    #[test]
    fn no_keys_no_rows_gives_no_groups() {
        let v = Column::new("v", Vec::<i32>::new());
        let t = GroupBy::new([]).aggregate(0, AggOp::Cnt).execute(&[v]).unwrap();
        assert_eq!(t.rows(), 0);
    }

    #[test]
    fn key_can_also_be_a_value() {
        let k = Column::new("k", vec![2i32, 1, 2]);
        let t = GroupBy::new([0]).aggregate(0, AggOp::Cnt).execute(&[k]).unwrap();
        assert_eq!(t.row(0), Some(vec![Value::Int32(1), Value::Int32(1)]));
        assert_eq!(t.row(1), Some(vec![Value::Int32(2), Value::Int32(2)]));
    }
}
