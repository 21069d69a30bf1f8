//! Merging two grouped tables into one.
//!
//! Both inputs are partial aggregates over disjoint row sets with the same shape:
//! the same key arity, column types, and per-column operators. The result holds
//! the sorted union of both key sets. Where a key tuple appears on both sides the
//! value columns are recombined with their operator; otherwise the row is copied.
//!
//! The merge is a two-cursor walk over the key tuples, compared lexicographically
//! column by column, so the same routine serves any key arity:
//! - K = 0 pairs the single rows of both sides
//! - K = 1 compares one key column
//! - K = 2 compares `(key1, key2)`, whatever the two key types
//!
//! Only operators whose partial results can be recombined directly are accepted:
//! `Nil` (left value wins), `Cnt` and `Sum` (added, numeric only), `Min`, `Max`.
//! Averages, variances, medians and distinct counts have to be split into
//! `Sum`/`Cnt` pairs before partial results are produced.
//!
//! Inputs are never modified and every output column is freshly allocated, so
//! independent merges can run on different threads (see [`fan_in`](crate::fan_in)).
//!
//! ```
//! use colagg::{merge, AggOp, Column, GroupedTable, Value};
//!
//! let a = GroupedTable::new(
//!     vec![Column::new("k", vec![1i32, 3]), Column::new("s", vec![5i64, 7])],
//!     1,
//!     vec![AggOp::Sum],
//! ).unwrap();
//! let b = GroupedTable::new(
//!     vec![Column::new("k", vec![2i32, 3]), Column::new("s", vec![2i64, 1])],
//!     1,
//!     vec![AggOp::Sum],
//! ).unwrap();
//! let m = merge(&a, &b).unwrap();
//! assert_eq!(m.rows(), 3);
//! assert_eq!(m.row(2), Some(vec![Value::Int32(3), Value::Int64(8)]));
//! ```

use std::cmp::Ordering;

use log::debug;

use crate::column::{Column, ColumnData, TypedColumn};
use crate::error::{ColumnError, Result};
use crate::reduce::Aggregate;
use crate::table::GroupedTable;
use crate::types::AggOp;

/// One output row of a merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeStep {
    /// Copy row of the left table.
    Left(usize),
    /// Copy row of the right table.
    Right(usize),
    /// Recombine a row of each table holding the same key tuple.
    Both(usize, usize),
}

/// Lexicographic order of key tuple `i` of `a` against key tuple `j` of `b`.
/// Columns of different types, or rows out of range, compare equal.
#[must_use]
pub fn compare_keys(a: &[Column], i: usize, b: &[Column], j: usize) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(ka, kb)| ka.compare_with(i, kb, j).unwrap_or(Ordering::Equal))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// The two-cursor plan for merging `a_rows` rows of keys `a` with `b_rows` rows
/// of keys `b`. Both key sets must be ascending.
#[must_use]
pub fn merge_plan(a: &[Column], a_rows: usize, b: &[Column], b_rows: usize) -> Vec<MergeStep> {
    let mut plan = Vec::with_capacity(a_rows + b_rows);
    let (mut i, mut j) = (0, 0);
    while i < a_rows && j < b_rows {
        match compare_keys(a, i, b, j) {
            Ordering::Less => {
                plan.push(MergeStep::Left(i));
                i += 1;
            }
            Ordering::Greater => {
                plan.push(MergeStep::Right(j));
                j += 1;
            }
            Ordering::Equal => {
                plan.push(MergeStep::Both(i, j));
                i += 1;
                j += 1;
            }
        }
    }
    plan.extend((i..a_rows).map(MergeStep::Left));
    plan.extend((j..b_rows).map(MergeStep::Right));
    plan
}

fn merge_column<T: Aggregate>(
    a: &TypedColumn<T>,
    b: &TypedColumn<T>,
    op: AggOp,
    plan: &[MergeStep],
) -> Option<TypedColumn<T>> {
    let (a, b) = (a.as_slice(), b.as_slice());
    plan.iter()
        .map(|step| match *step {
            MergeStep::Left(i) => Some(a[i].clone()),
            MergeStep::Right(j) => Some(b[j].clone()),
            MergeStep::Both(i, j) => T::combine(op, &a[i], &b[j]),
        })
        .collect()
}

fn check_compatible(a: &GroupedTable, b: &GroupedTable) -> Result<()> {
    let fail = |msg: String| Err(ColumnError::NotMergeable(msg));
    if a.key_arity() != b.key_arity() {
        return fail(format!("key arity {} vs {}", a.key_arity(), b.key_arity()));
    }
    if a.columns().len() != b.columns().len() {
        return fail(format!(
            "{} columns vs {}",
            a.columns().len(),
            b.columns().len()
        ));
    }
    if a.value_ops() != b.value_ops() {
        return fail("value columns use different operators".into());
    }
    for (i, (ca, cb)) in a.columns().iter().zip(b.columns()).enumerate() {
        let op = a.op(i).unwrap_or(AggOp::Nil);
        if ca.logical_type() != cb.logical_type() {
            return fail(format!(
                "column {i} is {} on the left and {} on the right",
                ca.logical_type(),
                cb.logical_type()
            ));
        }
        if ca.dictionary() != cb.dictionary() {
            return fail(format!("column {i} uses different dictionaries"));
        }
        if !op.is_mergeable() {
            return fail(format!("{op} partials cannot be recombined (column {i})"));
        }
        if matches!(op, AggOp::Sum | AggOp::Cnt) && !ca.logical_type().is_numeric() {
            return fail(format!("{op} on {} column {i}", ca.logical_type()));
        }
    }
    Ok(())
}

/// Combine two grouped tables into a new one holding the union of their keys.
///
/// # Errors
/// [`ColumnError::NotMergeable`] if the tables differ in shape, column types or
/// operators, or use an operator that cannot be recombined.
pub fn merge(a: &GroupedTable, b: &GroupedTable) -> Result<GroupedTable> {
    check_compatible(a, b)?;
    let plan = merge_plan(a.key_columns(), a.rows(), b.key_columns(), b.rows());

    let mut columns = Vec::with_capacity(a.columns().len());
    for (i, (ca, cb)) in a.columns().iter().zip(b.columns()).enumerate() {
        let op = a.op(i).unwrap_or(AggOp::Nil);
        let data = zip_data!(
            ca.data(),
            cb.data(),
            (x, y) => merge_column(x, y, op, &plan).map(ColumnData::from),
            _ => None
        )
        .ok_or_else(|| ColumnError::NotMergeable(format!("cannot recombine column {}", ca.name())))?;
        columns.push(ca.with_same_metadata(data));
    }

    let shared = plan
        .iter()
        .filter(|s| matches!(s, MergeStep::Both(..)))
        .count();
    debug!(
        "merged {} + {} groups into {} ({shared} shared keys)",
        a.rows(),
        b.rows(),
        plan.len()
    );
    GroupedTable::new(columns, a.key_arity(), a.value_ops().to_vec())
}
