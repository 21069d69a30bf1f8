//! Assertion functions for columns and grouped tables.
//!
//! Each function panics with a message naming the first offending row, so a
//! failing property test points straight at the problem.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::column::Column;
use crate::merge::compare_keys;
use crate::segment::Boundaries;
use crate::table::GroupedTable;
use crate::types::Value;

/// Assert that every row orders at or after the previous one.
///
/// # Panics
///
/// Panics at the first descent.
///
/// # Example
///
/// ```
/// use colagg::Column;
/// use colagg::testing::assert_non_decreasing;
///
/// assert_non_decreasing(&Column::new("x", vec![1i32, 1, 4]));
/// ```
pub fn assert_non_decreasing(column: &Column) {
    for r in 1..column.len() {
        assert_ne!(
            column.compare(r - 1, r),
            Some(Ordering::Greater),
            "Column {} descends at row {r}:\n  Previous: {:?}\n  Current: {:?}",
            column.name(),
            column.get(r - 1),
            column.get(r)
        );
    }
}

/// `Value` plus the raw bits of a float, so `-0.0`, `+0.0` and differently signed
/// NaNs count as the distinct values the sorter treats them as.
type ExactValue = (Value, Option<u64>);

fn exact(v: Value) -> ExactValue {
    let bits = match &v {
        Value::Float32(f) => Some(u64::from(f.0.to_bits())),
        Value::Float64(f) => Some(f.0.to_bits()),
        _ => None,
    };
    (v, bits)
}

fn counts(column: &Column) -> HashMap<ExactValue, usize> {
    let mut counts = HashMap::new();
    for r in 0..column.len() {
        if let Some(v) = column.get(r) {
            *counts.entry(exact(v)).or_insert(0) += 1;
        }
    }
    counts
}

/// Assert that two columns hold the same values with the same multiplicities,
/// regardless of order.
///
/// # Panics
///
/// Panics if the columns differ in length or content.
///
/// # Example
///
/// ```
/// use colagg::Column;
/// use colagg::testing::assert_same_multiset;
///
/// assert_same_multiset(&Column::new("a", vec!["x", "y", "x"]), &Column::new("b", vec!["x", "x", "y"]));
/// ```
pub fn assert_same_multiset(actual: &Column, expected: &Column) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Column length mismatch:\n  Expected length: {}\n  Actual length: {}",
        expected.len(),
        actual.len()
    );
    let (a, e) = (counts(actual), counts(expected));
    if a != e {
        let missing: Vec<_> = e.iter().filter(|(v, n)| a.get(*v) != Some(*n)).collect();
        let extra: Vec<_> = a.iter().filter(|(v, n)| e.get(*v) != Some(*n)).collect();
        panic!(
            "Column content mismatch:\n  Expected (value, count) not matched: {missing:?}\n  Actual (value, count) not expected: {extra:?}"
        );
    }
}

/// Assert that `bounds` is a valid segmentation of the sorted `column`: it spans
/// the column, every group holds one value, and neighbouring groups differ.
///
/// # Panics
///
/// Panics on the first violated property.
pub fn assert_valid_boundaries(column: &Column, bounds: &Boundaries) {
    let b = bounds.as_slice();
    assert_eq!(b.first(), Some(&0), "Boundaries must start at 0: {b:?}");
    assert_eq!(
        bounds.rows(),
        column.len(),
        "Boundaries must end at the row count {}: {b:?}",
        column.len()
    );
    for seg in bounds.segments() {
        assert!(!seg.is_empty(), "Empty group {seg:?} in {b:?}");
        for r in seg.start + 1..seg.end {
            assert_eq!(
                column.compare(seg.start, r),
                Some(Ordering::Equal),
                "Group {seg:?} holds different values at rows {} and {r}",
                seg.start
            );
        }
        if seg.end < column.len() {
            assert_ne!(
                column.compare(seg.end - 1, seg.end),
                Some(Ordering::Equal),
                "Rows {} and {} are equal but split by a boundary",
                seg.end - 1,
                seg.end
            );
        }
    }
}

/// Like [`assert_valid_boundaries`] for a refinement of `prior`: equal
/// neighbours may be split, but only where `prior` splits them.
///
/// # Panics
///
/// Panics on the first violated property or on a dropped prior boundary.
pub fn assert_refines(column: &Column, bounds: &Boundaries, prior: &Boundaries) {
    let b = bounds.as_slice();
    for p in prior.as_slice() {
        assert!(b.contains(p), "Prior boundary {p} missing from {b:?}");
    }
    for seg in bounds.segments() {
        for r in seg.start + 1..seg.end {
            assert_eq!(
                column.compare(seg.start, r),
                Some(Ordering::Equal),
                "Group {seg:?} holds different values at rows {} and {r}",
                seg.start
            );
        }
        if seg.end < column.len() && !prior.as_slice().contains(&seg.end) {
            assert_ne!(
                column.compare(seg.end - 1, seg.end),
                Some(Ordering::Equal),
                "Boundary {} splits equal rows without a prior boundary",
                seg.end
            );
        }
    }
}

/// Assert that the key tuples of `table` strictly ascend.
///
/// # Panics
///
/// Panics at the first key tuple that is not greater than its predecessor.
pub fn assert_strictly_ascending_keys(table: &GroupedTable) {
    let keys = table.key_columns();
    for r in 1..table.rows() {
        assert_eq!(
            compare_keys(keys, r - 1, keys, r),
            Ordering::Less,
            "Key tuples out of order at row {r}:\n  Previous: {:?}\n  Current: {:?}",
            table.row(r - 1),
            table.row(r)
        );
    }
}

/// Assert that two grouped tables have the same shape and the same rows.
/// Column names are not compared.
///
/// # Panics
///
/// Panics on a shape difference or on the first differing row.
pub fn assert_tables_equal(actual: &GroupedTable, expected: &GroupedTable) {
    assert_eq!(actual.key_arity(), expected.key_arity(), "Key arity mismatch");
    assert_eq!(actual.value_ops(), expected.value_ops(), "Operator mismatch");
    assert_eq!(
        actual.rows(),
        expected.rows(),
        "Row count mismatch:\n  Expected rows: {}\n  Actual rows: {}",
        expected.rows(),
        actual.rows()
    );
    for r in 0..actual.rows() {
        assert_eq!(
            actual.row(r),
            expected.row(r),
            "Row {r} differs"
        );
    }
}
