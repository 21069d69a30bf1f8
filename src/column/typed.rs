//! [`TypedColumn<T>`]: the owned, contiguous buffer behind every column.

use std::cmp::Ordering;
use std::mem;

use crate::column::element::{Element, Numeric};
use crate::error::{ColumnError, Result};
use crate::types::Value;

/// An owned buffer of one element type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypedColumn<T> {
    data: Vec<T>,
}

impl<T> TypedColumn<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub(crate) fn as_mut_vec(&mut self) -> &mut Vec<T> {
        &mut self.data
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    #[must_use]
    pub fn get(&self, i: usize) -> Option<&T> {
        self.data.get(i)
    }

    pub fn push(&mut self, v: T) {
        self.data.push(v);
    }

    /// Swap rows `i` and `j`.
    ///
    /// # Errors
    /// [`ColumnError::OutOfRange`] if either row does not exist.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        let len = self.data.len();
        for index in [i, j] {
            if index >= len {
                return Err(ColumnError::OutOfRange { index, len });
            }
        }
        self.data.swap(i, j);
        Ok(())
    }

    /// Keep at most `keep` rows starting at `start`, preserving their order.
    /// Returns the new row count; a `start` past the end empties the column.
    pub fn truncate(&mut self, keep: usize, start: usize) -> usize {
        if start >= self.data.len() {
            self.data.clear();
            return 0;
        }
        let end = start.saturating_add(keep).min(self.data.len());
        self.data.truncate(end);
        self.data.drain(..start);
        self.data.len()
    }

    /// Drop everything past the first `rows` elements and give memory back when
    /// the buffer is large and at least half empty.
    pub(crate) fn compact(&mut self, rows: usize, shrink_min_capacity: usize) {
        self.data.truncate(rows);
        let cap = self.data.capacity();
        if cap > shrink_min_capacity && cap > 2 * self.data.len() {
            self.data.shrink_to_fit();
        }
    }
}

impl<T: Default> TypedColumn<T> {
    /// Rearrange the whole column so that row `i` becomes the old row `perm[i]`.
    ///
    /// # Errors
    /// [`ColumnError::InvalidPermutation`] if `perm` is not a permutation of `0..len`.
    pub fn reorder(&mut self, perm: &[usize]) -> Result<()> {
        if perm.len() != self.data.len() {
            return Err(ColumnError::InvalidPermutation(format!(
                "expected {} indices, found {}",
                self.data.len(),
                perm.len()
            )));
        }
        self.permute_range(0, perm)
    }

    /// Gather within `start..start + perm.len()`: row `start + k` becomes the old
    /// row `perm[k]`. Indices in `perm` are absolute row numbers.
    ///
    /// # Errors
    /// [`ColumnError::InvalidPermutation`] if `perm` does not permute that range.
    pub fn permute_range(&mut self, start: usize, perm: &[usize]) -> Result<()> {
        permute_slice(&mut self.data, start, perm)
    }
}

impl<T: Element> TypedColumn<T> {
    /// Cast and append a scalar; `false` if it cannot be represented.
    pub(crate) fn push_value(&mut self, v: &Value) -> bool {
        match T::from_value(v) {
            Some(item) => {
                self.data.push(item);
                true
            }
            None => false,
        }
    }

    /// Order of rows `i` and `j`; `None` if either is out of range.
    #[must_use]
    pub fn compare(&self, i: usize, j: usize) -> Option<Ordering> {
        Some(self.data.get(i)?.compare(self.data.get(j)?))
    }

    /// Order of row `i` here against row `j` of `other`.
    #[must_use]
    pub fn compare_with(&self, i: usize, other: &Self, j: usize) -> Option<Ordering> {
        Some(self.data.get(i)?.compare(other.data.get(j)?))
    }

    /// Fresh buffer holding the given rows in the given order.
    ///
    /// # Errors
    /// [`ColumnError::OutOfRange`] on the first row that does not exist.
    pub fn gather(&self, rows: &[usize]) -> Result<Self> {
        let len = self.data.len();
        rows.iter()
            .map(|&index| {
                self.data
                    .get(index)
                    .cloned()
                    .ok_or(ColumnError::OutOfRange { index, len })
            })
            .collect()
    }
}

impl<T: Numeric> TypedColumn<T> {
    #[must_use]
    pub fn min(&self) -> Option<T> {
        self.data
            .iter()
            .copied()
            .reduce(|a, b| if b.compare(&a) == Ordering::Less { b } else { a })
    }

    #[must_use]
    pub fn max(&self) -> Option<T> {
        self.data
            .iter()
            .copied()
            .reduce(|a, b| if b.compare(&a) == Ordering::Greater { b } else { a })
    }

    /// Sum accumulated in `f64`.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.data.iter().map(|v| v.to_f64()).sum()
    }
}

impl<T> From<Vec<T>> for TypedColumn<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> FromIterator<T> for TypedColumn<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

/// Apply an absolute-index gather to `data[start..start + perm.len()]`, moving
/// elements instead of cloning them.
pub(crate) fn permute_slice<T: Default>(data: &mut [T], start: usize, perm: &[usize]) -> Result<()> {
    let end = match start.checked_add(perm.len()) {
        Some(end) if end <= data.len() => end,
        _ => {
            return Err(ColumnError::InvalidPermutation(format!(
                "{} indices from row {start} exceed {} rows",
                perm.len(),
                data.len()
            )));
        }
    };
    let mut seen = vec![false; perm.len()];
    for &p in perm {
        if p < start || p >= end || mem::replace(&mut seen[p - start], true) {
            return Err(ColumnError::InvalidPermutation(format!(
                "index {p} is repeated or outside {start}..{end}"
            )));
        }
    }
    let mut scratch: Vec<T> = data[start..end].iter_mut().map(mem::take).collect();
    for (k, &p) in perm.iter().enumerate() {
        data[start + k] = mem::take(&mut scratch[p - start]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_window_in_order() {
        let mut c: TypedColumn<i32> = vec![0, 1, 2, 3, 4].into();
        assert_eq!(c.truncate(2, 1), 2);
        assert_eq!(c.as_slice(), &[1, 2]);

        let mut c: TypedColumn<i32> = vec![0, 1, 2].into();
        assert_eq!(c.truncate(10, 1), 2);
        assert_eq!(c.truncate(1, 5), 0);
        assert!(c.is_empty());
    }

    #[test]
    fn permute_range_moves_values() {
        let mut c: TypedColumn<String> =
            vec!["a", "b", "c", "d"].into_iter().map(String::from).collect();
        c.permute_range(1, &[3, 1, 2]).unwrap();
        assert_eq!(c.as_slice(), &["a", "d", "b", "c"]);
    }

    #[test]
    fn permute_rejects_duplicates() {
        let mut c: TypedColumn<u8> = vec![1, 2, 3].into();
        assert!(c.reorder(&[0, 0, 1]).is_err());
        assert!(c.reorder(&[0, 1]).is_err());
        assert_eq!(c.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn permute_range_past_the_end_is_an_error() {
        let mut c: TypedColumn<i32> = vec![1, 2, 3].into();
        assert!(matches!(
            c.permute_range(usize::MAX, &[0, 1]),
            Err(ColumnError::InvalidPermutation(_))
        ));
        assert!(c.permute_range(2, &[2, 3]).is_err());
        assert_eq!(c.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn compact_shrinks_large_sparse_buffers() {
        let mut c: TypedColumn<u64> = (0..5000).collect();
        c.compact(10, 1000);
        assert_eq!(c.len(), 10);
        assert!(c.capacity() < 5000);

        let mut small: TypedColumn<u64> = (0..600).collect();
        let before = small.capacity();
        small.compact(100, 1000);
        assert_eq!(small.capacity(), before);
    }

    #[test]
    fn numeric_summaries() {
        let c: TypedColumn<f64> = vec![2.0, -1.5, 4.0].into();
        assert_eq!(c.min(), Some(-1.5));
        assert_eq!(c.max(), Some(4.0));
        assert!((c.sum() - 4.5).abs() < 1e-12);
        assert_eq!(TypedColumn::<i32>::new().min(), None);
    }
}
