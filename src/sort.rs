//! Sorting: a hybrid selection/quicksort kernel and the multi-column [`Sorter`].
//!
//! The kernel works on anything implementing the crate-private `SortTarget`
//! trait, so the same code sorts a slice of elements in place (used by MEDIAN and
//! DISTINCT) and an index array by the values it points at (used for multi-column
//! sorts and for top-k selection).
//!
//! Ranges of at most [`EngineConfig::selection_sort_threshold`] rows are finished
//! with selection sort. Larger ranges pick a median-of-three pivot, partition
//! from both ends, and recurse. When nothing in a range is strictly smaller than
//! the pivot (many duplicate keys) the pivot-equal rows are gathered into a
//! prefix instead, so runs of equal keys cost linear time rather than quadratic.
//!
//! Sorting several aligned columns is done indirectly: the primary column's row
//! indices are sorted, then the resulting permutation is applied once to the
//! primary column, each companion column, and an optional row-id bundle.
//!
//! ```
//! use colagg::{Column, Sorter, Value};
//!
//! let mut key = Column::new("k", vec![3i32, 1, 2]);
//! let mut val = Column::new("v", vec!["c", "a", "b"]);
//! let mut ids = vec![10u64, 11, 12];
//! Sorter::new(&mut key)
//!     .with_companion(&mut val)
//!     .with_row_ids(&mut ids)
//!     .sort_all()
//!     .unwrap();
//! assert_eq!(val.get(0), Some(Value::from("a")));
//! assert_eq!(ids, vec![11, 12, 10]);
//! ```

use std::cmp::Ordering;

use log::{debug, trace};

use crate::column::{Column, Element, permute_slice};
use crate::config::{DEFAULT_SELECTION_SORT_THRESHOLD, EngineConfig};
use crate::error::{ColumnError, Result};
use crate::segment::Boundaries;

/// Something the sort kernel can order by position.
pub(crate) trait SortTarget {
    /// A copy of the value at a position, stable while positions are swapped.
    type Pivot;

    fn pivot(&self, i: usize) -> Self::Pivot;
    fn cmp_pivot(&self, i: usize, pivot: &Self::Pivot) -> Ordering;
    fn compare(&self, i: usize, j: usize) -> Ordering;
    fn swap(&mut self, i: usize, j: usize);
}

/// Direct sort of a slice of elements.
pub(crate) struct SliceTarget<'a, T> {
    data: &'a mut [T],
}

impl<'a, T: Element> SliceTarget<'a, T> {
    pub(crate) fn new(data: &'a mut [T]) -> Self {
        Self { data }
    }
}

impl<T: Element> SortTarget for SliceTarget<'_, T> {
    type Pivot = T;

    fn pivot(&self, i: usize) -> T {
        self.data[i].clone()
    }

    #[inline]
    fn cmp_pivot(&self, i: usize, pivot: &T) -> Ordering {
        self.data[i].compare(pivot)
    }

    #[inline]
    fn compare(&self, i: usize, j: usize) -> Ordering {
        self.data[i].compare(&self.data[j])
    }

    #[inline]
    fn swap(&mut self, i: usize, j: usize) {
        self.data.swap(i, j);
    }
}

/// Indirect sort: positions hold row numbers into `values`.
pub(crate) struct IndexTarget<'a, T> {
    idx: &'a mut [usize],
    values: &'a [T],
    descending: bool,
}

impl<'a, T: Element> IndexTarget<'a, T> {
    pub(crate) fn new(idx: &'a mut [usize], values: &'a [T], descending: bool) -> Self {
        Self {
            idx,
            values,
            descending,
        }
    }

    #[inline]
    fn order(&self, a: usize, b: usize) -> Ordering {
        let o = self.values[a].compare(&self.values[b]);
        if self.descending { o.reverse() } else { o }
    }

    /// Row currently at position `i`.
    pub(crate) fn row(&self, i: usize) -> usize {
        self.idx[i]
    }
}

impl<T: Element> SortTarget for IndexTarget<'_, T> {
    type Pivot = usize;

    fn pivot(&self, i: usize) -> usize {
        self.idx[i]
    }

    #[inline]
    fn cmp_pivot(&self, i: usize, pivot: &usize) -> Ordering {
        self.order(self.idx[i], *pivot)
    }

    #[inline]
    fn compare(&self, i: usize, j: usize) -> Ordering {
        self.order(self.idx[i], self.idx[j])
    }

    #[inline]
    fn swap(&mut self, i: usize, j: usize) {
        self.idx.swap(i, j);
    }
}

/// Selection sort of `[lo, hi)`.
pub(crate) fn selection_sort<S: SortTarget>(t: &mut S, lo: usize, hi: usize) {
    for a in lo..hi.saturating_sub(1) {
        let mut m = a;
        for b in a + 1..hi {
            if t.compare(b, m) == Ordering::Less {
                m = b;
            }
        }
        if m != a {
            t.swap(a, m);
        }
    }
}

/// Order positions `lo`, `mid`, `hi - 1` and return the middle one as pivot.
fn median_of_three<S: SortTarget>(t: &mut S, lo: usize, hi: usize) -> S::Pivot {
    let mid = lo + (hi - lo) / 2;
    let last = hi - 1;
    if t.compare(mid, lo) == Ordering::Less {
        t.swap(lo, mid);
    }
    if t.compare(last, lo) == Ordering::Less {
        t.swap(lo, last);
    }
    if t.compare(last, mid) == Ordering::Less {
        t.swap(mid, last);
    }
    t.pivot(mid)
}

/// Two-pointer partition of `[lo, hi)`: positions whose comparison against the
/// pivot satisfies `left` end up in `[lo, split)`, the rest in `[split, hi)`.
fn partition<S, F>(t: &mut S, lo: usize, hi: usize, pivot: &S::Pivot, left: F) -> usize
where
    S: SortTarget,
    F: Fn(Ordering) -> bool,
{
    let (mut i, mut j) = (lo, hi);
    loop {
        while i < j && left(t.cmp_pivot(i, pivot)) {
            i += 1;
        }
        while i < j && !left(t.cmp_pivot(j - 1, pivot)) {
            j -= 1;
        }
        if i >= j {
            return i;
        }
        t.swap(i, j - 1);
        i += 1;
        j -= 1;
    }
}

/// Split `[lo, hi)` around a median-of-three pivot so every position left of the
/// returned split orders at or before every position right of it.
///
/// Normally the left part is strictly below the pivot and both parts are
/// non-empty. When nothing is below the pivot the pivot-equal rows are moved to
/// the front instead and `degenerate` is set; the split is then past that equal
/// run and may be `hi` when the whole range is one value.
pub(crate) fn partition_sub<S: SortTarget>(t: &mut S, lo: usize, hi: usize) -> (usize, bool) {
    let pivot = median_of_three(t, lo, hi);
    let split = partition(t, lo, hi, &pivot, |o| o == Ordering::Less);
    if split > lo {
        return (split, false);
    }
    let eq_end = partition(t, lo, hi, &pivot, |o| o == Ordering::Equal);
    trace!("degenerate pivot in {lo}..{hi}: {} equal rows", eq_end - lo);
    (eq_end, true)
}

/// Sort `[lo, hi)` of the target.
pub(crate) fn quicksort<S: SortTarget>(t: &mut S, mut lo: usize, mut hi: usize, threshold: usize) {
    let threshold = threshold.max(1);
    while hi - lo > threshold {
        let (split, degenerate) = partition_sub(t, lo, hi);
        if degenerate {
            // [lo, split) is one value and already in place.
            lo = split;
        } else if split - lo < hi - split {
            quicksort(t, lo, split, threshold);
            lo = split;
        } else {
            quicksort(t, split, hi, threshold);
            hi = split;
        }
    }
    selection_sort(t, lo, hi);
}

/// Sort a slice of elements in place.
pub fn sort_slice<T: Element>(data: &mut [T]) {
    sort_slice_with(data, DEFAULT_SELECTION_SORT_THRESHOLD);
}

/// Sort a slice of elements in place with an explicit selection-sort cutoff.
pub fn sort_slice_with<T: Element>(data: &mut [T], threshold: usize) {
    let n = data.len();
    quicksort(&mut SliceTarget::new(data), 0, n, threshold);
}

/// Row indices `start..end` of `values`, ordered by value.
pub(crate) fn sorted_rows<T: Element>(values: &[T], start: usize, end: usize, threshold: usize) -> Vec<usize> {
    let mut idx: Vec<usize> = (start..end).collect();
    let n = idx.len();
    quicksort(&mut IndexTarget::new(&mut idx, values, false), 0, n, threshold);
    idx
}

impl Column {
    /// Sort rows `[i, j)` of this column in place.
    ///
    /// # Errors
    /// [`ColumnError::OutOfRange`] if the range is not inside the column.
    pub fn sort(&mut self, i: usize, j: usize) -> Result<()> {
        self.sort_with(i, j, &EngineConfig::default())
    }

    /// [`sort`](Column::sort) with an explicit configuration.
    ///
    /// # Errors
    /// [`ColumnError::OutOfRange`] if the range is not inside the column.
    pub fn sort_with(&mut self, i: usize, j: usize, cfg: &EngineConfig) -> Result<()> {
        check_range(i, j, self.len())?;
        let threshold = cfg.sort_threshold();
        with_data!(self.data_mut(), c => sort_slice_with(&mut c.as_mut_slice()[i..j], threshold));
        Ok(())
    }

    /// The permutation that would sort rows `[i, j)`, as absolute row indices.
    ///
    /// # Errors
    /// [`ColumnError::OutOfRange`] if the range is not inside the column.
    pub fn sorted_permutation(&self, i: usize, j: usize, cfg: &EngineConfig) -> Result<Vec<usize>> {
        check_range(i, j, self.len())?;
        let threshold = cfg.sort_threshold();
        Ok(with_data!(self.data(), c => sorted_rows(c.as_slice(), i, j, threshold)))
    }
}

fn check_range(i: usize, j: usize, len: usize) -> Result<()> {
    if j > len {
        return Err(ColumnError::OutOfRange { index: j, len });
    }
    if i > j {
        return Err(ColumnError::OutOfRange { index: i, len: j });
    }
    Ok(())
}

/// Sorts a primary column and carries companion columns and row ids along so
/// that every row tuple stays aligned.
pub struct Sorter<'a> {
    primary: &'a mut Column,
    companions: Vec<&'a mut Column>,
    row_ids: Option<&'a mut [u64]>,
    threshold: usize,
}

impl<'a> Sorter<'a> {
    pub fn new(primary: &'a mut Column) -> Self {
        Self {
            primary,
            companions: Vec::new(),
            row_ids: None,
            threshold: DEFAULT_SELECTION_SORT_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_companion(mut self, column: &'a mut Column) -> Self {
        self.companions.push(column);
        self
    }

    #[must_use]
    pub fn with_companions<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = &'a mut Column>,
    {
        self.companions.extend(columns);
        self
    }

    /// Permute an opaque row-id bundle in lockstep with the columns.
    #[must_use]
    pub fn with_row_ids(mut self, ids: &'a mut [u64]) -> Self {
        self.row_ids = Some(ids);
        self
    }

    #[must_use]
    pub fn with_config(mut self, cfg: &EngineConfig) -> Self {
        self.threshold = cfg.sort_threshold();
        self
    }

    fn check_lengths(&self, end: usize) -> Result<()> {
        check_range(0, end, self.primary.len())?;
        let short = self
            .companions
            .iter()
            .map(|c| c.len())
            .chain(self.row_ids.as_ref().map(|ids| ids.len()))
            .find(|&len| len < end);
        match short {
            Some(found) => Err(ColumnError::LengthMismatch { expected: end, found }),
            None => Ok(()),
        }
    }

    fn apply(&mut self, start: usize, perm: &[usize]) -> Result<()> {
        self.primary.permute_range(start, perm)?;
        for c in &mut self.companions {
            c.permute_range(start, perm)?;
        }
        if let Some(ids) = self.row_ids.as_deref_mut() {
            permute_slice(ids, start, perm)?;
        }
        Ok(())
    }

    /// Sort rows `[i, j)` of the primary column and replicate the order.
    ///
    /// # Errors
    /// [`ColumnError::OutOfRange`] for a bad range, or
    /// [`ColumnError::LengthMismatch`] if a companion is shorter than `j`.
    pub fn sort(&mut self, i: usize, j: usize) -> Result<()> {
        check_range(i, j, self.primary.len())?;
        self.check_lengths(j)?;
        let threshold = self.threshold;
        let perm = with_data!(self.primary.data(), c => sorted_rows(c.as_slice(), i, j, threshold));
        self.apply(i, &perm)?;
        debug!(
            "sorted rows {i}..{j} of {} with {} companions",
            self.primary.name(),
            self.companions.len()
        );
        Ok(())
    }

    /// Sort the whole primary column.
    ///
    /// # Errors
    /// [`ColumnError::LengthMismatch`] if a companion is shorter than the primary.
    pub fn sort_all(&mut self) -> Result<()> {
        let n = self.primary.len();
        self.sort(0, n)
    }

    /// Sort independently inside every segment of `bounds`, as needed when a
    /// coarser key has already been sorted and segmented.
    ///
    /// # Errors
    /// [`ColumnError::InvalidBoundaries`] if `bounds` does not cover the primary
    /// column, or [`ColumnError::LengthMismatch`] for a short companion.
    pub fn sort_segments(&mut self, bounds: &Boundaries) -> Result<()> {
        if bounds.rows() != self.primary.len() {
            return Err(ColumnError::InvalidBoundaries(format!(
                "boundaries cover {} rows, column has {}",
                bounds.rows(),
                self.primary.len()
            )));
        }
        self.check_lengths(bounds.rows())?;
        let threshold = self.threshold;
        for seg in bounds.segments().filter(|s| s.len() > 1) {
            let perm = with_data!(
                self.primary.data(),
                c => sorted_rows(c.as_slice(), seg.start, seg.end, threshold)
            );
            self.apply(seg.start, &perm)?;
        }
        debug!(
            "sorted {} segments of {}",
            bounds.groups(),
            self.primary.name()
        );
        Ok(())
    }
}
