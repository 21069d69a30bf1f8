//! Top-k and bottom-k selection without a full sort.
//!
//! Selection runs quickselect over an index array with the sorter's
//! median-of-three partition, narrowing to the sub-range that holds the k-th
//! position until that range is small enough to finish with a sort. Every row
//! tied with the k-th value is then added, so more than `k` rows can come back
//! and ties are never dropped arbitrarily.
//!
//! The column itself is not reordered; the result is a list of row indices,
//! best first.
//!
//! ```
//! use colagg::Column;
//!
//! let c = Column::new("s", vec!["c", "a", "b", "a"]);
//! assert_eq!(c.top_k(2), vec![0, 2]);
//! assert_eq!(c.bottom_k(1), vec![1, 3]);
//! ```

use std::cmp::Ordering;

use log::debug;

use crate::column::{Column, Element};
use crate::config::{DEFAULT_SELECTION_SORT_THRESHOLD, EngineConfig};
use crate::sort::{IndexTarget, SortTarget, partition_sub, quicksort};

/// Rows of the `k` best values (smallest, or largest when `descending`) plus
/// every row tied with the k-th, best first.
pub(crate) fn select_rows<T: Element>(values: &[T], k: usize, descending: bool, threshold: usize) -> Vec<usize> {
    let n = values.len();
    if k == 0 || n == 0 {
        return Vec::new();
    }
    let threshold = threshold.max(1);
    let mut idx: Vec<usize> = (0..n).collect();
    if k >= n {
        quicksort(&mut IndexTarget::new(&mut idx, values, descending), 0, n, threshold);
        return idx;
    }

    let worst_row = {
        let mut t = IndexTarget::new(&mut idx, values, descending);
        // [0, lo) orders before [lo, hi), which orders before [hi, n); lo <= k <= hi.
        let (mut lo, mut hi) = (0, n);
        loop {
            if hi - lo <= threshold {
                quicksort(&mut t, lo, hi, threshold);
                break;
            }
            let (split, degenerate) = partition_sub(&mut t, lo, hi);
            if degenerate {
                // [lo, split) is one value, the best of the range.
                if k <= split {
                    break;
                }
                lo = split;
            } else {
                match k.cmp(&split) {
                    Ordering::Less => hi = split,
                    Ordering::Greater => lo = split,
                    Ordering::Equal => break,
                }
            }
        }
        let mut worst = 0;
        for p in 1..k {
            if t.compare(p, worst) == Ordering::Greater {
                worst = p;
            }
        }
        t.row(worst)
    };

    let mut rows = idx[..k].to_vec();
    rows.extend(
        idx[k..]
            .iter()
            .copied()
            .filter(|&r| values[r].compare(&values[worst_row]).is_eq()),
    );
    let len = rows.len();
    quicksort(&mut IndexTarget::new(&mut rows, values, descending), 0, len, threshold);
    rows
}

impl Column {
    /// Rows holding the `k` largest values, plus rows tied with the k-th largest,
    /// largest first.
    #[must_use]
    pub fn top_k(&self, k: usize) -> Vec<usize> {
        self.select(k, true, DEFAULT_SELECTION_SORT_THRESHOLD)
    }

    /// Rows holding the `k` smallest values, plus rows tied with the k-th
    /// smallest, smallest first.
    #[must_use]
    pub fn bottom_k(&self, k: usize) -> Vec<usize> {
        self.select(k, false, DEFAULT_SELECTION_SORT_THRESHOLD)
    }

    #[must_use]
    pub fn top_k_with(&self, k: usize, cfg: &EngineConfig) -> Vec<usize> {
        self.select(k, true, cfg.sort_threshold())
    }

    #[must_use]
    pub fn bottom_k_with(&self, k: usize, cfg: &EngineConfig) -> Vec<usize> {
        self.select(k, false, cfg.sort_threshold())
    }

    fn select(&self, k: usize, descending: bool, threshold: usize) -> Vec<usize> {
        let rows = with_data!(self.data(), c => select_rows(c.as_slice(), k, descending, threshold));
        debug!(
            "selected {} of {} rows of {} (k = {k}, {})",
            rows.len(),
            self.len(),
            self.name(),
            if descending { "top" } else { "bottom" }
        );
        rows
    }
}
