//! Segmentation of sorted columns into runs of equal values.
//!
//! A [`Boundaries`] array starts at 0, ends at the row count and is strictly
//! increasing, so each pair of neighbours delimits one non-empty group.
//!
//! Multi-column grouping is incremental: segment the first key, sort the second
//! key inside those segments, then segment the second key *against* the first
//! key's boundaries. Every prior boundary is kept and new ones are added where
//! the finer key changes.
//!
//! ```
//! use colagg::Column;
//!
//! let k1 = Column::new("a", vec![1i32, 1, 1, 2, 2]);
//! let k2 = Column::new("b", vec![5i32, 5, 6, 6, 6]);
//! let b1 = k1.segment(None).unwrap();
//! assert_eq!(b1.as_slice(), &[0, 3, 5]);
//! let b2 = k2.segment(Some(&b1)).unwrap();
//! assert_eq!(b2.as_slice(), &[0, 2, 3, 5]);
//! ```

use std::ops::Range;

use log::debug;

use crate::column::{Column, Element};
use crate::error::{ColumnError, Result};

/// Ascending group offsets over a sorted column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Boundaries(Vec<usize>);

impl Boundaries {
    /// Validate and wrap a boundary array.
    ///
    /// # Errors
    /// [`ColumnError::InvalidBoundaries`] if the array is empty, does not start at 0,
    /// or is not strictly increasing.
    pub fn new(offsets: Vec<usize>) -> Result<Self> {
        match offsets.first() {
            None => {
                return Err(ColumnError::InvalidBoundaries("empty boundary array".into()));
            }
            Some(&first) if first != 0 => {
                return Err(ColumnError::InvalidBoundaries(format!(
                    "first boundary is {first}, expected 0"
                )));
            }
            Some(_) => {}
        }
        if let Some(w) = offsets.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ColumnError::InvalidBoundaries(format!(
                "boundaries not strictly increasing at {} → {}",
                w[0], w[1]
            )));
        }
        Ok(Self(offsets))
    }

    /// One group spanning `rows` rows, or no groups when `rows` is 0.
    #[must_use]
    pub fn single(rows: usize) -> Self {
        if rows == 0 { Self(vec![0]) } else { Self(vec![0, rows]) }
    }

    /// One group per row.
    #[must_use]
    pub fn each_row(rows: usize) -> Self {
        Self((0..=rows).collect())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }

    /// Number of groups.
    #[must_use]
    pub fn groups(&self) -> usize {
        self.0.len() - 1
    }

    /// Number of rows covered.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.0.last().copied().unwrap_or(0)
    }

    /// Row range of every group, in order.
    pub fn segments(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.0.windows(2).map(|w| w[0]..w[1])
    }
}

/// Boundaries of equal-value runs in a sorted slice, refining `prior` if given.
pub(crate) fn segment_slice<T: Element>(values: &[T], prior: Option<&[usize]>) -> Vec<usize> {
    let mut out = vec![0];
    let whole = [0, values.len()];
    let prior = prior.unwrap_or(&whole);
    for w in prior.windows(2) {
        let (start, end) = (w[0], w[1]);
        for i in start + 1..end {
            if values[i].compare(&values[i - 1]).is_ne() {
                out.push(i);
            }
        }
        if end > start {
            out.push(end);
        }
    }
    out
}

impl Column {
    /// Boundaries of the equal-value runs of this (sorted) column.
    ///
    /// With `prior`, scanning restarts at every prior boundary and all prior
    /// boundaries are preserved.
    ///
    /// # Errors
    /// [`ColumnError::InvalidBoundaries`] if `prior` does not cover exactly this
    /// column's rows.
    pub fn segment(&self, prior: Option<&Boundaries>) -> Result<Boundaries> {
        if let Some(p) = prior {
            if p.rows() != self.len() {
                return Err(ColumnError::InvalidBoundaries(format!(
                    "prior boundaries cover {} rows, column {} has {}",
                    p.rows(),
                    self.name(),
                    self.len()
                )));
            }
        }
        let offsets = with_data!(self.data(), c => {
            segment_slice(c.as_slice(), prior.map(Boundaries::as_slice))
        });
        let bounds = Boundaries(offsets);
        debug!("segmented {} into {} groups", self.name(), bounds.groups());
        Ok(bounds)
    }
}
