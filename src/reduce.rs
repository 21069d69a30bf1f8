//! Reduction: collapse every segment of a sorted, segmented column to one value.
//!
//! | op | result per segment |
//! |---|---|
//! | `Nil` | first element |
//! | `Cnt` | segment length |
//! | `Sum` | sum in the storage type (integers wrap) |
//! | `Avg` | `f64` mean, cast back to the storage type |
//! | `Min` / `Max` | linear scan |
//! | `VarPop` / `VarSamp` | squared deviations over `n` / `max(n - 1, 1)` |
//! | `StdPop` / `StdSamp` | `sqrt(abs(var))` |
//! | `Distinct` | number of distinct values (sorts the segment) |
//! | `Median` | middle element; even numeric segments average the two middles, even string segments take the lower one |
//! | `Concat` | strings joined with the configured separator |
//!
//! Numeric columns store counts (`Cnt`, `Distinct`) in their own storage type.
//! String and blob columns turn into `int64` columns for those two operators.
//! Operators that make no sense for a type (say `VarPop` on strings) log a
//! warning and behave as `Nil`.
//!
//! Dictionary-coded columns are reduced on their codes, which are numbered in
//! first-seen order. `Min` and `Max` keep the dictionary but pick the smallest or
//! largest *code*, the same order sort, merge and top-k use for those columns. To
//! get the alphabetically first or last word, [`decode`](Column::decode) the
//! column before grouping.
//!
//! ```
//! use colagg::{AggOp, Boundaries, Column, Value};
//!
//! let mut c = Column::new("x", vec![1i32, 1, 2, 2, 3]);
//! let b = Boundaries::new(vec![0, 2, 4, 5]).unwrap();
//! c.reduce(&b, AggOp::Sum).unwrap();
//! assert_eq!(c.len(), 3);
//! assert_eq!(c.get(1), Some(Value::Int32(4)));
//! ```

use std::cmp::Ordering;
use std::mem;

use log::{debug, warn};

use crate::column::{Column, ColumnData, Element, Numeric, TypedColumn};
use crate::config::EngineConfig;
use crate::error::{ColumnError, Result};
use crate::segment::Boundaries;
use crate::sort::sort_slice_with;
use crate::types::AggOp;

/// Outcome of reducing one segment.
#[derive(Clone, Debug, PartialEq)]
pub enum Reduced<T> {
    /// A value of the column's own type.
    Value(T),
    /// A count for types that cannot hold one.
    Count(usize),
}

/// Parameters a reduction may need.
#[derive(Clone, Copy, Debug)]
pub struct ReduceContext<'a> {
    pub sort_threshold: usize,
    pub separator: &'a str,
}

impl<'a> ReduceContext<'a> {
    #[must_use]
    pub fn from_config(cfg: &'a EngineConfig) -> Self {
        Self {
            sort_threshold: cfg.sort_threshold(),
            separator: &cfg.concat_separator,
        }
    }
}

/// Element types that can be reduced per segment and re-combined across
/// partial results.
pub trait Aggregate: Element {
    /// Whether `op` is meaningful for this type.
    fn supports(op: AggOp) -> bool;

    /// Reduce one non-empty segment. May reorder the segment.
    fn reduce_segment(seg: &mut [Self], op: AggOp, ctx: &ReduceContext<'_>) -> Reduced<Self>;

    /// Combine two partial aggregates produced by `op`; `None` if `op` cannot be
    /// re-aggregated for this type.
    fn combine(op: AggOp, left: &Self, right: &Self) -> Option<Self>;
}

fn first<T: Element>(seg: &mut [T]) -> T {
    mem::take(&mut seg[0])
}

fn extreme<T: Element>(seg: &[T], want: Ordering) -> T {
    let mut best = &seg[0];
    for v in &seg[1..] {
        if v.compare(best) == want {
            best = v;
        }
    }
    best.clone()
}

fn count_distinct<T: Element>(seg: &mut [T], threshold: usize) -> usize {
    sort_slice_with(seg, threshold);
    1 + seg.windows(2).filter(|w| w[0].compare(&w[1]).is_ne()).count()
}

#[allow(clippy::cast_precision_loss)]
fn mean<T: Numeric>(seg: &[T]) -> f64 {
    seg.iter().map(|v| v.to_f64()).sum::<f64>() / seg.len() as f64
}

#[allow(clippy::cast_precision_loss)]
fn variance<T: Numeric>(seg: &[T], sample: bool) -> f64 {
    let n = seg.len();
    let m = mean(seg);
    let ss: f64 = seg.iter().map(|v| (v.to_f64() - m).powi(2)).sum();
    let divisor = if sample { n.saturating_sub(1).max(1) } else { n };
    ss / divisor as f64
}

fn reduce_numeric<T: Numeric>(seg: &mut [T], op: AggOp, ctx: &ReduceContext<'_>) -> T {
    let n = seg.len();
    match op {
        AggOp::Cnt => T::from_count(n),
        AggOp::Sum => seg[1..].iter().fold(seg[0], |acc, &v| acc.add(v)),
        AggOp::Avg => T::from_f64(mean(seg)),
        AggOp::Min => extreme(seg, Ordering::Less),
        AggOp::Max => extreme(seg, Ordering::Greater),
        AggOp::VarPop => T::from_f64(variance(seg, false)),
        AggOp::VarSamp => T::from_f64(variance(seg, true)),
        AggOp::StdPop => T::from_f64(variance(seg, false).abs().sqrt()),
        AggOp::StdSamp => T::from_f64(variance(seg, true).abs().sqrt()),
        AggOp::Distinct => T::from_count(count_distinct(seg, ctx.sort_threshold)),
        AggOp::Median => {
            sort_slice_with(seg, ctx.sort_threshold);
            if n % 2 == 1 {
                seg[n / 2]
            } else {
                T::from_f64((seg[n / 2 - 1].to_f64() + seg[n / 2].to_f64()) / 2.0)
            }
        }
        AggOp::Nil | AggOp::Concat => seg[0],
    }
}

/// Shared by strings and blobs: ordering-only operators.
fn reduce_ordered<T: Element>(seg: &mut [T], op: AggOp, ctx: &ReduceContext<'_>) -> Reduced<T> {
    match op {
        AggOp::Cnt => Reduced::Count(seg.len()),
        AggOp::Distinct => Reduced::Count(count_distinct(seg, ctx.sort_threshold)),
        AggOp::Min => Reduced::Value(extreme(seg, Ordering::Less)),
        AggOp::Max => Reduced::Value(extreme(seg, Ordering::Greater)),
        AggOp::Median => {
            sort_slice_with(seg, ctx.sort_threshold);
            Reduced::Value(mem::take(&mut seg[(seg.len() - 1) / 2]))
        }
        _ => Reduced::Value(first(seg)),
    }
}

fn combine_ordered<T: Element>(op: AggOp, left: &T, right: &T) -> Option<T> {
    match op {
        AggOp::Nil => Some(left.clone()),
        AggOp::Min => Some(if right.compare(left).is_lt() { right } else { left }.clone()),
        AggOp::Max => Some(if right.compare(left).is_gt() { right } else { left }.clone()),
        _ => None,
    }
}

macro_rules! impl_aggregate_numeric {
    ($($t:ty),* $(,)?) => {
        $(
            impl Aggregate for $t {
                fn supports(op: AggOp) -> bool {
                    op != AggOp::Concat
                }

                fn reduce_segment(seg: &mut [Self], op: AggOp, ctx: &ReduceContext<'_>) -> Reduced<Self> {
                    Reduced::Value(reduce_numeric(seg, op, ctx))
                }

                fn combine(op: AggOp, left: &Self, right: &Self) -> Option<Self> {
                    match op {
                        AggOp::Cnt | AggOp::Sum => Some(left.add(*right)),
                        _ => combine_ordered(op, left, right),
                    }
                }
            }
        )*
    };
}

impl_aggregate_numeric!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl Aggregate for String {
    fn supports(op: AggOp) -> bool {
        !op.is_arithmetic()
    }

    fn reduce_segment(seg: &mut [Self], op: AggOp, ctx: &ReduceContext<'_>) -> Reduced<Self> {
        match op {
            AggOp::Concat => Reduced::Value(seg.join(ctx.separator)),
            _ => reduce_ordered(seg, op, ctx),
        }
    }

    fn combine(op: AggOp, left: &Self, right: &Self) -> Option<Self> {
        combine_ordered(op, left, right)
    }
}

impl Aggregate for Vec<u8> {
    fn supports(op: AggOp) -> bool {
        !op.is_arithmetic() && op != AggOp::Concat
    }

    fn reduce_segment(seg: &mut [Self], op: AggOp, ctx: &ReduceContext<'_>) -> Reduced<Self> {
        reduce_ordered(seg, op, ctx)
    }

    fn combine(op: AggOp, left: &Self, right: &Self) -> Option<Self> {
        combine_ordered(op, left, right)
    }
}

/// Reduce a typed buffer in place. Returns the per-group counts when the element
/// type cannot hold them itself.
pub(crate) fn reduce_typed<T: Aggregate>(
    col: &mut TypedColumn<T>,
    bounds: &Boundaries,
    op: AggOp,
    ctx: &ReduceContext<'_>,
    shrink_min_capacity: usize,
) -> Option<Vec<i64>> {
    let groups = bounds.groups();
    let data = col.as_mut_vec();
    let mut counts: Option<Vec<i64>> = None;
    for (g, seg) in bounds.segments().enumerate() {
        // g <= seg.start, so writing slot g never touches a later segment.
        match T::reduce_segment(&mut data[seg], op, ctx) {
            Reduced::Value(v) => data[g] = v,
            Reduced::Count(n) => counts
                .get_or_insert_with(|| Vec::with_capacity(groups))
                .push(i64::try_from(n).unwrap_or(i64::MAX)),
        }
    }
    if counts.is_none() {
        col.compact(groups, shrink_min_capacity);
    }
    counts
}

impl Column {
    /// Collapse every segment of `bounds` to one value with `op`, in place.
    ///
    /// # Errors
    /// [`ColumnError::InvalidBoundaries`] if `bounds` does not cover exactly this
    /// column's rows.
    pub fn reduce(&mut self, bounds: &Boundaries, op: AggOp) -> Result<()> {
        self.reduce_with(bounds, op, &EngineConfig::default())
    }

    /// [`reduce`](Column::reduce) with an explicit configuration.
    ///
    /// # Errors
    /// [`ColumnError::InvalidBoundaries`] if `bounds` does not cover exactly this
    /// column's rows.
    pub fn reduce_with(&mut self, bounds: &Boundaries, op: AggOp, cfg: &EngineConfig) -> Result<()> {
        if bounds.rows() != self.len() {
            return Err(ColumnError::InvalidBoundaries(format!(
                "boundaries cover {} rows, column {} has {}",
                bounds.rows(),
                self.name(),
                self.len()
            )));
        }
        let ty = self.logical_type();
        let supported = with_data!(self.data(), c => supports_for(c, op));
        let op = if supported {
            op
        } else {
            warn!(
                "{op} is not supported for {ty} column {}; keeping the first value of each group",
                self.name()
            );
            AggOp::Nil
        };

        let ctx = ReduceContext::from_config(cfg);
        let shrink = cfg.shrink_min_capacity;
        let counts = with_data!(self.data_mut(), c => reduce_typed(c, bounds, op, &ctx, shrink));
        if let Some(counts) = counts {
            self.set_data(ColumnData::Int64(counts.into()));
        }
        if !matches!(op, AggOp::Nil | AggOp::Min | AggOp::Max) {
            self.clear_dictionary();
        }
        if !matches!(op, AggOp::Nil | AggOp::Min | AggOp::Max | AggOp::Avg | AggOp::Median) {
            self.clear_formatter();
        }
        debug!(
            "reduced {} with {op} to {} groups",
            self.name(),
            bounds.groups()
        );
        Ok(())
    }
}

fn supports_for<T: Aggregate>(_col: &TypedColumn<T>, op: AggOp) -> bool {
    T::supports(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ReduceContext<'static> {
        ReduceContext {
            sort_threshold: 32,
            separator: ", ",
        }
    }

    #[test]
    fn sample_variance_of_singleton_is_zero() {
        let mut seg = [5.0f64];
        assert_eq!(reduce_numeric(&mut seg, AggOp::VarSamp, &ctx()), 0.0);
        assert_eq!(reduce_numeric(&mut seg, AggOp::StdSamp, &ctx()), 0.0);
    }

    #[test]
    fn variance_population_and_sample() {
        let mut seg = [2.0f64, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((reduce_numeric(&mut seg, AggOp::VarPop, &ctx()) - 4.0).abs() < 1e-12);
        assert!((reduce_numeric(&mut seg, AggOp::StdPop, &ctx()) - 2.0).abs() < 1e-12);
        assert!((reduce_numeric(&mut seg, AggOp::VarSamp, &ctx()) - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn integer_avg_truncates() {
        let mut seg = [1i32, 2];
        assert_eq!(reduce_numeric(&mut seg, AggOp::Avg, &ctx()), 1);
    }

    #[test]
    fn median_rules() {
        assert_eq!(reduce_numeric(&mut [5i32, 1, 3], AggOp::Median, &ctx()), 3);
        assert_eq!(reduce_numeric(&mut [4i32, 2], AggOp::Median, &ctx()), 3);
        let mut s = vec!["b".to_string(), "a".to_string()];
        assert_eq!(
            String::reduce_segment(&mut s, AggOp::Median, &ctx()),
            Reduced::Value("a".to_string())
        );
    }

    #[test]
    fn concat_joins_in_current_order() {
        let mut s = vec!["x".to_string(), "a".to_string(), "m".to_string()];
        assert_eq!(
            String::reduce_segment(&mut s, AggOp::Concat, &ctx()),
            Reduced::Value("x, a, m".to_string())
        );
        assert!(!<Vec<u8> as Aggregate>::supports(AggOp::Concat));
        assert!(!i32::supports(AggOp::Concat));
    }

    #[test]
    fn combine_rules() {
        assert_eq!(i64::combine(AggOp::Sum, &5, &2), Some(7));
        assert_eq!(i64::combine(AggOp::Max, &5, &7), Some(7));
        assert_eq!(i64::combine(AggOp::Min, &5, &7), Some(5));
        assert_eq!(u8::combine(AggOp::Cnt, &250, &10), Some(4));
        assert_eq!(i64::combine(AggOp::Avg, &5, &7), None);
        assert_eq!(String::combine(AggOp::Sum, &"a".into(), &"b".into()), None);
    }
}
