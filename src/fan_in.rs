//! Fan-in of partial aggregates.
//!
//! Rows are partitioned elsewhere, each partition is grouped on its own, and the
//! partial [`GroupedTable`]s are merged here into one result. Because a merge
//! reads its inputs and allocates a fresh output, the parallel variant merges
//! disjoint pairs on a thread pool, one round at a time, until one table is left.
//!
//! Pairing is always left neighbour with right neighbour, so both variants see the
//! partials in the same order and produce the same table.

use anyhow::{Context, Result};
use log::debug;

use crate::merge::merge;
use crate::table::GroupedTable;

#[cfg(feature = "parallel")]
use crate::config::EngineConfig;

/// Merge partial tables left to right.
///
/// # Errors
/// Fails on an empty list or when two partials cannot be merged.
pub fn merge_all(tables: Vec<GroupedTable>) -> Result<GroupedTable> {
    let count = tables.len();
    let mut it = tables.into_iter();
    let first = it.next().context("no partial tables to merge")?;
    let merged = it.enumerate().try_fold(first, |acc, (i, t)| {
        merge(&acc, &t).with_context(|| format!("merging partial table {}", i + 1))
    })?;
    debug!("merged {count} partial tables into {} groups", merged.rows());
    Ok(merged)
}

/// Merge partial tables pairwise in rounds on a dedicated rayon pool sized by
/// [`EngineConfig::fan_in_threads`].
///
/// # Errors
/// Fails on an empty list, when the pool cannot be built, or when two partials
/// cannot be merged.
#[cfg(feature = "parallel")]
pub fn merge_all_par(tables: Vec<GroupedTable>, cfg: &EngineConfig) -> Result<GroupedTable> {
    use rayon::prelude::*;

    anyhow::ensure!(!tables.is_empty(), "no partial tables to merge");
    let threads = cfg.fan_in_threads.unwrap_or_else(num_cpus::get).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("building fan-in thread pool")?;

    let count = tables.len();
    let mut level = tables;
    let mut round = 0;
    while level.len() > 1 {
        let mut pairs = Vec::with_capacity(level.len().div_ceil(2));
        let mut it = level.into_iter();
        while let Some(left) = it.next() {
            pairs.push((left, it.next()));
        }
        round += 1;
        level = pool.install(|| {
            pairs
                .into_par_iter()
                .map(|(left, right)| match right {
                    Some(right) => merge(&left, &right)
                        .with_context(|| format!("merging partials in round {round}")),
                    None => Ok(left),
                })
                .collect::<Result<Vec<_>>>()
        })?;
    }
    debug!("merged {count} partial tables in {round} rounds on {threads} threads");
    level.into_iter().next().context("no partial tables to merge")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::types::AggOp;

    fn partial(keys: Vec<u8>, counts: Vec<u64>) -> GroupedTable {
        GroupedTable::new(
            vec![Column::new("k", keys), Column::new("n", counts)],
            1,
            vec![AggOp::Cnt],
        )
        .unwrap()
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(merge_all(Vec::new()).is_err());
    }

    #[test]
    fn single_table_passes_through() {
        let t = partial(vec![1], vec![3]);
        assert_eq!(merge_all(vec![t.clone()]).unwrap(), t);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_sequential() {
        let parts: Vec<GroupedTable> = (0..7u8)
            .map(|p| partial(vec![p, p + 1, 10], vec![1, 2, u64::from(p)]))
            .collect();
        let seq = merge_all(parts.clone()).unwrap();
        let cfg = EngineConfig {
            fan_in_threads: Some(3),
            ..EngineConfig::default()
        };
        let par = merge_all_par(parts, &cfg).unwrap();
        assert_eq!(seq, par);
        assert!(par.keys_strictly_ascending());
    }
}
