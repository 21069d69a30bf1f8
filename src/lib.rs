//! # colagg
//!
//! An **in-memory columnar aggregation engine**: typed columns that can be sorted,
//! segmented into groups, reduced to one value per group, and merged with other
//! partial aggregates. It is the relational-algebra kernel under a GROUP BY,
//! without any SQL parsing or storage underneath.
//!
//! ## Key Features
//!
//! - **Typed columns** - twelve logical types (signed and unsigned integers of every
//!   width, `float32`/`float64`, strings, blobs), with dictionary-coded categoricals
//! - **Hybrid sort** - selection sort for small ranges, median-of-three quicksort for
//!   large ones, with linear handling of duplicate-heavy keys
//! - **Companion columns** - sort one column and carry any number of others (plus an
//!   opaque row-id bundle) along so row tuples stay aligned
//! - **Incremental multi-key grouping** - segment a key, refine by the next key
//!   inside the existing groups
//! - **Thirteen reductions** - NIL, CNT, SUM, AVG, MIN, MAX, population and sample
//!   variance and standard deviation, DISTINCT, MEDIAN, CONCAT
//! - **Merge of partial results** - two-cursor merge of grouped tables for any number
//!   of key columns, and sequential or parallel fan-in over many partials
//! - **Top-k / bottom-k** - quickselect that keeps every tie of the k-th value
//! - **Flat serialization** - raw binary arrays and per-element text
//!
//! ## Quick Start
//!
//! ```
//! use colagg::{AggOp, Column, GroupBy, Value};
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let city = Column::new("city", vec!["paris", "oslo", "paris", "oslo", "rome"]);
//! let temp = Column::new("temp", vec![21.0f64, 12.0, 25.0, 14.0, 30.0]);
//!
//! let table = GroupBy::new([0])
//!     .aggregate(1, AggOp::Avg)
//!     .aggregate(1, AggOp::Max)
//!     .execute(&[city, temp])?;
//!
//! assert_eq!(table.rows(), 3);
//! assert_eq!(
//!     table.row(0),
//!     Some(vec![Value::from("oslo"), Value::from(13.0f64), Value::from(14.0f64)])
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Column
//!
//! A [`Column`] is a named buffer of one [`LogicalType`]. It dispatches once on the
//! type and runs generic code over the concrete element type. Out-of-range access
//! returns `None` or [`ColumnError::OutOfRange`], never a panic.
//!
//! ### Boundaries
//!
//! [`Boundaries`] partition a sorted column into runs of equal values. They start
//! at 0, end at the row count, and strictly increase.
//!
//! ### GroupedTable
//!
//! A [`GroupedTable`] holds key columns followed by value columns, one row per
//! group, each value column tagged with the [`AggOp`] that produced it.
//!
//! ## The Kernel Step by Step
//!
//! ```
//! use colagg::{AggOp, Column, Sorter};
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let mut key = Column::new("k", vec![3i32, 1, 2, 2, 1]);
//! let mut val = Column::new("v", vec![30i64, 10, 20, 21, 11]);
//!
//! Sorter::new(&mut key).with_companion(&mut val).sort_all()?;
//! let bounds = key.segment(None)?;
//! assert_eq!(bounds.as_slice(), &[0, 2, 4, 5]);
//!
//! key.reduce(&bounds, AggOp::Nil)?;
//! val.reduce(&bounds, AggOp::Sum)?;
//! assert_eq!(val.sum(), Some(92.0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Fan-in of Partial Aggregates
//!
//! ```
//! use colagg::{merge_all, AggOp, Column, GroupBy};
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let plan = GroupBy::new([0]).aggregate(1, AggOp::Sum);
//! let part1 = plan.execute(&[Column::new("k", vec!["a", "b"]), Column::new("n", vec![1i64, 2])])?;
//! let part2 = plan.execute(&[Column::new("k", vec!["b", "c"]), Column::new("n", vec![3i64, 4])])?;
//!
//! let total = merge_all(vec![part1, part2])?;
//! assert_eq!(total.rows(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors and Logging
//!
//! Kernel operations return [`Result`] with a [`ColumnError`]. The drivers
//! ([`GroupBy::execute`], [`merge_all`], configuration loading) return
//! `anyhow::Result` with context attached. Requesting an operator a type cannot
//! support is not an error: it is logged through the `log` facade and the
//! reduction keeps the first value of each group. No logger is installed by
//! this crate.
//!
//! ## Module Overview
//!
//! - [`column`] - typed buffers, element traits, casting factory, dictionaries
//! - [`sort`] - the sort kernel and the multi-column [`Sorter`]
//! - [`segment`] - [`Boundaries`] and the segmenter
//! - [`reduce`] - per-segment reductions
//! - [`merge`](mod@merge) - merging two grouped tables
//! - [`select`] - top-k and bottom-k
//! - [`serialize`] - binary and text output, timestamp formatting
//! - [`table`] - [`GroupedTable`]
//! - [`group_by`] - the group-by driver
//! - [`fan_in`] - sequential and parallel merge of many partials
//! - [`config`] - [`EngineConfig`]
//! - [`testing`] - assertions, builders and fixtures for tests

#[macro_use]
mod macros;

pub mod column;
pub mod config;
pub mod error;
pub mod fan_in;
pub mod group_by;
pub mod merge;
pub mod reduce;
pub mod segment;
pub mod select;
pub mod serialize;
pub mod sort;
pub mod table;
pub mod testing;
pub mod types;

pub use column::{Column, ColumnData, Dictionary, Element, Numeric, TypedColumn};
pub use config::EngineConfig;
pub use error::{ColumnError, Result};
#[cfg(feature = "parallel")]
pub use fan_in::merge_all_par;
pub use fan_in::merge_all;
pub use group_by::GroupBy;
pub use merge::{MergeStep, merge, merge_plan};
pub use reduce::{Aggregate, Reduced};
pub use segment::Boundaries;
pub use serialize::{TimestampFormatter, UtcTimestampFormatter};
pub use sort::{Sorter, sort_slice, sort_slice_with};
pub use table::GroupedTable;
pub use types::{AggOp, LogicalType, Value};
