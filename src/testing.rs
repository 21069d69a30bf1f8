//! Testing utilities for code built on colagg.
//!
//! This module provides helpers for writing tests against columns and grouped
//! tables:
//!
//! - **Assertions**: check sort order, multiset preservation, boundary shape and
//!   key order, with messages that show where a property broke
//! - **Builders**: assemble grouped tables and generate deterministic data
//! - **Fixtures**: small ready-made datasets
//!
//! # Quick Start
//!
//! ```
//! use colagg::*;
//! use colagg::testing::*;
//!
//! let data = pseudo_random_i64(200, 0, 10);
//! let mut c = Column::new("x", data.clone());
//! c.sort(0, c.len()).unwrap();
//!
//! assert_non_decreasing(&c);
//! assert_same_multiset(&c, &Column::new("x", data));
//! assert_valid_boundaries(&c, &c.segment(None).unwrap());
//! ```
//!
//! # Assertion Functions
//!
//! - [`assert_non_decreasing`]: every row orders at or after the one before it
//! - [`assert_same_multiset`]: same values with the same multiplicities, any order
//! - [`assert_valid_boundaries`]: boundaries are well formed and match value changes
//! - [`assert_strictly_ascending_keys`]: no duplicate or out-of-order key tuples
//! - [`assert_tables_equal`]: row-by-row comparison of two grouped tables
//!
//! # Builders
//!
//! ```
//! use colagg::testing::TableBuilder;
//! use colagg::AggOp;
//!
//! let t = TableBuilder::new()
//!     .key("k", vec![1i32, 2])
//!     .value("total", vec![10i64, 20], AggOp::Sum)
//!     .build()
//!     .unwrap();
//! assert_eq!(t.key_arity(), 1);
//! ```

pub mod assertions;
pub mod builders;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
