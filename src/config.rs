//! Engine tunables.
//!
//! [`EngineConfig`] carries the few constants the kernel exposes. Every field has a
//! default, so a JSON document only needs to name the fields it overrides:
//!
//! ```
//! use colagg::EngineConfig;
//!
//! let cfg = EngineConfig::from_json_str(r#"{ "concat_separator": "|" }"#).unwrap();
//! assert_eq!(cfg.concat_separator, "|");
//! assert_eq!(cfg.selection_sort_threshold, 32);
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Ranges at or below this many rows are finished with selection sort.
pub const DEFAULT_SELECTION_SORT_THRESHOLD: usize = 32;

/// Reduced buffers with more capacity than this are candidates for shrinking.
pub const DEFAULT_SHRINK_MIN_CAPACITY: usize = 1000;

/// Separator used by the CONCAT reduction.
pub const DEFAULT_CONCAT_SEPARATOR: &str = ", ";

/// Tunables shared by sort, reduce and fan-in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest range the sorter hands to selection sort instead of partitioning.
    pub selection_sort_threshold: usize,
    /// After a reduce, storage is reallocated when its capacity exceeds this value
    /// and is more than twice the number of groups.
    pub shrink_min_capacity: usize,
    /// Separator placed between elements by CONCAT.
    pub concat_separator: String,
    /// Worker threads for [`merge_all_par`](crate::fan_in::merge_all_par).
    /// `None` uses every available core.
    pub fan_in_threads: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selection_sort_threshold: DEFAULT_SELECTION_SORT_THRESHOLD,
            shrink_min_capacity: DEFAULT_SHRINK_MIN_CAPACITY,
            concat_separator: DEFAULT_CONCAT_SEPARATOR.to_string(),
            fan_in_threads: None,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a JSON document.
    ///
    /// # Errors
    /// Returns an error if the document is not valid JSON or a field has the wrong type.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing engine configuration")
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse engine configuration {}", path.display()))
    }

    /// Selection-sort cutoff, never below 1.
    #[must_use]
    pub fn sort_threshold(&self) -> usize {
        self.selection_sort_threshold.max(1)
    }
}
