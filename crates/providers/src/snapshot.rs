//! Snapshot provider - showtimes captured ahead of time
//!
//! Reads raw record lists from disk instead of a live site:
//!
//! ```text
//! <root>/<location code>/<YYYY-MM-DD>.json
//! ```
//!
//! Each file holds the raw (pre-finalize) list shape. A missing file means
//! the provider has nothing for that date and location, which yields an
//! empty set rather than an error. A file that is unreadable or fails record
//! validation is an adapter failure.

use crate::location::LocationTable;
use crate::provider::{ShowtimeProvider, ShowtimeQuery};
use anyhow::{Context, Result, bail};
use records::{DateWindow, RecordSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Provider backed by a directory of captured schedules
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    name: String,
    locations: LocationTable,
    root: PathBuf,
    window: DateWindow,
}

impl SnapshotProvider {
    /// Create a snapshot provider
    ///
    /// ## Parameters
    /// - `name`: provider identifier used in logs and errors
    /// - `locations`: the provider's location table
    /// - `root`: directory holding one sub-directory per location code
    pub fn new(name: impl Into<String>, locations: LocationTable, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            locations,
            root: root.into(),
            window: DateWindow::default(),
        }
    }

    /// Configure the look-ahead window (default: 6 days)
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_path(&self, query: &ShowtimeQuery) -> Result<PathBuf> {
        let code = query.location_code.as_str();
        if code.is_empty() || code == "." || code == ".." || code.contains(['/', '\\']) {
            bail!("location code `{}` cannot be used as a snapshot directory", code);
        }
        Ok(self
            .root
            .join(code)
            .join(format!("{}.json", query.date.format("%Y-%m-%d"))))
    }
}

impl ShowtimeProvider for SnapshotProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn window(&self) -> DateWindow {
        self.window
    }

    fn locations(&self) -> &LocationTable {
        &self.locations
    }

    #[instrument(skip(self, query), fields(provider = %self.name, location = %query.location))]
    fn fetch_raw_records(&self, query: &ShowtimeQuery) -> Result<RecordSet> {
        let path = self.snapshot_path(query)?;
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {}, nothing scheduled", path.display());
                return Ok(RecordSet::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read snapshot {}", path.display()));
            }
        };
        let records = RecordSet::from_json(&json)
            .and_then(RecordSet::into_raw_list)
            .with_context(|| format!("Invalid snapshot {}", path.display()))?;

        let total = records.len();
        let kept: Vec<_> = records
            .into_iter()
            .filter(|record| query.filter.matches(record.title()))
            .collect();

        debug!(
            "Loaded {} records from {} ({} after title filter)",
            total,
            path.display(),
            kept.len()
        );
        Ok(RecordSet::from_records(kept))
    }
}
