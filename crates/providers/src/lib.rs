//! # Providers Crate
//!
//! Where showtime records come from.
//!
//! ## Components
//!
//! ### ShowtimeProvider
//! The capability interface each cinema chain implements:
//! `fetch_raw_records(query) -> RecordSet`. The aggregation engine depends on
//! this trait only, never on a concrete adapter.
//!
//! ### search
//! The entry point: checks the location against the provider's
//! [`LocationTable`], resolves the day of month against the provider's
//! `DateWindow`, then calls the provider. Validation always runs first.
//!
//! ### SnapshotProvider
//! Serves schedules captured ahead of time from a directory tree, so the
//! whole pipeline can run offline.
//!
//! ## Example Usage
//!
//! ```ignore
//! use providers::{LocationTable, SnapshotProvider, search};
//!
//! let locations = LocationTable::load(Path::new("data/code_cgv.json"))?;
//! let cgv = SnapshotProvider::new("cgv", locations, "data/snapshots/cgv");
//!
//! let mut set = search(&cgv, "강남", Some(22), None, today)?;
//! set.finalize()?;
//! ```

// Public modules
pub mod location;
pub mod provider;
pub mod snapshot;

// Re-export commonly used types
pub use location::LocationTable;
pub use provider::{ShowtimeProvider, ShowtimeQuery, TitleFilter, fetch, prepare_query, search};
pub use snapshot::SnapshotProvider;
