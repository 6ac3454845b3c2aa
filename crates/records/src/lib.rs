//! # Records Crate
//!
//! The aggregation engine for cinema showtimes. Provider adapters produce raw
//! [`Record`]s; this crate merges them, groups them by title, orders each
//! title's showings and classifies seat availability.
//!
//! ## Main Components
//!
//! - **types**: `Record`, `GroupedTitle`, `TimelineEntry`, `TitleDetails`
//! - **record_set**: the `RecordSet` container and its Open → Finalized → Enriched lifecycle
//! - **aggregate**: grouping and timeline ordering run by `finalize`
//! - **date**: day-of-month resolution against a provider's `DateWindow`
//! - **capacity**: Low / Medium / High seat tiers
//! - **enrich**: the `DetailEnricher` boundary for external metadata
//! - **error**: `ShowtimeError` and the crate `Result`
//!
//! ## Example Usage
//!
//! ```ignore
//! use records::{Record, RecordSet, Rating};
//!
//! let mut all = RecordSet::new();
//! for provider_result in provider_results {
//!     all.merge(provider_result)?;
//! }
//! all.finalize()?;
//!
//! for title in all.to_grouped_list()? {
//!     println!("{} ({} showings)", title.title, title.timeline.len());
//! }
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod record_set;
pub mod aggregate;
pub mod date;
pub mod capacity;
pub mod enrich;

// Re-export commonly used types for convenience
pub use error::{Result, ShowtimeError};
pub use types::{
    EnrichedTitle,
    GroupedTitle,
    Rating,
    Record,
    RecordBuilder,
    TimelineEntry,
    TitleDetails,
};
pub use record_set::{RecordSet, SetState};
pub use date::{DateWindow, check_day, resolve as resolve_date};
pub use capacity::{Tier, classify};
pub use enrich::DetailEnricher;
