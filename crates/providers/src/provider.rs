//! The provider capability interface and the validated search entry point.
//!
//! Every cinema chain is a separate [`ShowtimeProvider`]. The engine never
//! sees a concrete provider type; it validates the request against the
//! provider's location table and date window, then asks for raw records.

use crate::location::LocationTable;
use chrono::NaiveDate;
use records::{DateWindow, RecordSet, Result, ShowtimeError, resolve_date};
use tracing::{debug, info, instrument};

/// Optional substring filter on titles.
///
/// Providers apply it while producing records. An empty filter matches
/// every title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFilter(Option<String>);

impl TitleFilter {
    pub fn any() -> Self {
        Self(None)
    }

    pub fn containing(needle: impl Into<String>) -> Self {
        Self(Some(needle.into()))
    }

    pub fn from_option(needle: Option<&str>) -> Self {
        Self(needle.map(str::to_string))
    }

    pub fn matches(&self, title: &str) -> bool {
        match &self.0 {
            Some(needle) => title.contains(needle.as_str()),
            None => true,
        }
    }
}

/// A fully validated request for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowtimeQuery {
    /// Location name as the user typed it
    pub location: String,
    /// Provider-specific code the name maps to
    pub location_code: String,
    pub date: NaiveDate,
    pub filter: TitleFilter,
}

/// Capability interface implemented once per cinema provider.
///
/// ## Contract
/// - return an open `RecordSet` (possibly empty when there is no data for
///   the date or location, which is not an error)
/// - apply `query.filter` to titles
/// - report failures as `Err`; they are surfaced as adapter errors and are
///   neither retried nor suppressed
pub trait ShowtimeProvider: Send + Sync {
    /// Short identifier, e.g. "cgv"
    fn name(&self) -> &str;

    /// Days ahead this provider publishes schedules for
    fn window(&self) -> DateWindow {
        DateWindow::default()
    }

    fn locations(&self) -> &LocationTable;

    fn fetch_raw_records(&self, query: &ShowtimeQuery) -> anyhow::Result<RecordSet>;
}

/// Validate `location` and `day` for `provider` without fetching anything.
pub fn prepare_query(
    provider: &dyn ShowtimeProvider,
    location: &str,
    day: Option<i32>,
    title: Option<&str>,
    today: NaiveDate,
) -> Result<ShowtimeQuery> {
    let location_code = provider.locations().require(location)?;
    let date = resolve_date(day, today, provider.window())?;

    Ok(ShowtimeQuery {
        location: location.to_string(),
        location_code: location_code.to_string(),
        date,
        filter: TitleFilter::from_option(title),
    })
}

/// Run a prepared query against `provider`.
///
/// Adapter failures come back verbatim as `ShowtimeError::Adapter`.
#[instrument(skip(provider, query), fields(provider = provider.name(), date = %query.date))]
pub fn fetch(provider: &dyn ShowtimeProvider, query: &ShowtimeQuery) -> Result<RecordSet> {
    let set = provider
        .fetch_raw_records(query)
        .map_err(|e| ShowtimeError::adapter(provider.name(), format!("{:#}", e)))?;

    if set.is_finalized() {
        return Err(ShowtimeError::adapter(
            provider.name(),
            "returned a finalized record set",
        ));
    }

    debug!(
        "Provider {} returned {} records for {}",
        provider.name(),
        set.len(),
        query.location
    );
    Ok(set)
}

/// Validate, resolve the date and fetch: the engine's entry point.
///
/// Validation happens before the provider is called, so a bad location or
/// date never reaches the network.
pub fn search(
    provider: &dyn ShowtimeProvider,
    location: &str,
    day: Option<i32>,
    title: Option<&str>,
    today: NaiveDate,
) -> Result<RecordSet> {
    let query = prepare_query(provider, location, day, title, today)?;
    info!(
        "Searching {} at {} on {}",
        provider.name(),
        query.location,
        query.date
    );
    fetch(provider, &query)
}
