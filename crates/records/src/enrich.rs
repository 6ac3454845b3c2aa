//! Boundary to external title metadata.
//!
//! The engine only defines what it asks for and what it does with the
//! answer; lookups themselves live behind [`DetailEnricher`]. Enrichment is
//! best-effort: a missing title, or a failing enricher, leaves the metadata
//! empty and never fails the aggregation.

use crate::types::{EnrichedTitle, GroupedTitle, TitleDetails};
use anyhow::Result;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Source of per-title metadata.
///
/// `Send + Sync` so one enricher can be shared across requests.
pub trait DetailEnricher: Send + Sync {
    /// Returns the name of this enricher (for logging)
    fn name(&self) -> &str;

    /// Look up metadata for `titles`.
    ///
    /// Keys of the returned map must be titles exactly as requested. Titles
    /// without metadata are simply left out.
    fn lookup(&self, titles: &BTreeSet<String>) -> Result<HashMap<String, TitleDetails>>;
}

/// Attach metadata from `enricher` to every grouped title.
pub(crate) fn attach_details(
    grouped: Vec<GroupedTitle>,
    enricher: &dyn DetailEnricher,
) -> Vec<EnrichedTitle> {
    let titles: BTreeSet<String> = grouped.iter().map(|g| g.title.clone()).collect();

    let mut details = match enricher.lookup(&titles) {
        Ok(details) => details,
        Err(e) => {
            warn!(
                "Enricher {} failed, continuing without metadata: {:#}",
                enricher.name(),
                e
            );
            HashMap::new()
        }
    };

    grouped
        .into_iter()
        .map(|grouped| {
            let details = details.remove(&grouped.title).unwrap_or_else(|| {
                debug!("No metadata for title {:?}", grouped.title);
                TitleDetails::default()
            });
            EnrichedTitle { grouped, details }
        })
        .collect()
}
