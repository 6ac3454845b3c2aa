//! # Showtime Orchestrator
//!
//! This module coordinates one showtime request across every provider:
//! 1. Validate the location and date for each provider
//! 2. Fetch from all providers in parallel, each into its own RecordSet
//! 3. Fold the results into one set, in provider registration order
//! 4. Finalize (group by title, sort timelines)
//! 5. Optionally enrich with title metadata
//!
//! ## Failure policy
//! - A day number outside 1..=31 fails the whole request before any fetch
//! - A provider that does not know the location, or whose window does not
//!   reach the requested date, is skipped; if no provider knows the location
//!   or none of those that do can serve the date, the request fails with a
//!   validation error
//! - A provider that fails is skipped and reported in `Aggregation::failures`;
//!   if every provider fails, the first failure is returned
//! - No retries

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use tracing::{info, warn};

use providers::{ShowtimeProvider, ShowtimeQuery, prepare_query};
use records::{DetailEnricher, RecordSet, ShowtimeError, check_day};

/// What the caller wants to see
#[derive(Debug, Clone)]
pub struct ShowtimeRequest {
    pub location: String,
    /// Day of month; `None` for today
    pub day: Option<i32>,
    /// Substring filter on titles
    pub title: Option<String>,
    /// Injected so requests are reproducible
    pub today: NaiveDate,
    pub enrich: bool,
}

impl ShowtimeRequest {
    pub fn new(location: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            location: location.into(),
            day: None,
            title: None,
            today,
            enrich: true,
        }
    }

    pub fn with_day(mut self, day: Option<i32>) -> Self {
        self.day = day;
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_enrich(mut self, enrich: bool) -> Self {
        self.enrich = enrich;
        self
    }
}

/// A provider whose contribution was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: String,
}

/// Result of one request
#[derive(Debug)]
pub struct Aggregation {
    /// Finalized, and enriched when requested and an enricher is configured
    pub showtimes: RecordSet,
    /// Date the request resolved to
    pub date: NaiveDate,
    /// Providers whose records are in `showtimes`
    pub contributed: Vec<String>,
    /// Providers that do not serve the requested location or date
    pub skipped: Vec<String>,
    /// Providers that failed while fetching
    pub failures: Vec<ProviderFailure>,
}

type ProviderHandle = Arc<dyn ShowtimeProvider>;

/// Main orchestrator that coordinates providers, aggregation and enrichment
#[derive(Clone, Default)]
pub struct ShowtimeOrchestrator {
    providers: Vec<ProviderHandle>,
    enricher: Option<Arc<dyn DetailEnricher>>,
}

impl ShowtimeOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Registration order is merge order.
    pub fn with_provider(mut self, provider: ProviderHandle) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn DetailEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Main entry point: aggregate showtimes for one location and date
    pub async fn get_showtimes(&self, request: &ShowtimeRequest) -> Result<Aggregation> {
        let start_time = Instant::now();

        if self.providers.is_empty() {
            return Err(anyhow!("no showtime providers configured"));
        }

        // Validate before any fetch
        let (planned, skipped) = self.plan_queries(request)?;
        let date = planned[0].1.date;
        info!(
            "Planned {} provider queries for {} on {} ({} skipped)",
            planned.len(),
            request.location,
            date,
            skipped.len()
        );

        // Fetch in parallel
        let results = self.fetch_parallel(planned).await;

        // Fold sequentially
        let (mut showtimes, contributed, failures) = self.merge_results(results)?;
        info!(
            "Merged {} records from {} providers ({} failed)",
            showtimes.len(),
            contributed.len(),
            failures.len()
        );

        showtimes.finalize().context("Failed to finalize showtimes")?;
        info!("Finalized into {} titles", showtimes.len());

        if request.enrich {
            if let Some(enricher) = &self.enricher {
                showtimes
                    .enrich(enricher.as_ref())
                    .context("Failed to enrich showtimes")?;
            }
        }

        info!(
            "Total time to aggregate showtimes for {}: {:.2?}",
            request.location,
            start_time.elapsed()
        );

        Ok(Aggregation {
            showtimes,
            date,
            contributed,
            skipped,
            failures,
        })
    }

    /// Validate the request against every provider.
    ///
    /// Returns the queries to run plus the names of providers that do not
    /// serve the location or do not publish the requested date.
    fn plan_queries(
        &self,
        request: &ShowtimeRequest,
    ) -> Result<(Vec<(ProviderHandle, ShowtimeQuery)>, Vec<String>)> {
        if let Some(day) = request.day {
            check_day(day)?;
        }

        let mut planned = Vec::new();
        let mut skipped = Vec::new();
        let mut serves_location = false;

        for provider in &self.providers {
            if !provider.locations().contains(&request.location) {
                warn!(
                    "Provider {} has no location {:?}, skipping",
                    provider.name(),
                    request.location
                );
                skipped.push(provider.name().to_string());
                continue;
            }
            serves_location = true;

            // Location and day range are already checked; what is left is the
            // provider's own window.
            match prepare_query(
                provider.as_ref(),
                &request.location,
                request.day,
                request.title.as_deref(),
                request.today,
            ) {
                Ok(query) => planned.push((provider.clone(), query)),
                Err(e) if e.is_validation() => {
                    warn!("Provider {} cannot serve this date ({}), skipping", provider.name(), e);
                    skipped.push(provider.name().to_string());
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Invalid request for provider {}", provider.name()));
                }
            }
        }

        if planned.is_empty() {
            let reason = if serves_location {
                "date not available".to_string()
            } else {
                format!("invalid location `{}`", request.location)
            };
            return Err(ShowtimeError::validation(reason).into());
        }

        Ok((planned, skipped))
    }

    /// Run every planned query on the blocking pool
    async fn fetch_parallel(
        &self,
        planned: Vec<(ProviderHandle, ShowtimeQuery)>,
    ) -> Vec<(String, Result<RecordSet>)> {
        let handles: Vec<_> = planned
            .into_iter()
            .map(|(provider, query)| {
                let name = provider.name().to_string();
                let handle = tokio::task::spawn_blocking(move || {
                    providers::fetch(provider.as_ref(), &query)
                });
                (name, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            let result = match handle.await {
                Ok(fetched) => fetched.map_err(anyhow::Error::from),
                Err(join_error) => {
                    Err(anyhow::Error::from(join_error).context(format!("{} task panicked", name)))
                }
            };
            results.push((name, result));
        }
        results
    }

    /// Fold provider results into one open set, skipping failures
    fn merge_results(
        &self,
        results: Vec<(String, Result<RecordSet>)>,
    ) -> Result<(RecordSet, Vec<String>, Vec<ProviderFailure>)> {
        let mut merged = RecordSet::new();
        let mut contributed = Vec::new();
        let mut failures = Vec::new();
        let mut first_error = None;

        for (name, result) in results {
            match result {
                Ok(set) => {
                    merged.merge(set)?;
                    contributed.push(name);
                }
                Err(e) => {
                    warn!("Provider {} failed, skipping its showtimes: {:#}", name, e);
                    failures.push(ProviderFailure {
                        provider: name,
                        error: format!("{:#}", e),
                    });
                    first_error.get_or_insert(e);
                }
            }
        }

        if contributed.is_empty() {
            if let Some(e) = first_error {
                return Err(e.context("Every provider failed"));
            }
        }

        Ok((merged, contributed, failures))
    }
}
