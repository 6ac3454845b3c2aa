//! Title metadata from a local catalog file.
//!
//! This crate implements the engine's `DetailEnricher` boundary on top of a
//! JSON catalog exported from a film-council listing. It handles:
//! - Loading and validating the catalog
//! - Normalizing release dates and director lists
//! - Looking titles up, optionally ignoring marker prefixes such as a
//!   dubbing tag, while keying results by the title as requested
//!
//! Catalog layout:
//!
//! ```json
//! {
//!   "독전": {
//!     "titleEnglish": "Believer",
//!     "genre": "범죄,액션",
//!     "nationality": "한국",
//!     "openDate": "20180522",
//!     "directors": ["이해영"]
//!   }
//! }
//! ```

use anyhow::Result;
use chrono::NaiveDate;
use records::{DetailEnricher, TitleDetails};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid open date `{value}` for `{title}`")]
    InvalidDate { title: String, value: String },
}

/// Directors may be published as one string or as a list of names
#[derive(Deserialize)]
#[serde(untagged)]
enum Directors {
    Joined(String),
    Names(Vec<String>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    #[serde(default)]
    title_english: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    nationality: String,
    #[serde(default)]
    open_date: Option<String>,
    #[serde(default)]
    directors: Option<Directors>,
}

fn parse_open_date(title: &str, value: &str) -> Result<Option<NaiveDate>, CatalogError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
        .map(Some)
        .map_err(|_| CatalogError::InvalidDate {
            title: title.to_string(),
            value: value.to_string(),
        })
}

impl CatalogEntry {
    fn into_details(self, title: &str) -> Result<TitleDetails, CatalogError> {
        let open_date = match self.open_date {
            Some(value) => parse_open_date(title, &value)?,
            None => None,
        };
        let directors = match self.directors {
            Some(Directors::Joined(joined)) => joined,
            Some(Directors::Names(names)) => names.join(", "),
            None => String::new(),
        };

        Ok(TitleDetails {
            title_english: self.title_english,
            genre: self.genre,
            nationality: self.nationality,
            open_date,
            directors,
        })
    }
}

/// Enricher backed by an in-memory title catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogEnricher {
    catalog: HashMap<String, TitleDetails>,
    ignored_prefixes: Vec<String>,
}

impl CatalogEnricher {
    pub fn new(catalog: HashMap<String, TitleDetails>) -> Self {
        Self {
            catalog,
            ignored_prefixes: Vec::new(),
        }
    }

    /// Parse a catalog from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let entries: HashMap<String, CatalogEntry> = serde_json::from_str(json)?;
        let catalog = entries
            .into_iter()
            .map(|(title, entry)| {
                let details = entry.into_details(&title)?;
                Ok((title, details))
            })
            .collect::<Result<HashMap<_, _>, CatalogError>>()?;
        Ok(Self::new(catalog))
    }

    /// Load a catalog file from disk
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let enricher = Self::from_json_str(&json)?;
        info!(
            "Loaded {} catalog entries from {}",
            enricher.len(),
            path.display()
        );
        Ok(enricher)
    }

    /// Strip `prefix` from requested titles before looking them up
    /// (e.g. `"(더빙) "` so dubbed showings share the original's metadata).
    pub fn with_ignored_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ignored_prefixes.push(prefix.into());
        self
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Catalog key for a requested title
    fn lookup_key<'a>(&self, title: &'a str) -> &'a str {
        self.ignored_prefixes
            .iter()
            .find_map(|prefix| title.strip_prefix(prefix.as_str()))
            .unwrap_or(title)
    }
}

impl DetailEnricher for CatalogEnricher {
    fn name(&self) -> &str {
        "catalog"
    }

    fn lookup(&self, titles: &BTreeSet<String>) -> Result<HashMap<String, TitleDetails>> {
        let found: HashMap<String, TitleDetails> = titles
            .iter()
            .filter_map(|title| {
                self.catalog
                    .get(self.lookup_key(title))
                    .map(|details| (title.clone(), details.clone()))
            })
            .collect();

        debug!(
            "Catalog matched {} of {} titles",
            found.len(),
            titles.len()
        );
        Ok(found)
    }
}
