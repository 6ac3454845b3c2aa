//! Location tables: human-readable theater names to provider codes.
//!
//! The code-table builders write a JSON array whose first element is the
//! mapping, e.g. `[{"강남": "areacode=01&theatercode=0056"}]`. A bare object
//! is accepted as well.

use records::{Result, ShowtimeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Name → opaque provider code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTable {
    codes: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TableFile {
    Wrapped(Vec<BTreeMap<String, String>>),
    Bare(BTreeMap<String, String>),
}

impl LocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and fixtures
    pub fn with_location(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
        self.codes.insert(name.into(), code.into());
        self
    }

    pub fn from_json_str(json: &str, file: &str) -> Result<Self> {
        let parsed: TableFile = serde_json::from_str(json).map_err(|e| ShowtimeError::ParseError {
            file: file.to_string(),
            reason: e.to_string(),
        })?;

        let codes = match parsed {
            TableFile::Bare(codes) => codes,
            TableFile::Wrapped(tables) => {
                tables
                    .into_iter()
                    .next()
                    .ok_or_else(|| ShowtimeError::ParseError {
                        file: file.to_string(),
                        reason: "empty location table".to_string(),
                    })?
            }
        };

        Ok(Self { codes })
    }

    /// Load a location table from disk
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&json, &path.display().to_string())?;
        debug!("Loaded {} locations from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn code(&self, name: &str) -> Option<&str> {
        self.codes.get(name).map(|c| c.as_str())
    }

    /// Like [`code`](Self::code), but an unknown name is a validation error
    pub fn require(&self, name: &str) -> Result<&str> {
        self.code(name)
            .ok_or_else(|| ShowtimeError::validation(format!("invalid location `{}`", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codes.contains_key(name)
    }

    /// Location names in ascending order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
