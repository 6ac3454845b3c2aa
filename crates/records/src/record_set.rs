//! The accumulate-then-freeze container for showtimes.
//!
//! A `RecordSet` moves through three states and never back:
//!
//! ```text
//! Open ──finalize──▶ Finalized ──enrich──▶ Enriched
//! ```
//!
//! - `Open`: raw records; `push` and `merge` append
//! - `Finalized`: records replaced by per-title timelines (see `aggregate`)
//! - `Enriched`: timelines plus external metadata
//!
//! Each state owns its own data, so there is no way to read grouped output
//! from an open set or raw records from a finalized one. Operations called in
//! the wrong state return `ShowtimeError::State`.

use crate::aggregate::group_by_title;
use crate::enrich::{DetailEnricher, attach_details};
use crate::error::{Result, ShowtimeError};
use crate::types::{EnrichedTitle, GroupedTitle, Record};
use tracing::{debug, instrument};

/// Lifecycle state of a `RecordSet`, holding that state's data
#[derive(Debug, Clone, PartialEq, Eq)]
enum Contents {
    Open(Vec<Record>),
    Finalized(Vec<GroupedTitle>),
    Enriched(Vec<EnrichedTitle>),
}

/// Name of a `RecordSet` state, for callers that want to branch on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetState {
    Open,
    Finalized,
    Enriched,
}

/// Showtime records gathered from one or more providers.
///
/// `merge` takes `&mut self` and consumes the other set, so two adapters can
/// never append into the same instance at once: accumulate per adapter, then
/// fold the results on one thread before calling `finalize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    contents: Contents,
}

impl RecordSet {
    /// Create an empty, open set
    pub fn new() -> Self {
        Self {
            contents: Contents::Open(Vec::new()),
        }
    }

    /// Create an open set holding a single record
    pub fn from_record(record: Record) -> Self {
        Self {
            contents: Contents::Open(vec![record]),
        }
    }

    /// Create an open set from records already in hand
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            contents: Contents::Open(records),
        }
    }

    /// Parse a raw list (the pre-finalize wire shape) into an open set.
    ///
    /// Every element goes through strict record validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| ShowtimeError::validation(format!("invalid record list: {}", e)))?;
        let records = values
            .into_iter()
            .map(Record::from_json_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_records(records))
    }

    pub fn state(&self) -> SetState {
        match self.contents {
            Contents::Open(_) => SetState::Open,
            Contents::Finalized(_) => SetState::Finalized,
            Contents::Enriched(_) => SetState::Enriched,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.state() != SetState::Open
    }

    /// Number of records while open, number of titles afterwards
    pub fn len(&self) -> usize {
        match &self.contents {
            Contents::Open(records) => records.len(),
            Contents::Finalized(grouped) => grouped.len(),
            Contents::Enriched(enriched) => enriched.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a single record
    pub fn push(&mut self, record: Record) -> Result<()> {
        match &mut self.contents {
            Contents::Open(records) => {
                records.push(record);
                Ok(())
            }
            _ => Err(ShowtimeError::state("cannot append after finalize")),
        }
    }

    /// Append all of `other`'s records, in order, and return `self`.
    ///
    /// Both sets must still be open. On error `self` is left untouched.
    pub fn merge(&mut self, other: RecordSet) -> Result<&mut Self> {
        let Contents::Open(incoming) = other.contents else {
            return Err(ShowtimeError::state("cannot merge after finalize"));
        };
        let Contents::Open(records) = &mut self.contents else {
            return Err(ShowtimeError::state("cannot merge after finalize"));
        };

        records.extend(incoming);
        Ok(self)
    }

    /// Group the records by title and freeze the set.
    #[instrument(skip(self))]
    pub fn finalize(&mut self) -> Result<()> {
        let records = match &mut self.contents {
            Contents::Open(records) => std::mem::take(records),
            _ => return Err(ShowtimeError::state("record set is already finalized")),
        };

        debug!("Finalizing {} records", records.len());
        self.contents = Contents::Finalized(group_by_title(records));
        Ok(())
    }

    /// Attach metadata from `enricher` to every title.
    ///
    /// Only valid once finalized, and only once. Lookup misses and enricher
    /// failures leave the metadata empty; they do not fail this call.
    #[instrument(skip(self, enricher), fields(enricher = enricher.name()))]
    pub fn enrich(&mut self, enricher: &dyn DetailEnricher) -> Result<()> {
        let grouped = match &mut self.contents {
            Contents::Finalized(grouped) => std::mem::take(grouped),
            Contents::Open(_) => {
                return Err(ShowtimeError::state("cannot enrich before finalize"));
            }
            Contents::Enriched(_) => {
                return Err(ShowtimeError::state("record set is already enriched"));
            }
        };

        self.contents = Contents::Enriched(attach_details(grouped, enricher));
        Ok(())
    }

    /// Raw records, in insertion order. Only available while open.
    pub fn to_raw_list(&self) -> Result<&[Record]> {
        match &self.contents {
            Contents::Open(records) => Ok(records),
            _ => Err(ShowtimeError::state(
                "raw records are gone once the set is finalized",
            )),
        }
    }

    /// Consume an open set and hand back its records
    pub fn into_raw_list(self) -> Result<Vec<Record>> {
        match self.contents {
            Contents::Open(records) => Ok(records),
            _ => Err(ShowtimeError::state(
                "raw records are gone once the set is finalized",
            )),
        }
    }

    /// Grouped titles, ascending by title. Requires `finalize` first.
    pub fn to_grouped_list(&self) -> Result<Vec<&GroupedTitle>> {
        match &self.contents {
            Contents::Finalized(grouped) => Ok(grouped.iter().collect()),
            Contents::Enriched(enriched) => Ok(enriched.iter().map(|e| &e.grouped).collect()),
            Contents::Open(_) => Err(ShowtimeError::state(
                "grouped view requires finalize first",
            )),
        }
    }

    /// Grouped titles with metadata. Requires `enrich` first.
    pub fn to_enriched_list(&self) -> Result<&[EnrichedTitle]> {
        match &self.contents {
            Contents::Enriched(enriched) => Ok(enriched),
            _ => Err(ShowtimeError::state("enriched view requires enrich first")),
        }
    }

    /// Serialize whichever shape the current state holds
    pub fn to_json(&self) -> Result<String> {
        let json = match &self.contents {
            Contents::Open(records) => serde_json::to_string(records)?,
            Contents::Finalized(grouped) => serde_json::to_string(grouped)?,
            Contents::Enriched(enriched) => serde_json::to_string(enriched)?,
        };
        Ok(json)
    }
}

impl Default for RecordSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Rating, TitleDetails};
    use anyhow::Result as AnyResult;
    use serde_json::json;
    use std::collections::{BTreeSet, HashMap};

    fn record(title: &str, start: &str, rating: Option<Rating>) -> Record {
        Record::builder()
            .title(title)
            .cinema_info("롯데시네마 월드타워")
            .hall_info("2D 1관")
            .start(start)
            .end("23:00")
            .available_seats(50)
            .total_seats(100)
            .rating(rating)
            .build()
            .unwrap()
    }

    fn set(records: &[(&str, &str)]) -> RecordSet {
        RecordSet::from_records(records.iter().map(|(t, s)| record(t, s, None)).collect())
    }

    struct NoMetadata;

    impl DetailEnricher for NoMetadata {
        fn name(&self) -> &str {
            "none"
        }

        fn lookup(&self, _titles: &BTreeSet<String>) -> AnyResult<HashMap<String, TitleDetails>> {
            Ok(HashMap::new())
        }
    }

    #[test]
    fn test_empty_set() {
        let mut set = RecordSet::new();
        assert!(set.is_empty());
        assert_eq!(set.state(), SetState::Open);

        set.finalize().unwrap();
        assert!(set.to_grouped_list().unwrap().is_empty());
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let mut a = set(&[("a1", "10:00"), ("a2", "10:00")]);
        let b = set(&[("b1", "10:00")]);
        let c = set(&[("c1", "10:00"), ("c2", "10:00")]);

        a.merge(b).unwrap().merge(c).unwrap();

        let titles: Vec<&str> = a.to_raw_list().unwrap().iter().map(|r| r.title()).collect();
        assert_eq!(titles, vec!["a1", "a2", "b1", "c1", "c2"]);
    }

    #[test]
    fn test_merge_associativity() {
        let build = || {
            (
                set(&[("x", "10:00")]),
                set(&[("y", "11:00"), ("z", "12:00")]),
                set(&[("w", "09:00")]),
            )
        };

        let (mut a, b, c) = build();
        a.merge(b).unwrap();
        a.merge(c).unwrap();

        let (mut a2, mut b2, c2) = build();
        b2.merge(c2).unwrap();
        a2.merge(b2).unwrap();

        assert_eq!(a.to_raw_list().unwrap(), a2.to_raw_list().unwrap());
    }

    #[test]
    fn test_merge_after_finalize_fails() {
        let mut finalized = set(&[("a", "10:00")]);
        finalized.finalize().unwrap();

        let err = finalized.merge(set(&[("b", "10:00")])).unwrap_err();
        assert!(err.is_state());
        assert!(err.to_string().contains("cannot merge after finalize"));

        // Finalized operand on the right is rejected too, and the left side
        // is left as it was.
        let mut open = set(&[("c", "10:00")]);
        let mut other = set(&[("d", "10:00")]);
        other.finalize().unwrap();
        assert!(open.merge(other).unwrap_err().is_state());
        assert_eq!(open.len(), 1);
    }

    #[test]
    fn test_push_after_finalize_fails() {
        let mut set = RecordSet::new();
        set.push(record("a", "10:00", None)).unwrap();
        set.finalize().unwrap();
        assert!(set.push(record("b", "10:00", None)).unwrap_err().is_state());
    }

    #[test]
    fn test_finalize_twice_fails() {
        let mut set = set(&[("a", "10:00")]);
        set.finalize().unwrap();
        assert!(set.finalize().unwrap_err().is_state());
        assert_eq!(set.state(), SetState::Finalized);
    }

    #[test]
    fn test_grouped_read_before_finalize_fails() {
        let set = set(&[("a", "10:00")]);
        assert!(set.to_grouped_list().unwrap_err().is_state());
        assert!(set.to_enriched_list().unwrap_err().is_state());
    }

    #[test]
    fn test_raw_read_after_finalize_fails() {
        let mut set = set(&[("a", "10:00")]);
        set.finalize().unwrap();
        assert!(set.to_raw_list().unwrap_err().is_state());
    }

    #[test]
    fn test_finalize_groups_and_sorts() {
        let mut set = RecordSet::from_records(vec![
            record("코코", "19:00", None),
            record("독전", "21:30", None),
            record("독전", "10:00", Some(Rating::Twelve)),
            record("독전", "12:00", Some(Rating::Fifteen)),
        ]);
        set.finalize().unwrap();

        let grouped = set.to_grouped_list().unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].title, "독전");
        assert_eq!(grouped[0].rating, Some(Rating::Twelve));

        let starts: Vec<&str> = grouped[0].timeline.iter().map(|t| t.start.as_str()).collect();
        assert_eq!(starts, vec!["10:00", "12:00", "21:30"]);

        let total: usize = grouped.iter().map(|g| g.timeline.len()).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_enrich_lifecycle() {
        let mut set = set(&[("Unknown Film", "10:00")]);
        assert!(set.enrich(&NoMetadata).unwrap_err().is_state());

        set.finalize().unwrap();
        set.enrich(&NoMetadata).unwrap();
        assert_eq!(set.state(), SetState::Enriched);

        let enriched = set.to_enriched_list().unwrap();
        assert_eq!(enriched[0].grouped.title, "Unknown Film");
        assert!(enriched[0].details.is_empty());

        // Still readable as grouped, but terminal
        assert_eq!(set.to_grouped_list().unwrap().len(), 1);
        assert!(set.enrich(&NoMetadata).unwrap_err().is_state());
        assert!(set.finalize().unwrap_err().is_state());
        assert!(set.merge(RecordSet::new()).unwrap_err().is_state());
    }

    #[test]
    fn test_json_shapes_follow_state() {
        let mut set = RecordSet::from_record(record("독전", "10:00", Some(Rating::Nineteen)));

        let raw: serde_json::Value = serde_json::from_str(&set.to_json().unwrap()).unwrap();
        assert_eq!(raw[0]["title"], json!("독전"));
        assert_eq!(raw[0]["cinemaInfo"], json!("롯데시네마 월드타워"));

        set.finalize().unwrap();
        let grouped: serde_json::Value = serde_json::from_str(&set.to_json().unwrap()).unwrap();
        assert_eq!(grouped[0]["rating"], json!("19"));
        assert_eq!(grouped[0]["timeline"][0]["start"], json!("10:00"));
        assert!(grouped[0]["timeline"][0].get("title").is_none());
    }

    #[test]
    fn test_from_json_validates_each_record() {
        let good = r#"[{"title":"버닝","cinemaInfo":"CGV 강남","hallInfo":"2D 1관",
            "start":"10:00","end":"12:28","availableSeats":3,"totalSeats":90,"rating":null}]"#;
        assert_eq!(RecordSet::from_json(good).unwrap().len(), 1);

        let partial = r#"[{"title":"버닝","cinemaInfo":"CGV 강남"}]"#;
        assert!(RecordSet::from_json(partial).unwrap_err().is_validation());

        assert!(RecordSet::from_json("{}").unwrap_err().is_validation());
    }
}
