//! Core domain types for showtime aggregation.
//!
//! - `Record`: one raw showtime entry as an adapter produced it
//! - `GroupedTitle` / `TimelineEntry`: the per-movie view after finalize
//! - `TitleDetails` / `EnrichedTitle`: optional metadata attached afterwards
//!
//! All wire shapes use camelCase field names.

use crate::capacity::{Tier, classify};
use crate::error::{Result, ShowtimeError};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Rating
// =============================================================================

/// Audience classification attached to a showtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "ALL")]
    All,
    #[serde(rename = "12")]
    Twelve,
    #[serde(rename = "15")]
    Fifteen,
    #[serde(rename = "19")]
    Nineteen,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::All => "ALL",
            Rating::Twelve => "12",
            Rating::Fifteen => "15",
            Rating::Nineteen => "19",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = ShowtimeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ALL" => Ok(Rating::All),
            "12" => Ok(Rating::Twelve),
            "15" => Ok(Rating::Fifteen),
            "19" => Ok(Rating::Nineteen),
            _ => Err(ShowtimeError::validation(format!("unknown rating `{}`", s))),
        }
    }
}

// =============================================================================
// Record
// =============================================================================

/// One raw showtime: a single movie in a single hall at a single time.
///
/// Records are immutable once built. The only ways to get one are
/// [`RecordBuilder::build`] and strict deserialization, and both check the
/// same invariants:
/// - every field is present (`rating` may be null but must be given)
/// - `start`/`end` look like `HH:MM` (hours may run past 24)
/// - `available_seats <= total_seats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRecord")]
pub struct Record {
    title: String,
    cinema_info: String,
    hall_info: String,
    start: String,
    end: String,
    available_seats: u32,
    total_seats: u32,
    rating: Option<Rating>,
}

impl Record {
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    /// Parse a record from an untyped JSON object.
    ///
    /// Missing fields, extra fields, wrong types and broken invariants all
    /// come back as the same validation error.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| invalid_record(e.to_string()))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cinema_info(&self) -> &str {
        &self.cinema_info
    }

    pub fn hall_info(&self) -> &str {
        &self.hall_info
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn available_seats(&self) -> u32 {
        self.available_seats
    }

    pub fn total_seats(&self) -> u32 {
        self.total_seats
    }

    pub fn rating(&self) -> Option<Rating> {
        self.rating
    }

    pub fn tier(&self) -> Tier {
        classify(self.available_seats, self.total_seats)
    }

    /// Split into the grouping key, the rating and the timeline entry.
    pub(crate) fn into_parts(self) -> (String, Option<Rating>, TimelineEntry) {
        let entry = TimelineEntry {
            cinema_info: self.cinema_info,
            hall_info: self.hall_info,
            start: self.start,
            end: self.end,
            available_seats: self.available_seats,
            total_seats: self.total_seats,
        };
        (self.title, self.rating, entry)
    }
}

fn invalid_record(reason: impl fmt::Display) -> ShowtimeError {
    ShowtimeError::validation(format!("invalid record: {}", reason))
}

/// `H+:MM`, minutes below 60. Hours are unbounded so that late shows can be
/// written as `25:10`.
fn is_clock_time(s: &str) -> bool {
    let Some((hours, minutes)) = s.split_once(':') else {
        return false;
    };
    !hours.is_empty()
        && hours.bytes().all(|b| b.is_ascii_digit())
        && minutes.len() == 2
        && minutes.bytes().all(|b| b.is_ascii_digit())
        && minutes < "60"
}

fn validate(record: Record) -> Result<Record> {
    if !is_clock_time(&record.start) {
        return Err(invalid_record(format!("bad start time `{}`", record.start)));
    }
    if !is_clock_time(&record.end) {
        return Err(invalid_record(format!("bad end time `{}`", record.end)));
    }
    if record.available_seats > record.total_seats {
        return Err(invalid_record(format!(
            "{} seats available out of {}",
            record.available_seats, record.total_seats
        )));
    }
    Ok(record)
}

/// Wire form of a record: exactly the eight fields, nothing else.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawRecord {
    title: String,
    cinema_info: String,
    hall_info: String,
    start: String,
    end: String,
    available_seats: u32,
    total_seats: u32,
    // Present-but-null is fine, absent is not.
    #[serde(deserialize_with = "required_nullable")]
    rating: Option<Rating>,
}

fn required_nullable<'de, D>(deserializer: D) -> std::result::Result<Option<Rating>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Rating>::deserialize(deserializer)
}

impl TryFrom<RawRecord> for Record {
    type Error = ShowtimeError;

    fn try_from(raw: RawRecord) -> Result<Self> {
        validate(Record {
            title: raw.title,
            cinema_info: raw.cinema_info,
            hall_info: raw.hall_info,
            start: raw.start,
            end: raw.end,
            available_seats: raw.available_seats,
            total_seats: raw.total_seats,
            rating: raw.rating,
        })
    }
}

/// Named-field constructor for [`Record`].
///
/// Every setter must be called before `build`; forgetting one is a
/// validation error rather than a silently defaulted field.
///
/// ```ignore
/// let record = Record::builder()
///     .title("독전")
///     .cinema_info("CGV 강남")
///     .hall_info("2D 3관")
///     .start("21:30")
///     .end("23:35")
///     .available_seats(120)
///     .total_seats(180)
///     .rating(Some(Rating::Nineteen))
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    title: Option<String>,
    cinema_info: Option<String>,
    hall_info: Option<String>,
    start: Option<String>,
    end: Option<String>,
    available_seats: Option<u32>,
    total_seats: Option<u32>,
    rating: Option<Option<Rating>>,
}

impl RecordBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn cinema_info(mut self, cinema_info: impl Into<String>) -> Self {
        self.cinema_info = Some(cinema_info.into());
        self
    }

    pub fn hall_info(mut self, hall_info: impl Into<String>) -> Self {
        self.hall_info = Some(hall_info.into());
        self
    }

    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn available_seats(mut self, seats: u32) -> Self {
        self.available_seats = Some(seats);
        self
    }

    pub fn total_seats(mut self, seats: u32) -> Self {
        self.total_seats = Some(seats);
        self
    }

    /// Set the rating; `None` means the provider publishes no rating.
    pub fn rating(mut self, rating: Option<Rating>) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn build(self) -> Result<Record> {
        fn required<T>(value: Option<T>, field: &str) -> Result<T> {
            value.ok_or_else(|| invalid_record(format!("missing field `{}`", field)))
        }

        validate(Record {
            title: required(self.title, "title")?,
            cinema_info: required(self.cinema_info, "cinemaInfo")?,
            hall_info: required(self.hall_info, "hallInfo")?,
            start: required(self.start, "start")?,
            end: required(self.end, "end")?,
            available_seats: required(self.available_seats, "availableSeats")?,
            total_seats: required(self.total_seats, "totalSeats")?,
            rating: required(self.rating, "rating")?,
        })
    }
}

// =============================================================================
// Grouped view
// =============================================================================

/// One showing of a title, with the title itself stripped off
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub cinema_info: String,
    pub hall_info: String,
    pub start: String,
    pub end: String,
    pub available_seats: u32,
    pub total_seats: u32,
}

impl TimelineEntry {
    pub fn tier(&self) -> Tier {
        classify(self.available_seats, self.total_seats)
    }
}

/// All showings of one title after finalize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedTitle {
    pub title: String,
    /// First non-null rating seen among the title's records
    pub rating: Option<Rating>,
    /// Ascending by `start`; ties keep insertion order
    pub timeline: Vec<TimelineEntry>,
}

// =============================================================================
// Enrichment
// =============================================================================

/// External metadata for a title. `Default` is what a lookup miss yields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleDetails {
    pub title_english: String,
    pub genre: String,
    pub nationality: String,
    pub open_date: Option<NaiveDate>,
    pub directors: String,
}

impl TitleDetails {
    pub fn is_empty(&self) -> bool {
        *self == TitleDetails::default()
    }
}

/// A grouped title with its metadata; serializes as one flat object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedTitle {
    #[serde(flatten)]
    pub grouped: GroupedTitle,
    #[serde(flatten)]
    pub details: TitleDetails,
}
