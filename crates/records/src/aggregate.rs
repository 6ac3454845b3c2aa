//! Grouping raw records into per-title timelines.
//!
//! Runs once, inside `RecordSet::finalize`:
//! 1. Partition records by exact title
//! 2. Walk titles in ascending order (BTreeMap keys)
//! 3. Keep the first non-null rating, turn each record into a timeline entry
//! 4. Stable-sort each timeline by `start`
//!
//! `start` is compared as a string. `"25:10"` sorts after `"23:00"`, which is
//! what providers mean by it, but `"9:00"` would sort after `"10:00"`.

use crate::types::{GroupedTitle, Record};
use std::collections::BTreeMap;
use tracing::debug;

/// Group `records` by title. Total over any well-formed input.
pub fn group_by_title(records: Vec<Record>) -> Vec<GroupedTitle> {
    let record_count = records.len();
    let mut groups: BTreeMap<String, GroupedTitle> = BTreeMap::new();

    for record in records {
        let (title, rating, entry) = record.into_parts();
        let group = groups
            .entry(title)
            .or_insert_with_key(|title| GroupedTitle {
                title: title.clone(),
                rating: None,
                timeline: Vec::new(),
            });

        if group.rating.is_none() {
            group.rating = rating;
        }
        group.timeline.push(entry);
    }

    let grouped: Vec<GroupedTitle> = groups
        .into_values()
        .map(|mut group| {
            // sort_by is stable: equal start times keep insertion order
            group.timeline.sort_by(|a, b| a.start.cmp(&b.start));
            group
        })
        .collect();

    debug!(
        "Grouped {} records into {} titles",
        record_count,
        grouped.len()
    );

    grouped
}
