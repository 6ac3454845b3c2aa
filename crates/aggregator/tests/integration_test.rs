//! Integration tests for the aggregator.
//!
//! Snapshot providers and a catalog enricher wired together the way the
//! command-line tool wires them.

use aggregator::{ShowtimeOrchestrator, ShowtimeRequest};
use chrono::NaiveDate;
use details::CatalogEnricher;
use providers::{LocationTable, SnapshotProvider};
use records::{Rating, SetState};
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn write_snapshot(root: &Path, code: &str, json: &str) {
    fs::create_dir_all(root.join(code)).unwrap();
    fs::write(root.join(code).join("2018-05-22.json"), json).unwrap();
}

fn create_test_setup() -> (tempfile::TempDir, ShowtimeOrchestrator) {
    let dir = tempfile::tempdir().unwrap();

    write_snapshot(
        &dir.path().join("cgv"),
        "0056",
        r#"[
            {"title": "독전", "cinemaInfo": "CGV 강남", "hallInfo": "2D 3관",
             "start": "21:30", "end": "23:35", "availableSeats": 12, "totalSeats": 180, "rating": null},
            {"title": "(더빙) 코코", "cinemaInfo": "CGV 강남", "hallInfo": "2D 1관",
             "start": "10:00", "end": "11:50", "availableSeats": 150, "totalSeats": 150, "rating": "ALL"}
        ]"#,
    );
    write_snapshot(
        &dir.path().join("megabox"),
        "1372",
        r#"[
            {"title": "독전", "cinemaInfo": "메가박스 강남", "hallInfo": "2D 2관",
             "start": "19:00", "end": "21:05", "availableSeats": 60, "totalSeats": 120, "rating": "19"}
        ]"#,
    );
    // Lotte serves 강남 too, but its snapshot is corrupt
    write_snapshot(&dir.path().join("lotci"), "1|1|1004", "not json");

    let catalog = CatalogEnricher::from_json_str(
        r#"{
            "독전": {"titleEnglish": "Believer", "genre": "범죄,액션", "nationality": "한국",
                     "openDate": "20180522", "directors": ["이해영"]},
            "코코": {"titleEnglish": "Coco", "genre": "애니메이션", "nationality": "미국",
                     "openDate": "20180111", "directors": ["리 언크리치", "아드리안 몰리나"]}
        }"#,
    )
    .unwrap()
    .with_ignored_prefix("(더빙) ");

    let orchestrator = ShowtimeOrchestrator::new()
        .with_provider(Arc::new(SnapshotProvider::new(
            "cgv",
            LocationTable::new().with_location("강남", "0056"),
            dir.path().join("cgv"),
        )))
        .with_provider(Arc::new(SnapshotProvider::new(
            "lotci",
            LocationTable::new().with_location("강남", "1|1|1004"),
            dir.path().join("lotci"),
        )))
        .with_provider(Arc::new(SnapshotProvider::new(
            "megabox",
            LocationTable::new().with_location("강남", "1372"),
            dir.path().join("megabox"),
        )))
        .with_enricher(Arc::new(catalog));

    (dir, orchestrator)
}

fn request() -> ShowtimeRequest {
    ShowtimeRequest::new("강남", NaiveDate::from_ymd_opt(2018, 5, 20).unwrap()).with_day(Some(22))
}

#[tokio::test]
async fn test_full_request_realistic() {
    let (_dir, orchestrator) = create_test_setup();

    let result = orchestrator.get_showtimes(&request()).await.unwrap();

    assert_eq!(result.contributed, vec!["cgv", "megabox"]);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].provider, "lotci");
    assert_eq!(result.showtimes.state(), SetState::Enriched);

    let enriched = result.showtimes.to_enriched_list().unwrap();
    assert_eq!(enriched.len(), 2);

    // "(" sorts before Hangul
    assert_eq!(enriched[0].grouped.title, "(더빙) 코코");
    assert_eq!(enriched[0].details.title_english, "Coco");
    assert_eq!(enriched[0].details.directors, "리 언크리치, 아드리안 몰리나");

    let dokjeon = &enriched[1];
    assert_eq!(dokjeon.grouped.rating, Some(Rating::Nineteen));
    let starts: Vec<&str> = dokjeon.grouped.timeline.iter().map(|t| t.start.as_str()).collect();
    assert_eq!(starts, vec!["19:00", "21:30"]);
    assert_eq!(dokjeon.details.nationality, "한국");
}

#[tokio::test]
async fn test_grouping_completeness_across_providers() {
    let (_dir, orchestrator) = create_test_setup();

    let result = orchestrator
        .get_showtimes(&request().with_enrich(false))
        .await
        .unwrap();

    let grouped = result.showtimes.to_grouped_list().unwrap();
    let total: usize = grouped.iter().map(|g| g.timeline.len()).sum();
    assert_eq!(total, 3);

    let titles: Vec<&str> = grouped.iter().map(|g| g.title.as_str()).collect();
    let mut sorted = titles.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(titles, sorted);
}

#[tokio::test]
async fn test_enriched_json_shape() {
    let (_dir, orchestrator) = create_test_setup();

    let result = orchestrator.get_showtimes(&request()).await.unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&result.showtimes.to_json().unwrap()).unwrap();

    assert_eq!(value[1]["title"], "독전");
    assert_eq!(value[1]["titleEnglish"], "Believer");
    assert_eq!(value[1]["openDate"], "2018-05-22");
    assert_eq!(value[1]["timeline"][0]["cinemaInfo"], "메가박스 강남");
}
