//! Console rendering for search results.

use colored::{ColoredString, Colorize};
use records::{EnrichedTitle, GroupedTitle, Rating, Tier, TimelineEntry, TitleDetails};

/// Rating shown as a short colored badge
pub fn rating_badge(rating: Option<Rating>) -> ColoredString {
    match rating {
        Some(Rating::All) => " ALL ".on_green().black(),
        Some(Rating::Twelve) => " 12 ".on_blue().white(),
        Some(Rating::Fifteen) => " 15 ".on_yellow().black(),
        Some(Rating::Nineteen) => " 19 ".on_red().white(),
        None => " - ".dimmed(),
    }
}

/// `available/total` colored by tier
pub fn seats(entry: &TimelineEntry) -> ColoredString {
    let text = format!("{}/{}", entry.available_seats, entry.total_seats);
    match entry.tier() {
        Tier::Low => text.red(),
        Tier::Medium => text.yellow(),
        Tier::High => text.blue(),
    }
}

pub fn timeline_line(entry: &TimelineEntry) -> String {
    format!(
        "  {}~{}  {}  {}  {}",
        entry.start.bold(),
        entry.end,
        entry.cinema_info,
        entry.hall_info.dimmed(),
        seats(entry)
    )
}

fn details_line(details: &TitleDetails) -> Option<String> {
    if details.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    if !details.title_english.is_empty() {
        parts.push(details.title_english.italic().to_string());
    }
    for field in [&details.genre, &details.nationality, &details.directors] {
        if !field.is_empty() {
            parts.push(field.clone());
        }
    }
    if let Some(open_date) = details.open_date {
        parts.push(format!("opened {}", open_date));
    }
    Some(format!("  {}", parts.join(" · ")))
}

pub fn grouped_block(title: &GroupedTitle, details: Option<&TitleDetails>) -> String {
    let mut lines = vec![format!(
        "{} {} ({} showings)",
        rating_badge(title.rating),
        title.title.bold(),
        title.timeline.len()
    )];
    if let Some(line) = details.and_then(details_line) {
        lines.push(line);
    }
    lines.extend(title.timeline.iter().map(timeline_line));
    lines.join("\n")
}

pub fn print_grouped(titles: &[&GroupedTitle]) {
    for title in titles {
        println!("{}\n", grouped_block(title, None));
    }
}

pub fn print_enriched(titles: &[EnrichedTitle]) {
    for title in titles {
        println!("{}\n", grouped_block(&title.grouped, Some(&title.details)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(start: &str, available: u32, total: u32) -> TimelineEntry {
        TimelineEntry {
            cinema_info: "CGV 강남".to_string(),
            hall_info: "2D 3관".to_string(),
            start: start.to_string(),
            end: "23:35".to_string(),
            available_seats: available,
            total_seats: total,
        }
    }

    #[test]
    fn test_block_lists_every_showing() {
        colored::control::set_override(false);

        let title = GroupedTitle {
            title: "독전".to_string(),
            rating: Some(Rating::Nineteen),
            timeline: vec![entry("19:00", 10, 100), entry("21:30", 90, 100)],
        };
        let block = grouped_block(&title, None);

        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], " 19  독전 (2 showings)");
        assert!(lines[1].contains("19:00~23:35"));
        assert!(lines[1].ends_with("10/100"));
        assert!(lines[2].ends_with("90/100"));
    }

    #[test]
    fn test_details_line_skips_empty_fields() {
        colored::control::set_override(false);

        assert!(details_line(&TitleDetails::default()).is_none());

        let details = TitleDetails {
            title_english: "Believer".to_string(),
            genre: "범죄".to_string(),
            nationality: String::new(),
            open_date: NaiveDate::from_ymd_opt(2018, 5, 22),
            directors: "이해영".to_string(),
        };
        assert_eq!(
            details_line(&details).unwrap(),
            "  Believer · 범죄 · 이해영 · opened 2018-05-22"
        );
    }

    #[test]
    fn test_missing_rating_badge() {
        colored::control::set_override(false);
        assert_eq!(rating_badge(None).to_string(), " - ");
        assert_eq!(rating_badge(Some(Rating::All)).to_string(), " ALL ");
    }
}
