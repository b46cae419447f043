//! Analytics over a user's entries in a date range.
//!
//! Every function here works on rows already fetched by
//! [`JournalStorage::entries_between`](crate::journal_storage::JournalStorage::entries_between),
//! the storage layer only filters by user and range.

use crate::{dates, journal_storage::EntryStats};
use std::collections::BTreeMap;
use time::Date;

/// Half-open day range, `start <= day < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("startDate and endDate are required")]
    Missing,

    #[error("Invalid date {0:?}, expected YYYY-MM-DD")]
    Malformed(String),

    #[error("startDate must not be after endDate")]
    Reversed,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct RangeQuery {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, RangeError> {
        if start > end {
            Err(RangeError::Reversed)
        } else {
            Ok(Self { start, end })
        }
    }

    pub fn from_query(query: &RangeQuery) -> Result<Self, RangeError> {
        let parse = |s: &str| dates::parse_day(s).map_err(|_| RangeError::Malformed(s.to_owned()));
        match (non_empty(&query.start_date), non_empty(&query.end_date)) {
            (Some(start), Some(end)) => Self::new(parse(start)?, parse(end)?),
            _ => Err(RangeError::Missing),
        }
    }

    /// The `days` days up to and including `today`.
    pub fn trailing(today: Date, days: i64) -> Self {
        let end = today.next_day().unwrap_or(today);
        let start = end
            .checked_sub(time::Duration::days(days))
            .unwrap_or(Date::MIN);
        Self { start, end }
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub const NO_DATA: &str = "No data";
pub const UNKNOWN_SENTIMENT: &str = "Unknown";
pub const WORD_COUNT_SERIES: &str = "word_count";

#[derive(Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregates {
    pub total_entries: u64,
    pub avg_word_count: u64,
    pub most_used_category: String,
}

/// A single bucket, named the way the dashboard charts expect it.
#[derive(Debug, PartialEq, Eq, serde::Serialize)]
pub struct Count {
    pub id: String,
    pub value: u64,
}

#[derive(Debug, PartialEq, Eq, serde::Serialize)]
pub struct DayCount {
    pub day: String,
    pub value: u64,
}

#[derive(Debug, PartialEq, Eq, serde::Serialize)]
pub struct Point {
    pub x: String,
    pub y: u64,
}

#[derive(Debug, PartialEq, Eq, serde::Serialize)]
pub struct Series {
    pub id: &'static str,
    pub data: Vec<Point>,
}

pub fn word_count(content: &str) -> u64 {
    content.split_whitespace().count() as u64
}

pub fn aggregates(entries: &[EntryStats]) -> Aggregates {
    let total_entries = entries.len() as u64;
    let words: u64 = entries.iter().map(|e| word_count(&e.content)).sum();
    let avg_word_count = if total_entries == 0 {
        0
    } else {
        (words as f64 / total_entries as f64).round() as u64
    };

    let most_used_category = ranked(tally(entries.iter().map(|e| e.category.as_str())))
        .into_iter()
        .next()
        .map(|c| c.id)
        .unwrap_or_else(|| NO_DATA.to_owned());

    Aggregates {
        total_entries,
        avg_word_count,
        most_used_category,
    }
}

pub fn entry_frequency(entries: &[EntryStats]) -> Vec<DayCount> {
    tally(entries.iter().map(|e| dates::day_of(&e.created_at)))
        .into_iter()
        .map(|(day, value)| DayCount {
            day: day.to_owned(),
            value,
        })
        .collect()
}

/// Includes every category in `categories`, even those without entries.
pub fn category_distribution<'a>(
    categories: impl IntoIterator<Item = &'a str>,
    entries: &'a [EntryStats],
) -> Vec<Count> {
    let mut counts = categories
        .into_iter()
        .map(|name| (name, 0))
        .collect::<BTreeMap<_, _>>();
    for entry in entries {
        *counts.entry(entry.category.as_str()).or_insert(0) += 1;
    }
    ranked(counts)
}

pub fn sentiment_summary(entries: &[EntryStats]) -> Vec<Count> {
    let labels = entries
        .iter()
        .map(|e| {
            e.sentiment
                .as_deref()
                .map(capitalize)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_SENTIMENT.to_owned())
        })
        .collect::<Vec<_>>();
    ranked(tally(labels.iter().map(String::as_str)))
}

pub fn word_count_trends(entries: &[EntryStats]) -> Vec<Series> {
    let mut per_day = BTreeMap::new();
    for entry in entries {
        *per_day.entry(dates::day_of(&entry.created_at)).or_insert(0) += word_count(&entry.content);
    }

    vec![Series {
        id: WORD_COUNT_SERIES,
        data: per_day
            .into_iter()
            .map(|(day, y)| Point {
                x: day.to_owned(),
                y,
            })
            .collect(),
    }]
}

/// Uppercases the first letter of every word and lowercases the rest.
pub fn capitalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word_start = true;
    for c in s.trim().chars() {
        if c.is_alphanumeric() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}

fn tally<'a>(items: impl Iterator<Item = &'a str>) -> BTreeMap<&'a str, u64> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

/// Highest count first, ties by name.
fn ranked(counts: BTreeMap<&str, u64>) -> Vec<Count> {
    let mut ret = counts
        .into_iter()
        .map(|(id, value)| Count {
            id: id.to_owned(),
            value,
        })
        .collect::<Vec<_>>();
    // stable, so equal counts keep the map's name order
    ret.sort_by(|a, b| b.value.cmp(&a.value));
    ret
}

#[cfg(test)]
mod test {
    use super::*;
    use time::macros::date;

    fn stats(created_at: &str, category: &str, sentiment: Option<&str>, content: &str) -> EntryStats {
        EntryStats {
            created_at: created_at.to_owned(),
            category: category.to_owned(),
            sentiment: sentiment.map(str::to_owned),
            content: content.to_owned(),
        }
    }

    fn fixture() -> Vec<EntryStats> {
        vec![
            stats("2024-01-01 08:00:00", "Work", Some("joy"), "shipped the release"),
            stats("2024-01-01 21:00:00", "Personal", Some("neutral"), "quiet  evening\n"),
            stats("2024-01-03 10:00:00", "Work", Some("JOY"), "more work"),
            stats("2024-01-04 10:00:00", "Health", None, "ran five kilometres today"),
        ]
    }

    fn query(start: Option<&str>, end: Option<&str>) -> RangeQuery {
        RangeQuery {
            start_date: start.map(str::to_owned),
            end_date: end.map(str::to_owned),
        }
    }

    #[test]
    fn range_from_query() {
        assert_eq!(
            DateRange::from_query(&query(Some("2024-01-01"), Some("2024-02-01"))),
            Ok(DateRange {
                start: date!(2024 - 01 - 01),
                end: date!(2024 - 02 - 01)
            })
        );
        assert_eq!(
            DateRange::from_query(&query(Some("2024-01-01"), None)),
            Err(RangeError::Missing)
        );
        assert_eq!(
            DateRange::from_query(&query(Some(""), Some("2024-01-01"))),
            Err(RangeError::Missing)
        );
        assert_eq!(
            DateRange::from_query(&query(Some("01/01/2024"), Some("2024-01-01"))),
            Err(RangeError::Malformed("01/01/2024".to_owned()))
        );
        assert_eq!(
            DateRange::from_query(&query(Some("2024-02-01"), Some("2024-01-01"))),
            Err(RangeError::Reversed)
        );
    }

    #[test]
    fn trailing_range_includes_today() {
        let range = DateRange::trailing(date!(2024 - 03 - 10), 30);
        assert_eq!(range.end, date!(2024 - 03 - 11));
        assert_eq!(range.start, date!(2024 - 02 - 10));
    }

    #[test]
    fn aggregates_over_entries() {
        assert_eq!(
            aggregates(&fixture()),
            Aggregates {
                total_entries: 4,
                // 3 + 2 + 2 + 4 = 11 words
                avg_word_count: 3,
                most_used_category: "Work".to_owned(),
            }
        );
    }

    #[test]
    fn aggregates_without_entries() {
        assert_eq!(
            aggregates(&[]),
            Aggregates {
                total_entries: 0,
                avg_word_count: 0,
                most_used_category: NO_DATA.to_owned(),
            }
        );
    }

    #[test]
    fn frequency_per_day() {
        assert_eq!(
            entry_frequency(&fixture()),
            vec![
                DayCount {
                    day: "2024-01-01".to_owned(),
                    value: 2
                },
                DayCount {
                    day: "2024-01-03".to_owned(),
                    value: 1
                },
                DayCount {
                    day: "2024-01-04".to_owned(),
                    value: 1
                },
            ]
        );
    }

    #[test]
    fn distribution_keeps_empty_categories() {
        let dist = category_distribution(
            vec!["Gratitude", "Health", "Personal", "Work"],
            &fixture(),
        );
        let pairs = dist
            .iter()
            .map(|c| (c.id.as_str(), c.value))
            .collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![("Work", 2), ("Health", 1), ("Personal", 1), ("Gratitude", 0)]
        );
    }

    #[test]
    fn sentiments_are_capitalized_and_merged() {
        let pairs = sentiment_summary(&fixture())
            .into_iter()
            .map(|c| (c.id, c.value))
            .collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![
                ("Joy".to_owned(), 2),
                ("Neutral".to_owned(), 1),
                ("Unknown".to_owned(), 1)
            ]
        );
    }

    #[test]
    fn word_trends() {
        let series = word_count_trends(&fixture());
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].id, "word_count");
        assert_eq!(
            series[0].data,
            vec![
                Point {
                    x: "2024-01-01".to_owned(),
                    y: 5
                },
                Point {
                    x: "2024-01-03".to_owned(),
                    y: 2
                },
                Point {
                    x: "2024-01-04".to_owned(),
                    y: 4
                },
            ]
        );
    }

    #[test]
    fn json_shapes() {
        let json = serde_json::to_value(aggregates(&fixture())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totalEntries": 4,
                "avgWordCount": 3,
                "mostUsedCategory": "Work"
            })
        );
    }

    #[test]
    fn capitalize_words() {
        assert_eq!(capitalize("joy"), "Joy");
        assert_eq!(capitalize("NEUTRAL"), "Neutral");
        assert_eq!(capitalize("deep sadness"), "Deep Sadness");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn words() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  one\ttwo\n three  "), 3);
    }
}
