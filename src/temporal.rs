//! Timestamp parsing and creation-time predicates over extracted items.
//!
//! Every comparison happens on UTC `OffsetDateTime` values. Two renderings
//! of the same instant (`Z` vs `+00:00`, with or without fractional
//! seconds) must compare equal, which plain string comparison can't give.

use clap::ValueEnum;
use serde::{de, Deserialize, Deserializer, Serialize};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::error::{Error, Result};

const DATE_ONLY_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

fn parse_instant(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    let parsed = OffsetDateTime::parse(value, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(value, &Iso8601::DEFAULT))
        .ok()
        .or_else(|| {
            Date::parse(value, DATE_ONLY_FORMAT)
                .ok()
                .map(|date| date.midnight().assume_utc())
        })?;
    Some(parsed.to_offset(UtcOffset::UTC))
}

/// Parses a caller-supplied bound such as `2024-01-01T00:00:00Z` or
/// `2024-01-01` (midnight UTC).
pub fn parse_bound(value: &str) -> Result<OffsetDateTime> {
    parse_instant(value)
        .ok_or_else(|| Error::configuration(format!("'{value}' is not an ISO-8601 timestamp")))
}

/// Renders an instant the way the provider expects date arguments.
pub fn format_instant(instant: OffsetDateTime) -> Result<String> {
    instant
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|err| Error::configuration(format!("can't format {instant}: {err}")))
}

/// Serde helper for provider timestamps.
pub fn deserialize_instant<'de, D>(deserializer: D) -> std::result::Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_instant(&raw)
        .ok_or_else(|| de::Error::custom(format!("'{raw}' is not an ISO-8601 timestamp")))
}

pub fn serialize_instant<S>(instant: &OffsetDateTime, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let rendered = instant
        .format(&Rfc3339)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&rendered)
}

/// Anything with a creation instant.
pub trait Created {
    fn created_at(&self) -> OffsetDateTime;
}

/// What the caller knows about the order of an item list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanOrder {
    /// No ordering guarantee; every item is inspected.
    #[default]
    Unordered,
    /// The list is sorted newest first by `createdAt`. Counting then uses a
    /// binary partition instead of a full scan. Results are wrong for lists
    /// that are not actually in this order.
    NewestFirst,
}

/// Items created strictly before `cutoff`.
pub fn count_before<T: Created>(items: &[T], cutoff: OffsetDateTime) -> usize {
    count_before_with(items, cutoff, ScanOrder::Unordered)
}

/// Items created strictly after `cutoff`.
pub fn count_after<T: Created>(items: &[T], cutoff: OffsetDateTime) -> usize {
    count_after_with(items, cutoff, ScanOrder::Unordered)
}

/// Items created in `[start, end)`.
pub fn count_between<T: Created>(items: &[T], start: OffsetDateTime, end: OffsetDateTime) -> usize {
    count_between_with(items, start, end, ScanOrder::Unordered)
}

pub fn count_before_with<T: Created>(items: &[T], cutoff: OffsetDateTime, order: ScanOrder) -> usize {
    match order {
        ScanOrder::Unordered => items.iter().filter(|i| i.created_at() < cutoff).count(),
        ScanOrder::NewestFirst => {
            items.len() - items.partition_point(|i| i.created_at() >= cutoff)
        }
    }
}

pub fn count_after_with<T: Created>(items: &[T], cutoff: OffsetDateTime, order: ScanOrder) -> usize {
    match order {
        ScanOrder::Unordered => items.iter().filter(|i| i.created_at() > cutoff).count(),
        ScanOrder::NewestFirst => items.partition_point(|i| i.created_at() > cutoff),
    }
}

pub fn count_between_with<T: Created>(
    items: &[T],
    start: OffsetDateTime,
    end: OffsetDateTime,
    order: ScanOrder,
) -> usize {
    match order {
        ScanOrder::Unordered => items
            .iter()
            .filter(|i| {
                let created = i.created_at();
                created >= start && created < end
            })
            .count(),
        ScanOrder::NewestFirst => {
            let not_before_start = items.partition_point(|i| i.created_at() >= start);
            let not_before_end = items.partition_point(|i| i.created_at() >= end);
            not_before_start.saturating_sub(not_before_end)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Before,
    After,
    Between,
}

/// Creation-time filter used by the repository rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Before(OffsetDateTime),
    After(OffsetDateTime),
    /// Inclusive start, exclusive end.
    Between {
        start: OffsetDateTime,
        end: OffsetDateTime,
    },
}

impl TimeWindow {
    pub fn new(
        direction: Direction,
        start: OffsetDateTime,
        end: Option<OffsetDateTime>,
    ) -> Result<Self> {
        match direction {
            Direction::Before => Ok(TimeWindow::Before(start)),
            Direction::After => Ok(TimeWindow::After(start)),
            Direction::Between => {
                let end = end.ok_or_else(|| {
                    Error::configuration("a 'between' window needs an end bound")
                })?;
                if end < start {
                    return Err(Error::configuration(format!(
                        "window end {end} is earlier than start {start}"
                    )));
                }
                Ok(TimeWindow::Between { start, end })
            }
        }
    }

    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        match *self {
            TimeWindow::Before(cutoff) => instant < cutoff,
            TimeWindow::After(cutoff) => instant > cutoff,
            TimeWindow::Between { start, end } => instant >= start && instant < end,
        }
    }

    pub fn count<T: Created>(&self, items: &[T]) -> usize {
        match *self {
            TimeWindow::Before(cutoff) => count_before(items, cutoff),
            TimeWindow::After(cutoff) => count_after(items, cutoff),
            TimeWindow::Between { start, end } => count_between(items, start, end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::Duration;

    struct Item(OffsetDateTime);

    impl Created for Item {
        fn created_at(&self) -> OffsetDateTime {
            self.0
        }
    }

    fn newest_first() -> Vec<Item> {
        vec![
            Item(datetime!(2023-10-28 10:00 UTC)),
            Item(datetime!(2023-10-27 9:00 UTC)),
            Item(datetime!(2023-10-26 8:00 UTC)),
        ]
    }

    #[test]
    fn test_parse_normalizes_renderings() {
        let zulu = parse_bound("2023-10-28T10:00:00Z").unwrap();
        let offset = parse_bound("2023-10-28T12:00:00+02:00").unwrap();
        let fractional = parse_bound("2023-10-28T10:00:00.000Z").unwrap();
        assert_eq!(zulu, offset);
        assert_eq!(zulu, fractional);
        assert_eq!(zulu.offset(), UtcOffset::UTC);
    }

    #[test]
    fn test_parse_date_only_is_midnight_utc() {
        assert_eq!(
            parse_bound("2022-01-01").unwrap(),
            datetime!(2022-01-01 0:00 UTC)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_bound("yesterday"), Err(Error::Configuration(_))));
        assert!(matches!(parse_bound(""), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_format_instant() {
        assert_eq!(
            format_instant(datetime!(2024-02-01 0:00 +1)).unwrap(),
            "2024-01-31T23:00:00Z"
        );
    }

    #[test]
    fn test_count_before_boundaries() {
        let t = datetime!(2024-05-01 12:00 UTC);
        let items = vec![
            Item(t - Duration::hours(2)),
            Item(t - Duration::hours(1)),
            Item(t),
        ];
        assert_eq!(count_before(&items, t), 2);
        assert_eq!(count_before(&items, t - Duration::days(1)), 0);
        assert_eq!(count_before(&items, t + Duration::days(1)), 3);
        assert_eq!(count_before::<Item>(&[], t), 0);
    }

    #[test]
    fn test_count_before_scans_unsorted_lists() {
        let items = vec![
            Item(datetime!(2023-01-01 0:00 UTC)),
            Item(datetime!(2025-01-01 0:00 UTC)),
            Item(datetime!(2022-01-01 0:00 UTC)),
        ];
        assert_eq!(count_before(&items, datetime!(2024-01-01 0:00 UTC)), 2);
    }

    #[test]
    fn test_count_after_and_between() {
        let items = newest_first();
        assert_eq!(count_after(&items, datetime!(2023-10-27 9:00 UTC)), 1);
        assert_eq!(
            count_between(
                &items,
                datetime!(2023-10-27 9:00 UTC),
                datetime!(2023-10-28 10:00 UTC)
            ),
            1
        );
    }

    #[test]
    fn test_newest_first_matches_full_scan() {
        let items = newest_first();
        let cutoffs = [
            datetime!(2023-10-25 0:00 UTC),
            datetime!(2023-10-26 8:00 UTC),
            datetime!(2023-10-27 23:59:59 UTC),
            datetime!(2023-10-29 0:00 UTC),
        ];
        for cutoff in cutoffs {
            assert_eq!(
                count_before_with(&items, cutoff, ScanOrder::NewestFirst),
                count_before(&items, cutoff)
            );
            assert_eq!(
                count_after_with(&items, cutoff, ScanOrder::NewestFirst),
                count_after(&items, cutoff)
            );
            for end in cutoffs {
                assert_eq!(
                    count_between_with(&items, cutoff, end, ScanOrder::NewestFirst),
                    count_between(&items, cutoff, end)
                );
            }
        }
    }

    #[test]
    fn test_window_requires_end_for_between() {
        let start = datetime!(2022-01-01 0:00 UTC);
        assert!(matches!(
            TimeWindow::new(Direction::Between, start, None),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            TimeWindow::new(Direction::Between, start, Some(start - Duration::days(1))),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_between_is_inclusive_start_exclusive_end() {
        let start = datetime!(2022-01-01 0:00 UTC);
        let end = datetime!(2023-01-01 0:00 UTC);
        let window = TimeWindow::new(Direction::Between, start, Some(end)).unwrap();
        assert!(window.contains(start));
        assert!(!window.contains(end));
    }
}
