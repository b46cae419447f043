use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

const TIMESTAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const DAY: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Timestamps are stored as UTC text so that they compare lexically against a bare day.
pub fn timestamp(at: OffsetDateTime) -> String {
    let at = at.to_offset(time::UtcOffset::UTC);
    // the format only contains numeric components
    at.format(TIMESTAMP).unwrap_or_default()
}

pub fn day(date: Date) -> String {
    date.format(DAY).unwrap_or_default()
}

pub fn parse_day(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s, DAY)
}

/// Day part of a stored timestamp.
pub fn day_of(timestamp: &str) -> &str {
    timestamp.get(0..10).unwrap_or(timestamp)
}

#[cfg(test)]
mod test {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn timestamps_are_utc() {
        assert_eq!(
            timestamp(datetime!(2024-03-01 23:30:00 -02:00)),
            "2024-03-02 01:30:00"
        );
    }

    #[test]
    fn days() {
        assert_eq!(day(date!(2024 - 01 - 09)), "2024-01-09");
        assert_eq!(parse_day("2024-01-09").unwrap(), date!(2024 - 01 - 09));
        assert!(parse_day("2024-1-9").is_err());
        assert!(parse_day("yesterday").is_err());
        assert_eq!(day_of("2024-01-09 10:11:12"), "2024-01-09");
    }
}
