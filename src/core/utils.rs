use chrono::{DateTime, FixedOffset, NaiveDate};

pub fn display_offset() -> FixedOffset {
    FixedOffset::east_opt(3 * 60 * 60).unwrap() // +0300, Addis Ababa
}

pub fn datetime_to_string(datetime: DateTime<FixedOffset>) -> String {
    datetime
        .with_timezone(&display_offset())
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn datetime_to_string_opt(datetime: Option<DateTime<FixedOffset>>) -> Option<String> {
    datetime.map(datetime_to_string)
}

pub fn date_to_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn date_to_string_opt(date: Option<NaiveDate>) -> Option<String> {
    date.map(date_to_string)
}

/// Parses `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parses RFC 3339, `YYYY-MM-DD HH:MM:SS` or a bare date (end of day, +03:00).
pub fn parse_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(val) = DateTime::parse_from_rfc3339(value) {
        return Some(val);
    }
    let offset = display_offset();
    if let Ok(val) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return val.and_local_timezone(offset).single();
    }
    parse_date(value)?
        .and_hms_opt(23, 59, 59)?
        .and_local_timezone(offset)
        .single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_to_string() {
        let datetime = DateTime::parse_from_rfc3339("2025-03-01T02:30:00Z").unwrap();
        assert_eq!(datetime_to_string(datetime), "2025-03-01 05:30:00");
        assert_eq!(datetime_to_string_opt(None), None);
    }

    #[test]
    fn test_parse_datetime() {
        let expected = DateTime::parse_from_rfc3339("2025-03-31T23:59:59+03:00").unwrap();
        assert_eq!(parse_datetime("2025-03-31"), Some(expected));
        assert_eq!(parse_datetime("2025-03-31 23:59:59"), Some(expected));
        assert_eq!(
            parse_datetime("2025-03-31T20:59:59Z"),
            Some(expected)
        );
        assert_eq!(parse_datetime("31/03/2025"), None);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2019-07-08"),
            NaiveDate::from_ymd_opt(2019, 7, 8)
        );
        assert_eq!(parse_date("2019-13-08"), None);
    }
}
