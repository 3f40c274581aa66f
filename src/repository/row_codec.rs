// ==========================================
// Row encoding helpers shared by the repositories
// ==========================================
// Timestamps: "%Y-%m-%d %H:%M:%S"; dates: "%Y-%m-%d"
// Decode failures surface as rusqlite conversion errors, never as defaults
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;

pub(crate) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Current UTC timestamp, truncated to seconds
pub(crate) fn now_ts() -> NaiveDateTime {
    let now = chrono::Utc::now().naive_utc();
    NaiveDateTime::parse_from_str(&format_ts(&now), TS_FORMAT).unwrap_or(now)
}

pub(crate) fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_opt_ts(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<NaiveDateTime>> {
    raw.map(|s| parse_ts(idx, &s)).transpose()
}

pub(crate) fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Decode a status/kind column through the enum's own parser
pub(crate) fn parse_enum<T>(
    idx: usize,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unrecognised value '{}'", raw).into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ResourceStatus;

    #[test]
    fn test_timestamp_round_trip_drops_subseconds() {
        let now = now_ts();
        let parsed = parse_ts(0, &format_ts(&now)).unwrap();
        assert_eq!(parsed, now);
    }

    #[test]
    fn test_parse_enum_rejects_unknown() {
        assert!(parse_enum(3, "assigned", ResourceStatus::from_db_str).is_ok());
        assert!(parse_enum(3, "borrowed", ResourceStatus::from_db_str).is_err());
    }
}
