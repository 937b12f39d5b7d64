//! Guide dates: parsing front-matter values and formatting them for each output.
//!
//! | Output          | Format                          |
//! |-----------------|---------------------------------|
//! | RSS `pubDate`   | RFC 2822                        |
//! | sitemap/JSON-LD | ISO 8601 (`2025-01-15T00:00:00.000Z`) |
//! | page date line  | `2025년 1월 15일`               |

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use std::fmt;

/// A UTC instant parsed from a guide's `date` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GuideDate(DateTime<Utc>);

impl GuideDate {
    /// Parse `YYYY-MM-DD`, `YYYY-MM-DD[T ]HH:MM:SS` (taken as UTC) or full RFC 3339.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Self(dt.with_timezone(&Utc)));
        }
        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Some(Self(naive.and_utc()));
            }
        }
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
        Some(Self(date.and_hms_opt(0, 0, 0)?.and_utc()))
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    #[cfg(test)]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid test date");
        Self(date.and_hms_opt(0, 0, 0).expect("midnight").and_utc())
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn to_rfc2822(self) -> String {
        self.0.to_rfc2822()
    }

    /// Millisecond precision with a `Z` suffix, matching `Date.prototype.toISOString`.
    pub fn to_iso8601(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Korean long form used on guide pages, e.g. `2025년 1월 15일`.
    pub fn to_korean(self) -> String {
        format!("{}년 {}월 {}일", self.0.year(), self.0.month(), self.0.day())
    }
}

impl fmt::Display for GuideDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_only() {
        let date = GuideDate::parse("2025-01-15").unwrap();
        assert_eq!(date, GuideDate::from_ymd(2025, 1, 15));
        assert_eq!(date.to_string(), "2025-01-15");
    }

    #[test]
    fn test_parse_datetime_forms() {
        let utc = GuideDate::parse("2025-01-15T09:30:00Z").unwrap();
        let naive = GuideDate::parse("2025-01-15T09:30:00").unwrap();
        let offset = GuideDate::parse("2025-01-15T18:30:00+09:00").unwrap();
        let spaced = GuideDate::parse("2025-01-15 09:30:00").unwrap();
        assert_eq!(utc, naive);
        assert_eq!(utc, offset);
        assert_eq!(utc, spaced);
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(GuideDate::parse("").is_none());
        assert!(GuideDate::parse("2025-02-30").is_none());
        assert!(GuideDate::parse("2025/01/15").is_none());
        assert!(GuideDate::parse("yesterday").is_none());
    }

    #[test]
    fn test_to_rfc2822() {
        let date = GuideDate::from_ymd(2025, 1, 15);
        assert_eq!(date.to_rfc2822(), "Wed, 15 Jan 2025 00:00:00 +0000");
    }

    #[test]
    fn test_to_iso8601() {
        let date = GuideDate::from_ymd(2025, 1, 15);
        assert_eq!(date.to_iso8601(), "2025-01-15T00:00:00.000Z");
    }

    #[test]
    fn test_to_korean() {
        assert_eq!(GuideDate::from_ymd(2025, 1, 5).to_korean(), "2025년 1월 5일");
        assert_eq!(GuideDate::from_ymd(2024, 12, 31).to_korean(), "2024년 12월 31일");
    }

    #[test]
    fn test_ordering() {
        assert!(GuideDate::from_ymd(2024, 12, 31) < GuideDate::from_ymd(2025, 1, 1));
    }
}
