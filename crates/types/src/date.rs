//! Dates that keep the precision they were supplied with.
//!
//! Notification forms routinely carry incomplete dates ("onset sometime in March 2024"). A
//! [`PartialDate`] stores exactly what was given and renders it back unchanged, so a
//! month-precision input never turns into a made-up day.
//!
//! Accepted input forms:
//! - `YYYY`
//! - `YYYY-MM`
//! - `YYYY-MM-DD`
//! - RFC 3339 date-time (`2024-03-05T10:15:00+01:00`)

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Errors returned while parsing a [`PartialDate`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DateError {
    #[error("date cannot be empty")]
    Empty,

    #[error("invalid date '{0}': expected YYYY, YYYY-MM, YYYY-MM-DD or an RFC 3339 date-time")]
    Invalid(String),
}

/// Precision carried by a [`PartialDate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatePrecision {
    Year,
    Month,
    Day,
    DateTime,
}

/// A calendar date or instant at the precision the caller supplied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartialDate {
    Year(i32),
    Month { year: i32, month: u32 },
    Day(NaiveDate),
    DateTime(DateTime<FixedOffset>),
}

impl PartialDate {
    /// Parses a partial date, choosing the precision from the shape of the input.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::Empty`] for blank input and [`DateError::Invalid`] when the input
    /// matches none of the accepted forms or names an impossible calendar date.
    pub fn parse(input: &str) -> Result<Self, DateError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(DateError::Empty);
        }
        let invalid = || DateError::Invalid(raw.to_string());

        if raw.contains('T') {
            return DateTime::parse_from_rfc3339(raw)
                .map(PartialDate::DateTime)
                .map_err(|_| invalid());
        }

        let parts: Vec<&str> = raw.split('-').collect();
        match parts.as_slice() {
            [year] => Ok(PartialDate::Year(parse_year(year).ok_or_else(invalid)?)),
            [year, month] => {
                let year = parse_year(year).ok_or_else(invalid)?;
                let month = parse_two_digits(month).ok_or_else(invalid)?;
                NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
                Ok(PartialDate::Month { year, month })
            }
            [year, month, day] => {
                let year = parse_year(year).ok_or_else(invalid)?;
                let month = parse_two_digits(month).ok_or_else(invalid)?;
                let day = parse_two_digits(day).ok_or_else(invalid)?;
                NaiveDate::from_ymd_opt(year, month, day)
                    .map(PartialDate::Day)
                    .ok_or_else(invalid)
            }
            _ => Err(invalid()),
        }
    }

    /// Returns the precision this date was supplied with.
    pub fn precision(&self) -> DatePrecision {
        match self {
            PartialDate::Year(_) => DatePrecision::Year,
            PartialDate::Month { .. } => DatePrecision::Month,
            PartialDate::Day(_) => DatePrecision::Day,
            PartialDate::DateTime(_) => DatePrecision::DateTime,
        }
    }
}

fn parse_year(raw: &str) -> Option<i32> {
    if raw.len() != 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn parse_two_digits(raw: &str) -> Option<u32> {
    if raw.len() != 2 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialDate::Year(year) => write!(f, "{year:04}"),
            PartialDate::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            PartialDate::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            PartialDate::DateTime(instant) => write!(f, "{}", instant.to_rfc3339()),
        }
    }
}

impl FromStr for PartialDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartialDate::parse(s)
    }
}

impl Serialize for PartialDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PartialDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PartialDate::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Deserializes an optional date where a blank string counts as absent.
///
/// Use with `#[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]`.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<PartialDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => PartialDate::parse(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_year_precision() {
        let date = PartialDate::parse("2021").expect("year");
        assert_eq!(date.precision(), DatePrecision::Year);
        assert_eq!(date.to_string(), "2021");
    }

    #[test]
    fn keeps_month_precision() {
        let date = PartialDate::parse("2021-03").expect("month");
        assert_eq!(date, PartialDate::Month { year: 2021, month: 3 });
        assert_eq!(date.to_string(), "2021-03");
    }

    #[test]
    fn keeps_day_precision() {
        let date = PartialDate::parse("2021-03-09").expect("day");
        assert_eq!(date.precision(), DatePrecision::Day);
        assert_eq!(date.to_string(), "2021-03-09");
    }

    #[test]
    fn keeps_offset_of_date_times() {
        let date = PartialDate::parse("2022-01-11T10:15:00+01:00").expect("date-time");
        assert_eq!(date.precision(), DatePrecision::DateTime);
        assert_eq!(date.to_string(), "2022-01-11T10:15:00+01:00");
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        assert!(matches!(
            PartialDate::parse("2021-02-30"),
            Err(DateError::Invalid(_))
        ));
        assert!(matches!(
            PartialDate::parse("2021-13"),
            Err(DateError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_malformed_shapes() {
        for raw in ["21", "2021-3", "2021-03-9", "2021/03/09", "03-2021", "2021-03-09-01"] {
            assert!(
                matches!(PartialDate::parse(raw), Err(DateError::Invalid(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(PartialDate::parse("   "), Err(DateError::Empty));
    }

    #[test]
    fn optional_deserializer_treats_blank_as_absent() {
        #[derive(serde::Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "deserialize_optional")]
            date: Option<PartialDate>,
        }

        let blank: Holder = serde_json::from_str(r#"{"date": " "}"#).expect("blank");
        assert!(blank.date.is_none());

        let missing: Holder = serde_json::from_str("{}").expect("missing");
        assert!(missing.date.is_none());

        let null: Holder = serde_json::from_str(r#"{"date": null}"#).expect("null");
        assert!(null.date.is_none());

        let present: Holder = serde_json::from_str(r#"{"date": "2020-12"}"#).expect("present");
        assert_eq!(present.date, Some(PartialDate::Month { year: 2020, month: 12 }));

        assert!(serde_json::from_str::<Holder>(r#"{"date": "soon"}"#).is_err());
    }
}
