use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DATE_TIME_FORMATS: [&str; 4] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// Semantic type of a filterable column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Boolean,
    Enum,
    Integer,
    Real,
    /// Date with time-of-day; filtered at day granularity
    DateTime,
    DateOnly,
    TimeOfDay,
    Duration,
}

impl FieldType {
    /// Columns whose popup is a year/month/day (or day/hour/minute/second) tree
    pub fn is_hierarchical(self) -> bool {
        matches!(self, FieldType::DateTime | FieldType::DateOnly | FieldType::Duration)
    }

    pub fn is_date(self) -> bool {
        matches!(self, FieldType::DateTime | FieldType::DateOnly)
    }

    /// Boolean popups only ever hold two or three values, so they get no select-all row
    pub fn has_select_all(self) -> bool {
        self != FieldType::Boolean
    }

    /// Raw values hidden when the blank sentinel is unchecked.
    ///
    /// Text columns track null and empty string separately.
    pub fn blank_values(self) -> Vec<FilterValue> {
        match self {
            FieldType::Text => vec![FilterValue::Blank, FilterValue::Text(String::new())],
            _ => vec![FilterValue::Blank],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Boolean => "boolean",
            FieldType::Enum => "enum",
            FieldType::Integer => "integer",
            FieldType::Real => "real",
            FieldType::DateTime => "date_time",
            FieldType::DateOnly => "date_only",
            FieldType::TimeOfDay => "time_of_day",
            FieldType::Duration => "duration",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "text" | "string" => Ok(FieldType::Text),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "enum" => Ok(FieldType::Enum),
            "integer" | "int" => Ok(FieldType::Integer),
            "real" | "number" | "float" => Ok(FieldType::Real),
            "date_time" | "datetime" | "date" => Ok(FieldType::DateTime),
            "date_only" | "dateonly" => Ok(FieldType::DateOnly),
            "time_of_day" | "time" => Ok(FieldType::TimeOfDay),
            "duration" | "timespan" => Ok(FieldType::Duration),
            other => Err(format!("Unknown field type: {}", other)),
        }
    }
}

/// A raw cell value as seen by the filter engine.
///
/// `Blank` stands for a missing, null or unreadable value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterValue {
    Blank,
    Bool(bool),
    Integer(i64),
    Real(OrderedFloat<f64>),
    Text(String),
    /// Enum values are carried by variant name
    Enum(String),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Duration(TimeDelta),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }

    pub fn real(value: f64) -> Self {
        FilterValue::Real(OrderedFloat(value))
    }

    /// Null or empty string
    pub fn is_blank(&self) -> bool {
        match self {
            FilterValue::Blank => true,
            FilterValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Reduce a value to the granularity the filter compares at: date-times lose their
    /// time of day and durations lose sub-second precision.
    pub fn normalize(self, field_type: FieldType) -> Self {
        match (self, field_type) {
            (FilterValue::DateTime(dt), FieldType::DateTime) => {
                FilterValue::DateTime(dt.date().and_time(NaiveTime::MIN))
            }
            (FilterValue::Duration(d), FieldType::Duration) => {
                FilterValue::Duration(TimeDelta::seconds(d.num_seconds()))
            }
            (value, _) => value,
        }
    }

    /// Calendar date of date-typed values
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FilterValue::DateTime(dt) => Some(dt.date()),
            FilterValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Ordering used for popup lists: text compares case-insensitively first so that
    /// "apple" and "Apple" sit next to each other, everything else uses value order.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FilterValue::Text(a), FilterValue::Text(b))
            | (FilterValue::Enum(a), FilterValue::Enum(b)) => {
                cmp_case_insensitive(a, b).then_with(|| a.cmp(b))
            }
            (FilterValue::Integer(a), FilterValue::Real(b)) => OrderedFloat(*a as f64).cmp(b),
            (FilterValue::Real(a), FilterValue::Integer(b)) => a.cmp(&OrderedFloat(*b as f64)),
            _ => self.cmp(other),
        }
    }

    /// Convert a JSON scalar into a value of the given column type.
    ///
    /// Anything that cannot be read as that type becomes `Blank`.
    pub fn from_json(value: &Value, field_type: FieldType) -> Self {
        let converted = match (field_type, value) {
            (_, Value::Null) => None,
            (FieldType::Text, Value::String(s)) => Some(FilterValue::Text(s.clone())),
            (FieldType::Text, Value::Bool(b)) => Some(FilterValue::Text(b.to_string())),
            (FieldType::Text, Value::Number(n)) => Some(FilterValue::Text(n.to_string())),
            (FieldType::Boolean, Value::Bool(b)) => Some(FilterValue::Bool(*b)),
            (FieldType::Boolean, Value::String(s)) => s.parse::<bool>().ok().map(FilterValue::Bool),
            (FieldType::Enum, Value::String(s)) => Some(FilterValue::Enum(s.clone())),
            (FieldType::Enum, Value::Number(n)) => Some(FilterValue::Enum(n.to_string())),
            (FieldType::Integer, Value::Number(n)) => n.as_i64().map(FilterValue::Integer),
            (FieldType::Integer, Value::String(s)) => s.trim().parse().ok().map(FilterValue::Integer),
            (FieldType::Real, Value::Number(n)) => n.as_f64().map(FilterValue::real),
            (FieldType::Real, Value::String(s)) => s.trim().parse().ok().map(FilterValue::real),
            (FieldType::DateTime, Value::String(s)) => parse_date_time(s).map(FilterValue::DateTime),
            (FieldType::DateTime, Value::Number(n)) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| FilterValue::DateTime(dt.naive_utc())),
            (FieldType::DateOnly, Value::String(s)) => parse_date(s).map(FilterValue::Date),
            (FieldType::TimeOfDay, Value::String(s)) => parse_time(s).map(FilterValue::Time),
            (FieldType::Duration, Value::String(s)) => parse_duration(s).map(FilterValue::Duration),
            (FieldType::Duration, Value::Number(n)) => n
                .as_f64()
                .and_then(|secs| TimeDelta::try_milliseconds((secs * 1000.0).round() as i64))
                .map(FilterValue::Duration),
            _ => None,
        };
        converted.unwrap_or(FilterValue::Blank)
    }

    /// JSON form used by presets; the column type travels alongside, so scalars suffice
    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::Blank => Value::Null,
            FilterValue::Bool(b) => Value::Bool(*b),
            FilterValue::Integer(i) => Value::from(*i),
            // JSON has no NaN or infinity; "NaN", "inf" and "-inf" parse back as reals
            FilterValue::Real(r) if !r.is_finite() => Value::String(r.to_string()),
            FilterValue::Real(r) => Value::from(r.into_inner()),
            FilterValue::Text(s) | FilterValue::Enum(s) => Value::String(s.clone()),
            FilterValue::DateTime(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            FilterValue::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
            FilterValue::Time(t) => Value::String(t.format("%H:%M:%S").to_string()),
            FilterValue::Duration(d) => Value::String(format_duration(*d)),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Blank => Ok(()),
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Integer(i) => write!(f, "{}", i),
            FilterValue::Real(r) => write!(f, "{}", r),
            FilterValue::Text(s) | FilterValue::Enum(s) => f.write_str(s),
            FilterValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            FilterValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            FilterValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            FilterValue::Duration(d) => f.write_str(&format_duration(*d)),
        }
    }
}

fn cmp_case_insensitive(a: &str, b: &str) -> Ordering {
    let mut a_iter = a.chars().flat_map(char::to_lowercase);
    let mut b_iter = b.chars().flat_map(char::to_lowercase);
    loop {
        match (a_iter.next(), b_iter.next()) {
            (Some(ac), Some(bc)) => match ac.cmp(&bc) {
                Ordering::Equal => continue,
                ord => return ord,
            },
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return Ordering::Equal,
        }
    }
}

fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| parse_date(s).map(|d| d.and_time(NaiveTime::MIN)))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    TIME_FORMATS.iter().find_map(|format| NaiveTime::parse_from_str(s.trim(), format).ok())
}

/// Parse `[-][d.]hh:mm:ss` into a duration
fn parse_duration(s: &str) -> Option<TimeDelta> {
    let s = s.trim();
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (days, clock) = match body.split_once('.') {
        Some((days, clock)) if clock.contains(':') => (days.parse::<i64>().ok()?, clock),
        _ => (0, body),
    };
    let mut parts = clock.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next().unwrap_or("0").parse().ok()?;
    if parts.next().is_some()
        || days < 0
        || hours < 0
        || !(0..60).contains(&minutes)
        || !(0.0..60.0).contains(&seconds)
    {
        return None;
    }
    // Day counts come from row data; anything that overflows is unreadable
    let whole = days
        .checked_mul(86_400)?
        .checked_add(hours.checked_mul(3_600)?)?
        .checked_add(minutes * 60)?;
    let millis = whole.checked_mul(1000)?.checked_add((seconds * 1000.0).round() as i64)?;
    let delta = TimeDelta::try_milliseconds(millis)?;
    Some(if negative { -delta } else { delta })
}

/// Format a duration as `[-][d.]hh:mm:ss`
pub fn format_duration(d: TimeDelta) -> String {
    let sign = if d < TimeDelta::zero() { "-" } else { "" };
    let total = d.num_seconds().abs();
    let (days, rem) = (total / 86_400, total % 86_400);
    let (hours, minutes, seconds) = (rem / 3_600, (rem % 3_600) / 60, rem % 60);
    if days > 0 {
        format!("{}{}.{:02}:{:02}:{:02}", sign, days, hours, minutes, seconds)
    } else {
        format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds)
    }
}

/// Year, month and day of a date-typed value
pub fn date_parts(value: &FilterValue) -> Option<(i32, u32, u32)> {
    value.as_date().map(|d| (d.year(), d.month(), d.day()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_blank_detection() {
        assert!(FilterValue::Blank.is_blank());
        assert!(FilterValue::text("").is_blank());
        assert!(!FilterValue::text(" ").is_blank());
        assert!(!FilterValue::Integer(0).is_blank());
    }

    #[test]
    fn test_normalize_date_time_drops_time_of_day() {
        let morning = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(8, 30, 0).unwrap();
        let evening = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(22, 0, 5).unwrap();
        assert_eq!(
            FilterValue::DateTime(morning).normalize(FieldType::DateTime),
            FilterValue::DateTime(evening).normalize(FieldType::DateTime)
        );
    }

    #[test]
    fn test_normalize_duration_truncates_subseconds() {
        let value = FilterValue::Duration(TimeDelta::milliseconds(90_750));
        assert_eq!(
            value.normalize(FieldType::Duration),
            FilterValue::Duration(TimeDelta::seconds(90))
        );
    }

    #[test]
    fn test_normalize_leaves_other_types_alone() {
        let value = FilterValue::text("abc");
        assert_eq!(value.clone().normalize(FieldType::DateTime), value);
    }

    #[test]
    fn test_from_json_conversion_failures_are_blank() {
        assert_eq!(FilterValue::from_json(&json!("abc"), FieldType::Integer), FilterValue::Blank);
        assert_eq!(FilterValue::from_json(&json!("2023-13-01"), FieldType::DateOnly), FilterValue::Blank);
        assert_eq!(FilterValue::from_json(&json!([1, 2]), FieldType::Text), FilterValue::Blank);
        assert_eq!(FilterValue::from_json(&Value::Null, FieldType::Text), FilterValue::Blank);
    }

    #[test]
    fn test_from_json_date_time_variants() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap().and_hms_opt(10, 0, 0).unwrap();
        assert_eq!(
            FilterValue::from_json(&json!("2023-01-02T10:00:00"), FieldType::DateTime),
            FilterValue::DateTime(expected)
        );
        assert_eq!(
            FilterValue::from_json(&json!("2023-01-02T10:00:00+00:00"), FieldType::DateTime),
            FilterValue::DateTime(expected)
        );
        assert_eq!(
            FilterValue::from_json(&json!("2023-01-02"), FieldType::DateTime),
            FilterValue::DateTime(expected.date().and_time(NaiveTime::MIN))
        );
    }

    #[test]
    fn test_duration_parse_and_format() {
        let d = parse_duration("1.02:03:04").unwrap();
        assert_eq!(d, TimeDelta::seconds(86_400 + 2 * 3_600 + 3 * 60 + 4));
        assert_eq!(format_duration(d), "1.02:03:04");
        assert_eq!(format_duration(TimeDelta::seconds(65)), "00:01:05");
        assert_eq!(parse_duration("-00:00:30"), Some(TimeDelta::seconds(-30)));
        assert!(parse_duration("00:61:00").is_none());
        assert!(parse_duration("garbage").is_none());
        assert!(parse_duration("00:-5:00").is_none());
        assert!(parse_duration("999999999999999.00:00:00").is_none());
        assert!(parse_duration("9223372036854775807:00:00").is_none());
        assert_eq!(
            FilterValue::from_json(&json!("999999999999999.00:00:00"), FieldType::Duration),
            FilterValue::Blank
        );
    }

    #[test]
    fn test_non_finite_reals_survive_json() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let real = FilterValue::real(value);
            let json = real.to_json();
            assert!(json.is_string(), "{} should not become null", value);
            assert_eq!(FilterValue::from_json(&json, FieldType::Real), real);
        }
        assert_eq!(FilterValue::real(1.5).to_json(), json!(1.5));
    }

    #[test]
    fn test_json_round_trip_of_dates() {
        let value = FilterValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(FilterValue::from_json(&value.to_json(), FieldType::DateOnly), value);
    }

    #[test]
    fn test_sort_cmp_text_is_case_insensitive() {
        let mut values = vec![FilterValue::text("banana"), FilterValue::text("Apple"), FilterValue::text("apple")];
        values.sort_by(|a, b| a.sort_cmp(b));
        assert_eq!(
            values,
            vec![FilterValue::text("Apple"), FilterValue::text("apple"), FilterValue::text("banana")]
        );
    }

    #[test]
    fn test_field_type_from_str() {
        assert_eq!("date-time".parse::<FieldType>().unwrap(), FieldType::DateTime);
        assert_eq!("Bool".parse::<FieldType>().unwrap(), FieldType::Boolean);
        assert!("matrix".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_text_blank_values_include_empty_string() {
        assert_eq!(FieldType::Text.blank_values().len(), 2);
        assert_eq!(FieldType::Integer.blank_values(), vec![FilterValue::Blank]);
    }
}
