use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

const LAST_UPDATED: &str = "lastUpdated";
const START_DATE: &str = "startDate";
const END_DATE: &str = "endDate";
const IS_AVAILABLE: &str = "isAvailable";

/// An availability window exactly as received from upstream.
///
/// Snapshots compare strictly on both type and value, so a boolean `true` and
/// the string `"true"` are different snapshots.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AvailabilitySnapshot(Map<String, Value>);

impl AvailabilitySnapshot {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

impl From<Map<String, Value>> for AvailabilitySnapshot {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

/// A parsed, validated availability window
#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    pub last_updated: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_available: bool,

    snapshot: AvailabilitySnapshot,
}

impl Availability {
    /// The snapshot this window was parsed from
    pub fn snapshot(&self) -> &AvailabilitySnapshot {
        &self.snapshot
    }
}

impl TryFrom<AvailabilitySnapshot> for Availability {
    type Error = Error;

    fn try_from(snapshot: AvailabilitySnapshot) -> Result<Self> {
        let last_updated = date_field(&snapshot, LAST_UPDATED, "availability.lastUpdated")?;
        let start_date = date_field(&snapshot, START_DATE, "availability.startDate")?;
        let end_date = date_field(&snapshot, END_DATE, "availability.endDate")?;
        let is_available = match snapshot.get(IS_AVAILABLE) {
            Some(Value::Bool(value)) => *value,
            Some(_) => {
                return Err(Error::validation(
                    "availability.isAvailable",
                    "must be a boolean",
                ))
            }
            None => return Err(Error::validation("availability.isAvailable", "is required")),
        };

        Ok(Self {
            last_updated,
            start_date,
            end_date,
            is_available,
            snapshot,
        })
    }
}

fn date_field(
    snapshot: &AvailabilitySnapshot,
    key: &str,
    field: &'static str,
) -> Result<DateTime<Utc>> {
    match snapshot.get(key) {
        Some(Value::String(value)) => parse_iso8601(value)
            .ok_or_else(|| Error::validation(field, format!("{:?} is not an ISO-8601 date", value))),
        Some(_) => Err(Error::validation(field, "must be an ISO-8601 string")),
        None => Err(Error::validation(field, "is required")),
    }
}

/// Date-time layouts carrying an explicit offset, `+hhmm` or `+hh:mm`
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"];
/// Date-time layouts read as UTC, with or without a trailing `Z`
const UTC_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO-8601 date or date-time. Values without an offset are read as UTC.
pub fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc));
    }
    if let Some(datetime) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
    {
        return Some(datetime.with_timezone(&Utc));
    }

    let utc = value.strip_suffix('Z').unwrap_or(value);
    if let Some(naive) = UTC_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(utc, format).ok())
    {
        return Some(Utc.from_utc_datetime(&naive));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
