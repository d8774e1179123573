//! Chart query parameters and their derivation from stored birth data.
//!
//! The backend's `/compute` endpoint takes numeric date/time components
//! plus a timezone name and coordinates. Person records store the date
//! and time as display strings, so every fetch rebuilds the parameters
//! from those strings.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::person::Person;
use crate::types::DEFAULT_TIMEZONE;

/// Request body for `POST /compute`, and the shape `GET /auth/chart-data`
/// returns for the signed-in account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartQueryParams {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    #[serde(default)]
    pub minute: i32,
    #[serde(default)]
    pub second: i32,
    pub tz: String,
    pub lat: f64,
    pub lon: f64,
    /// Restrict the computation to these bodies. `None` means all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_topo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topo_alt: Option<f64>,
}

/// Request body for `POST /match`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub boy: ChartQueryParams,
    pub girl: ChartQueryParams,
}

impl ChartQueryParams {
    /// Build parameters from a chart-ready person.
    ///
    /// Splits `date_of_birth` on `-` and `time_of_birth` on `:` and parses
    /// each component as an integer. Ranges are not checked: month 13 is
    /// passed through for the backend to reject. Coordinates default to
    /// `0.0` and the timezone to `Asia/Kolkata`.
    pub fn from_person(person: &Person) -> Result<Self, CoreError> {
        let dob = person
            .date_of_birth
            .as_deref()
            .ok_or(CoreError::MissingField("date_of_birth"))?;
        let tob = person
            .time_of_birth
            .as_deref()
            .ok_or(CoreError::MissingField("time_of_birth"))?;

        let (year, month, day) = split_date(dob)?;
        let (hour, minute) = split_time(tob)?;

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second: 0,
            tz: person
                .timezone
                .clone()
                .filter(|tz| !tz.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            lat: person.latitude.unwrap_or(0.0),
            lon: person.longitude.unwrap_or(0.0),
            planets: None,
            use_topo: None,
            topo_alt: None,
        })
    }

    /// Build parameters from an ad hoc birth form (the match page), where
    /// the location must have been picked from the suggestion list.
    pub fn from_birth_form(
        date_of_birth: &str,
        time_of_birth: &str,
        lat: Option<f64>,
        lon: Option<f64>,
        tz: &str,
    ) -> Result<Self, CoreError> {
        let (Some(lat), Some(lon)) = (lat, lon) else {
            return Err(CoreError::MissingLocation);
        };

        let (year, month, day) = split_date(date_of_birth)?;
        let (hour, minute) = split_time(time_of_birth)?;

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second: 0,
            tz: if tz.trim().is_empty() {
                DEFAULT_TIMEZONE.to_string()
            } else {
                tz.to_string()
            },
            lat,
            lon,
            planets: None,
            use_topo: None,
            topo_alt: None,
        })
    }

    /// Restrict the computation to the named bodies.
    pub fn with_planets(mut self, planets: Vec<String>) -> Self {
        self.planets = Some(planets);
        self
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn split_date(dob: &str) -> Result<(i32, i32, i32), CoreError> {
    let mut parts = dob.trim().split('-');
    let year = parse_component(parts.next(), "year")?;
    let month = parse_component(parts.next(), "month")?;
    let day = parse_component(parts.next(), "day")?;
    Ok((year, month, day))
}

fn split_time(tob: &str) -> Result<(i32, i32), CoreError> {
    let mut parts = tob.trim().split(':');
    let hour = parse_component(parts.next(), "hour")?;
    // A bare hour ("08") means on the hour.
    let minute = match parts.next() {
        Some(raw) => parse_component(Some(raw), "minute")?,
        None => 0,
    };
    Ok((hour, minute))
}

fn parse_component(raw: Option<&str>, field: &'static str) -> Result<i32, CoreError> {
    let raw = raw.ok_or(CoreError::MissingField(field))?;
    raw.trim()
        .parse::<i32>()
        .map_err(|_| CoreError::MalformedField {
            field,
            value: raw.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
