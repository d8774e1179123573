//! Display readings derived from a computed chart: the dasha timeline,
//! yogas, and the planetary positions table.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chart::{ChartResult, Division};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Row order of the planetary positions table.
pub const PLANET_ORDER: &[&str] = &[
    "Sun", "Moon", "Mars", "Mercury", "Jupiter", "Venus", "Saturn", "Rahu", "Ketu",
];

/// Placeholder for an absent cell.
pub const EMPTY_CELL: &str = "-";

/// Shown when no current mahadasha can be found.
pub const UNKNOWN_DASHA: &str = "Unknown";

pub const YOGA_STATUS_STRONG: &str = "STRONG";
pub const YOGA_STATUS_ACTIVE: &str = "ACTIVE";

// ---------------------------------------------------------------------------
// Dasha timeline
// ---------------------------------------------------------------------------

/// One period of the Vimshottari timeline. Mahadashas nest antardashas,
/// which nest pratyantardashas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashaPeriod {
    pub lord: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub years: Option<f64>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub antar_dashas: Vec<DashaPeriod>,
    #[serde(default)]
    pub pratyantar_dashas: Vec<DashaPeriod>,
}

impl DashaPeriod {
    /// `"2012 - 2028"` from the start and end dates.
    pub fn year_span(&self) -> Option<String> {
        let start = parse_backend_datetime(self.start_date.as_deref()?)?;
        let end = parse_backend_datetime(self.end_date.as_deref()?)?;
        Some(format!("{} - {}", start.format("%Y"), end.format("%Y")))
    }

    /// `"Mar 24"` style end label used on antardasha cards.
    pub fn end_label(&self) -> Option<String> {
        let end = parse_backend_datetime(self.end_date.as_deref()?)?;
        Some(end.format("%b %y").to_string())
    }

    /// The currently running sub-period, if flagged.
    pub fn current_antar(&self) -> Option<&DashaPeriod> {
        self.antar_dashas.iter().find(|d| d.is_current)
    }
}

/// Mahadasha list from `vimshottari.timeline`. Entries that do not parse
/// are skipped; an absent timeline gives an empty list.
pub fn dasha_timeline(chart: &ChartResult) -> Vec<DashaPeriod> {
    let Some(timeline) = chart
        .vimshottari()
        .and_then(|v| v.get("timeline"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    timeline
        .iter()
        .filter_map(|entry| match serde_json::from_value::<DashaPeriod>(entry.clone()) {
            Ok(period) => Some(period),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unreadable dasha entry");
                None
            }
        })
        .collect()
}

/// Index of the running mahadasha, or the first one when none is flagged.
/// `None` only for an empty timeline.
pub fn current_period_index(timeline: &[DashaPeriod]) -> Option<usize> {
    if timeline.is_empty() {
        return None;
    }
    Some(timeline.iter().position(|d| d.is_current).unwrap_or(0))
}

/// `"{lord} Mahadasha"` for the running period, or `"Unknown"`.
pub fn active_mahadasha(chart: &ChartResult) -> String {
    dasha_timeline(chart)
        .iter()
        .find(|d| d.is_current)
        .map(|d| format!("{} Mahadasha", d.lord))
        .unwrap_or_else(|| UNKNOWN_DASHA.to_string())
}

/// Backend timestamps are Python `isoformat()` output, with or without an
/// offset, or bare dates.
fn parse_backend_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ---------------------------------------------------------------------------
// Yogas
// ---------------------------------------------------------------------------

/// Evaluation status attached to each yoga by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YogaStatus {
    Strong,
    Active,
    Other(String),
}

impl YogaStatus {
    pub fn from_str_value(s: &str) -> Self {
        match s {
            YOGA_STATUS_STRONG => Self::Strong,
            YOGA_STATUS_ACTIVE => Self::Active,
            other => Self::Other(other.to_string()),
        }
    }

    /// Strong and active yogas are the ones shown to the user.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Strong | Self::Active)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Yoga {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub score: Option<f64>,
    pub status: YogaStatus,
}

/// All yogas in the chart, in backend order. Entries without a name or
/// id are skipped.
pub fn yogas(chart: &ChartResult) -> Vec<Yoga> {
    let Some(raw) = chart.yogas_raw() else {
        return Vec::new();
    };

    raw.iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let id = str_field(obj, "id").map(str::to_string);
            let name = str_field(obj, "name")
                .map(str::to_string)
                .or_else(|| id.clone())?;
            Some(Yoga {
                id,
                name,
                description: str_field(obj, "description").map(str::to_string),
                score: obj.get("score").and_then(Value::as_f64),
                status: YogaStatus::from_str_value(str_field(obj, "status").unwrap_or_default()),
            })
        })
        .collect()
}

/// Yogas with `STRONG` or `ACTIVE` status.
pub fn present_yogas(chart: &ChartResult) -> Vec<Yoga> {
    yogas(chart)
        .into_iter()
        .filter(|y| y.status.is_present())
        .collect()
}

// ---------------------------------------------------------------------------
// Planetary positions
// ---------------------------------------------------------------------------

/// One row of the planetary positions table.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetRow {
    pub name: String,
    pub sign: Option<String>,
    /// Degrees within the sign.
    pub degree_in_sign: Option<f64>,
    /// `"Rohini-2"`.
    pub nakshatra: Option<String>,
    pub nakshatra_lord: Option<String>,
    pub house: String,
    /// `(R)`, `(C)`, both, or `-`.
    pub status: String,
    pub d9_sign: Option<String>,
    pub d9_sign_lord: Option<String>,
    pub is_ascendant: bool,
}

impl PlanetRow {
    pub fn degree_dms(&self) -> String {
        self.degree_in_sign
            .map(format_dms)
            .unwrap_or_else(|| EMPTY_CELL.to_string())
    }
}

/// Rows for the nine grahas in table order, then the ascendant.
pub fn planet_rows(chart: &ChartResult) -> Vec<PlanetRow> {
    let houses = chart.whole_sign_houses();
    let mut rows = Vec::new();

    for &name in PLANET_ORDER {
        let Some(data) = chart.planet(name) else {
            continue;
        };
        let sign = str_field(data, "sign_manual").map(str::to_string);
        rows.push(PlanetRow {
            name: name.to_string(),
            house: house_number(sign.as_deref(), houses),
            sign,
            degree_in_sign: data.get("degree_in_sign_manual").and_then(Value::as_f64),
            nakshatra: nakshatra_label(data.get("nakshatra")),
            nakshatra_lord: data
                .get("nakshatra")
                .and_then(|n| n.get("lord"))
                .and_then(Value::as_str)
                .map(str::to_string),
            status: planet_status(data),
            d9_sign: str_field(data, "d9_sign").map(str::to_string),
            d9_sign_lord: str_field(data, "d9_sign_lord").map(str::to_string),
            is_ascendant: false,
        });
    }

    if let Some(asc) = chart.ascendant() {
        rows.push(PlanetRow {
            name: "Ascendant".to_string(),
            sign: str_field(asc, "sign").map(str::to_string),
            degree_in_sign: asc.get("deg_in_sign").and_then(Value::as_f64),
            nakshatra: nakshatra_label(asc.get("nakshatra")),
            nakshatra_lord: asc
                .get("nakshatra")
                .and_then(|n| n.get("lord"))
                .and_then(Value::as_str)
                .map(str::to_string),
            house: "1".to_string(),
            status: EMPTY_CELL.to_string(),
            d9_sign: str_field(asc, "d9_sign").map(str::to_string),
            d9_sign_lord: str_field(asc, "d9_sign_lord").map(str::to_string),
            is_ascendant: true,
        });
    }

    rows
}

/// Rows for a divisional chart, read from its sub-object.
///
/// Signs come from `{prefix}_sign`, degrees are `{prefix}_longitude`
/// within the sign, and houses are looked up in the sub-object's
/// `_houses_signs` (or `_houses`) list. Nakshatras are taken from the
/// primary entry, since the longitude is the same. D1, or a chart
/// without the division, gives the primary rows.
pub fn divisional_planet_rows(chart: &ChartResult, division: Division) -> Vec<PlanetRow> {
    let (Some(sub), Some(prefix)) = (chart.divisional(division), division.field_prefix()) else {
        return planet_rows(chart);
    };
    let sign_key = format!("{prefix}_sign");
    let longitude_key = format!("{prefix}_longitude");
    let houses = sub
        .get("_houses_signs")
        .or_else(|| sub.get("_houses"))
        .and_then(Value::as_array);

    let mut rows = Vec::new();
    for &name in PLANET_ORDER {
        let Some(data) = sub.get(name).and_then(Value::as_object) else {
            continue;
        };
        let sign = str_field(data, &sign_key).map(str::to_string);
        let primary = chart.planet(name);
        rows.push(PlanetRow {
            name: name.to_string(),
            house: listed_house(sign.as_deref(), houses),
            sign,
            degree_in_sign: data
                .get(&longitude_key)
                .and_then(Value::as_f64)
                .map(|d| d.rem_euclid(30.0)),
            nakshatra: primary.and_then(|p| nakshatra_label(p.get("nakshatra"))),
            nakshatra_lord: primary
                .and_then(|p| p.get("nakshatra"))
                .and_then(|n| n.get("lord"))
                .and_then(Value::as_str)
                .map(str::to_string),
            status: planet_status(data),
            d9_sign: None,
            d9_sign_lord: None,
            is_ascendant: false,
        });
    }

    if let Some(asc) = sub.get("_ascendant").and_then(Value::as_object) {
        rows.push(PlanetRow {
            name: "Ascendant".to_string(),
            sign: str_field(asc, "sign").map(str::to_string),
            degree_in_sign: asc
                .get("degree")
                .and_then(Value::as_f64)
                .map(|d| d.rem_euclid(30.0)),
            nakshatra: None,
            nakshatra_lord: None,
            house: "1".to_string(),
            status: EMPTY_CELL.to_string(),
            d9_sign: None,
            d9_sign_lord: None,
            is_ascendant: true,
        });
    }

    rows
}

fn planet_status(data: &Map<String, Value>) -> String {
    let mut flags = Vec::new();
    if data.get("retrograde").and_then(Value::as_bool).unwrap_or(false) {
        flags.push("(R)");
    }
    if data.get("combust").and_then(Value::as_bool).unwrap_or(false) {
        flags.push("(C)");
    }
    if flags.is_empty() {
        EMPTY_CELL.to_string()
    } else {
        flags.join(" ")
    }
}

/// House whose sign matches, from keys like `house_4`.
fn house_number(sign: Option<&str>, houses: Option<&Map<String, Value>>) -> String {
    let (Some(sign), Some(houses)) = (sign, houses) else {
        return EMPTY_CELL.to_string();
    };
    houses
        .iter()
        .find(|(_, h)| h.get("sign").and_then(Value::as_str) == Some(sign))
        .map(|(key, _)| key.trim_start_matches("house_").to_string())
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

/// House number from a `[{ "house": 4, "sign": "Cancer" }, ..]` list.
fn listed_house(sign: Option<&str>, houses: Option<&Vec<Value>>) -> String {
    let (Some(sign), Some(houses)) = (sign, houses) else {
        return EMPTY_CELL.to_string();
    };
    houses
        .iter()
        .find(|h| h.get("sign").and_then(Value::as_str) == Some(sign))
        .and_then(|h| h.get("house").and_then(Value::as_i64))
        .map(|n| n.to_string())
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

fn nakshatra_label(nakshatra: Option<&Value>) -> Option<String> {
    let nakshatra = nakshatra?;
    let name = nakshatra.get("nakshatra")?.as_str()?;
    match nakshatra.get("pada") {
        Some(Value::Number(pada)) => Some(format!("{name}-{pada}")),
        _ => Some(name.to_string()),
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)?.as_str()
}

/// Format decimal degrees as zero-padded `DD:MM:SS`. Non-finite input
/// renders as `-`.
pub fn format_dms(decimal_deg: f64) -> String {
    if !decimal_deg.is_finite() {
        return EMPTY_CELL.to_string();
    }
    let mut d = decimal_deg.floor() as i64;
    let m_float = (decimal_deg - d as f64) * 60.0;
    let mut m = m_float.floor() as i64;
    let mut s = ((m_float - m as f64) * 60.0).round() as i64;
    if s == 60 {
        s = 0;
        m += 1;
    }
    if m == 60 {
        m = 0;
        d += 1;
    }
    format!("{d:02}:{m:02}:{s:02}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
