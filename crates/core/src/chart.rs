//! The computed chart returned by `POST /compute`.
//!
//! The backend owns this shape and extends it freely, so the client keeps
//! the whole JSON object and only reads the fields it renders. Every
//! accessor returns `Option` instead of failing on an absent field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// ChartResult
// ---------------------------------------------------------------------------

/// Opaque chart object. Serializes back to exactly what was received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartResult(Map<String, Value>);

impl ChartResult {
    /// Wrap an arbitrary JSON value. Non-objects become an empty chart.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Replace one top-level field, returning the modified chart.
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn ascendant(&self) -> Option<&Map<String, Value>> {
        self.0.get("ascendant").and_then(Value::as_object)
    }

    /// Sign of the ascendant, e.g. `"Leo"`.
    pub fn ascendant_sign(&self) -> Option<&str> {
        self.ascendant()?.get("sign")?.as_str()
    }

    /// Planet name → position attributes.
    pub fn planets(&self) -> Option<&Map<String, Value>> {
        self.0.get("planets").and_then(Value::as_object)
    }

    pub fn planet(&self, name: &str) -> Option<&Map<String, Value>> {
        self.planets()?.get(name)?.as_object()
    }

    pub fn moon_sign(&self) -> Option<&str> {
        self.0.get("moon_sign")?.as_str()
    }

    /// Nakshatra name of the Moon, from `nakshatra_of_moon.nakshatra`.
    pub fn moon_nakshatra(&self) -> Option<&str> {
        self.0.get("nakshatra_of_moon")?.get("nakshatra")?.as_str()
    }

    pub fn vimshottari(&self) -> Option<&Value> {
        self.0.get("vimshottari")
    }

    pub fn yogas_raw(&self) -> Option<&Vec<Value>> {
        self.0.get("yogas")?.as_array()
    }

    pub fn whole_sign_houses(&self) -> Option<&Map<String, Value>> {
        self.0.get("whole_sign_houses").and_then(Value::as_object)
    }

    pub fn lucky_gemstone(&self) -> Option<&str> {
        self.0.get("lucky_factors")?.get("lucky_gemstone")?.as_str()
    }

    /// Divisional sub-object (`d9`, `d10`) for a division, if present.
    pub fn divisional(&self, division: Division) -> Option<&Map<String, Value>> {
        let key = division.sub_object_key()?;
        self.0.get(key).and_then(Value::as_object)
    }
}

// ---------------------------------------------------------------------------
// Division
// ---------------------------------------------------------------------------

/// Harmonic division of the chart being viewed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    /// Rasi chart, the primary chart.
    #[default]
    D1,
    /// Navamsa.
    D9,
    /// Dashamsha.
    D10,
}

/// All divisions offered by the chart switcher, in display order.
pub const ALL_DIVISIONS: &[Division] = &[Division::D1, Division::D9, Division::D10];

impl Division {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::D1 => "D1",
            Self::D9 => "D9",
            Self::D10 => "D10",
        }
    }

    /// Tab label shown above the chart.
    pub fn label(&self) -> &'static str {
        match self {
            Self::D1 => "Lagna (D1)",
            Self::D9 => "Navamsa (D9)",
            Self::D10 => "Dashamsha (D10)",
        }
    }

    /// Key of the backend sub-object holding this division. `None` for D1,
    /// which lives at the top level.
    pub fn sub_object_key(&self) -> Option<&'static str> {
        match self {
            Self::D1 => None,
            Self::D9 => Some("d9"),
            Self::D10 => Some("d10"),
        }
    }

    /// Field prefix used inside the sub-object, e.g. `d9` in `d9_sign`.
    pub fn field_prefix(&self) -> Option<&'static str> {
        self.sub_object_key()
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Division {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D1" => Ok(Self::D1),
            "D9" => Ok(Self::D9),
            "D10" => Ok(Self::D10),
            _ => Err(CoreError::InvalidDivision(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
