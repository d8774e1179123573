//! Ashta Koota compatibility results from `POST /match`.

use serde::{Deserialize, Serialize};

/// Score for one of the eight kootas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KootaScore {
    pub koota: String,
    pub score: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AshtaKoota {
    pub total: f64,
    pub max: f64,
    pub verdict: String,
    #[serde(default)]
    pub kootas: Vec<KootaScore>,
}

impl AshtaKoota {
    /// Total as a percentage of the maximum, `0.0` when the maximum is zero.
    pub fn percentage(&self) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.total / self.max * 100.0
    }
}

/// Moon placement summary returned for each partner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartnerSummary {
    #[serde(default)]
    pub moon_sign: Option<String>,
    #[serde(default)]
    pub nakshatra_of_moon: Option<serde_json::Value>,
}

impl PartnerSummary {
    pub fn nakshatra(&self) -> Option<&str> {
        self.nakshatra_of_moon.as_ref()?.get("nakshatra")?.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub ashta_koota: AshtaKoota,
    #[serde(default)]
    pub boy: Option<PartnerSummary>,
    #[serde(default)]
    pub girl: Option<PartnerSummary>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
