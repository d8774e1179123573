//! Person records: the account holder and their family members.
//!
//! The backend owns these records; the client holds a copy fetched per
//! session. Birth fields are optional because accounts created through
//! Google sign-in start without them.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, DEFAULT_TIMEZONE};

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

/// Birth data for one person, as returned by `GET /auth/me` and embedded
/// in every family member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
    pub name: String,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub date_of_birth: Option<String>,
    /// `HH:MM`.
    #[serde(default)]
    pub time_of_birth: Option<String>,
    /// Free-text display name of the birth place.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// IANA timezone name.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
}

impl Person {
    /// A person is chart-ready when date, time and latitude of birth are
    /// all present. Anything less routes to profile completion.
    pub fn is_chart_ready(&self) -> bool {
        self.date_of_birth.as_deref().is_some_and(|s| !s.trim().is_empty())
            && self.time_of_birth.as_deref().is_some_and(|s| !s.trim().is_empty())
            && self.latitude.is_some()
    }

    /// Names of the birth fields still missing, in form order.
    pub fn missing_birth_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.date_of_birth.as_deref().map_or(true, |s| s.trim().is_empty()) {
            missing.push("date_of_birth");
        }
        if self.time_of_birth.as_deref().map_or(true, |s| s.trim().is_empty()) {
            missing.push("time_of_birth");
        }
        if self.latitude.is_none() {
            missing.push("latitude");
        }
        missing
    }
}

// ---------------------------------------------------------------------------
// Family members
// ---------------------------------------------------------------------------

/// A family member stored under the account, from `GET /family/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: DbId,
    #[serde(default)]
    pub user_id: Option<DbId>,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(flatten)]
    pub person: Person,
}

/// Payload for `POST /family/` and `PUT /family/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFamilyMember {
    pub name: String,
    pub relationship: String,
    pub gender: String,
    pub date_of_birth: String,
    pub time_of_birth: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

// ---------------------------------------------------------------------------
// Profile update
// ---------------------------------------------------------------------------

/// Partial update for `PUT /auth/me`. Absent fields are left untouched
/// by the backend and are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl ProfileUpdate {
    /// True when no field would be sent.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
