//! Request and response bodies for the backend endpoints that carry no
//! domain meaning of their own (auth, geocoding, AI chat, learning).

use serde::{Deserialize, Serialize};

use jyotish_core::person::Person;
use jyotish_core::types::DEFAULT_TIMEZONE;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleLoginRequest<'a> {
    pub token: &'a str,
}

/// Body for `POST /auth/signup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub mobile_number: String,
    pub date_of_birth: String,
    pub time_of_birth: String,
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub timezone: String,
}

impl SignupRequest {
    /// Minimum password length the backend accepts.
    pub const MIN_PASSWORD_LEN: usize = 6;

    pub fn with_default_timezone(mut self) -> Self {
        if self.timezone.trim().is_empty() {
            self.timezone = DEFAULT_TIMEZONE.to_string();
        }
        self
    }
}

/// Token response of every sign-in endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: Person,
}

// ---------------------------------------------------------------------------
// Geocoding
// ---------------------------------------------------------------------------

/// One entry of `GET /geocode/suggestions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SuggestionsResponse {
    #[serde(default)]
    pub results: Vec<PlaceSuggestion>,
}

// ---------------------------------------------------------------------------
// AI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AnalyzeRequest<'a> {
    pub query: &'a str,
    pub context_data: &'a serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnalyzeResponse {
    pub response: String,
}

/// Body for `POST /learn/guru-chat`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_module_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_lesson_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub references: Option<Vec<String>>,
}
