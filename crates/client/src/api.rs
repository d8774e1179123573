//! REST API client for the astrology backend.
//!
//! Wraps the backend HTTP API (auth, chart computation, matching, family
//! members, geocoding, AI chat) using [`reqwest`]. Each call is a single
//! request/response cycle: no retry, no backoff, and no de-duplication of
//! identical concurrent requests.

use jyotish_core::chart::ChartResult;
use jyotish_core::matching::MatchResult;
use jyotish_core::params::{ChartQueryParams, MatchRequest};
use jyotish_core::person::{FamilyMember, NewFamilyMember, Person, ProfileUpdate};
use jyotish_core::types::DbId;

use crate::config::ClientConfig;
use crate::messages::{
    AnalyzeRequest, AnalyzeResponse, AuthResponse, ChatReply, ChatRequest, GoogleLoginRequest,
    LoginRequest, PlaceSuggestion, SignupRequest, SuggestionsResponse,
};
use crate::session::Session;

/// HTTP client for one backend deployment.
#[derive(Clone)]
pub struct AstroApi {
    client: reqwest::Client,
    api_url: String,
    session: Session,
}

/// Errors from the backend REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend rejected the credentials or the session token (HTTP 401).
    #[error("Unauthorized: {body}")]
    Unauthorized {
        /// Raw response body for debugging.
        body: String,
    },

    /// The backend returned any other non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl ApiError {
    /// The backend's `detail` message, when the body is a JSON error.
    pub fn detail(&self) -> Option<String> {
        let body = match self {
            Self::Unauthorized { body } | Self::ApiError { body, .. } => body,
            Self::Request(_) => return None,
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        match value.get("detail")? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Short message suitable for a notification line.
    pub fn notice(&self) -> String {
        match self {
            Self::Request(e) if e.is_timeout() => "The server took too long to respond.".into(),
            Self::Request(_) => "Could not reach the server.".into(),
            Self::Unauthorized { .. } => self
                .detail()
                .unwrap_or_else(|| "Session expired. Please log in again.".into()),
            Self::ApiError { status, .. } => self
                .detail()
                .unwrap_or_else(|| format!("Request failed with status {status}.")),
        }
    }
}

impl AstroApi {
    /// Create an API client for the configured backend.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone(), session))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, session: Session) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ---- auth ----

    /// Sign in with email and password. Stores the session on success.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let response = self
            .post("/auth/login")
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let auth: AuthResponse = Self::parse_response(response).await?;
        self.remember(&auth);
        Ok(auth)
    }

    /// Sign in with a Google ID token. Stores the session on success.
    pub async fn google_login(&self, token: &str) -> Result<AuthResponse, ApiError> {
        let response = self
            .post("/auth/google")
            .json(&GoogleLoginRequest { token })
            .send()
            .await?;
        let auth: AuthResponse = Self::parse_response(response).await?;
        self.remember(&auth);
        Ok(auth)
    }

    /// Create an account. Stores the session on success.
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ApiError> {
        let response = self.post("/auth/signup").json(request).send().await?;
        let auth: AuthResponse = Self::parse_response(response).await?;
        self.remember(&auth);
        Ok(auth)
    }

    /// Fetch the signed-in account (`GET /auth/me`).
    pub async fn current_user(&self) -> Result<Person, ApiError> {
        let response = self.get("/auth/me").send().await?;
        Self::parse_response(response).await
    }

    /// Update the signed-in account (`PUT /auth/me`) and refresh the
    /// locally cached copy.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Person, ApiError> {
        let response = self
            .client
            .put(self.url("/auth/me"))
            .headers(self.auth_headers())
            .json(update)
            .send()
            .await?;
        let person: Person = Self::parse_response(response).await?;
        if let Err(e) = self.session.store_user(&person) {
            tracing::warn!(error = %e, "Failed to cache updated account");
        }
        Ok(person)
    }

    /// Stored chart parameters for the signed-in account. `None` when the
    /// profile lacks birth details.
    pub async fn chart_params(&self) -> Result<Option<ChartQueryParams>, ApiError> {
        let response = self.get("/auth/chart-data").send().await?;
        Self::parse_response(response).await
    }

    // ---- charts ----

    /// Compute a chart (`POST /compute`).
    pub async fn compute_chart(&self, params: &ChartQueryParams) -> Result<ChartResult, ApiError> {
        tracing::debug!(
            year = params.year,
            month = params.month,
            day = params.day,
            tz = %params.tz,
            "Requesting chart computation",
        );
        let response = self.post("/compute").json(params).send().await?;
        Self::parse_response(response).await
    }

    /// Compute Ashta Koota compatibility (`POST /match`).
    pub async fn match_charts(
        &self,
        boy: &ChartQueryParams,
        girl: &ChartQueryParams,
    ) -> Result<MatchResult, ApiError> {
        let body = MatchRequest {
            boy: boy.clone(),
            girl: girl.clone(),
        };
        let response = self.post("/match").json(&body).send().await?;
        Self::parse_response(response).await
    }

    // ---- family ----

    pub async fn family_members(&self) -> Result<Vec<FamilyMember>, ApiError> {
        let response = self.get("/family/").send().await?;
        Self::parse_response(response).await
    }

    pub async fn add_family_member(
        &self,
        member: &NewFamilyMember,
    ) -> Result<FamilyMember, ApiError> {
        let response = self.post("/family/").json(member).send().await?;
        Self::parse_response(response).await
    }

    pub async fn update_family_member(
        &self,
        id: DbId,
        member: &NewFamilyMember,
    ) -> Result<FamilyMember, ApiError> {
        let response = self
            .client
            .put(self.url(&format!("/family/{id}")))
            .headers(self.auth_headers())
            .json(member)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    pub async fn delete_family_member(&self, id: DbId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/family/{id}")))
            .headers(self.auth_headers())
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- geocoding ----

    /// Place suggestions for a partial name. A response without a
    /// `results` list yields an empty list.
    pub async fn location_suggestions(&self, query: &str) -> Result<Vec<PlaceSuggestion>, ApiError> {
        let response = self
            .get("/geocode/suggestions")
            .query(&[("query", query)])
            .send()
            .await?;
        let parsed: SuggestionsResponse = Self::parse_response(response).await?;
        Ok(parsed.results)
    }

    // ---- AI ----

    /// Ask the AI astrologer about a chart (`POST /ai/analyze`).
    pub async fn analyze(
        &self,
        query: &str,
        context: &serde_json::Value,
    ) -> Result<String, ApiError> {
        let response = self
            .post("/ai/analyze")
            .json(&AnalyzeRequest {
                query,
                context_data: context,
            })
            .send()
            .await?;
        let parsed: AnalyzeResponse = Self::parse_response(response).await?;
        Ok(parsed.response)
    }

    /// Learning module structure (`GET /learn/modules`).
    pub async fn learning_modules(&self) -> Result<serde_json::Value, ApiError> {
        let response = self.get("/learn/modules").send().await?;
        Self::parse_response(response).await
    }

    /// Chat with the learning assistant (`POST /learn/guru-chat`).
    pub async fn guru_chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        let response = self.post("/learn/guru-chat").json(request).send().await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn auth_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = self.session.token() {
            match reqwest::header::HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    headers.insert(reqwest::header::AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!("Session token is not a valid header value, sending without it"),
            }
        }
        headers
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).headers(self.auth_headers())
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).headers(self.auth_headers())
    }

    fn remember(&self, auth: &AuthResponse) {
        if let Err(e) = self.session.begin(auth) {
            tracing::warn!(error = %e, "Signed in but the session could not be persisted");
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an error carrying the status and
    /// body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(ApiError::Unauthorized { body });
            }
            return Err(ApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
