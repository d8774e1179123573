//! In-process fake of the astrology backend, served by axum on a random
//! local port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use jyotish_client::api::AstroApi;
use jyotish_client::cache::ChartCache;
use jyotish_client::flow::ChartFlow;
use jyotish_client::session::Session;
use jyotish_client::storage::{MemoryStorage, Storage};

pub const TOKEN: &str = "tok-1";
pub const EMAIL: &str = "asha@example.com";
pub const PASSWORD: &str = "secret1";

/// Birth year that makes `/compute` answer slowly.
pub const SLOW_YEAR: i64 = 1900;

// ---------------------------------------------------------------------------
// Backend state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Backend {
    pub user: Mutex<Value>,
    pub chart_data: Mutex<Value>,
    pub members: Mutex<Vec<Value>>,
    /// Bodies received by `/compute`, in order.
    pub computed: Mutex<Vec<Value>>,
    /// `Authorization` header of every request that carried one.
    pub auth_headers: Mutex<Vec<String>>,
    /// When set, every protected route answers 401.
    pub reject_tokens: Mutex<bool>,
}

pub fn asha() -> Value {
    json!({
        "id": 1,
        "name": "Asha",
        "email": EMAIL,
        "date_of_birth": "1990-05-14",
        "time_of_birth": "08:30",
        "location": "Pune",
        "latitude": 18.52,
        "longitude": 73.85,
        "timezone": "Asia/Kolkata"
    })
}

pub fn ravi(id: i64) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "relationship": "brother",
        "name": "Ravi",
        "date_of_birth": "1993-11-02",
        "time_of_birth": "21:05",
        "location": "Delhi",
        "latitude": 28.61,
        "longitude": 77.21,
        "timezone": "Asia/Kolkata"
    })
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub backend: Arc<Backend>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A flow against this server whose session and cache share `storage`.
    pub fn flow(&self, storage: Arc<dyn Storage>) -> ChartFlow {
        let session = Session::restore(storage.clone()).unwrap();
        let api = AstroApi::with_client(reqwest::Client::new(), self.url(), session);
        ChartFlow::new(api, ChartCache::new(storage))
    }

    /// A flow with an in-memory store already holding a valid token.
    pub fn signed_in_flow(&self) -> (ChartFlow, Arc<dyn Storage>) {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set("token", TOKEN).unwrap();
        (self.flow(storage.clone()), storage)
    }
}

pub async fn spawn() -> TestServer {
    let backend = Arc::new(Backend {
        user: Mutex::new(asha()),
        chart_data: Mutex::new(json!({
            "year": 1990, "month": 5, "day": 14,
            "hour": 8, "minute": 30, "second": 0,
            "tz": "Asia/Kolkata", "lat": 18.52, "lon": 73.85
        })),
        ..Backend::default()
    });

    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me).put(update_me))
        .route("/auth/chart-data", get(chart_data))
        .route("/compute", post(compute))
        .route("/match", post(match_charts))
        .route("/family/", get(list_family).post(add_family))
        .route("/family/{id}", delete(delete_family).put(update_family))
        .route("/geocode/suggestions", get(suggestions))
        .route("/ai/analyze", post(analyze))
        .route("/learn/guru-chat", post(guru_chat))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer { addr, backend }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

type Shared = State<Arc<Backend>>;

fn unauthorized(detail: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail }))).into_response()
}

/// Record the bearer header and reject anything but the valid token.
fn authorize(backend: &Backend, headers: &HeaderMap) -> Result<(), Response> {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Some(h) = &header {
        backend.auth_headers.lock().unwrap().push(h.clone());
    }
    let valid = header.as_deref() == Some(&format!("Bearer {TOKEN}"));
    if !valid || *backend.reject_tokens.lock().unwrap() {
        return Err(unauthorized("Could not validate credentials"));
    }
    Ok(())
}

async fn login(State(backend): Shared, Json(body): Json<Value>) -> Response {
    if body["email"] != EMAIL || body["password"] != PASSWORD {
        return unauthorized("Incorrect email or password");
    }
    let user = backend.user.lock().unwrap().clone();
    Json(json!({ "access_token": TOKEN, "token_type": "bearer", "user": user })).into_response()
}

async fn me(State(backend): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    Json(backend.user.lock().unwrap().clone()).into_response()
}

async fn update_me(State(backend): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    let mut user = backend.user.lock().unwrap();
    if let (Some(target), Some(patch)) = (user.as_object_mut(), body.as_object()) {
        for (k, v) in patch {
            target.insert(k.clone(), v.clone());
        }
    }
    Json(user.clone()).into_response()
}

async fn chart_data(State(backend): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    Json(backend.chart_data.lock().unwrap().clone()).into_response()
}

async fn compute(State(backend): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    backend.computed.lock().unwrap().push(body.clone());
    if body["year"].as_i64() == Some(SLOW_YEAR) {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    Json(json!({
        "birth_year": body["year"],
        "moon_sign": "Taurus",
        "ascendant": { "sign": "Gemini", "degree": 12.5 },
        "planets": {
            "Sun": { "sign_manual": "Taurus", "degree": 29.9, "house": 12 },
            "Moon": { "sign_manual": "Taurus", "degree": 4.25 }
        },
        "d9": {
            "Sun": { "d9_sign": "Pisces", "d9_longitude": 359.1 },
            "_ascendant": { "sign": "Virgo" }
        }
    }))
    .into_response()
}

async fn match_charts(State(backend): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    if body.get("boy").is_none() || body.get("girl").is_none() {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": "boy and girl required" })))
            .into_response();
    }
    Json(json!({
        "ashta_koota": {
            "total": 27.5,
            "max": 36,
            "verdict": "Good match",
            "kootas": [
                { "koota": "Varna", "score": 1, "max": 1 },
                { "koota": "Nadi", "score": 8, "max": 8 }
            ]
        },
        "boy": { "moon_sign": "Taurus", "nakshatra_of_moon": { "name": "Rohini", "pada": 2 } },
        "girl": { "moon_sign": "Cancer", "nakshatra_of_moon": "Pushya" }
    }))
    .into_response()
}

async fn list_family(State(backend): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    Json(backend.members.lock().unwrap().clone()).into_response()
}

async fn add_family(State(backend): Shared, headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    let mut members = backend.members.lock().unwrap();
    let id = members.len() as i64 + 100;
    body["id"] = json!(id);
    body["user_id"] = json!(1);
    members.push(body.clone());
    Json(body).into_response()
}

async fn update_family(
    State(backend): Shared,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    let mut members = backend.members.lock().unwrap();
    let Some(slot) = members.iter_mut().find(|m| m["id"] == id) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Member not found" }))).into_response();
    };
    body["id"] = json!(id);
    body["user_id"] = json!(1);
    *slot = body.clone();
    Json(body).into_response()
}

async fn delete_family(State(backend): Shared, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    let mut members = backend.members.lock().unwrap();
    let before = members.len();
    members.retain(|m| m["id"] != id);
    if members.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Member not found" }))).into_response();
    }
    Json(json!({ "ok": true })).into_response()
}

async fn suggestions(Query(q): Query<std::collections::HashMap<String, String>>) -> Response {
    let query = q.get("query").cloned().unwrap_or_default();
    if query.len() < 3 {
        return Json(json!({})).into_response();
    }
    Json(json!({
        "results": [
            { "display_name": "Pune, Maharashtra, India", "latitude": 18.52, "longitude": 73.85 },
            { "display_name": "Pune Cantonment, India", "latitude": 18.50, "longitude": 73.88 }
        ]
    }))
    .into_response()
}

async fn analyze(State(backend): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    let moon = body["context_data"]["moon_sign"].as_str().unwrap_or("unknown");
    Json(json!({ "response": format!("Your Moon is in {moon}.") })).into_response()
}

async fn guru_chat(Json(body): Json<Value>) -> Response {
    Json(json!({
        "reply": format!("On '{}': start with the lunar mansions.", body["message"].as_str().unwrap_or("")),
        "references": ["module-2"]
    }))
    .into_response()
}
