//! Fake astrology backend for driving `jyotish` commands end to end.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use clap::Parser;
use serde_json::{json, Value};

use jyotish_cli::args::Cli;
use jyotish_cli::commands::App;
use jyotish_client::api::AstroApi;
use jyotish_client::cache::ChartCache;
use jyotish_client::flow::ChartFlow;
use jyotish_client::session::Session;
use jyotish_client::storage::{FileStorage, Storage};

pub const TOKEN: &str = "tok-1";
pub const EMAIL: &str = "asha@example.com";
pub const PASSWORD: &str = "secret1";

// ---------------------------------------------------------------------------
// Backend state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Backend {
    pub members: Mutex<Vec<Value>>,
    /// Bodies received by `/compute`.
    pub computed: Mutex<Vec<Value>>,
    /// Bodies received by `/match`.
    pub matched: Mutex<Vec<Value>>,
    /// When set, every protected route answers 401.
    pub reject_tokens: Mutex<bool>,
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

    /// An app whose session and cache live in `dir`, as the binary's do.
    pub fn app(&self, dir: &Path) -> (App, Arc<dyn Storage>) {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir));
        let session = Session::restore(storage.clone()).unwrap();
        let api = AstroApi::with_client(reqwest::Client::new(), self.url(), session);
        let flow = ChartFlow::new(api, ChartCache::new(storage.clone()));
        (App::new(flow, false), storage)
    }

    /// Same as [`TestServer::app`] with a valid token already stored.
    pub fn signed_in_app(&self, dir: &Path) -> (App, Arc<dyn Storage>) {
        let storage = FileStorage::new(dir);
        storage.set("token", TOKEN).unwrap();
        self.app(dir)
    }
}

/// Parse `args` as the `jyotish` command line.
pub fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("jyotish").chain(args.iter().copied())).unwrap()
}

pub async fn spawn() -> TestServer {
    let backend = Arc::new(Backend::default());

    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/google", post(google_login))
        .route("/auth/me", get(me))
        .route("/compute", post(compute))
        .route("/match", post(match_charts))
        .route("/family/", get(list_family))
        .route("/family/{id}", put(update_family))
        .route("/geocode/suggestions", get(suggestions))
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

fn authorize(backend: &Backend, headers: &HeaderMap) -> Result<(), Response> {
    let header = headers.get("authorization").and_then(|v| v.to_str().ok());
    if header != Some(&format!("Bearer {TOKEN}")) || *backend.reject_tokens.lock().unwrap() {
        return Err(unauthorized("Could not validate credentials"));
    }
    Ok(())
}

fn asha() -> Value {
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

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] != EMAIL || body["password"] != PASSWORD {
        return unauthorized("Incorrect email or password");
    }
    Json(json!({ "access_token": TOKEN, "token_type": "bearer", "user": asha() })).into_response()
}

async fn google_login() -> Response {
    unauthorized("Invalid Google token")
}

async fn me(State(backend): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    Json(asha()).into_response()
}

async fn compute(State(backend): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    backend.computed.lock().unwrap().push(body);
    Json(json!({
        "moon_sign": "Taurus",
        "ascendant": { "sign": "Leo", "deg_in_sign": 12.5 },
        "planets": { "Sun": { "sign_manual": "Aries", "degree_in_sign_manual": 10.0 } },
        "whole_sign_houses": { "house_1": { "sign": "Leo" }, "house_12": { "sign": "Cancer" } },
        "d9": {
            "Sun": { "d9_sign": "Cancer", "d9_longitude": 95.5 },
            "_ascendant": { "sign": "Virgo" },
            "_houses_signs": [ { "house": 11, "sign": "Cancer" } ]
        }
    }))
    .into_response()
}

async fn match_charts(State(backend): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    backend.matched.lock().unwrap().push(body);
    Json(json!({
        "ashta_koota": { "total": 27.5, "max": 36, "verdict": "Good match", "kootas": [] }
    }))
    .into_response()
}

async fn list_family(State(backend): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&backend, &headers) {
        return r;
    }
    Json(backend.members.lock().unwrap().clone()).into_response()
}

async fn update_family(
    State(backend): Shared,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
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

async fn suggestions(Query(q): Query<HashMap<String, String>>) -> Response {
    if q.get("query").map_or(0, String::len) < 3 {
        return Json(json!({})).into_response();
    }
    Json(json!({
        "results": [
            { "display_name": "Pune, Maharashtra, India", "latitude": 18.52, "longitude": 73.85 }
        ]
    }))
    .into_response()
}
