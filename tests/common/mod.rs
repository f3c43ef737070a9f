#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::{Value, json};
use url::Url;

use quizify::{
    Result,
    config::AuthConfig,
    management::{ManualClock, PkceSessionStore, TokenStore, TrackListStore},
    spotify::{ApiClient, AuthFlow, Navigator},
    storage::{MemoryStorage, Storage},
};

pub const CLIENT_ID: &str = "test-client";
pub const REDIRECT_URI: &str = "http://127.0.0.1:8000/callback";
pub const PREFIX: &str = "spotify_";
pub const START_MS: i64 = 1_700_000_000_000;

/// Everything the mock Spotify saw.
#[derive(Default)]
pub struct MockState {
    pub token_requests: AtomicUsize,
    pub api_requests: AtomicUsize,
    pub token_forms: Mutex<Vec<HashMap<String, String>>>,
    pub authorizations: Mutex<Vec<String>>,
    pub api_calls: Mutex<Vec<(String, String, Option<Value>)>>,
    /// Answer for `GET /v1/me/player/devices`.
    pub devices: Mutex<Value>,
    /// Makes `PUT /v1/me/player/pause` answer 502.
    pub pause_fails: AtomicBool,
}

impl MockState {
    pub fn token_hits(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    pub fn api_hits(&self) -> usize {
        self.api_requests.load(Ordering::SeqCst)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.authorizations.lock().unwrap().last().cloned()
    }

    pub fn calls(&self) -> Vec<(String, String, Option<Value>)> {
        self.api_calls.lock().unwrap().clone()
    }

    fn record(&self, method: &str, path: &str, headers: &HeaderMap, body: Option<Value>) {
        self.api_requests.fetch_add(1, Ordering::SeqCst);
        if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            self.authorizations.lock().unwrap().push(auth.to_string());
        }
        self.api_calls
            .lock()
            .unwrap()
            .push((method.to_string(), path.to_string(), body));
    }
}

pub struct MockSpotify {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockSpotify {
    pub async fn start() -> Self {
        let state = Arc::new(MockState {
            devices: Mutex::new(json!({
                "devices": [
                    { "id": "d1", "name": "Kitchen", "is_active": false, "type": "Speaker" },
                    { "id": "d2", "name": "Laptop", "is_active": true, "type": "Computer" }
                ]
            })),
            ..Default::default()
        });

        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/me", get(me))
            .route("/v1/me/player/devices", get(devices))
            .route("/v1/me/player/play", put(play))
            .route("/v1/me/player/pause", put(pause))
            .route("/v1/tracks/{id}", get(track))
            .route("/lists/party.json", get(party_list))
            .route("/lists/single.json", get(single_track))
            .route("/lists/double-encoded.json", get(double_encoded))
            .route("/lists/broken.json", get(broken))
            .route("/lists/missing.json", get(missing))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn token_url(&self) -> String {
        self.url("/api/token")
    }

    pub fn api_url(&self) -> String {
        self.url("/v1")
    }
}

async fn token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_requests.fetch_add(1, Ordering::SeqCst);
    state.token_forms.lock().unwrap().push(form.clone());

    match form.get("grant_type").map(String::as_str) {
        Some("refresh_token") => match form.get("refresh_token").map(String::as_str) {
            Some("ref1") => Json(json!({
                "access_token": "tok2",
                "token_type": "Bearer",
                "expires_in": 3600
            }))
            .into_response(),
            _ => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid_grant" })),
            )
                .into_response(),
        },
        Some("authorization_code") => {
            if form.get("code_verifier").is_none_or(|v| v.len() < 43) {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "invalid_request" })),
                )
                    .into_response();
            }
            match form.get("code").map(String::as_str) {
                Some("good-code") => Json(json!({
                    "access_token": "tok1",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                    "refresh_token": "ref1",
                    "scope": "user-modify-playback-state user-read-playback-state"
                }))
                .into_response(),
                Some("no-expiry") => Json(json!({ "access_token": "tok-noexp" })).into_response(),
                Some("no-token") => Json(json!({ "token_type": "Bearer" })).into_response(),
                _ => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "invalid_grant" })),
                )
                    .into_response(),
            }
        }
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer tok"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "status": 401, "message": "Invalid access token" } })),
    )
        .into_response()
}

async fn me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("GET", "/me", &headers, None);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "id": "quizmaster", "display_name": "Quiz Master" })).into_response()
}

async fn devices(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("GET", "/me/player/devices", &headers, None);
    if !authorized(&headers) {
        return unauthorized();
    }
    let devices = state.devices.lock().unwrap().clone();
    Json(devices).into_response()
}

async fn play(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("PUT", "/me/player/play", &headers, Some(body.clone()));
    if !authorized(&headers) {
        return unauthorized();
    }
    let uri = body["uris"][0].as_str().unwrap_or_default();
    if uri == "spotify:track:nodevice" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": { "status": 404, "message": "Player command failed: No active device found", "reason": "NO_ACTIVE_DEVICE" }
            })),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn pause(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("PUT", "/me/player/pause", &headers, None);
    if !authorized(&headers) {
        return unauthorized();
    }
    if state.pause_fails.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": { "status": 502, "message": "Bad gateway." } })),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn track(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record("GET", &format!("/tracks/{id}"), &headers, None);
    if !authorized(&headers) {
        return unauthorized();
    }
    match id.as_str() {
        "t1" => Json(json!({
            "id": "t1",
            "name": "Bohemian Rhapsody",
            "duration_ms": 354000,
            "artists": [{ "id": "a1", "name": "Queen" }]
        }))
        .into_response(),
        "t2" => Json(json!({
            "id": "t2",
            "name": "Under Pressure",
            "duration_ms": 248000,
            "artists": [{ "id": "a1", "name": "Queen" }, { "id": "a2", "name": "David Bowie" }]
        }))
        .into_response(),
        "t3" => Json(json!({ "id": "t3", "name": "", "duration_ms": 1000, "artists": [] }))
            .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "status": 404, "message": "Not found." } })),
        )
            .into_response(),
    }
}

async fn party_list() -> Json<Value> {
    Json(json!([
        { "uri": "spotify:track:t1", "name": "Song #1", "startMs": 30000, "durationMs": 2500 },
        { "uri": "spotify:track:t2", "name": "Song #2", "startMs": 0 }
    ]))
}

async fn single_track() -> Json<Value> {
    Json(json!({ "uri": "spotify:track:t1", "name": "Only one" }))
}

async fn double_encoded() -> String {
    let inner = json!([{ "uri": "spotify:track:t2", "name": "Encoded twice" }]).to_string();
    format!("\u{feff}  {}\n", Value::String(inner))
}

async fn broken() -> &'static str {
    "this is { not json"
}

async fn missing() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Records every URL the auth flow navigates to.
#[derive(Default)]
pub struct RecordingNavigator {
    pub visited: Mutex<Vec<Url>>,
}

impl RecordingNavigator {
    pub fn last(&self) -> Option<Url> {
        self.visited.lock().unwrap().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &Url) -> Result<()> {
        self.visited.lock().unwrap().push(url.clone());
        Ok(())
    }
}

/// One application context wired against the mock.
pub struct Harness {
    pub mock: MockSpotify,
    pub clock: Arc<ManualClock>,
    pub local: Arc<MemoryStorage>,
    pub session: Arc<MemoryStorage>,
    pub tokens: Arc<TokenStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub auth: Arc<AuthFlow>,
    pub api: Arc<ApiClient>,
    pub lists: Arc<TrackListStore>,
}

impl Harness {
    pub async fn start() -> Self {
        let mock = MockSpotify::start().await;
        let clock = Arc::new(ManualClock::new(START_MS));
        let local = Arc::new(MemoryStorage::new());
        let session = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(RecordingNavigator::default());

        let local_dyn: Arc<dyn Storage> = local.clone();
        let session_dyn: Arc<dyn Storage> = session.clone();

        let tokens = Arc::new(TokenStore::new(local_dyn.clone(), clock.clone(), PREFIX));
        let auth = Arc::new(
            AuthFlow::new(
                AuthConfig {
                    client_id: CLIENT_ID.into(),
                    redirect_uri: REDIRECT_URI.into(),
                    scopes: vec![
                        "user-modify-playback-state".into(),
                        "user-read-playback-state".into(),
                    ],
                    authorize_url: mock.url("/authorize"),
                    token_url: mock.token_url(),
                },
                tokens.clone(),
                PkceSessionStore::new(session_dyn, PREFIX),
                navigator.clone(),
            )
            .unwrap(),
        );
        let api = Arc::new(ApiClient::new(mock.api_url(), tokens.clone()));
        let lists = Arc::new(TrackListStore::new(local_dyn));

        Self {
            mock,
            clock,
            local,
            session,
            tokens,
            navigator,
            auth,
            api,
            lists,
        }
    }

    /// The provider redirect for the login that was just started.
    pub fn redirect_url(&self, code: &str, state: &str) -> Url {
        let mut url = Url::parse(REDIRECT_URI).unwrap();
        url.query_pairs_mut()
            .append_pair("code", code)
            .append_pair("state", state);
        url
    }

    /// State value sent with the last authorization request.
    pub fn sent_state(&self) -> String {
        let url = self.navigator.last().expect("no navigation happened");
        quizify::utils::query_param(&url, "state").expect("no state in authorization URL")
    }

    /// Full login against the mock with the code `good-code`.
    pub async fn log_in(&self) {
        self.auth.start_auth().await.unwrap();
        let mut url = self.redirect_url("good-code", &self.sent_state());
        self.auth.handle_redirect_callback(&mut url).await.unwrap();
    }
}
