//! Test utilities for client testing
//!
//! Provides an in-process mock of a Teltonika device REST API.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use teltonika_core::api::{LoginRequest, ModemActionRequest};
use tokio::net::TcpListener;

pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "Admin123";

const UNAUTHORIZED_STATUS: &str = include_str!("../tests/fixtures/unauthorized_status.json");
const SYSTEM_STATUS: &str = include_str!("../tests/fixtures/system_status.json");
const MODEMS_STATUS: &str = include_str!("../tests/fixtures/modems_status.json");

/// Canned body served instead of the emulated behaviour
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Mock device state
#[derive(Debug, Clone)]
pub struct MockDeviceState {
    /// Tokens the device currently accepts
    pub tokens: Arc<Mutex<HashSet<String>>>,
    /// Lifetime in seconds announced for new tokens
    pub token_lifetime: Arc<AtomicU64>,
    /// Envelope served by `/unauthorized/status`
    pub device_status: Arc<Mutex<Value>>,
    /// Envelope served by `/system/device/status`
    pub system_status: Arc<Mutex<Value>>,
    /// Envelope served by `/modems/status`
    pub modems_status: Arc<Mutex<Value>>,
    /// Per-path overrides, keyed by request path
    pub canned: Arc<Mutex<HashMap<String, CannedResponse>>>,
    /// Artificial latency applied to every request
    pub delay: Arc<Mutex<Option<Duration>>>,
    /// Every request, as "METHOD /path"
    pub requests: Arc<Mutex<Vec<String>>>,
    /// Modem actions performed, as (action, modem id)
    pub modem_actions: Arc<Mutex<Vec<(String, String)>>>,
    /// Number of device reboots requested
    pub reboots: Arc<AtomicUsize>,
    issued: Arc<AtomicUsize>,
}

impl Default for MockDeviceState {
    fn default() -> Self {
        let fixture =
            |body: &str| serde_json::from_str::<Value>(body).expect("fixture is valid JSON");

        Self {
            tokens: Arc::new(Mutex::new(HashSet::new())),
            token_lifetime: Arc::new(AtomicU64::new(299)),
            device_status: Arc::new(Mutex::new(fixture(UNAUTHORIZED_STATUS))),
            system_status: Arc::new(Mutex::new(fixture(SYSTEM_STATUS))),
            modems_status: Arc::new(Mutex::new(fixture(MODEMS_STATUS))),
            canned: Arc::new(Mutex::new(HashMap::new())),
            delay: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
            modem_actions: Arc::new(Mutex::new(Vec::new())),
            reboots: Arc::new(AtomicUsize::new(0)),
            issued: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MockDeviceState {
    /// Serve `body` with `status` for `path` (e.g. "/api/modems/status").
    pub fn set_response(&self, path: &str, status: StatusCode, body: impl Into<String>) {
        self.canned.lock().unwrap().insert(
            path.to_string(),
            CannedResponse {
                status,
                body: body.into(),
            },
        );
    }

    /// Go back to the emulated behaviour for `path`.
    pub fn clear_response(&self, path: &str) {
        self.canned.lock().unwrap().remove(path);
    }

    /// Forget every issued token, as a device reboot would.
    pub fn revoke_tokens(&self) {
        self.tokens.lock().unwrap().clear();
    }

    pub fn set_token_lifetime(&self, seconds: u64) {
        self.token_lifetime.store(seconds, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Number of requests received for "METHOD /path".
    pub fn count(&self, request: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.as_str() == request)
            .count()
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    async fn record(&self, method: &str, path: &str) -> Option<Response> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("{} {}", method, path));

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.canned
            .lock()
            .unwrap()
            .get(path)
            .map(|canned| json_response(canned.status, canned.body.clone()))
    }

    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        bearer_token(headers)
            .map(|token| self.tokens.lock().unwrap().contains(token))
            .unwrap_or(false)
    }
}

/// Mock device implementation
#[derive(Debug)]
pub struct MockDevice {
    state: MockDeviceState,
    port: u16,
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            state: MockDeviceState::default(),
            port: 0,
        }
    }

    /// Start the mock device and return its API base URL
    pub async fn start(mut self) -> Result<(Self, String)> {
        let app = self.create_router();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        self.port = addr.port();

        let base_url = format!("http://127.0.0.1:{}/api", self.port);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock device error: {}", e);
            }
        });

        for _ in 0..20 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Ok((self, base_url))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &MockDeviceState {
        &self.state
    }

    fn create_router(&self) -> Router {
        Router::new()
            .route("/api/login", post(login_handler))
            .route("/api/logout", post(logout_handler))
            .route("/api/session/status", get(session_status_handler))
            .route("/api/unauthorized/status", get(unauthorized_status_handler))
            .route("/api/system/device/status", get(system_status_handler))
            .route("/api/system/actions/reboot", post(reboot_handler))
            .route("/api/modems/status", get(modems_status_handler))
            .route("/api/modems/actions/:action", post(modem_action_handler))
            .with_state(self.state.clone())
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "success": false,
            "errors": [{"code": 120, "error": "Unauthorized access", "source": "auth"}]
        })),
    )
        .into_response()
}

async fn login_handler(
    State(state): State<MockDeviceState>,
    Json(req): Json<LoginRequest>,
) -> Response {
    if let Some(canned) = state.record("POST", "/api/login").await {
        return canned;
    }

    if req.username != TEST_USERNAME || req.password != TEST_PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "errors": [{"code": 121, "error": "Login failed", "source": "auth"}]
            })),
        )
            .into_response();
    }

    let n = state.issued.fetch_add(1, Ordering::SeqCst) + 1;
    let token = format!("token-{}", n);
    state.tokens.lock().unwrap().insert(token.clone());

    Json(json!({
        "success": true,
        "data": {
            "username": req.username,
            "token": token,
            "expires": state.token_lifetime.load(Ordering::SeqCst)
        }
    }))
    .into_response()
}

async fn logout_handler(State(state): State<MockDeviceState>, headers: HeaderMap) -> Response {
    if let Some(canned) = state.record("POST", "/api/logout").await {
        return canned;
    }

    let removed = bearer_token(&headers)
        .map(|token| state.tokens.lock().unwrap().remove(token))
        .unwrap_or(false);
    if !removed {
        return unauthorized();
    }

    Json(json!({"success": true, "data": {"response": "Logged out successfully"}})).into_response()
}

async fn session_status_handler(
    State(state): State<MockDeviceState>,
    headers: HeaderMap,
) -> Response {
    if let Some(canned) = state.record("GET", "/api/session/status").await {
        return canned;
    }

    let active = state.is_authorized(&headers);
    Json(json!({"success": true, "data": {"active": active}})).into_response()
}

async fn unauthorized_status_handler(State(state): State<MockDeviceState>) -> Response {
    if let Some(canned) = state.record("GET", "/api/unauthorized/status").await {
        return canned;
    }

    let body = state.device_status.lock().unwrap().clone();
    Json(body).into_response()
}

async fn system_status_handler(
    State(state): State<MockDeviceState>,
    headers: HeaderMap,
) -> Response {
    if let Some(canned) = state.record("GET", "/api/system/device/status").await {
        return canned;
    }
    if !state.is_authorized(&headers) {
        return unauthorized();
    }

    let body = state.system_status.lock().unwrap().clone();
    Json(body).into_response()
}

async fn reboot_handler(State(state): State<MockDeviceState>, headers: HeaderMap) -> Response {
    if let Some(canned) = state.record("POST", "/api/system/actions/reboot").await {
        return canned;
    }
    if !state.is_authorized(&headers) {
        return unauthorized();
    }

    state.reboots.fetch_add(1, Ordering::SeqCst);
    Json(json!({"success": true})).into_response()
}

async fn modems_status_handler(
    State(state): State<MockDeviceState>,
    headers: HeaderMap,
) -> Response {
    if let Some(canned) = state.record("GET", "/api/modems/status").await {
        return canned;
    }
    if !state.is_authorized(&headers) {
        return unauthorized();
    }

    let body = state.modems_status.lock().unwrap().clone();
    Json(body).into_response()
}

async fn modem_action_handler(
    Path(action): Path<String>,
    State(state): State<MockDeviceState>,
    headers: HeaderMap,
    Json(req): Json<ModemActionRequest>,
) -> Response {
    let path = format!("/api/modems/actions/{}", action);
    if let Some(canned) = state.record("POST", &path).await {
        return canned;
    }
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    if !matches!(
        action.as_str(),
        "reboot" | "restart_connection" | "change_sim"
    ) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let known = state.modems_status.lock().unwrap()["data"]
        .as_array()
        .map(|modems| modems.iter().any(|m| m["id"] == req.data.id.as_str()))
        .unwrap_or(false);
    if !known {
        return Json(json!({
            "success": false,
            "errors": [{"code": 113, "error": "Resource not found", "source": "modems"}]
        }))
        .into_response();
    }

    state
        .modem_actions
        .lock()
        .unwrap()
        .push((action, req.data.id));
    Json(json!({"success": true})).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_device_startup() {
        let (device, url) = MockDevice::new().start().await.unwrap();

        assert!(device.port() > 0);
        assert!(url.contains(&device.port().to_string()));
        assert!(url.ends_with("/api"));

        let response = reqwest::get(format!("{}/unauthorized/status", url))
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(device.state().count("GET /api/unauthorized/status"), 1);
    }

    #[tokio::test]
    async fn test_login_issues_accepted_token() {
        let (device, url) = MockDevice::new().start().await.unwrap();
        let client = reqwest::Client::new();

        let body: Value = client
            .post(format!("{}/login", url))
            .json(&json!({"username": TEST_USERNAME, "password": TEST_PASSWORD}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let token = body["data"]["token"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["expires"], 299);
        assert!(device.state().tokens.lock().unwrap().contains(&token));

        let response = client
            .get(format!("{}/modems/status", url))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn test_protected_endpoint_requires_token() {
        let (_, url) = MockDevice::new().start().await.unwrap();

        let response = reqwest::Client::new()
            .get(format!("{}/system/device/status", url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_canned_response() {
        let (device, url) = MockDevice::new().start().await.unwrap();
        device.state().set_response(
            "/api/unauthorized/status",
            StatusCode::BAD_GATEWAY,
            "<html>Bad Gateway</html>",
        );

        let response = reqwest::get(format!("{}/unauthorized/status", url))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(response.text().await.unwrap(), "<html>Bad Gateway</html>");

        device.state().clear_response("/api/unauthorized/status");
        let response = reqwest::get(format!("{}/unauthorized/status", url))
            .await
            .unwrap();
        assert!(response.status().is_success());
    }
}
