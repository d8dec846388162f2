//! HTTP client for communicating with a Teltonika device.

use crate::auth::Token;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use teltonika_core::api::{LoginRequest, LogoutResponse, ModemActionRequest};
use teltonika_core::{
    is_auth_code, ApiResponse, DeviceInfo, ModemStatus, Result, SessionStatus, SystemInfo,
    TeltonikaError, TokenData,
};
use tracing::{debug, warn};

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Normalize a base URL by removing trailing slashes.
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Connection settings for a single device.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, e.g. `https://192.168.1.1/api`
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Reject self-signed certificates when `true`
    pub verify_ssl: bool,
    /// Upper bound for each request, connection included
    pub timeout: Duration,
}

impl ClientConfig {
    /// Configuration with TLS verification enabled and the default timeout.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            verify_ssl: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check that the configuration can be used to reach a device.
    ///
    /// # Errors
    ///
    /// Returns `TeltonikaError::Config` if the base URL is empty or not
    /// `http://`/`https://`, or if the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(TeltonikaError::Config("Base URL cannot be empty".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(TeltonikaError::Config(format!(
                "Base URL must start with http:// or https://, got: {}",
                url
            )));
        }
        if self.timeout.is_zero() {
            return Err(TeltonikaError::Config(
                "Timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Modem operations exposed under `modems/actions/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemAction {
    Reboot,
    RestartConnection,
    SwitchSim,
}

impl ModemAction {
    pub fn endpoint(self) -> &'static str {
        match self {
            ModemAction::Reboot => "modems/actions/reboot",
            ModemAction::RestartConnection => "modems/actions/restart_connection",
            ModemAction::SwitchSim => "modems/actions/change_sim",
        }
    }

    fn description(self) -> &'static str {
        match self {
            ModemAction::Reboot => "reboot modem",
            ModemAction::RestartConnection => "restart modem connection",
            ModemAction::SwitchSim => "switch modem SIM",
        }
    }
}

impl fmt::Display for ModemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Async client for the REST API of one Teltonika device.
///
/// The client owns at most one HTTP session, opened lazily on the first
/// request and released by [`close`](Self::close), at the end of
/// [`scope`](Self::scope), or on drop. Authenticated calls log in on demand
/// and reuse the bearer token until it is about to expire.
///
/// Every call performs a single round trip (plus a login when needed). Nothing
/// is retried.
///
/// # Examples
///
/// ```no_run
/// use teltonikactl::client::{ClientConfig, TeltonikaClient};
///
/// # async fn example() -> teltonika_core::Result<()> {
/// let config = ClientConfig::new("https://192.168.1.1/api", "admin", "secret")
///     .with_verify_ssl(false);
/// let client = TeltonikaClient::new(config)?;
///
/// let modems = client
///     .scope(|c| async move { c.get_modem_status().await })
///     .await?;
/// println!("{} modem(s)", modems.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TeltonikaClient {
    config: ClientConfig,
    base_url: String,
    session: Mutex<Option<Client>>,
    token: Mutex<Option<Token>>,
}

/// Closes the client when the enclosing scope ends, however it ends.
struct CloseOnExit<'a>(&'a TeltonikaClient);

impl Drop for CloseOnExit<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

impl TeltonikaClient {
    /// Create a client. No connection is made until the first request.
    ///
    /// # Errors
    ///
    /// Returns `TeltonikaError::Config` if the configuration is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_url = normalize_url(config.base_url.trim());

        Ok(Self {
            config,
            base_url,
            session: Mutex::new(None),
            token: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// API root without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether an HTTP session is currently open.
    pub fn has_session(&self) -> bool {
        lock(&self.session).is_some()
    }

    /// Whether a token is cached and still usable.
    pub fn is_authenticated(&self) -> bool {
        lock(&self.token)
            .as_ref()
            .map(|token| !token.is_expired())
            .unwrap_or(false)
    }

    /// Release the HTTP session and forget the cached token.
    ///
    /// Idempotent. The token is not revoked on the device; call
    /// [`logout`](Self::logout) first for that. A later request opens a new
    /// session.
    pub fn close(&self) {
        let session = lock(&self.session).take();
        lock(&self.token).take();

        if session.is_some() {
            debug!("Released session for {}", self.base_url);
        }
    }

    /// Run `f` with this client and close it when `f` completes.
    ///
    /// The client is closed exactly once, whether `f` succeeds, fails, panics
    /// or is cancelled. The output of `f` is returned unchanged.
    pub async fn scope<'a, F, Fut, T>(&'a self, f: F) -> T
    where
        F: FnOnce(&'a Self) -> Fut,
        Fut: Future<Output = T> + 'a,
    {
        let _guard = CloseOnExit(self);
        f(self).await
    }

    /// Fetch public device metadata. No credentials are needed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device is unreachable or the request times out (`Connection`)
    /// - The payload does not match the expected schema (`Decode`)
    /// - The device answers with an unsuccessful envelope
    pub async fn get_device_info(&self) -> Result<DeviceInfo> {
        let endpoint = "unauthorized/status";
        debug!("GET {}", endpoint);

        let request = self.session()?.get(self.url(endpoint));
        let (status, text) = self.send(request, endpoint).await?;
        let envelope = Self::parse_envelope(status, &text, endpoint)?;

        Self::into_data(envelope, endpoint, "get device info")
    }

    /// Check the configured credentials by logging in and out again.
    ///
    /// # Returns
    ///
    /// `Ok(false)` when the device rejects the credentials, `Ok(true)` when
    /// it accepts them.
    ///
    /// # Errors
    ///
    /// Only transport and decode failures are errors.
    pub async fn validate_credentials(&self) -> Result<bool> {
        let outcome = match self.authenticate().await {
            Ok(_) => Ok(true),
            Err(e) if e.is_auth() => {
                warn!("Credentials rejected for {}: {}", self.config.username, e);
                Ok(false)
            }
            Err(e) => Err(e),
        };

        let logout = self.logout().await;
        let valid = outcome?;
        logout?;
        Ok(valid)
    }

    /// Fetch the authenticated system snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Auth`/`InvalidCredentials` if the device rejects the
    /// credentials, `Decode` on a malformed payload and `Connection` on
    /// transport failure.
    pub async fn get_system_info(&self) -> Result<SystemInfo> {
        let endpoint = "system/device/status";
        let envelope = self.authorized(Method::GET, endpoint, None).await?;
        Self::into_data(envelope, endpoint, "get system info")
    }

    /// Fetch the status of every modem, in device order.
    ///
    /// A device without modems yields an empty list.
    pub async fn get_modem_status(&self) -> Result<Vec<ModemStatus>> {
        let endpoint = "modems/status";
        let envelope = self.authorized(Method::GET, endpoint, None).await?;
        Self::into_data(envelope, endpoint, "get modem status")
    }

    /// Log in with the configured credentials and cache the token.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` if the device answers HTTP 401
    /// - `Auth` with the device error code if the envelope reports an error
    /// - `Connection`/`Decode` on transport or payload failures
    pub async fn authenticate(&self) -> Result<TokenData> {
        let endpoint = "login";
        debug!("Logging in to {} as {}", self.base_url, self.config.username);

        let body = LoginRequest {
            username: self.config.username.clone(),
            password: self.config.password.clone(),
        };
        let request = self.session()?.post(self.url(endpoint)).json(&body);
        let (status, text) = self.send(request, endpoint).await?;

        let envelope = match ApiResponse::parse(&text) {
            Ok(envelope) => envelope,
            Err(_) if status == StatusCode::UNAUTHORIZED => {
                return Err(TeltonikaError::InvalidCredentials)
            }
            Err(e) => return Err(decode_error(endpoint, status, e)),
        };

        if let ApiResponse {
            success: true,
            data: Some(data),
            ..
        } = envelope
        {
            let token: TokenData = serde_json::from_value(data)
                .map_err(|e| TeltonikaError::Decode(format!("Invalid {} payload: {}", endpoint, e)))?;
            debug!(
                "Logged in as {}, token valid for {}s",
                token.username, token.expires
            );
            *lock(&self.token) = Some(Token::new(token.clone(), Instant::now()));
            return Ok(token);
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!("Login rejected for {}", self.config.username);
            return Err(TeltonikaError::InvalidCredentials);
        }

        match envelope.first_error() {
            Some(err) => {
                warn!("Login failed: {}", err);
                Err(TeltonikaError::Auth {
                    message: format!("Authentication failed: {}", err),
                    code: Some(err.code),
                })
            }
            None => Err(TeltonikaError::auth("Authentication failed")),
        }
    }

    /// Revoke the cached token on the device.
    ///
    /// The token is forgotten locally whatever the outcome. Without a token
    /// this succeeds without contacting the device.
    ///
    /// # Returns
    ///
    /// Whether the device confirmed the logout.
    pub async fn logout(&self) -> Result<bool> {
        let endpoint = "logout";
        let token = lock(&self.token).take();
        let Some(token) = token else {
            debug!("No active session to log out");
            return Ok(true);
        };

        debug!("Logging out {}", token.username());
        let request = self
            .session()?
            .post(self.url(endpoint))
            .bearer_auth(token.value());
        let (status, text) = self.send(request, endpoint).await?;

        match ApiResponse::parse(&text) {
            Ok(envelope) => {
                let confirmed = envelope.success;
                match envelope.decode::<LogoutResponse>() {
                    Ok(ApiResponse {
                        data: Some(reply), ..
                    }) => debug!("Logout answered: {}", reply.response),
                    Ok(_) => {}
                    Err(e) => debug!("Ignoring unexpected logout payload: {}", e),
                }
                Ok(confirmed)
            }
            Err(_) if status == StatusCode::UNAUTHORIZED => Ok(false),
            Err(e) => Err(decode_error(endpoint, status, e)),
        }
    }

    /// Ask the device whether the cached token is still active.
    ///
    /// Without a token, on transport failure, or on an inactive answer the
    /// token is forgotten and the session is reported inactive.
    pub async fn session_status(&self) -> Result<SessionStatus> {
        let endpoint = "session/status";
        let inactive = SessionStatus { active: false };

        let token = lock(&self.token).as_ref().map(|t| t.value().to_string());
        let Some(token) = token else {
            return Ok(inactive);
        };

        let request = self
            .session()?
            .get(self.url(endpoint))
            .bearer_auth(&token);
        let text = match self.send(request, endpoint).await {
            Ok((_, text)) => text,
            Err(e) => {
                debug!("Session status check failed: {}", e);
                self.forget_token(&token);
                return Ok(inactive);
            }
        };

        let status = match ApiResponse::parse(&text) {
            Ok(ApiResponse {
                success: true,
                data: Some(data),
                ..
            }) => serde_json::from_value::<SessionStatus>(data).map_err(|e| {
                TeltonikaError::Decode(format!("Invalid {} payload: {}", endpoint, e))
            })?,
            _ => inactive,
        };

        if !status.active {
            self.forget_token(&token);
        }
        Ok(status)
    }

    /// Reboot the device.
    ///
    /// # Returns
    ///
    /// Whether the device accepted the request.
    pub async fn reboot_device(&self) -> Result<bool> {
        let envelope = self
            .authorized(Method::POST, "system/actions/reboot", None)
            .await?;
        Ok(envelope.success)
    }

    /// Reboot the modem with the given identifier.
    pub async fn reboot_modem(&self, modem_id: &str) -> Result<()> {
        self.modem_action(ModemAction::Reboot, modem_id).await
    }

    /// Restart the mobile data connection of a modem.
    pub async fn restart_connection(&self, modem_id: &str) -> Result<()> {
        self.modem_action(ModemAction::RestartConnection, modem_id)
            .await
    }

    /// Switch a dual-SIM modem to its other SIM slot.
    pub async fn switch_sim(&self, modem_id: &str) -> Result<()> {
        self.modem_action(ModemAction::SwitchSim, modem_id).await
    }

    /// Run a modem action.
    ///
    /// # Errors
    ///
    /// - `Auth` carrying `"<error> (code <n>)"` for authentication codes
    /// - `Api` for any other device error
    /// - `Connection("Failed to <action>")` for a failure without details
    pub async fn modem_action(&self, action: ModemAction, modem_id: &str) -> Result<()> {
        let body = serde_json::to_value(ModemActionRequest::new(modem_id))?;
        let envelope = self
            .authorized(Method::POST, action.endpoint(), Some(body))
            .await?;

        if envelope.success {
            debug!("Modem {}: {} accepted", modem_id, action);
            Ok(())
        } else {
            Err(failure(&envelope, action.description()))
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Current HTTP session, opened on first use.
    fn session(&self) -> Result<Client> {
        let mut slot = lock(&self.session);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let client = Client::builder()
            .timeout(self.config.timeout)
            .user_agent(concat!("teltonikactl/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!self.config.verify_ssl)
            .build()
            .map_err(|e| TeltonikaError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Opened session for {}", self.base_url);
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Cached token, logging in first if it is missing or expired.
    async fn bearer_token(&self) -> Result<String> {
        let cached = lock(&self.token)
            .as_ref()
            .filter(|token| !token.is_expired())
            .map(|token| token.value().to_string());

        match cached {
            Some(token) => Ok(token),
            None => Ok(self.authenticate().await?.token),
        }
    }

    /// Forget the cached token unless it was already replaced.
    fn forget_token(&self, value: &str) {
        let mut slot = lock(&self.token);
        if slot.as_ref().map(|t| t.value() == value).unwrap_or(false) {
            *slot = None;
        }
    }

    async fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<(StatusCode, String)> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        debug!("{} answered HTTP {}", endpoint, status.as_u16());
        Ok((status, text))
    }

    fn transport_error(&self, err: reqwest::Error) -> TeltonikaError {
        let message = if err.is_timeout() {
            format!(
                "Timed out after {}s waiting for {}",
                self.config.timeout.as_secs_f32(),
                self.base_url
            )
        } else if err.is_connect() {
            format!("Cannot connect to {}: {}", self.base_url, err)
        } else {
            format!("Request to {} failed: {}", self.base_url, err)
        };
        TeltonikaError::Connection(message)
    }

    /// Send an authenticated request and return the device envelope.
    ///
    /// A 401 answer or an authentication error code drops the token that was
    /// used, so the next call logs in again.
    async fn authorized(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse<Value>> {
        let token = self.bearer_token().await?;

        debug!("{} {}", method, endpoint);
        let mut request = self
            .session()?
            .request(method, self.url(endpoint))
            .bearer_auth(&token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let (status, text) = self.send(request, endpoint).await?;

        let envelope = match ApiResponse::parse(&text) {
            Ok(envelope) => envelope,
            Err(_) if status == StatusCode::UNAUTHORIZED => {
                self.forget_token(&token);
                return Err(TeltonikaError::auth(format!(
                    "Unauthorized access to {}",
                    endpoint
                )));
            }
            Err(e) => return Err(decode_error(endpoint, status, e)),
        };

        let auth_error = envelope
            .first_error()
            .filter(|err| !envelope.success && is_auth_code(err.code));
        if status == StatusCode::UNAUTHORIZED || auth_error.is_some() {
            warn!("Device rejected the session token on {}", endpoint);
            self.forget_token(&token);
            return Err(match auth_error.or_else(|| envelope.first_error()) {
                Some(err) => TeltonikaError::Auth {
                    message: err.to_string(),
                    code: Some(err.code),
                },
                None => TeltonikaError::auth(format!("Unauthorized access to {}", endpoint)),
            });
        }

        Ok(envelope)
    }

    /// Parse a response body into an envelope.
    ///
    /// A non-JSON 401 page counts as an authentication failure.
    fn parse_envelope(status: StatusCode, text: &str, endpoint: &str) -> Result<ApiResponse<Value>> {
        match ApiResponse::parse(text) {
            Ok(envelope) => Ok(envelope),
            Err(_) if status == StatusCode::UNAUTHORIZED => Err(TeltonikaError::auth(format!(
                "Unauthorized access to {}",
                endpoint
            ))),
            Err(e) => Err(decode_error(endpoint, status, e)),
        }
    }

    /// Extract and validate the payload of a successful envelope.
    fn into_data<T: DeserializeOwned>(
        envelope: ApiResponse<Value>,
        endpoint: &str,
        action: &str,
    ) -> Result<T> {
        match envelope {
            ApiResponse {
                success: true,
                data: Some(data),
                ..
            } => serde_json::from_value(data)
                .map_err(|e| TeltonikaError::Decode(format!("Invalid {} payload: {}", endpoint, e))),
            envelope => Err(failure(&envelope, action)),
        }
    }
}

impl Drop for TeltonikaClient {
    fn drop(&mut self) {
        self.close();
    }
}

/// Map an unsuccessful envelope to an error.
fn failure(envelope: &ApiResponse<Value>, action: &str) -> TeltonikaError {
    match envelope.first_error() {
        Some(err) if is_auth_code(err.code) => TeltonikaError::Auth {
            message: err.to_string(),
            code: Some(err.code),
        },
        Some(err) => {
            warn!("Failed to {}: {}", action, err);
            TeltonikaError::Api {
                code: err.code,
                message: err.error.clone(),
            }
        }
        None => TeltonikaError::Connection(format!("Failed to {}", action)),
    }
}

fn decode_error(endpoint: &str, status: StatusCode, err: TeltonikaError) -> TeltonikaError {
    let detail = match err {
        TeltonikaError::Decode(detail) => detail,
        other => other.to_string(),
    };
    TeltonikaError::Decode(format!(
        "Invalid response from {} (HTTP {}): {}",
        endpoint,
        status.as_u16(),
        detail
    ))
}
