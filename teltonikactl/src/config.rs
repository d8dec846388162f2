//! CLI configuration management
//!
//! Settings come from, lowest priority first: defaults, the config file,
//! `TELTONIKA_*` environment variables, then command-line flags. The config
//! file is only ever read.

use crate::client::ClientConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Address of a device in its factory configuration.
pub const DEFAULT_URL: &str = "https://192.168.1.1/api";

const ENV_URL: &str = "TELTONIKA_URL";
const ENV_USERNAME: &str = "TELTONIKA_USERNAME";
const ENV_PASSWORD: &str = "TELTONIKA_PASSWORD";
const ENV_VERIFY_SSL: &str = "TELTONIKA_VERIFY_SSL";
const ENV_FORMAT: &str = "TELTONIKA_FORMAT";
const ENV_TIMEOUT: &str = "TELTONIKA_TIMEOUT";

/// CLI configuration
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Device API root
    pub url: String,

    pub username: String,

    pub password: String,

    /// Verify the device TLS certificate
    pub verify_ssl: bool,

    /// Default output format
    pub output_format: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            username: "admin".to_string(),
            password: String::new(),
            verify_ssl: true,
            output_format: "table".to_string(),
            timeout: 10,
        }
    }
}

impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("verify_ssl", &self.verify_ssl)
            .field("output_format", &self.output_format)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CliConfig {
    /// Load configuration from the default file, or defaults if there is none
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            debug!("No config file at {}", config_path.display());
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read CLI config file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse CLI config file {}", path.display()))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine config directory"))?;

        Ok(config_dir.join("teltonika").join("cli.toml"))
    }

    /// Library client settings for this configuration
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.url, &self.username, &self.password)
            .with_verify_ssl(self.verify_ssl)
            .with_timeout(Duration::from_secs(self.timeout))
    }

    /// Create a new builder for constructing configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for CLI configuration with validation and priority chain support
///
/// Each layer overwrites the values it provides, so layers must be applied
/// from lowest to highest priority:
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables
/// 4. CLI arguments
#[derive(Default)]
pub struct ConfigBuilder {
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    verify_ssl: Option<bool>,
    output_format: Option<String>,
    timeout: Option<u64>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set device URL (with validation)
    pub fn with_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        Self::validate_url(&url)?;
        self.url = Some(url);
        Ok(self)
    }

    /// Set username (with validation)
    pub fn with_username(mut self, username: impl Into<String>) -> Result<Self> {
        let username = username.into();
        Self::validate_username(&username)?;
        self.username = Some(username);
        Ok(self)
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = Some(verify_ssl);
        self
    }

    /// Set output format (with validation)
    pub fn with_output_format(mut self, format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        Self::validate_output_format(&format)?;
        self.output_format = Some(format);
        Ok(self)
    }

    /// Set timeout in seconds (with validation)
    pub fn with_timeout(mut self, timeout: u64) -> Result<Self> {
        Self::validate_timeout(timeout)?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    /// Apply the default config file, if present
    ///
    /// An unreadable or malformed file is reported and skipped.
    pub fn with_config_file(self, load_file: bool) -> Result<Self> {
        if !load_file {
            return Ok(self);
        }

        match CliConfig::load() {
            Ok(config) => Ok(self.overlay(config)),
            Err(e) => {
                warn!("Ignoring config file: {:#}", e);
                Ok(self)
            }
        }
    }

    /// Apply a config file given explicitly; failing to load it is an error
    pub fn with_config_path(self, path: &Path) -> Result<Self> {
        let config = CliConfig::load_from(path)?;
        Ok(self.overlay(config))
    }

    fn overlay(self, config: CliConfig) -> Self {
        Self {
            url: Some(config.url),
            username: Some(config.username),
            password: Some(config.password),
            verify_ssl: Some(config.verify_ssl),
            output_format: Some(config.output_format),
            timeout: Some(config.timeout),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_URL) {
            if Self::validate_url(&url).is_ok() {
                self.url = Some(url);
            }
        }

        if let Ok(username) = std::env::var(ENV_USERNAME) {
            if Self::validate_username(&username).is_ok() {
                self.username = Some(username);
            }
        }

        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            self.password = Some(password);
        }

        if let Ok(verify) = std::env::var(ENV_VERIFY_SSL) {
            if let Some(verify) = parse_bool(&verify) {
                self.verify_ssl = Some(verify);
            }
        }

        if let Ok(format) = std::env::var(ENV_FORMAT) {
            if Self::validate_output_format(&format).is_ok() {
                self.output_format = Some(format);
            }
        }

        if let Ok(timeout) = std::env::var(ENV_TIMEOUT) {
            if let Ok(timeout) = timeout.parse() {
                if Self::validate_timeout(timeout).is_ok() {
                    self.timeout = Some(timeout);
                }
            }
        }

        self
    }

    /// Build the final configuration with validation
    pub fn build(self) -> Result<CliConfig> {
        let defaults = CliConfig::default();

        let url = self.url.unwrap_or(defaults.url);
        let username = self.username.unwrap_or(defaults.username);
        let output_format = self.output_format.unwrap_or(defaults.output_format);
        let timeout = self.timeout.unwrap_or(defaults.timeout);

        // Values from the config file are only checked here
        Self::validate_url(&url)?;
        Self::validate_username(&username)?;
        Self::validate_output_format(&output_format)?;
        Self::validate_timeout(timeout)?;

        Ok(CliConfig {
            url,
            username,
            password: self.password.unwrap_or(defaults.password),
            verify_ssl: self.verify_ssl.unwrap_or(defaults.verify_ssl),
            output_format,
            timeout,
        })
    }

    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(anyhow::anyhow!("Device URL cannot be empty"));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "Device URL must start with http:// or https://"
            ));
        }

        Ok(())
    }

    fn validate_username(username: &str) -> Result<()> {
        if username.trim().is_empty() {
            return Err(anyhow::anyhow!("Username cannot be empty"));
        }
        Ok(())
    }

    fn validate_output_format(format: &str) -> Result<()> {
        match format {
            "table" | "json" => Ok(()),
            _ => Err(anyhow::anyhow!(
                "Invalid output format '{}'. Must be 'table' or 'json'",
                format
            )),
        }
    }

    fn validate_timeout(timeout: u64) -> Result<()> {
        if timeout == 0 {
            return Err(anyhow::anyhow!("Timeout must be greater than 0"));
        }

        if timeout > 300 {
            return Err(anyhow::anyhow!(
                "Timeout must be less than or equal to 300 seconds"
            ));
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
