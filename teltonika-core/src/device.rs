//! Device metadata available without authentication (`/unauthorized/status`)

use serde::{Deserialize, Serialize};

/// Legal warning some devices display before login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityBanner {
    pub title: String,
    pub message: String,
}

/// Public device identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// WebUI language
    pub lang: String,
    /// Firmware image file name, when exposed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Configured device name
    pub device_name: String,
    /// Product model, e.g. "RUTX50"
    pub device_model: String,
    /// REST API version
    pub api_version: String,
    /// Stable device identifier
    pub device_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_banner: Option<SecurityBanner>,
}
