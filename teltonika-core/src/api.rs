//! Response envelope and session payloads of the Teltonika REST API
//!
//! Every device response is wrapped as `{"success": bool, "data": T, "errors": [...]}`.
//! Some firmware versions report missing values as the string `"N/A"`, so the
//! envelope is normalised before any schema validation takes place.

use crate::error::Result;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Placeholder some firmware versions emit instead of `null`.
pub const NOT_AVAILABLE: &str = "N/A";

/// Error entry reported by the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Numeric error code (see [`crate::ErrorCode`])
    pub code: i64,
    /// Error message
    pub error: String,
    /// Component that raised the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Configuration section involved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.error, self.code)
    }
}

/// Generic API response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the device accepted the request
    pub success: bool,
    /// Payload, present on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error details, present on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ApiError>>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            errors: None,
        }
    }

    /// Create a failed response
    pub fn failure(errors: Vec<ApiError>) -> Self {
        Self {
            success: false,
            data: None,
            errors: Some(errors),
        }
    }

    /// First error with the given code, if any.
    pub fn error_by_code(&self, code: i64) -> Option<&ApiError> {
        self.errors.as_deref()?.iter().find(|e| e.code == code)
    }

    /// First reported error, if any.
    pub fn first_error(&self) -> Option<&ApiError> {
        self.errors.as_deref()?.first()
    }
}

impl ApiResponse<Value> {
    /// Parse a raw body into an envelope with an undecoded payload.
    ///
    /// `"N/A"` strings are replaced by `null` throughout.
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        Ok(serde_json::from_value(normalize_na(value))?)
    }

    /// Validate the payload against `T`.
    ///
    /// Fails as a whole if the payload does not match; no partial records.
    pub fn decode<T: DeserializeOwned>(self) -> Result<ApiResponse<T>> {
        let data = self.data.map(serde_json::from_value).transpose()?;
        Ok(ApiResponse {
            success: self.success,
            data,
            errors: self.errors,
        })
    }
}

/// Replace every `"N/A"` string by `null`, recursively.
pub fn normalize_na(value: Value) -> Value {
    match value {
        Value::String(s) if s == NOT_AVAILABLE => Value::Null,
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_na).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| (key, normalize_na(val)))
                .collect(),
        ),
        other => other,
    }
}

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Session token returned by `/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    /// User the token was issued for
    pub username: String,
    /// Bearer token
    pub token: String,
    /// Token lifetime in seconds
    pub expires: u64,
}

/// Response body of `/logout`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub response: String,
}

/// Response body of `/session/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub active: bool,
}

/// Body of modem action requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemActionRequest {
    pub data: ModemActionTarget,
}

/// Modem targeted by an action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemActionTarget {
    pub id: String,
}

impl ModemActionRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            data: ModemActionTarget { id: id.into() },
        }
    }
}

/// Value the device reports either as a number or as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(i64),
    Text(String),
}

impl fmt::Display for NumberOrText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberOrText::Number(n) => write!(f, "{}", n),
            NumberOrText::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientInt {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Optional integer that may arrive as a JSON number or a numeric string.
pub(crate) fn opt_lenient_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LenientInt>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LenientInt::Int(v)) => Ok(Some(v)),
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
        Some(LenientInt::Float(v))
            if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 =>
        {
            Ok(Some(v as i64))
        }
        Some(LenientInt::Float(v)) => Err(D::Error::custom(format!(
            "expected an integer, got {}",
            v
        ))),
        Some(LenientInt::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected an integer, got {:?}", s))),
    }
}
