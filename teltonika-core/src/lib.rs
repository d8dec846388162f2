//! Teltonika Core Library
//!
//! Wire models, the response envelope and the error taxonomy for the Teltonika
//! router REST API. This crate performs no I/O; `teltonikactl` builds the HTTP
//! client on top of it.

#![recursion_limit = "256"]

pub mod api;
pub mod device;
pub mod error;
pub mod error_codes;
pub mod modems;
pub mod system;

// Re-export commonly used types
pub use api::{ApiError, ApiResponse, NumberOrText, SessionStatus, TokenData};
pub use device::{DeviceInfo, SecurityBanner};
pub use error::*;
pub use error_codes::{is_auth_code, ErrorCode};
pub use modems::{
    decode_mobile_stage, decode_ue_state, offline_modems, online_modems, ModemStatus,
    OfflineModem, OnlineModem,
};
pub use system::{StaticInfo, SystemInfo};
