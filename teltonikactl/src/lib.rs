//! Teltonika CLI Library
//!
//! Async client for the REST API of Teltonika routers, plus the building
//! blocks of the `teltonikactl` command-line tool.
//!
//! # Public API
//!
//! The primary public API is [`client::TeltonikaClient`]. Wire models and the
//! error type live in [`teltonika_core`]. Configuration types are available via
//! [`config::CliConfig`] and [`config::ConfigBuilder`].
//!
//! ```no_run
//! use teltonikactl::client::{ClientConfig, TeltonikaClient};
//!
//! # async fn example() -> teltonika_core::Result<()> {
//! let client = TeltonikaClient::new(ClientConfig::new(
//!     "https://192.168.1.1/api",
//!     "admin",
//!     "secret",
//! ))?;
//!
//! let info = client
//!     .scope(|c| async move { c.get_device_info().await })
//!     .await?;
//! println!("{} ({})", info.device_name, info.device_model);
//! # Ok(())
//! # }
//! ```

/// Bearer token state.
pub mod auth;

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// HTTP client for communicating with a Teltonika device.
pub mod client;

/// Configuration types for the CLI tool.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;

#[cfg(test)]
pub mod test_utils;
