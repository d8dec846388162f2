//! Output formatting utilities for the CLI
//!
//! Provides table and JSON formatting with colors.

use anyhow::Result;
use colored::*;
use serde_json::json;
use teltonika_core::{DeviceInfo, ModemStatus, SessionStatus, SystemInfo};

use tabled::{settings::Style, Table, Tabled};

use crate::config::CliConfig;

/// Output format options
#[derive(Debug, Clone)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Placeholder for values the device did not report
const MISSING: &str = "-";

/// Format public device information
pub fn format_device_info(info: &DeviceInfo, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(info)?),
        OutputFormat::Table => {
            let mut output = String::new();
            output.push_str(&"Device Information".bold().to_string());
            output.push('\n');
            output.push_str(&format!("Name: {}", info.device_name.cyan()));
            output.push('\n');
            output.push_str(&format!("Model: {}", info.device_model.cyan()));
            output.push('\n');
            output.push_str(&format!("Identifier: {}", info.device_identifier));
            output.push('\n');
            output.push_str(&format!("API Version: {}", info.api_version.yellow()));
            output.push('\n');
            output.push_str(&format!("Language: {}", info.lang));

            if let Some(filename) = &info.filename {
                output.push('\n');
                output.push_str(&format!("Firmware Image: {}", filename));
            }

            if let Some(banner) = &info.security_banner {
                output.push_str("\n\n");
                output.push_str(&banner.title.bold().red().to_string());
                output.push('\n');
                output.push_str(&banner.message);
            }

            Ok(output)
        }
    }
}

/// Format the authenticated system snapshot
pub fn format_system_info(info: &SystemInfo, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(info)?),
        OutputFormat::Table => {
            let static_info = &info.static_info;
            let mnf = &info.mnf_info;

            let mut output = String::new();
            output.push_str(&"System Information".bold().to_string());
            output.push('\n');
            output.push_str(&format!(
                "Device: {} ({})",
                static_info.device_name.cyan(),
                static_info.model
            ));
            output.push('\n');
            output.push_str(&format!("Hostname: {}", static_info.hostname));
            output.push('\n');
            output.push_str(&format!("Firmware: {}", info.firmware_version().green()));
            output.push('\n');
            output.push_str(&format!("Built: {}", static_info.fw_build_date));
            output.push('\n');
            output.push_str(&format!(
                "Kernel: {} on {} ({} CPU)",
                static_info.kernel, static_info.system, static_info.cpu_count
            ));
            output.push('\n');
            output.push_str(&format!("Release: {}", static_info.release.description));
            output.push('\n');
            output.push_str(&format!(
                "Serial: {}  Batch: {}  HW rev: {}",
                mnf.serial, mnf.batch, mnf.hw_ver
            ));
            output.push('\n');
            output.push_str(&format!("MAC (LAN/WAN): {} / {}", mnf.mac, mnf.mac_eth));

            if !info.board.modems.is_empty() {
                #[derive(Tabled)]
                struct BoardModemRow {
                    #[tabled(rename = "ID")]
                    id: String,
                    #[tabled(rename = "Description")]
                    desc: String,
                    #[tabled(rename = "SIMs")]
                    sims: String,
                    #[tabled(rename = "Primary")]
                    primary: String,
                }

                let rows: Vec<BoardModemRow> = info
                    .board
                    .modems
                    .iter()
                    .map(|m| BoardModemRow {
                        id: m.id.cyan().to_string(),
                        desc: m.desc.clone(),
                        sims: m.sim_count.to_string(),
                        primary: yes_no(m.primary),
                    })
                    .collect();

                let table = Table::new(rows).with(Style::rounded()).to_string();
                output.push_str("\n\n");
                output.push_str(&format!("{}\n{}", "Board Modems:".bold(), table));
            }

            Ok(output)
        }
    }
}

/// Format modem status list
pub fn format_modems(modems: &[ModemStatus], format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(modems)?),
        OutputFormat::Table => {
            if modems.is_empty() {
                return Ok("No modems reported by the device".dimmed().to_string());
            }

            #[derive(Tabled)]
            struct ModemRow {
                #[tabled(rename = "ID")]
                id: String,
                #[tabled(rename = "Name")]
                name: String,
                #[tabled(rename = "State")]
                state: String,
                #[tabled(rename = "Operator")]
                operator: String,
                #[tabled(rename = "Type")]
                conntype: String,
                #[tabled(rename = "RSSI")]
                rssi: String,
                #[tabled(rename = "Stage")]
                stage: String,
            }

            let rows: Vec<ModemRow> = modems
                .iter()
                .map(|modem| ModemRow {
                    id: modem.id().cyan().to_string(),
                    name: modem.name().unwrap_or(MISSING).to_string(),
                    state: if modem.is_online() {
                        "online".green().to_string()
                    } else {
                        "offline".red().to_string()
                    },
                    operator: modem.operator().unwrap_or(MISSING).to_string(),
                    conntype: modem.conntype().unwrap_or(MISSING).to_string(),
                    rssi: modem.rssi().map(format_rssi).unwrap_or_else(|| MISSING.to_string()),
                    stage: modem
                        .as_online()
                        .and_then(|m| m.mobile_stage_description())
                        .map(|s| s.into_owned())
                        .unwrap_or_else(|| MISSING.to_string()),
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Modems:".bold(), table))
        }
    }
}

/// Format session status
pub fn format_session(status: &SessionStatus, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(status)?),
        OutputFormat::Table => Ok(if status.active {
            format!("Session: {}", "active".green())
        } else {
            format!("Session: {}", "inactive".red())
        }),
    }
}

/// Format the effective CLI configuration, without the password
pub fn format_config(config: &CliConfig, format: &OutputFormat) -> Result<String> {
    let password = if config.password.is_empty() {
        "<unset>"
    } else {
        "<set>"
    };

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "url": config.url,
            "username": config.username,
            "password": password,
            "verify_ssl": config.verify_ssl,
            "output_format": config.output_format,
            "timeout": config.timeout,
        }))?),
        OutputFormat::Table => {
            let mut output = String::new();
            output.push_str(&"CLI Configuration:".bold().to_string());
            output.push('\n');
            output.push_str(&format!("{:<20} Value\n", "Setting"));
            output.push_str(&"-".repeat(40));
            output.push('\n');
            output.push_str(&format!("{:<20} {}\n", "URL", config.url));
            output.push_str(&format!("{:<20} {}\n", "Username", config.username));
            output.push_str(&format!("{:<20} {}\n", "Password", password));
            output.push_str(&format!("{:<20} {}\n", "Verify TLS", config.verify_ssl));
            output.push_str(&format!("{:<20} {}\n", "Output Format", config.output_format));
            output.push_str(&format!("{:<20} {}s", "Timeout", config.timeout));
            Ok(output)
        }
    }
}

/// Colour an RSSI value by signal quality
fn format_rssi(rssi: i64) -> String {
    let text = format!("{} dBm", rssi);
    if rssi >= -70 {
        text.green().to_string()
    } else if rssi >= -85 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

fn yes_no(value: bool) -> String {
    if value {
        "Yes".green().to_string()
    } else {
        "No".dimmed().to_string()
    }
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}
