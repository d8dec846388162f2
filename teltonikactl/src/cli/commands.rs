//! CLI command and subcommand definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Teltonika router CLI
#[derive(Parser, Debug)]
#[command(name = "teltonikactl")]
#[command(version, about = "Teltonika router CLI", long_about = None)]
pub struct Cli {
    /// Device API URL, e.g. https://192.168.1.1/api (overrides config file)
    #[arg(short, long, global = true)]
    pub url: Option<String>,

    /// Username (overrides config file)
    #[arg(short = 'U', long, global = true)]
    pub username: Option<String>,

    /// Password (prefer TELTONIKA_PASSWORD or the config file)
    #[arg(short = 'P', long, global = true)]
    pub password: Option<String>,

    /// Accept self-signed device certificates
    #[arg(short = 'k', long, global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config file)
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    /// Output format (overrides config file)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Don't load config file
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Config file path (default: ~/.config/teltonika/cli.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    Table,
    /// JSON output
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        }
    }
}

impl From<&OutputFormat> for crate::format::OutputFormat {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Table => crate::format::OutputFormat::Table,
            OutputFormat::Json => crate::format::OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show public device information (no login)
    Info,

    /// Show system information
    System,

    /// Show modem status
    Modems,

    /// Check that the configured credentials are accepted
    Validate,

    /// Log in and report whether the session is active
    Session,

    /// Check that a session can be opened and revoked again
    ///
    /// Tokens are not kept between runs, so this logs in and immediately logs
    /// out, verifying that the device honours logout for these credentials.
    Logout,

    /// Reboot the device
    Reboot,

    /// Modem actions
    Modem {
        #[command(subcommand)]
        command: ModemCommands,
    },

    /// Show CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModemCommands {
    /// Reboot a modem
    Reboot {
        /// Modem ID, e.g. 2-1
        id: String,
    },

    /// Restart the mobile data connection of a modem
    Restart {
        /// Modem ID, e.g. 2-1
        id: String,
    },

    /// Switch a dual-SIM modem to its other SIM
    SwitchSim {
        /// Modem ID, e.g. 2-1
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Print the config file location
    Path,
}
