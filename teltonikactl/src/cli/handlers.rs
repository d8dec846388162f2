//! Command execution handlers

use anyhow::Result;
use serde_json::json;
use std::path::Path;

use crate::client::{ModemAction, TeltonikaClient};
use crate::config::CliConfig;
use crate::format::{self, format_success};

use super::commands::*;

/// Handle info command
pub async fn handle_info(client: &TeltonikaClient, format: &OutputFormat) -> Result<()> {
    let info = client.get_device_info().await?;
    println!("{}", format::format_device_info(&info, &format.into())?);
    Ok(())
}

/// Handle system command
pub async fn handle_system(client: &TeltonikaClient, format: &OutputFormat) -> Result<()> {
    let info = client.get_system_info().await?;
    println!("{}", format::format_system_info(&info, &format.into())?);
    Ok(())
}

/// Handle modems command
pub async fn handle_modems(client: &TeltonikaClient, format: &OutputFormat) -> Result<()> {
    let modems = client.get_modem_status().await?;
    println!("{}", format::format_modems(&modems, &format.into())?);
    Ok(())
}

/// Handle validate command
///
/// Rejected credentials are reported as an error so the exit status reflects them.
pub async fn handle_validate(client: &TeltonikaClient, format: &OutputFormat) -> Result<()> {
    let valid = client.validate_credentials().await?;
    let username = &client.config().username;

    match format {
        OutputFormat::Json => {
            let body = json!({"username": username, "valid": valid});
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Table if valid => {
            println!(
                "{}",
                format_success(&format!("Credentials accepted for '{}'", username))
            );
        }
        OutputFormat::Table => {}
    }

    if !valid {
        anyhow::bail!("Credentials rejected for '{}'", username);
    }
    Ok(())
}

/// Handle session command
pub async fn handle_session(client: &TeltonikaClient, format: &OutputFormat) -> Result<()> {
    client.authenticate().await?;
    let status = client.session_status().await?;
    println!("{}", format::format_session(&status, &format.into())?);

    client.logout().await?;
    Ok(())
}

/// Handle logout command
///
/// No token survives between runs, so this is a login/logout round trip. An
/// unconfirmed logout is reported as an error so the exit status reflects it.
pub async fn handle_logout(client: &TeltonikaClient, format: &OutputFormat) -> Result<()> {
    let token = client.authenticate().await?;
    let confirmed = client.logout().await?;

    match format {
        OutputFormat::Json => {
            let body = json!({"username": token.username, "logged_out": confirmed});
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Table if confirmed => {
            println!(
                "{}",
                format_success(&format!("Session opened and revoked for '{}'", token.username))
            );
        }
        OutputFormat::Table => {}
    }

    if !confirmed {
        anyhow::bail!("Device did not confirm the logout for '{}'", token.username);
    }
    Ok(())
}

/// Handle reboot command
pub async fn handle_reboot(client: &TeltonikaClient, format: &OutputFormat) -> Result<()> {
    let accepted = client.reboot_device().await?;

    if let OutputFormat::Json = format {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({"accepted": accepted}))?
        );
    } else if accepted {
        println!("{}", format_success("Reboot requested"));
    }

    if !accepted {
        anyhow::bail!("Device refused to reboot");
    }
    Ok(())
}

/// Handle modem commands
pub async fn handle_modem(
    client: &TeltonikaClient,
    command: ModemCommands,
    format: &OutputFormat,
) -> Result<()> {
    let (action, id) = match command {
        ModemCommands::Reboot { id } => (ModemAction::Reboot, id),
        ModemCommands::Restart { id } => (ModemAction::RestartConnection, id),
        ModemCommands::SwitchSim { id } => (ModemAction::SwitchSim, id),
    };

    client.modem_action(action, &id).await?;

    match format {
        OutputFormat::Json => {
            let body = json!({"modem": id, "action": action.to_string(), "success": true});
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Table => {
            println!(
                "{}",
                format_success(&format!("Modem {}: {} requested", id, action))
            );
        }
    }

    Ok(())
}

/// Handle config commands
///
/// `config_file` is the file passed with `--config`, if any.
pub fn handle_config(
    command: ConfigCommands,
    current_config: &CliConfig,
    config_file: Option<&Path>,
    format: &OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("{}", format::format_config(current_config, &format.into())?);
        }
        ConfigCommands::Path => {
            let path = match config_file {
                Some(path) => path.to_path_buf(),
                None => CliConfig::config_path()?,
            };
            println!("{}", path.display());
        }
    }

    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
