//! Teltonika CLI
//!
//! Command-line interface for Teltonika routers.

use anyhow::Result;
use clap::Parser;
use teltonikactl::cli::{
    generate_completion, handle_config, handle_info, handle_logout, handle_modem, handle_modems,
    handle_reboot, handle_session, handle_system, handle_validate, Cli, Commands, OutputFormat,
};
use teltonikactl::client::TeltonikaClient;
use teltonikactl::config::CliConfig;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Build configuration using priority chain: defaults → file → env → CLI args
    let mut builder = CliConfig::builder();

    builder = match &cli.config {
        Some(path) => builder.with_config_path(path)?,
        None => builder.with_config_file(!cli.no_config)?,
    };

    builder = builder.with_env_overrides();

    if let Some(ref url) = cli.url {
        builder = builder.with_url(url)?;
    }
    if let Some(ref username) = cli.username {
        builder = builder.with_username(username)?;
    }
    if let Some(ref password) = cli.password {
        builder = builder.with_password(password);
    }
    if cli.insecure {
        builder = builder.with_verify_ssl(false);
    }
    if let Some(timeout) = cli.timeout {
        builder = builder.with_timeout(timeout)?;
    }
    if let Some(ref format) = cli.format {
        builder = builder.with_output_format(format.as_str())?;
    }

    let config = match builder.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let output_format = match config.output_format.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };
    debug!(?config, "Effective configuration");

    let result = match cli.command {
        Commands::Config { command } => {
            handle_config(command, &config, cli.config.as_deref(), &output_format)
        }
        Commands::Completion { shell } => {
            generate_completion(shell);
            Ok(())
        }
        command => run(&config, command, &output_format).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if cli.verbose {
            eprintln!("Error details: {:?}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Run a device command; the session is released whatever the outcome.
async fn run(config: &CliConfig, command: Commands, format: &OutputFormat) -> Result<()> {
    let client = TeltonikaClient::new(config.to_client_config())?;
    debug!("Using device at {}", client.base_url());

    client
        .scope(move |client| async move {
            match command {
                Commands::Info => handle_info(client, format).await,
                Commands::System => handle_system(client, format).await,
                Commands::Modems => handle_modems(client, format).await,
                Commands::Validate => handle_validate(client, format).await,
                Commands::Session => handle_session(client, format).await,
                Commands::Logout => handle_logout(client, format).await,
                Commands::Reboot => handle_reboot(client, format).await,
                Commands::Modem { command } => handle_modem(client, command, format).await,
                Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
            }
        })
        .await
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,teltonikactl=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
