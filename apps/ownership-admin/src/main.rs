use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ownership_admin::auth::TokenIdentities;
use ownership_admin::config::AppConfig;
use ownership_admin::domain::site::AdminSite;
use ownership_admin::{logging, server};

/// Ownership admin - record editing restricted to owners
#[derive(Parser)]
#[command(name = "ownership-admin")]
#[command(about = "Ownership admin - record editing restricted to owners")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (APP__*) -> 4) CLI overrides
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.port, cli.verbose);

    logging::init_logging(&config.logging);

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => server::run(&config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    let site = AdminSite::from_config(&config.ownership)?;
    let identities = TokenIdentities::from_config(&config.users)?;

    println!("Configuration is valid");
    println!(
        "{} record type(s), {} user(s)",
        site.registry().len(),
        identities.len()
    );
    for (permission, description) in site.registry().permission_catalog() {
        println!("  {permission}: {description}");
    }
    Ok(())
}
