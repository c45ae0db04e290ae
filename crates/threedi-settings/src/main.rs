//! threedi-settings CLI
//!
//! Imports legacy 3Di model settings into the 3Di API v3.

// CLI tool - relax pedantic lints for ergonomics
#![allow(clippy::pedantic)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use threedi_settings::api::openapi::settings_help;
use threedi_settings::config::EXAMPLE_CONFIG;
use threedi_settings::report::{render_mapping, render_overview, render_report, render_settings_help};
use threedi_settings::sources::ini::IniSourceConfig;
use threedi_settings::sources::sqlite::SqliteSourceConfig;
use threedi_settings::{ApiClient, ImportConfig, Importer, ResourceGroup, SettingsApi, SourceConfig};

#[derive(Parser)]
#[command(name = "threedi-settings")]
#[command(author = "Nelen & Schuurmans")]
#[command(version)]
#[command(about = "Create 3Di API v3 settings resources from legacy model settings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// API host
    #[arg(long, env = "THREEDI_API_HOST", global = true)]
    host: Option<String>,

    /// API token (bearer auth)
    #[arg(long, env = "THREEDI_API_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// API username (basic auth)
    #[arg(long, env = "THREEDI_API_USERNAME", global = true)]
    username: Option<String>,

    /// API password (basic auth)
    #[arg(long, env = "THREEDI_API_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Dry run mode (convert and show payloads, create nothing)
    #[arg(long, global = true)]
    dry_run: bool,

    /// Only import these groups (general, time_step, numerical, aggregation)
    #[arg(short, long = "group", value_name = "GROUP", global = true)]
    groups: Vec<ResourceGroup>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import settings from a legacy model INI file
    Ini {
        /// Simulation to create the settings for
        simulation_id: i64,

        /// Legacy model settings INI file
        ini_file: PathBuf,

        /// Aggregation INI file, overriding [output] aggregation_settings
        #[arg(long, value_name = "FILE")]
        aggregation_file: Option<PathBuf>,

        /// Do not import aggregation settings
        #[arg(long)]
        skip_aggregation: bool,
    },

    /// Import settings from a legacy SQLite model database
    Sqlite {
        /// Simulation to create the settings for
        simulation_id: i64,

        /// SQLite model database
        sqlite_file: PathBuf,

        /// Id of the v2_global_settings row
        settings_id: i64,

        /// Do not import aggregation settings
        #[arg(long)]
        skip_aggregation: bool,
    },

    /// Show the mapping between legacy fields and API fields
    Mapping,

    /// Show help texts, types and limits of all settings fields
    SettingsHelp,

    /// Generate example configuration
    Init {
        /// Output file path
        #[arg(short, long, default_value = "threedi-settings.yaml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Ini {
            simulation_id,
            ini_file,
            aggregation_file,
            skip_aggregation,
        } => {
            let source = SourceConfig::Ini(IniSourceConfig {
                path: ini_file.clone(),
                aggregation_path: aggregation_file.clone(),
                skip_aggregation: *skip_aggregation,
            });
            run_import(&cli, *simulation_id, source).await?;
        }
        Commands::Sqlite {
            simulation_id,
            sqlite_file,
            settings_id,
            skip_aggregation,
        } => {
            let source = SourceConfig::Sqlite(SqliteSourceConfig {
                path: sqlite_file.clone(),
                settings_id: *settings_id,
                skip_aggregation: *skip_aggregation,
            });
            run_import(&cli, *simulation_id, source).await?;
        }
        Commands::Mapping => {
            print!("{}", render_mapping(&cli.groups));
        }
        Commands::SettingsHelp => {
            show_settings_help(&cli).await?;
        }
        Commands::Init { output } => {
            generate_config(output)?;
        }
    }

    Ok(())
}

/// Loads the config file (if any) and applies the command line overrides.
fn load_config(cli: &Cli) -> anyhow::Result<ImportConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            ImportConfig::from_file(path)
                .with_context(|| format!("cannot load configuration {}", path.display()))?
        }
        None => ImportConfig::default(),
    };

    if let Some(host) = &cli.host {
        config.api.host = host.clone();
    }
    if let Some(token) = &cli.token {
        config.api.token = Some(token.clone());
    }
    if let Some(username) = &cli.username {
        config.api.username = Some(username.clone());
    }
    if let Some(password) = &cli.password {
        config.api.password = Some(password.clone());
    }
    if cli.dry_run {
        config.options.dry_run = true;
    }
    if !cli.groups.is_empty() {
        config.options.groups = cli.groups.clone();
    }
    if let Commands::Ini {
        skip_aggregation: true,
        ..
    }
    | Commands::Sqlite {
        skip_aggregation: true,
        ..
    } = cli.command
    {
        config.options.skip_aggregation = true;
    }

    config.validate()?;
    Ok(config)
}

async fn run_import(cli: &Cli, simulation_id: i64, source: SourceConfig) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let client = ApiClient::new(config.api.clone())?;

    let mut importer = Importer::new(simulation_id, &source, config.options.clone());
    let report = importer.run(&client).await?;
    println!();
    print!("{}", render_report(&report));

    if report.dry_run {
        return Ok(());
    }

    let overview = client
        .settings_overview(simulation_id)
        .await
        .context("cannot retrieve the simulation settings")?;
    println!();
    print!("{}", render_overview(&overview));

    let missing = report.missing_from(&overview);
    if !missing.is_empty() {
        let names: Vec<_> = missing.iter().map(|g| g.model_name()).collect();
        error!("Not found in the simulation settings: {}", names.join(", "));
        std::process::exit(1);
    }
    if !report.is_success() {
        std::process::exit(2);
    }

    Ok(())
}

async fn show_settings_help(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let client = ApiClient::new(config.api)?;

    let document = client
        .fetch_openapi()
        .await
        .context("cannot download the API specification")?;
    let models = settings_help(&document, &config.options.selected_groups())?;
    print!("{}", render_settings_help(&models));

    Ok(())
}

fn generate_config(output: &Path) -> anyhow::Result<()> {
    if output.exists() {
        anyhow::bail!("{} already exists", output.display());
    }
    std::fs::write(output, EXAMPLE_CONFIG)?;
    println!("✅ Configuration written to {}", output.display());
    println!("   Set api.token (or THREEDI_API_TOKEN) before importing.");
    Ok(())
}
