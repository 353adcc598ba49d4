use anyhow::Result;
use auragrow::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for auragrow::AppCommand {
    fn from(cmd: Commands) -> auragrow::AppCommand {
        match cmd {
            Commands::Project {
                address,
                principal,
                rate,
                years,
            } => auragrow::AppCommand::Project {
                address,
                principal,
                rate_percent: rate,
                years,
            },
            Commands::Refresh { address } => auragrow::AppCommand::Refresh { address },
            Commands::Cache { address } => auragrow::AppCommand::Cache { address },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Project simple vs compound growth for a wallet balance
    Project {
        /// Wallet address to resolve the principal from
        address: Option<String>,

        /// Manual principal in USD, skips the balance lookup
        #[arg(short, long)]
        principal: Option<f64>,

        /// Annual interest rate in percent
        #[arg(short, long)]
        rate: Option<f64>,

        /// Projection horizon in years
        #[arg(short, long)]
        years: Option<u32>,
    },
    /// Drop cached responses for an address and refetch
    Refresh { address: String },
    /// Show when cached responses for an address were last fetched
    Cache { address: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => auragrow::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = auragrow::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
# api_key: "your-aura-api-key"

providers:
  aura:
    base_url: "https://aura.adex.network"

defaults:
  principal: 1000.0
  rate_percent: 7.0
  years: 30
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
