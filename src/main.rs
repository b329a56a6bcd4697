use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "ticketsmith")]
#[command(
    version,
    about = "Creates issue-tracker tickets and provisions matching working folders"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "ticketsmith.toml", global = true)]
    pub config: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the configured issues and provision their working folders
    Run {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any problems
    Validate,
    /// Write a sample ticketsmith.toml
    Init,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "ticketsmith=debug"
    } else {
        "ticketsmith=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Run { yes } => cmd::cmd_run(&cli.config, *yes).await,
        Commands::Config { command } => cmd::cmd_config(&cli.config, command.clone()),
    }
}
