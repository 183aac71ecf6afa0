use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// Solana Token Burn History Scanner
#[derive(Parser)]
#[command(name = "burn-scan")]
#[command(about = "Walk a wallet's Solana history and total its burns of one token mint")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan an owner's history for burns of the configured mint
    Scan(commands::scan::ScanCommand),
    /// Read decimals and total supply of the configured mint
    Supply(commands::supply::SupplyCommand),
    /// Show which account a scan would walk for an owner
    Resolve(commands::resolve::ResolveCommand),
    /// Test Solana RPC connectivity
    TestRpc(commands::test_rpc::TestRpcCommand),
}

pub async fn run() -> AppResult<()> {
    // Initialise tracing subscriber to capture info!() macros
    // Uses RUST_LOG environment variable (defaults to "error" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(command) => command.run().await,
        Commands::Supply(command) => command.run().await,
        Commands::Resolve(command) => command.run().await,
        Commands::TestRpc(command) => command.run().await,
    }
}
