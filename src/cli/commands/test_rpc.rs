use crate::cli::commands::load_config;
use crate::errors::{AppError, AppResult};
use crate::rpc::SolanaRpcClient;
use clap::Args;
use tracing::{error, info};

/// Test Solana RPC connectivity
#[derive(Args)]
pub struct TestRpcCommand {
    /// Solana RPC URL
    #[arg(long)]
    pub rpc_url: Option<String>,
}

impl TestRpcCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== Testing Solana RPC Connection ===");

        let app_config = load_config(self.rpc_url.as_deref(), None)?;
        let rpc_config = app_config.solana_rpc;

        info!("Testing connection to: {}", rpc_config.url);

        let client = match SolanaRpcClient::new(rpc_config) {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to create RPC client: {}", e);
                return Err(AppError::Config(format!(
                    "RPC client creation failed: {}",
                    e
                )));
            }
        };

        match client.test_connection().await {
            Ok(version) => {
                println!("Solana RPC connection test PASSED");
                println!("Node version: solana-core {}", version);
            }
            Err(e) => {
                error!("RPC connection test failed: {}", e);
                println!("Solana RPC connection test FAILED");
                println!("Error: {}", e);
                println!("\nTroubleshooting tips:");
                println!("1. Verify the RPC URL is correct");
                println!("2. Public endpoints rate-limit aggressively; try a dedicated one");
                println!("3. Check SOLANA_RPC_URL and config.toml for stale overrides");

                return Err(AppError::Config(format!("RPC test failed: {}", e)));
            }
        }

        Ok(())
    }
}
