use crate::cli::commands::load_config;
use crate::config::ConfigValidator;
use crate::errors::AppResult;
use crate::rpc::SolanaRpcClient;
use crate::supply::SupplyReader;
use crate::utils::math::format_token_amount;
use clap::Args;
use tracing::info;

/// Read decimals and total supply of the tracked mint
#[derive(Args)]
pub struct SupplyCommand {
    /// Token mint address (overrides config.toml)
    #[arg(long)]
    mint: Option<String>,

    /// Solana RPC URL (overrides config.toml)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl SupplyCommand {
    pub async fn run(&self) -> AppResult<()> {
        let app_config = load_config(self.rpc_url.as_deref(), self.mint.as_deref())?;
        ConfigValidator::validate_mint(&app_config.scan.mint)?;

        info!("Reading supply of {}", app_config.scan.mint);
        let client = SolanaRpcClient::new(app_config.solana_rpc)?;
        let report = SupplyReader::new(&client)
            .report(&app_config.scan.mint, None)
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("\n=== TOKEN SUPPLY ===");
        println!("Mint: {}", report.mint);
        println!("Decimals: {}", report.supply.decimals);
        println!(
            "Supply: {}",
            format_token_amount(report.supply.ui_amount, report.supply.decimals)
        );
        println!("Raw supply: {}", report.supply.raw_amount);

        Ok(())
    }
}
