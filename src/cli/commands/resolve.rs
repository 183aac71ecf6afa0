use crate::cli::commands::load_config;
use crate::config::ConfigValidator;
use crate::errors::AppResult;
use crate::rpc::SolanaRpcClient;
use crate::scanner::{derive_token_account, AddressResolver};
use clap::Args;
use serde_json::json;

/// Show which account a scan for this owner would walk
#[derive(Args)]
pub struct ResolveCommand {
    /// Wallet address owning the tokens
    #[arg(long)]
    owner: String,

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

impl ResolveCommand {
    pub async fn run(&self) -> AppResult<()> {
        let app_config = load_config(self.rpc_url.as_deref(), self.mint.as_deref())?;
        ConfigValidator::validate_mint(&app_config.scan.mint)?;

        let mint = app_config.scan.mint.clone();
        let token_program = app_config.scan.token_program.clone();
        let client = SolanaRpcClient::new(app_config.solana_rpc)?;

        let derived = derive_token_account(&self.owner, &mint, &token_program);
        let resolved = AddressResolver::new(&client, &token_program)
            .resolve(&self.owner, &mint)
            .await;

        if self.json {
            let output = json!({
                "owner": self.owner,
                "mint": mint,
                "derived_token_account": derived.as_ref().ok(),
                "scan_address": resolved.address,
                "fell_back_to_owner": resolved.fell_back,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("\n=== SCAN ADDRESS ===");
        println!("Owner: {}", self.owner);
        println!("Mint: {}", mint);
        match &derived {
            Ok(address) => println!("Associated token account: {}", address),
            Err(reason) => println!("Associated token account: not derivable ({})", reason),
        }
        if resolved.fell_back {
            println!("Scan address: {} (owner fallback)", resolved.address);
        } else {
            println!("Scan address: {}", resolved.address);
        }

        Ok(())
    }
}
