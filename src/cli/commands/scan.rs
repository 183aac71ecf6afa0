use crate::cli::commands::load_config;
use crate::config::ConfigValidator;
use crate::errors::{AppResult, ScanError};
use crate::rpc::{HistorySource, SolanaRpcClient};
use crate::scanner::{ScanManager, ScanMode, ScanProgress, ScanStatus, ScanSummary};
use crate::utils::math::format_token_amount;
use crate::utils::time::{format_block_time, format_elapsed_time};
use clap::Args;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Scan an owner's history for burns of the tracked mint
#[derive(Args)]
pub struct ScanCommand {
    /// Wallet address whose burns are totalled
    #[arg(long)]
    owner: String,

    /// Token mint address (overrides config.toml)
    #[arg(long)]
    mint: Option<String>,

    /// Signatures per history page (overrides config.toml)
    #[arg(long)]
    page_size: Option<usize>,

    /// total-only or full-ledger (overrides config.toml)
    #[arg(long)]
    mode: Option<ScanMode>,

    /// Solana RPC URL (overrides config.toml)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Print the final summary as JSON instead of progress lines
    #[arg(long)]
    json: bool,
}

impl ScanCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== Burn History Scanner - Scan ===");

        let mut app_config = load_config(self.rpc_url.as_deref(), self.mint.as_deref())?;
        if let Some(mode) = self.mode {
            app_config.scan.mode = mode;
        }
        let options = app_config.scan.to_options(self.page_size);

        ConfigValidator::validate_mint(&app_config.scan.mint)?;
        ConfigValidator::validate_page_size(options.page_size)?;
        ConfigValidator::log_config_summary("Scan", &app_config, options.page_size);

        let client = Arc::new(SolanaRpcClient::new(app_config.solana_rpc.clone())?);
        let source: Arc<dyn HistorySource> = client.clone();
        let manager =
            ScanManager::connect(source, &*client, app_config.scan.mint.clone(), options)
                .await?;
        let decimals = manager.decimals();

        let started = Instant::now();
        let mut subscription = manager.start_scan(&self.owner);

        loop {
            tokio::select! {
                progress = subscription.next_progress() => {
                    let Some(progress) = progress else { break };
                    if !self.json {
                        report_progress(&progress, decimals, started.elapsed().as_secs_f64())?;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted, cancelling scan");
                    subscription.cancel();
                }
            }
        }
        if !self.json {
            println!();
        }

        let outcome = subscription.finish().await;
        let rpc_errors = client.get_error_count();
        if rpc_errors > 0 {
            warn!("{} RPC errors encountered during scan", rpc_errors);
        }

        let summary = match (outcome.status, outcome.summary) {
            (ScanStatus::Failed(reason), _) => return Err(ScanError::Failed(reason).into()),
            (_, Some(summary)) => summary,
            (status, None) => {
                return Err(ScanError::Aborted(format!("no summary for {} scan", status)).into())
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }

        Ok(())
    }
}

/// In-place progress line on stdout
fn report_progress(progress: &ScanProgress, decimals: u8, elapsed: f64) -> AppResult<()> {
    print!(
        "\rBurned so far: {} | Burns: {} | Elapsed: {}    ",
        format_token_amount(progress.running_total, decimals),
        progress.event_count(),
        format_elapsed_time(elapsed)
    );
    io::stdout().flush()?;
    Ok(())
}

fn print_summary(summary: &ScanSummary) {
    let decimals = summary.target.decimals;

    println!("\n=== BURN SCAN RESULTS ===");
    println!("Owner: {}", summary.target.owner_address);
    println!("Mint: {}", summary.target.mint_address);
    if summary.fell_back_to_owner {
        println!("Scanned account: {} (owner fallback)", summary.scan_address);
    } else {
        println!("Scanned account: {}", summary.scan_address);
    }
    println!("Status: {}", summary.status);
    println!(
        "Total burned: {}",
        format_token_amount(summary.progress.running_total, decimals)
    );
    println!("Pages scanned: {}", summary.pages_scanned);
    println!(
        "Transactions inspected: {} (skipped: {})",
        summary.transactions_inspected, summary.transactions_skipped
    );
    println!("Elapsed: {}", format_elapsed_time(summary.elapsed_seconds));

    if summary.progress.events.is_empty() {
        return;
    }

    println!("\n=== BURN EVENTS ({}) ===", summary.progress.event_count());
    for event in &summary.progress.events {
        println!(
            "{}  {:>24}  {}",
            format_block_time(event.block_time),
            format_token_amount(event.amount, decimals),
            event.signature
        );
    }
}
