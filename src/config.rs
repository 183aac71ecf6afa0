use crate::errors::{AppError, AppResult};
use crate::scanner::{ScanMode, ScanOptions};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{info, warn};

/// Classic SPL Token program
pub const SPL_TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Token-2022 program
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

/// Signature page size matching the RPC's practical ceiling for history walks
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Hard ceiling accepted by `getSignaturesForAddress`
pub const MAX_PAGE_SIZE: usize = 1000;

/// Application configuration loaded from config.toml or environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub solana_rpc: SolanaRpcConfig,
    pub scan: ScanConfig,
}

/// Solana JSON-RPC endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolanaRpcConfig {
    pub url: String,
    pub commitment: String,
    pub timeout_seconds: u64,
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_seconds: u64,
}

impl Default for SolanaRpcConfig {
    fn default() -> Self {
        Self {
            url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            initial_backoff_ms: 500,
            backoff_multiplier: 2.0,
            max_backoff_seconds: 10,
        }
    }
}

/// What to scan for and how
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Mint of the tracked token (empty until configured)
    pub mint: String,
    pub page_size: usize,
    pub mode: ScanMode,
    /// Program used when deriving the associated token account
    pub token_program: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mint: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            mode: ScanMode::FullLedger,
            token_program: SPL_TOKEN_PROGRAM_ID.to_string(),
        }
    }
}

impl ScanConfig {
    /// Scan options for the scanner, with an optional page size override
    pub fn to_options(&self, page_size: Option<usize>) -> ScanOptions {
        ScanOptions {
            page_size: page_size.unwrap_or(self.page_size),
            mode: self.mode,
            token_program: self.token_program.clone(),
        }
    }
}

/// Configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate_page_size(page_size: usize) -> AppResult<()> {
        if page_size == 0 {
            return Err(AppError::Config(
                "Page size must be greater than 0".to_string(),
            ));
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(AppError::Config(format!(
                "Page size {} exceeds the RPC limit of {}",
                page_size, MAX_PAGE_SIZE
            )));
        }
        if page_size < 10 {
            warn!(
                "Small page size: {} - long histories will need many requests",
                page_size
            );
        }
        Ok(())
    }

    pub fn validate_mint(mint: &str) -> AppResult<()> {
        if mint.trim().is_empty() {
            return Err(AppError::Config(
                "No mint configured: pass --mint or set BURN_SCAN_MINT".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_config_summary(operation: &str, config: &AppConfig, page_size: usize) {
        info!("{} configuration:", operation);
        info!("  RPC endpoint: {}", config.solana_rpc.url);
        info!("  Mint: {}", config.scan.mint);
        info!("  Page size: {}", page_size);
        info!("  Mode: {}", config.scan.mode);
    }
}

impl AppConfig {
    /// Load configuration from config.toml file and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::builder_with_defaults()?
            // Load from config.toml if it exists
            .add_source(File::with_name("config").required(false));
        Self::finish(config)
    }

    /// Load configuration from an explicit file, still honouring env overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::builder_with_defaults()?.add_source(File::from(path).required(true));
        Self::finish(config)
    }

    /// Get default config values for CLI argument defaults
    pub fn get_defaults() -> Result<Self, ConfigError> {
        match Self::load() {
            Ok(config) => Ok(config),
            Err(_) => Ok(Self {
                solana_rpc: SolanaRpcConfig::default(),
                scan: ScanConfig::default(),
            }),
        }
    }

    fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let rpc = SolanaRpcConfig::default();
        let scan = ScanConfig::default();
        Config::builder()
            .set_default("solana_rpc.url", rpc.url)?
            .set_default("solana_rpc.commitment", rpc.commitment)?
            .set_default("solana_rpc.timeout_seconds", rpc.timeout_seconds)?
            .set_default("solana_rpc.max_retries", rpc.max_retries as i64)?
            .set_default("solana_rpc.initial_backoff_ms", rpc.initial_backoff_ms)?
            .set_default("solana_rpc.backoff_multiplier", rpc.backoff_multiplier)?
            .set_default("solana_rpc.max_backoff_seconds", rpc.max_backoff_seconds)?
            .set_default("scan.mint", scan.mint)?
            .set_default("scan.page_size", scan.page_size as i64)?
            .set_default("scan.mode", "full_ledger")?
            .set_default("scan.token_program", scan.token_program)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config = builder
            // BURN_SCAN_SOLANA_RPC__TIMEOUT_SECONDS style overrides for nested keys
            .add_source(
                config::Environment::with_prefix("BURN_SCAN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // Check for specific environment variables with custom names
        if let Ok(url) = env::var("SOLANA_RPC_URL") {
            app_config.solana_rpc.url = url;
        }

        if let Ok(mint) = env::var("BURN_SCAN_MINT") {
            app_config.scan.mint = mint;
        }

        Ok(app_config)
    }
}
