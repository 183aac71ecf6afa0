pub mod resolve;
pub mod scan;
pub mod supply;
pub mod test_rpc;

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use tracing::{info, warn};

/// Load configuration from file/environment, falling back to defaults,
/// then apply the CLI overrides every command shares
pub(crate) fn load_config(rpc_url: Option<&str>, mint: Option<&str>) -> AppResult<AppConfig> {
    let mut app_config = match AppConfig::load() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            warn!("Failed to load configuration: {}", e);
            info!("Using defaults and CLI arguments");
            AppConfig::get_defaults().map_err(|e| AppError::Config(e.to_string()))?
        }
    };

    if let Some(url) = rpc_url {
        app_config.solana_rpc.url = url.to_string();
    }
    if let Some(mint) = mint {
        app_config.scan.mint = mint.to_string();
    }

    Ok(app_config)
}
