//! Token supply reader for the tracked mint

use crate::errors::RpcResult;
use crate::rpc::{TokenMetadataSource, TokenSupply};
use serde::Serialize;
use tracing::debug;

/// Supply figures alongside a burned amount
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplyReport {
    pub mint: String,
    pub supply: TokenSupply,
    /// Burned amount in token units, when a scan has produced one
    pub burned: Option<f64>,
}

impl SupplyReport {
    /// Burned amount as a percentage of current supply plus the burned amount
    pub fn burned_share_percent(&self) -> Option<f64> {
        let burned = self.burned?;
        let original = self.supply.ui_amount + burned;
        if original <= 0.0 {
            return None;
        }
        Some(burned / original * 100.0)
    }
}

pub struct SupplyReader<'a> {
    source: &'a dyn TokenMetadataSource,
}

impl<'a> SupplyReader<'a> {
    pub fn new(source: &'a dyn TokenMetadataSource) -> Self {
        Self { source }
    }

    pub async fn read(&self, mint: &str) -> RpcResult<TokenSupply> {
        let supply = self.source.token_supply(mint).await?;
        debug!(
            "Supply of {}: {} raw, {} decimals",
            mint, supply.raw_amount, supply.decimals
        );
        Ok(supply)
    }

    pub async fn decimals(&self, mint: &str) -> RpcResult<u8> {
        Ok(self.read(mint).await?.decimals)
    }

    pub async fn report(&self, mint: &str, burned: Option<f64>) -> RpcResult<SupplyReport> {
        Ok(SupplyReport {
            mint: mint.to_string(),
            supply: self.read(mint).await?,
            burned,
        })
    }
}
