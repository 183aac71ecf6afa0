//! Picks the account whose history is walked
//!
//! The associated token account for `(owner, mint)` is the most specific
//! place burns are recorded. Legacy or non-standard holdings live on the
//! owner's own history, so any resolution problem degrades to the owner
//! address instead of failing the scan.

use crate::rpc::HistorySource;
use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address_with_program_id;
use std::str::FromStr;
use tracing::{debug, warn};

/// Result of address resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub address: String,
    /// True when resolution degraded to the owner address
    pub fell_back: bool,
}

impl ResolvedAddress {
    fn token_account(address: String) -> Self {
        Self {
            address,
            fell_back: false,
        }
    }

    fn owner(owner: &str) -> Self {
        Self {
            address: owner.to_string(),
            fell_back: true,
        }
    }
}

/// Derive the associated token account address without touching the network
pub fn derive_token_account(owner: &str, mint: &str, token_program: &str) -> Result<String, String> {
    let owner = Pubkey::from_str(owner).map_err(|e| format!("owner '{}': {}", owner, e))?;
    let mint = Pubkey::from_str(mint).map_err(|e| format!("mint '{}': {}", mint, e))?;
    let program = Pubkey::from_str(token_program)
        .map_err(|e| format!("token program '{}': {}", token_program, e))?;

    Ok(get_associated_token_address_with_program_id(&owner, &mint, &program).to_string())
}

pub struct AddressResolver<'a> {
    source: &'a dyn HistorySource,
    token_program: &'a str,
}

impl<'a> AddressResolver<'a> {
    pub fn new(source: &'a dyn HistorySource, token_program: &'a str) -> Self {
        Self {
            source,
            token_program,
        }
    }

    /// Never fails; one existence probe at most
    pub async fn resolve(&self, owner: &str, mint: &str) -> ResolvedAddress {
        let derived = match derive_token_account(owner, mint, self.token_program) {
            Ok(address) => address,
            Err(reason) => {
                debug!("Token account derivation failed ({}), scanning owner", reason);
                return ResolvedAddress::owner(owner);
            }
        };

        match self.source.account_exists(&derived).await {
            Ok(true) => {
                debug!("Scanning associated token account {}", derived);
                ResolvedAddress::token_account(derived)
            }
            Ok(false) => {
                debug!(
                    "Associated token account {} does not exist, scanning owner {}",
                    derived, owner
                );
                ResolvedAddress::owner(owner)
            }
            Err(e) => {
                warn!(
                    "Existence probe for {} failed ({}), scanning owner {}",
                    derived, e, owner
                );
                ResolvedAddress::owner(owner)
            }
        }
    }
}
