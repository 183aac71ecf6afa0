//! Seams between the scanner and the chain
//!
//! The scanner only ever talks to these traits. `SolanaRpcClient` is the
//! production implementation; tests plug in scripted histories.

use crate::errors::RpcResult;
use crate::rpc::types::{ParsedTransaction, SignatureRecord, TokenSupply};
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of looking up one signature inside a batch
#[derive(Debug, Clone)]
pub enum TransactionLookup {
    Found(Box<ParsedTransaction>),
    /// The node returned `null` (pruned or not yet indexed)
    Missing,
    /// The node returned an error object for this entry only
    Unavailable(String),
    /// The entry came back but does not decode as a transaction
    Malformed(String),
}

/// Transaction-history API of the host chain
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Single existence probe for an account
    async fn account_exists(&self, address: &str) -> RpcResult<bool>;

    /// Up to `limit` signatures newest-to-oldest, strictly older than `before`
    async fn signatures_for_address(
        &self,
        address: &str,
        before: Option<&str>,
        limit: usize,
    ) -> RpcResult<Vec<SignatureRecord>>;

    /// Parsed transactions for `signatures`, one lookup per input, same order
    async fn parsed_transactions(&self, signatures: &[String])
        -> RpcResult<Vec<TransactionLookup>>;
}

/// Token-metadata reader for the tracked mint
#[async_trait]
pub trait TokenMetadataSource: Send + Sync {
    async fn token_supply(&self, mint: &str) -> RpcResult<TokenSupply>;
}

#[async_trait]
impl<T: HistorySource + ?Sized> HistorySource for Arc<T> {
    async fn account_exists(&self, address: &str) -> RpcResult<bool> {
        (**self).account_exists(address).await
    }

    async fn signatures_for_address(
        &self,
        address: &str,
        before: Option<&str>,
        limit: usize,
    ) -> RpcResult<Vec<SignatureRecord>> {
        (**self).signatures_for_address(address, before, limit).await
    }

    async fn parsed_transactions(
        &self,
        signatures: &[String],
    ) -> RpcResult<Vec<TransactionLookup>> {
        (**self).parsed_transactions(signatures).await
    }
}

#[async_trait]
impl<T: TokenMetadataSource + ?Sized> TokenMetadataSource for Arc<T> {
    async fn token_supply(&self, mint: &str) -> RpcResult<TokenSupply> {
        (**self).token_supply(mint).await
    }
}
