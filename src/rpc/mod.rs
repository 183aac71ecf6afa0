//! Solana JSON-RPC integration module
//!
//! This module provides all RPC-related functionality including:
//! - **Client** - Async HTTP JSON-RPC client with rate-limit backoff and batching
//! - **Source** - The `HistorySource` / `TokenMetadataSource` seams the scanner consumes
//! - **Types** - Serde wire types for `jsonParsed` transactions and signature pages
//! - **Retry** - Exponential backoff and timeout utilities

pub mod client;
pub mod retry;
pub mod source;
pub mod types;

// Re-export main types
pub use client::SolanaRpcClient;
pub use retry::{calculate_next_backoff, execute_with_timeout};
pub use source::{HistorySource, TokenMetadataSource, TransactionLookup};
pub use types::{ParsedTransaction, SignatureRecord, TokenSupply};
