//! Burn history scanning
//!
//! Pipeline for one scan:
//! - **Resolver** picks the account to walk (associated token account or owner)
//! - **Paginator** pages signature history newest to oldest
//! - **Fetcher** turns a page of signatures into parsed transactions
//! - **Extractor** decides how much of the tracked mint a transaction burned
//! - **Aggregator** runs the loop and emits cumulative progress
//! - **Manager** owns scan lifecycles per owner

pub mod aggregator;
pub mod cancel;
pub mod extractor;
pub mod fetcher;
pub mod instruction;
pub mod manager;
pub mod paginator;
pub mod resolver;
pub mod types;

pub use aggregator::BurnScanner;
pub use cancel::ScanCancellation;
pub use extractor::BurnExtractor;
pub use fetcher::{FetchedTransaction, SkipReason, TransactionFetcher};
pub use instruction::{BurnInstruction, InstructionShape};
pub use manager::{ScanManager, ScanOutcome, ScanSubscription};
pub use paginator::{HistoryPaginator, SignaturePage};
pub use resolver::{derive_token_account, AddressResolver, ResolvedAddress};
pub use types::{
    BurnEvent, ScanMode, ScanOptions, ScanProgress, ScanState, ScanStatus, ScanSummary,
    ScanTarget,
};
