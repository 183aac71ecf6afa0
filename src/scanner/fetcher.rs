use crate::errors::{ScanError, ScanResult};
use crate::rpc::{HistorySource, ParsedTransaction, SignatureRecord, TransactionLookup};
use tracing::debug;

/// Why a signature in a page produced no transaction body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    FailedOnChain,
    Missing,
    Unavailable(String),
    Malformed(String),
}

/// One slot of a fetched page, aligned with the input signatures
#[derive(Debug, Clone)]
pub enum FetchedTransaction {
    Present(Box<ParsedTransaction>),
    Skipped(SkipReason),
}

impl FetchedTransaction {
    pub fn transaction(&self) -> Option<&ParsedTransaction> {
        match self {
            FetchedTransaction::Present(tx) => Some(tx),
            FetchedTransaction::Skipped(_) => None,
        }
    }
}

/// Resolves a page of signatures into parsed transactions in one request
pub struct TransactionFetcher<'a> {
    source: &'a dyn HistorySource,
}

impl<'a> TransactionFetcher<'a> {
    pub fn new(source: &'a dyn HistorySource) -> Self {
        Self { source }
    }

    /// Output has exactly one entry per input record, in input order
    pub async fn fetch_batch(
        &self,
        records: &[SignatureRecord],
    ) -> ScanResult<Vec<FetchedTransaction>> {
        // Signatures already known to have failed are not worth a round trip
        let wanted: Vec<String> = records
            .iter()
            .filter(|r| !r.failed())
            .map(|r| r.signature.clone())
            .collect();

        let mut lookups = if wanted.is_empty() {
            Vec::new()
        } else {
            self.source
                .parsed_transactions(&wanted)
                .await
                .map_err(ScanError::transactions)?
        }
        .into_iter();

        let fetched = records
            .iter()
            .map(|record| {
                if record.failed() {
                    return FetchedTransaction::Skipped(SkipReason::FailedOnChain);
                }

                match lookups.next() {
                    Some(TransactionLookup::Found(tx)) if tx.failed() => {
                        FetchedTransaction::Skipped(SkipReason::FailedOnChain)
                    }
                    Some(TransactionLookup::Found(tx)) => FetchedTransaction::Present(tx),
                    Some(TransactionLookup::Missing) => {
                        FetchedTransaction::Skipped(SkipReason::Missing)
                    }
                    Some(TransactionLookup::Unavailable(reason)) => {
                        debug!("Transaction {} unavailable: {}", record.signature, reason);
                        FetchedTransaction::Skipped(SkipReason::Unavailable(reason))
                    }
                    Some(TransactionLookup::Malformed(reason)) => {
                        debug!("Transaction {} malformed: {}", record.signature, reason);
                        FetchedTransaction::Skipped(SkipReason::Malformed(reason))
                    }
                    None => FetchedTransaction::Skipped(SkipReason::Unavailable(
                        "short batch response".to_string(),
                    )),
                }
            })
            .collect();

        Ok(fetched)
    }
}
