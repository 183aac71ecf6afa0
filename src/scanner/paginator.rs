use crate::errors::{ScanError, ScanResult};
use crate::rpc::{HistorySource, SignatureRecord};
use crate::scanner::types::ScanCursor;
use tracing::debug;

/// One page of signature history, newest to oldest
#[derive(Debug, Clone)]
pub struct SignaturePage {
    pub signatures: Vec<SignatureRecord>,
    /// Cursor for the next older page; `None` when the page was empty
    pub next_cursor: Option<ScanCursor>,
    /// Shorter than the page size: history is exhausted
    pub exhausted: bool,
}

/// Cursor-walking primitive over `getSignaturesForAddress`
pub struct HistoryPaginator<'a> {
    source: &'a dyn HistorySource,
    page_size: usize,
}

impl<'a> HistoryPaginator<'a> {
    pub fn new(source: &'a dyn HistorySource, page_size: usize) -> Self {
        Self { source, page_size }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn next_page(
        &self,
        account: &str,
        cursor: Option<&ScanCursor>,
    ) -> ScanResult<SignaturePage> {
        let signatures = self
            .source
            .signatures_for_address(account, cursor.map(ScanCursor::as_str), self.page_size)
            .await
            .map_err(ScanError::signatures)?;

        let next_cursor = signatures
            .last()
            .map(|oldest| ScanCursor::before(&oldest.signature));
        let exhausted = signatures.len() < self.page_size;

        debug!(
            "Fetched {} signatures for {} (exhausted: {})",
            signatures.len(),
            account,
            exhausted
        );

        Ok(SignaturePage {
            signatures,
            next_cursor,
            exhausted,
        })
    }
}
