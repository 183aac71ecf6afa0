//! The scan loop: walks one account's history page by page and folds burns
//! into a running total and ledger.
//!
//! A single loop serves both scan modes; `ScanMode::TotalOnly` just never
//! materialises the ledger.

use crate::errors::ScanResult;
use crate::rpc::{HistorySource, ParsedTransaction, SignatureRecord};
use crate::scanner::cancel::ScanCancellation;
use crate::scanner::extractor::BurnExtractor;
use crate::scanner::fetcher::{FetchedTransaction, SkipReason, TransactionFetcher};
use crate::scanner::paginator::HistoryPaginator;
use crate::scanner::resolver::AddressResolver;
use crate::scanner::types::{
    BurnEvent, ScanCursor, ScanMode, ScanOptions, ScanProgress, ScanState, ScanStatus,
    ScanSummary, ScanTarget,
};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Mutable state of one scan. Owned by exactly one `BurnScanner::run` call.
struct ScanRun {
    state: ScanState,
    mode: ScanMode,
    total: f64,
    events: Vec<BurnEvent>,
    /// Guards against overlapping pages counting a signature twice
    seen: HashSet<String>,
    pages_scanned: usize,
    transactions_inspected: usize,
    transactions_skipped: usize,
}

impl ScanRun {
    fn new(mode: ScanMode) -> Self {
        Self {
            state: ScanState::Idle,
            mode,
            total: 0.0,
            events: Vec::new(),
            seen: HashSet::new(),
            pages_scanned: 0,
            transactions_inspected: 0,
            transactions_skipped: 0,
        }
    }

    fn transition(&mut self, next: ScanState) {
        debug!("Scan state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn record(&mut self, record: &SignatureRecord, tx: &ParsedTransaction, amount: f64) {
        if !self.seen.insert(record.signature.clone()) {
            debug!("Signature {} already counted, skipping", record.signature);
            return;
        }

        self.total += amount;
        if self.mode == ScanMode::FullLedger {
            self.events.push(BurnEvent {
                signature: record.signature.clone(),
                amount,
                block_time: record.block_time.or(tx.block_time),
                slot: record.slot,
            });
        }
    }

    fn snapshot(&self, done: bool) -> ScanProgress {
        ScanProgress {
            running_total: self.total,
            events: self.events.clone(),
            done,
        }
    }
}

/// Runs scans against a history source
pub struct BurnScanner<'a> {
    source: &'a dyn HistorySource,
    options: &'a ScanOptions,
}

impl<'a> BurnScanner<'a> {
    pub fn new(source: &'a dyn HistorySource, options: &'a ScanOptions) -> Self {
        Self { source, options }
    }

    /// Scan `target` until history is exhausted or `cancel` fires.
    ///
    /// `on_progress` is called after every page with a cumulative snapshot;
    /// the final call has `done = true`. On a fetch failure no final snapshot
    /// is emitted and the error is returned.
    pub async fn run<F>(
        &self,
        target: &ScanTarget,
        mode: ScanMode,
        cancel: &ScanCancellation,
        mut on_progress: F,
    ) -> ScanResult<ScanSummary>
    where
        F: FnMut(ScanProgress) + Send,
    {
        self.options.validate()?;

        let started = Instant::now();
        let mut run = ScanRun::new(mode);
        run.transition(ScanState::Scanning);

        let resolved = AddressResolver::new(self.source, &self.options.token_program)
            .resolve(&target.owner_address, &target.mint_address)
            .await;
        info!(
            "Scanning {} for burns of {} ({} mode)",
            resolved.address, target.mint_address, mode
        );

        let paginator = HistoryPaginator::new(self.source, self.options.page_size);
        let fetcher = TransactionFetcher::new(self.source);
        let extractor = BurnExtractor::new(target, &resolved.address);
        let mut cursor: Option<ScanCursor> = None;

        let status = loop {
            if cancel.is_cancelled() {
                info!(
                    "Scan of {} cancelled after {} pages",
                    resolved.address, run.pages_scanned
                );
                run.transition(ScanState::Cancelled);
                on_progress(run.snapshot(true));
                break ScanStatus::Cancelled;
            }

            let page = match paginator.next_page(&resolved.address, cursor.as_ref()).await {
                Ok(page) => page,
                Err(e) => {
                    error!("Scan of {} failed: {}", resolved.address, e);
                    run.transition(ScanState::Failed);
                    return Err(e);
                }
            };

            let fetched = match fetcher.fetch_batch(&page.signatures).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    error!("Scan of {} failed: {}", resolved.address, e);
                    run.transition(ScanState::Failed);
                    return Err(e);
                }
            };

            for (record, entry) in page.signatures.iter().zip(fetched.iter()) {
                match entry {
                    FetchedTransaction::Present(tx) => {
                        run.transactions_inspected += 1;
                        if let Some(amount) = extractor.extract(tx) {
                            run.record(record, tx, amount);
                        }
                    }
                    FetchedTransaction::Skipped(reason) => {
                        run.transactions_skipped += 1;
                        if let SkipReason::Malformed(detail) = reason {
                            warn!("Skipping malformed transaction {}: {}", record.signature, detail);
                        }
                    }
                }
            }
            run.pages_scanned += 1;

            debug!(
                "Page {} done: {} signatures, running total {}",
                run.pages_scanned,
                page.signatures.len(),
                run.total
            );

            // A cursor that does not move would replay the same page forever
            let stalled = page.next_cursor.is_some() && page.next_cursor == cursor;
            if stalled {
                warn!("History cursor for {} did not advance, stopping", resolved.address);
            }

            if page.exhausted || stalled {
                run.transition(ScanState::Completed);
                on_progress(run.snapshot(true));
                break ScanStatus::Completed;
            }

            on_progress(run.snapshot(false));
            cursor = page.next_cursor;
        };

        let elapsed_seconds = started.elapsed().as_secs_f64();
        info!(
            "Scan of {} {}: total {} across {} burns, {} pages in {:.2}s",
            resolved.address,
            status,
            run.total,
            run.seen.len(),
            run.pages_scanned,
            elapsed_seconds
        );

        Ok(ScanSummary {
            target: target.clone(),
            scan_address: resolved.address,
            fell_back_to_owner: resolved.fell_back,
            status,
            progress: run.snapshot(true),
            pages_scanned: run.pages_scanned,
            transactions_inspected: run.transactions_inspected,
            transactions_skipped: run.transactions_skipped,
            elapsed_seconds,
        })
    }
}
