//! Scan lifecycle per owner: start, supersede, cancel, deregister

use crate::errors::{ScanError, ScanResult};
use crate::rpc::{HistorySource, TokenMetadataSource};
use crate::scanner::aggregator::BurnScanner;
use crate::scanner::cancel::ScanCancellation;
use crate::scanner::types::{
    ScanMode, ScanOptions, ScanProgress, ScanStatus, ScanSummary, ScanTarget,
};
use crate::supply::SupplyReader;
use futures::stream::{self, Stream};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

type Registry = Mutex<HashMap<String, ActiveScan>>;

struct ActiveScan {
    id: u64,
    cancel: ScanCancellation,
}

/// Terminal result of a spawned scan
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub status: ScanStatus,
    /// Absent when the scan failed before producing a summary
    pub summary: Option<ScanSummary>,
}

/// Caller's handle on one running scan
pub struct ScanSubscription {
    progress: mpsc::UnboundedReceiver<ScanProgress>,
    handle: JoinHandle<ScanOutcome>,
    cancel: ScanCancellation,
}

impl ScanSubscription {
    /// Next snapshot, or `None` once the scan has stopped emitting
    pub async fn next_progress(&mut self) -> Option<ScanProgress> {
        self.progress.recv().await
    }

    /// Snapshots as a stream; ends when the scan stops emitting
    pub fn progress_stream(&mut self) -> impl Stream<Item = ScanProgress> + '_ {
        stream::unfold(&mut self.progress, |rx| async move {
            rx.recv().await.map(|progress| (progress, rx))
        })
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the terminal status
    pub async fn finish(self) -> ScanOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => ScanOutcome {
                status: ScanStatus::Failed(ScanError::Aborted(e.to_string()).to_string()),
                summary: None,
            },
        }
    }
}

/// Runs at most one scan per owner for a fixed mint
pub struct ScanManager {
    source: Arc<dyn HistorySource>,
    mint: String,
    decimals: u8,
    options: ScanOptions,
    active: Arc<Registry>,
    next_scan_id: AtomicU64,
}

impl ScanManager {
    pub fn new(
        source: Arc<dyn HistorySource>,
        mint: impl Into<String>,
        decimals: u8,
        options: ScanOptions,
    ) -> ScanResult<Self> {
        options.validate()?;
        Ok(Self {
            source,
            mint: mint.into(),
            decimals,
            options,
            active: Arc::new(Mutex::new(HashMap::new())),
            next_scan_id: AtomicU64::new(1),
        })
    }

    /// Reads the mint's decimals once, then behaves like `new`
    pub async fn connect(
        source: Arc<dyn HistorySource>,
        metadata: &dyn TokenMetadataSource,
        mint: impl Into<String>,
        options: ScanOptions,
    ) -> ScanResult<Self> {
        let mint = mint.into();
        let decimals = SupplyReader::new(metadata)
            .decimals(&mint)
            .await
            .map_err(ScanError::metadata)?;
        debug!("Mint {} has {} decimals", mint, decimals);
        Self::new(source, mint, decimals, options)
    }

    pub fn mint(&self) -> &str {
        &self.mint
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn target_for(&self, owner: &str) -> ScanTarget {
        ScanTarget::new(owner, self.mint.as_str(), self.decimals)
    }

    /// Start a scan in the configured mode, superseding any scan for `owner`
    pub fn start_scan(&self, owner: &str) -> ScanSubscription {
        self.start_scan_with_mode(owner, self.options.mode)
    }

    pub fn start_scan_with_mode(&self, owner: &str, mode: ScanMode) -> ScanSubscription {
        let cancel = ScanCancellation::new();
        let id = self.next_scan_id.fetch_add(1, Ordering::SeqCst);

        if let Some(prior) = lock_registry(&self.active).insert(
            owner.to_string(),
            ActiveScan {
                id,
                cancel: cancel.clone(),
            },
        ) {
            info!("Superseding scan {} for {}", prior.id, owner);
            prior.cancel.cancel();
        }

        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let source = Arc::clone(&self.source);
        let options = self.options.clone();
        let target = self.target_for(owner);
        let registry = Arc::clone(&self.active);
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            let scanner = BurnScanner::new(&*source, &options);
            let result = scanner
                .run(&target, mode, &task_cancel, |progress| {
                    // Receiver may be gone; the scan still runs to a terminal state
                    let _ = progress_tx.send(progress);
                })
                .await;

            deregister(&registry, &target.owner_address, id);

            match result {
                Ok(summary) => ScanOutcome {
                    status: summary.status.clone(),
                    summary: Some(summary),
                },
                Err(e) => ScanOutcome {
                    status: ScanStatus::Failed(e.to_string()),
                    summary: None,
                },
            }
        });

        ScanSubscription {
            progress: progress_rx,
            handle,
            cancel,
        }
    }

    /// No-op when nothing is running for `owner`
    pub fn cancel_scan(&self, owner: &str) {
        if let Some(active) = lock_registry(&self.active).remove(owner) {
            debug!("Cancelling scan {} for {}", active.id, owner);
            active.cancel.cancel();
        }
    }

    pub fn is_scanning(&self, owner: &str) -> bool {
        lock_registry(&self.active).contains_key(owner)
    }
}

fn lock_registry(registry: &Registry) -> MutexGuard<'_, HashMap<String, ActiveScan>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Remove the entry only if it still belongs to scan `id`
fn deregister(registry: &Registry, owner: &str, id: u64) {
    let mut active = lock_registry(registry);
    if active.get(owner).map(|scan| scan.id) == Some(id) {
        active.remove(owner);
    }
}
