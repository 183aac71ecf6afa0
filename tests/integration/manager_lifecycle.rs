//! Scan lifecycle through `ScanManager`: subscriptions, supersede, cancel

use crate::common::fixtures::{instruction_burn, records, DECIMALS, MINT, OWNER};
use crate::common::MockHistory;
use anyhow::Result;
use burn_history_scanner::errors::ScanError;
use burn_history_scanner::rpc::{HistorySource, TokenSupply};
use burn_history_scanner::scanner::{ScanManager, ScanMode, ScanOptions, ScanStatus};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

const ACCOUNT: &str = "AtaW";

fn burning_history(count: usize) -> MockHistory {
    let mut history = MockHistory::new().with_history(OWNER, records("S", count));
    for rec in records("S", count) {
        history = history.with_transaction(
            &rec.signature,
            instruction_burn(&rec.signature, rec.slot, OWNER, ACCOUNT, MINT, 1_000_000),
        );
    }
    history
}

fn manager(history: MockHistory, page_size: usize) -> Result<ScanManager> {
    let source: Arc<dyn HistorySource> = Arc::new(history);
    Ok(ScanManager::new(
        source,
        MINT,
        DECIMALS,
        ScanOptions::default().with_page_size(page_size),
    )?)
}

#[tokio::test]
async fn test_subscription_streams_progress_then_status() -> Result<()> {
    let manager = manager(burning_history(7), 3)?;
    let mut subscription = manager.start_scan(OWNER);

    let snapshots: Vec<_> = subscription.progress_stream().collect().await;
    assert_eq!(snapshots.len(), 3);
    assert!(snapshots.last().unwrap().done);
    assert_eq!(snapshots.last().unwrap().running_total, 7.0);

    let outcome = subscription.finish().await;
    assert_eq!(outcome.status, ScanStatus::Completed);
    let summary = outcome.summary.expect("completed scans carry a summary");
    assert_eq!(summary.progress.events.len(), 7);
    assert!(!manager.is_scanning(OWNER));
    Ok(())
}

#[tokio::test]
async fn test_mode_override_per_scan() -> Result<()> {
    let manager = manager(burning_history(4), 10)?;
    let outcome = manager
        .start_scan_with_mode(OWNER, ScanMode::TotalOnly)
        .finish()
        .await;

    let summary = outcome.summary.expect("summary");
    assert_eq!(summary.progress.running_total, 4.0);
    assert!(summary.progress.events.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_new_scan_supersedes_running_scan() -> Result<()> {
    let history = burning_history(30).with_page_delay(Duration::from_millis(20));
    let manager = manager(history, 3)?;

    let mut first = manager.start_scan(OWNER);
    // Let the first scan get at least one page in
    let early = first.next_progress().await.expect("first page");
    assert!(!early.done);

    let second = manager.start_scan(OWNER);
    assert!(manager.is_scanning(OWNER));

    let first_outcome = first.finish().await;
    assert_eq!(first_outcome.status, ScanStatus::Cancelled);

    // The superseded scan finishing must not deregister its successor
    assert!(manager.is_scanning(OWNER));

    let second_outcome = second.finish().await;
    assert_eq!(second_outcome.status, ScanStatus::Completed);
    assert_eq!(second_outcome.summary.expect("summary").progress.running_total, 30.0);
    assert!(!manager.is_scanning(OWNER));
    Ok(())
}

#[tokio::test]
async fn test_cancel_scan_is_idempotent() -> Result<()> {
    let history = burning_history(30).with_page_delay(Duration::from_millis(20));
    let manager = manager(history, 3)?;

    let subscription = manager.start_scan(OWNER);
    manager.cancel_scan(OWNER);
    manager.cancel_scan(OWNER);
    assert!(!manager.is_scanning(OWNER));

    let outcome = subscription.finish().await;
    assert_eq!(outcome.status, ScanStatus::Cancelled);
    let partial = outcome.summary.expect("cancelled scans carry a summary");
    assert!(partial.progress.done);
    assert!(partial.progress.running_total < 30.0);
    Ok(())
}

#[tokio::test]
async fn test_scans_for_different_owners_are_independent() -> Result<()> {
    let history = burning_history(5)
        .with_history("OtherOwner", records("S", 2))
        .with_page_delay(Duration::from_millis(5));
    let manager = manager(history, 3)?;

    let mine = manager.start_scan(OWNER);
    let theirs = manager.start_scan("OtherOwner");
    assert!(manager.is_scanning(OWNER));
    assert!(manager.is_scanning("OtherOwner"));

    assert_eq!(mine.finish().await.status, ScanStatus::Completed);
    // Other owner's fixtures burn from OWNER's account, so nothing attributes
    let theirs = theirs.finish().await;
    assert_eq!(theirs.status, ScanStatus::Completed);
    assert_eq!(theirs.summary.expect("summary").progress.running_total, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_failed_scan_reports_status_without_summary() -> Result<()> {
    let history = burning_history(9).with_signature_failure_after(1);
    let manager = manager(history, 3)?;

    let mut subscription = manager.start_scan(OWNER);
    let mut snapshots = Vec::new();
    while let Some(progress) = subscription.next_progress().await {
        snapshots.push(progress);
    }
    assert_eq!(snapshots.len(), 1);
    assert!(!snapshots[0].done);

    let outcome = subscription.finish().await;
    assert!(outcome.status.is_failed());
    assert!(outcome.summary.is_none());
    assert!(!manager.is_scanning(OWNER));
    Ok(())
}

#[tokio::test]
async fn test_connect_reads_decimals_once() -> Result<()> {
    let history = Arc::new(burning_history(1).with_supply(TokenSupply {
        raw_amount: 1_000_000_000,
        decimals: 9,
        ui_amount: 1.0,
    }));
    let source: Arc<dyn HistorySource> = history.clone();

    let manager = ScanManager::connect(source, &*history, MINT, ScanOptions::default()).await?;
    assert_eq!(manager.decimals(), 9);
    assert_eq!(manager.target_for(OWNER).decimals, 9);
    Ok(())
}

#[tokio::test]
async fn test_connect_surfaces_metadata_failure() {
    let history = Arc::new(MockHistory::new());
    let source: Arc<dyn HistorySource> = history.clone();

    let result = ScanManager::connect(source, &*history, MINT, ScanOptions::default()).await;
    assert!(matches!(result, Err(ScanError::TransientFetch { .. })));
}
