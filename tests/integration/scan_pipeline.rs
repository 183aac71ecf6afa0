//! End-to-end scans through `BurnScanner` against a scripted history

use crate::common::fixtures::{
    balance_burn, failed_burn, failed_record, instruction_burn, record, records, transfer,
    DECIMALS, MINT, OWNER,
};
use crate::common::MockHistory;
use anyhow::Result;
use burn_history_scanner::errors::{FetchStage, ScanError};
use burn_history_scanner::rpc::TransactionLookup;
use burn_history_scanner::scanner::{
    BurnScanner, ScanCancellation, ScanMode, ScanOptions, ScanProgress, ScanStatus, ScanTarget,
};

const ACCOUNT: &str = "AtaW";

fn target() -> ScanTarget {
    ScanTarget::new(OWNER, MINT, DECIMALS)
}

/// Pages of 3 then 1: A burns 100 by balance diff, B failed, C other mint,
/// D burns 50 by instruction amount only
fn scenario_history() -> MockHistory {
    MockHistory::new()
        .with_history(
            OWNER,
            vec![
                record("A", 40),
                failed_record("B", 30),
                record("C", 20),
                record("D", 10),
            ],
        )
        .with_transaction(
            "A",
            balance_burn("A", 40, OWNER, ACCOUNT, MINT, 300_000_000, 200_000_000),
        )
        .with_transaction("B", failed_burn("B", 30, OWNER, ACCOUNT))
        .with_transaction(
            "C",
            instruction_burn("C", 20, OWNER, ACCOUNT, "OtherMint", 70_000_000),
        )
        .with_transaction("D", instruction_burn("D", 10, OWNER, ACCOUNT, MINT, 50_000_000))
}

#[tokio::test]
async fn test_two_page_scenario() -> Result<()> {
    let history = scenario_history();
    let options = ScanOptions::default().with_page_size(3);
    let cancel = ScanCancellation::new();
    let mut emitted: Vec<ScanProgress> = Vec::new();

    let summary = BurnScanner::new(&history, &options)
        .run(&target(), ScanMode::FullLedger, &cancel, |p| emitted.push(p))
        .await?;

    assert_eq!(emitted.len(), 2);
    assert!(!emitted[0].done);
    assert_eq!(emitted[0].running_total, 100.0);

    let last = emitted.last().unwrap();
    assert!(last.done);
    assert_eq!(last.running_total, 150.0);
    let ledger: Vec<(&str, f64)> = last
        .events
        .iter()
        .map(|e| (e.signature.as_str(), e.amount))
        .collect();
    assert_eq!(ledger, vec![("A", 100.0), ("D", 50.0)]);
    assert_eq!(last.events[1].slot, 10);
    assert_eq!(last.events[1].block_time, Some(1_700_000_010));

    assert_eq!(summary.status, ScanStatus::Completed);
    assert_eq!(summary.pages_scanned, 2);
    assert_eq!(summary.transactions_inspected, 3);
    assert_eq!(summary.transactions_skipped, 1);
    assert!(summary.fell_back_to_owner);
    assert_eq!(summary.scan_address, OWNER);

    // B was known failed from its signature record and never requested
    assert!(history.batches().iter().all(|batch| !batch.contains(&"B".to_string())));
    Ok(())
}

#[tokio::test]
async fn test_total_only_matches_full_ledger_total() -> Result<()> {
    let history = scenario_history();
    let options = ScanOptions::default().with_page_size(3);
    let cancel = ScanCancellation::new();
    let mut emitted = Vec::new();

    let summary = BurnScanner::new(&history, &options)
        .run(&target(), ScanMode::TotalOnly, &cancel, |p| emitted.push(p))
        .await?;

    assert_eq!(summary.progress.running_total, 150.0);
    assert!(emitted.iter().all(|p| p.events.is_empty()));
    Ok(())
}

#[tokio::test]
async fn test_progress_is_monotonic() -> Result<()> {
    let mut history = MockHistory::new().with_history(OWNER, records("S", 23));
    for (n, rec) in records("S", 23).iter().enumerate() {
        let tx = if n % 3 == 0 {
            instruction_burn(&rec.signature, rec.slot, OWNER, ACCOUNT, MINT, 1_000_000)
        } else {
            transfer(&rec.signature, rec.slot, OWNER)
        };
        history = history.with_transaction(&rec.signature, tx);
    }

    let options = ScanOptions::default().with_page_size(5);
    let cancel = ScanCancellation::new();
    let mut emitted: Vec<ScanProgress> = Vec::new();
    BurnScanner::new(&history, &options)
        .run(&target(), ScanMode::FullLedger, &cancel, |p| emitted.push(p))
        .await?;

    // 23 signatures in pages of 5: four full pages then a short one
    assert_eq!(emitted.len(), 5);
    for pair in emitted.windows(2) {
        assert!(pair[1].running_total >= pair[0].running_total);
        assert!(pair[1].events.starts_with(&pair[0].events));
    }
    assert_eq!(emitted.iter().filter(|p| p.done).count(), 1);
    assert!(emitted.last().unwrap().done);
    assert_eq!(emitted.last().unwrap().running_total, 8.0);
    Ok(())
}

#[tokio::test]
async fn test_exact_multiple_of_page_size_ends_on_empty_page() -> Result<()> {
    let history = MockHistory::new().with_history(OWNER, records("S", 6));
    let options = ScanOptions::default().with_page_size(3);
    let cancel = ScanCancellation::new();
    let mut emitted = Vec::new();

    let summary = BurnScanner::new(&history, &options)
        .run(&target(), ScanMode::FullLedger, &cancel, |p| emitted.push(p))
        .await?;

    assert_eq!(history.signature_calls(), 3);
    assert_eq!(summary.pages_scanned, 3);
    assert_eq!(emitted.len(), 3);
    assert!(emitted[2].done);
    // Transactions missing from the node are skipped, not errors
    assert_eq!(summary.transactions_skipped, 6);
    Ok(())
}

#[tokio::test]
async fn test_empty_history_completes_immediately() -> Result<()> {
    let history = MockHistory::new();
    let options = ScanOptions::default();
    let cancel = ScanCancellation::new();
    let mut emitted = Vec::new();

    let summary = BurnScanner::new(&history, &options)
        .run(&target(), ScanMode::FullLedger, &cancel, |p| emitted.push(p))
        .await?;

    assert_eq!(emitted.len(), 1);
    assert!(emitted[0].done);
    assert_eq!(emitted[0].running_total, 0.0);
    assert!(history.batches().is_empty());
    assert_eq!(summary.status, ScanStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn test_cancel_mid_scan_keeps_partial_result() -> Result<()> {
    let mut history = MockHistory::new().with_history(OWNER, records("S", 9));
    for rec in records("S", 9) {
        history = history.with_transaction(
            &rec.signature,
            instruction_burn(&rec.signature, rec.slot, OWNER, ACCOUNT, MINT, 2_000_000),
        );
    }

    let options = ScanOptions::default().with_page_size(3);
    let cancel = ScanCancellation::new();
    let trigger = cancel.clone();
    let mut emitted: Vec<ScanProgress> = Vec::new();

    let summary = BurnScanner::new(&history, &options)
        .run(&target(), ScanMode::FullLedger, &cancel, |p| {
            emitted.push(p);
            trigger.cancel();
        })
        .await?;

    assert_eq!(summary.status, ScanStatus::Cancelled);
    assert_eq!(history.signature_calls(), 1);
    assert_eq!(emitted.len(), 2);
    assert!(!emitted[0].done);
    assert!(emitted[1].done);
    assert_eq!(emitted[1].running_total, 6.0);
    assert_eq!(emitted[1].events.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_cancel_before_start_emits_empty_final() -> Result<()> {
    let history = scenario_history();
    let options = ScanOptions::default().with_page_size(3);
    let cancel = ScanCancellation::new();
    cancel.cancel();
    let mut emitted = Vec::new();

    let summary = BurnScanner::new(&history, &options)
        .run(&target(), ScanMode::FullLedger, &cancel, |p| emitted.push(p))
        .await?;

    assert_eq!(summary.status, ScanStatus::Cancelled);
    assert_eq!(history.signature_calls(), 0);
    assert_eq!(emitted, vec![ScanProgress { running_total: 0.0, events: vec![], done: true }]);
    Ok(())
}

#[tokio::test]
async fn test_signature_failure_fails_scan_without_final_progress() -> Result<()> {
    let mut history = MockHistory::new()
        .with_history(OWNER, records("S", 6))
        .with_signature_failure_after(1);
    for rec in records("S", 6) {
        history = history.with_transaction(
            &rec.signature,
            instruction_burn(&rec.signature, rec.slot, OWNER, ACCOUNT, MINT, 1_000_000),
        );
    }

    let options = ScanOptions::default().with_page_size(3);
    let cancel = ScanCancellation::new();
    let mut emitted: Vec<ScanProgress> = Vec::new();

    let result = BurnScanner::new(&history, &options)
        .run(&target(), ScanMode::FullLedger, &cancel, |p| emitted.push(p))
        .await;

    match result {
        Err(ScanError::TransientFetch { stage, .. }) => assert_eq!(stage, FetchStage::Signatures),
        other => panic!("expected signature fetch failure, got {:?}", other.map(|s| s.status)),
    }
    assert_eq!(emitted.len(), 1);
    assert!(emitted.iter().all(|p| !p.done));
    Ok(())
}

#[tokio::test]
async fn test_transaction_batch_failure_fails_scan() -> Result<()> {
    let history = MockHistory::new()
        .with_history(OWNER, records("S", 2))
        .with_failing_transactions();
    let options = ScanOptions::default().with_page_size(3);
    let cancel = ScanCancellation::new();
    let mut emitted = Vec::new();

    let result = BurnScanner::new(&history, &options)
        .run(&target(), ScanMode::FullLedger, &cancel, |p| emitted.push(p))
        .await;

    assert!(matches!(
        result,
        Err(ScanError::TransientFetch {
            stage: FetchStage::Transactions,
            ..
        })
    ));
    assert!(emitted.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unavailable_and_malformed_entries_are_skipped() -> Result<()> {
    let history = MockHistory::new()
        .with_history(OWNER, vec![record("A", 3), record("B", 2), record("C", 1)])
        .with_lookup("A", TransactionLookup::Unavailable("pruned".to_string()))
        .with_lookup("B", TransactionLookup::Malformed("bad message".to_string()))
        .with_transaction("C", instruction_burn("C", 1, OWNER, ACCOUNT, MINT, 4_000_000));
    let options = ScanOptions::default().with_page_size(10);
    let cancel = ScanCancellation::new();

    let summary = BurnScanner::new(&history, &options)
        .run(&target(), ScanMode::FullLedger, &cancel, |_| {})
        .await?;

    assert_eq!(summary.progress.running_total, 4.0);
    assert_eq!(summary.transactions_skipped, 2);
    assert_eq!(summary.transactions_inspected, 1);
    Ok(())
}

#[tokio::test]
async fn test_invalid_page_size_rejected_before_any_call() {
    let history = scenario_history();
    let options = ScanOptions::default().with_page_size(0);
    let cancel = ScanCancellation::new();

    let result = BurnScanner::new(&history, &options)
        .run(&target(), ScanMode::FullLedger, &cancel, |_| {})
        .await;

    assert!(matches!(result, Err(ScanError::InvalidOptions(_))));
    assert_eq!(history.signature_calls(), 0);
}
