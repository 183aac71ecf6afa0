//! Transaction and signature fixtures in `jsonParsed` shape

use burn_history_scanner::config::SPL_TOKEN_PROGRAM_ID;
use burn_history_scanner::rpc::{ParsedTransaction, SignatureRecord};
use serde_json::{json, Value};

/// Tracked mint used by the scenario tests
pub const MINT: &str = "MintM";
/// Owner whose address cannot be parsed as a public key, so scans walk it directly
pub const OWNER: &str = "OwnerW";
pub const DECIMALS: u8 = 6;

pub fn record(signature: &str, slot: u64) -> SignatureRecord {
    SignatureRecord {
        signature: signature.to_string(),
        slot,
        err: None,
        memo: None,
        block_time: Some(1_700_000_000 + slot as i64),
        confirmation_status: Some("finalized".to_string()),
    }
}

pub fn failed_record(signature: &str, slot: u64) -> SignatureRecord {
    SignatureRecord {
        err: Some(json!({"InstructionError": [0, {"Custom": 1}]})),
        ..record(signature, slot)
    }
}

/// `count` records named `{prefix}{n}`, newest first, slots descending
pub fn records(prefix: &str, count: usize) -> Vec<SignatureRecord> {
    (0..count)
        .map(|n| record(&format!("{}{}", prefix, n), 10_000 - n as u64))
        .collect()
}

fn burn_instruction(account: &str, mint: &str, authority: &str, raw_amount: u64) -> Value {
    json!({
        "program": "spl-token",
        "programId": SPL_TOKEN_PROGRAM_ID,
        "parsed": {
            "type": "burn",
            "info": {
                "account": account,
                "mint": mint,
                "authority": authority,
                "amount": raw_amount.to_string()
            }
        },
        "stackHeight": null
    })
}

fn token_balance(account_index: usize, mint: &str, owner: &str, raw_amount: u64) -> Value {
    let ui = raw_amount as f64 / 10f64.powi(DECIMALS as i32);
    json!({
        "accountIndex": account_index,
        "mint": mint,
        "owner": owner,
        "programId": SPL_TOKEN_PROGRAM_ID,
        "uiTokenAmount": {
            "amount": raw_amount.to_string(),
            "decimals": DECIMALS,
            "uiAmount": ui,
            "uiAmountString": ui.to_string()
        }
    })
}

fn transaction(
    signature: &str,
    slot: u64,
    account_keys: &[&str],
    instructions: Vec<Value>,
    pre_balances: Option<Vec<Value>>,
    post_balances: Option<Vec<Value>>,
) -> ParsedTransaction {
    let keys: Vec<Value> = account_keys
        .iter()
        .enumerate()
        .map(|(i, key)| json!({"pubkey": key, "signer": i == 0, "writable": true, "source": "transaction"}))
        .collect();

    serde_json::from_value(json!({
        "slot": slot,
        "blockTime": 1_700_000_000 + slot as i64,
        "meta": {
            "err": null,
            "fee": 5000,
            "innerInstructions": [],
            "preTokenBalances": pre_balances,
            "postTokenBalances": post_balances
        },
        "transaction": {
            "signatures": [signature],
            "message": {
                "accountKeys": keys,
                "instructions": instructions
            }
        }
    }))
    .expect("fixture transaction")
}

/// Burn from `account` evidenced by a pre/post balance drop
pub fn balance_burn(
    signature: &str,
    slot: u64,
    owner: &str,
    account: &str,
    mint: &str,
    pre_raw: u64,
    post_raw: u64,
) -> ParsedTransaction {
    transaction(
        signature,
        slot,
        &[owner, account, mint, SPL_TOKEN_PROGRAM_ID],
        vec![burn_instruction(account, mint, owner, pre_raw - post_raw)],
        Some(vec![token_balance(1, mint, owner, pre_raw)]),
        Some(vec![token_balance(1, mint, owner, post_raw)]),
    )
}

/// Burn with no balance snapshots, so only the instruction amount counts
pub fn instruction_burn(
    signature: &str,
    slot: u64,
    owner: &str,
    account: &str,
    mint: &str,
    raw_amount: u64,
) -> ParsedTransaction {
    transaction(
        signature,
        slot,
        &[owner, account, mint, SPL_TOKEN_PROGRAM_ID],
        vec![burn_instruction(account, mint, owner, raw_amount)],
        None,
        None,
    )
}

/// A token transfer; never a burn
pub fn transfer(signature: &str, slot: u64, owner: &str) -> ParsedTransaction {
    transaction(
        signature,
        slot,
        &[owner, "DestAcct", SPL_TOKEN_PROGRAM_ID],
        vec![json!({
            "program": "spl-token",
            "programId": SPL_TOKEN_PROGRAM_ID,
            "parsed": {"type": "transfer", "info": {
                "source": "SrcAcct", "destination": "DestAcct", "authority": owner, "amount": "10"
            }}
        })],
        None,
        None,
    )
}

/// Failed on-chain, as the transaction body reports it
pub fn failed_burn(signature: &str, slot: u64, owner: &str, account: &str) -> ParsedTransaction {
    let mut tx = instruction_burn(signature, slot, owner, account, MINT, 1_000_000);
    if let Some(meta) = tx.meta.as_mut() {
        meta.err = Some(json!({"InstructionError": [0, "InsufficientFunds"]}));
    }
    tx
}
