//! Burn event extraction from a single parsed transaction
//!
//! Evidence, in order of preference:
//! 1. Balance diff: pre minus post token balance of the attributed account.
//!    A non-positive diff discards the candidate.
//! 2. Instruction amount: UI amount when present and positive, otherwise the
//!    raw amount scaled by the mint's decimals.
//!
//! A transaction contributes at most one amount: the first candidate that
//! yields a positive value ends the search. Two independent burns from two
//! different accounts of the same owner in one transaction count once.

use crate::rpc::types::{RawInstruction, TokenBalance};
use crate::rpc::ParsedTransaction;
use crate::scanner::instruction::{BurnInstruction, InstructionShape};
use crate::scanner::types::ScanTarget;
use crate::utils::math::{positive_raw_decrease, scale_raw_amount};
use tracing::debug;

/// Outcome of the balance-diff evidence for one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
enum BalanceEvidence {
    /// Both snapshots present and the account went down by this much
    Decrease(f64),
    /// Both snapshots present but no net decrease
    NoDecrease,
    /// At least one snapshot missing
    Unavailable,
}

/// Top-level instructions with each one's inner instructions right after it
pub fn flatten_instructions(tx: &ParsedTransaction) -> Vec<&RawInstruction> {
    let Some(envelope) = tx.transaction.as_ref() else {
        return Vec::new();
    };
    let inner_groups = tx
        .meta
        .as_ref()
        .and_then(|m| m.inner_instructions.as_deref())
        .unwrap_or(&[]);

    let mut flattened = Vec::new();
    for (index, outer) in envelope.message.instructions.iter().enumerate() {
        flattened.push(outer);
        for group in inner_groups.iter().filter(|g| g.index as usize == index) {
            flattened.extend(group.instructions.iter());
        }
    }

    // Inner groups pointing past the outer list still carry real burns
    let outer_count = envelope.message.instructions.len();
    for group in inner_groups
        .iter()
        .filter(|g| g.index as usize >= outer_count)
    {
        flattened.extend(group.instructions.iter());
    }

    flattened
}

pub struct BurnExtractor<'a> {
    target: &'a ScanTarget,
    /// Account resolved for this scan (token account or owner fallback)
    scan_account: &'a str,
}

impl<'a> BurnExtractor<'a> {
    pub fn new(target: &'a ScanTarget, scan_account: &'a str) -> Self {
        Self {
            target,
            scan_account,
        }
    }

    /// Burned amount in token units, or `None` when nothing attributable burned
    pub fn extract(&self, tx: &ParsedTransaction) -> Option<f64> {
        if tx.failed() {
            return None;
        }
        if tx.transaction.is_none() {
            debug!("Transaction at slot {} has no message, skipping", tx.slot);
            return None;
        }

        flatten_instructions(tx)
            .into_iter()
            .map(InstructionShape::classify)
            .filter_map(|shape| match shape {
                InstructionShape::TokenBurn(burn) | InstructionShape::TokenBurnChecked(burn) => {
                    Some(burn)
                }
                InstructionShape::Other => None,
            })
            .filter(|burn| burn.mint == self.target.mint_address)
            .find_map(|burn| self.candidate_amount(tx, &burn))
    }

    fn candidate_amount(&self, tx: &ParsedTransaction, burn: &BurnInstruction) -> Option<f64> {
        let account_index = tx.account_index(&burn.account);
        if !self.is_attributed(tx, burn, account_index) {
            return None;
        }

        let evidence = account_index
            .map(|index| self.balance_evidence(tx, index))
            .unwrap_or(BalanceEvidence::Unavailable);

        match evidence {
            BalanceEvidence::Decrease(amount) => Some(amount),
            BalanceEvidence::NoDecrease => None,
            BalanceEvidence::Unavailable => self.instruction_amount(burn),
        }
    }

    /// Direct: the burn's owner field is the target owner.
    /// Indirect: the burned account's key-table entry is the scan account.
    fn is_attributed(
        &self,
        tx: &ParsedTransaction,
        burn: &BurnInstruction,
        account_index: Option<usize>,
    ) -> bool {
        let direct = burn.authority.as_deref() == Some(self.target.owner_address.as_str());
        let indirect = account_index
            .and_then(|index| tx.account_key(index))
            .map(|key| key == self.scan_account)
            .unwrap_or(false);
        direct || indirect
    }

    fn balance_evidence(&self, tx: &ParsedTransaction, account_index: usize) -> BalanceEvidence {
        let Some(meta) = tx.meta.as_ref() else {
            return BalanceEvidence::Unavailable;
        };
        let mint = self.target.mint_address.as_str();
        let pre = find_balance(meta.pre_token_balances.as_deref(), account_index, mint);
        let post = find_balance(meta.post_token_balances.as_deref(), account_index, mint);

        let (Some(pre), Some(post)) = (pre, post) else {
            return BalanceEvidence::Unavailable;
        };

        let decimals = self.target.decimals;
        let decrease = match (pre.ui_token_amount.raw(), post.ui_token_amount.raw()) {
            (Some(pre_raw), Some(post_raw)) => positive_raw_decrease(pre_raw, post_raw, decimals),
            _ => match (pre.ui_token_amount.ui_amount, post.ui_token_amount.ui_amount) {
                (Some(pre_ui), Some(post_ui)) if pre_ui - post_ui > 0.0 => Some(pre_ui - post_ui),
                (Some(_), Some(_)) => None,
                // Neither form usable, treat the snapshots as missing
                _ => return BalanceEvidence::Unavailable,
            },
        };

        match decrease {
            Some(amount) => BalanceEvidence::Decrease(amount),
            None => BalanceEvidence::NoDecrease,
        }
    }

    fn instruction_amount(&self, burn: &BurnInstruction) -> Option<f64> {
        if let Some(ui) = burn.ui_amount.filter(|ui| *ui > 0.0) {
            return Some(ui);
        }
        burn.raw_amount
            .filter(|raw| *raw > 0)
            .map(|raw| scale_raw_amount(raw, self.target.decimals))
    }
}

fn find_balance<'t>(
    balances: Option<&'t [TokenBalance]>,
    account_index: usize,
    mint: &str,
) -> Option<&'t TokenBalance> {
    balances?
        .iter()
        .find(|b| b.account_index == account_index && b.mint == mint)
}
