//! Closed set of instruction shapes the extractor understands
//!
//! Raw `jsonParsed` instructions are classified once at the boundary. Only
//! token-program burns survive as typed values; everything else collapses to
//! `Other` before any of its payload is decoded.

use crate::config::{SPL_TOKEN_PROGRAM_ID, TOKEN_2022_PROGRAM_ID};
use crate::rpc::types::{RawInstruction, UiTokenAmount};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Program names the RPC's instruction parser assigns to token programs
const TOKEN_PROGRAM_NAMES: [&str; 2] = ["spl-token", "spl-token-2022"];

#[derive(Debug, Clone, PartialEq)]
pub enum InstructionShape {
    TokenBurn(BurnInstruction),
    TokenBurnChecked(BurnInstruction),
    Other,
}

/// Fields shared by both burn variants
#[derive(Debug, Clone, PartialEq)]
pub struct BurnInstruction {
    /// Token account the tokens are burned from
    pub account: String,
    pub mint: String,
    /// Owner or delegate that signed the burn
    pub authority: Option<String>,
    pub raw_amount: Option<u64>,
    pub ui_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BurnInfo {
    account: String,
    mint: String,
    #[serde(default)]
    authority: Option<String>,
    #[serde(default)]
    amount: Option<AmountField>,
    #[serde(default)]
    token_amount: Option<UiTokenAmount>,
}

/// Raw amounts are strings on the wire, but some indexers emit numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AmountField {
    Text(String),
    Number(u64),
}

impl AmountField {
    fn raw(&self) -> Option<u64> {
        match self {
            AmountField::Text(s) => s.parse().ok(),
            AmountField::Number(n) => Some(*n),
        }
    }
}

impl InstructionShape {
    pub fn classify(raw: &RawInstruction) -> Self {
        if !is_token_program(raw) {
            return InstructionShape::Other;
        }

        let Some(parsed) = raw.parsed.as_ref().and_then(Value::as_object) else {
            return InstructionShape::Other;
        };
        let checked = match parsed.get("type").and_then(Value::as_str) {
            Some("burn") => false,
            Some("burnChecked") => true,
            _ => return InstructionShape::Other,
        };

        let Some(info) = parsed.get("info") else {
            debug!("Burn instruction without info payload");
            return InstructionShape::Other;
        };
        let info: BurnInfo = match BurnInfo::deserialize(info) {
            Ok(info) => info,
            Err(e) => {
                debug!("Undecodable burn instruction info: {}", e);
                return InstructionShape::Other;
            }
        };

        let burn = BurnInstruction::from_info(info);
        if checked {
            InstructionShape::TokenBurnChecked(burn)
        } else {
            InstructionShape::TokenBurn(burn)
        }
    }

    pub fn as_burn(&self) -> Option<&BurnInstruction> {
        match self {
            InstructionShape::TokenBurn(burn) | InstructionShape::TokenBurnChecked(burn) => {
                Some(burn)
            }
            InstructionShape::Other => None,
        }
    }
}

impl BurnInstruction {
    fn from_info(info: BurnInfo) -> Self {
        let (raw_amount, ui_amount) = match (&info.token_amount, &info.amount) {
            (Some(token_amount), _) => (token_amount.raw(), token_amount.ui_amount),
            (None, Some(amount)) => (amount.raw(), None),
            (None, None) => (None, None),
        };

        Self {
            account: info.account,
            mint: info.mint,
            authority: info.authority,
            raw_amount,
            ui_amount,
        }
    }
}

fn is_token_program(raw: &RawInstruction) -> bool {
    let by_name = raw
        .program
        .as_deref()
        .map(|name| TOKEN_PROGRAM_NAMES.contains(&name))
        .unwrap_or(false);
    let by_id = raw
        .program_id
        .as_deref()
        .map(|id| id == SPL_TOKEN_PROGRAM_ID || id == TOKEN_2022_PROGRAM_ID)
        .unwrap_or(false);
    by_name || by_id
}
