//! Wire types for the Solana JSON-RPC responses the scanner consumes
//!
//! Everything optional on the wire is optional here: partially indexed or
//! pruned transactions routinely omit `blockTime`, `meta`, or token balance
//! arrays, and a missing field must not fail a whole page.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub id: Option<u64>,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Results wrapped in `{ context, value }`
#[derive(Debug, Deserialize)]
pub struct WithContext<T> {
    pub value: T,
}

/// One entry from `getSignaturesForAddress`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    pub signature: String,
    pub slot: u64,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub confirmation_status: Option<String>,
}

impl SignatureRecord {
    /// True when the chain recorded this transaction as failed
    pub fn failed(&self) -> bool {
        matches!(&self.err, Some(v) if !v.is_null())
    }
}

/// `getTransaction` result with `jsonParsed` encoding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTransaction {
    #[serde(default)]
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
    #[serde(default)]
    pub transaction: Option<TransactionEnvelope>,
}

impl ParsedTransaction {
    pub fn failed(&self) -> bool {
        self.meta.as_ref().map(|m| m.failed()).unwrap_or(false)
    }

    /// Index of `address` in the message's account key table
    pub fn account_index(&self, address: &str) -> Option<usize> {
        self.account_keys()
            .iter()
            .position(|key| key.pubkey() == address)
    }

    /// Key at `index` of the account key table
    pub fn account_key(&self, index: usize) -> Option<&str> {
        self.account_keys().get(index).map(|key| key.pubkey())
    }

    pub fn account_keys(&self) -> &[AccountKey] {
        self.transaction
            .as_ref()
            .map(|t| t.message.account_keys.as_slice())
            .unwrap_or(&[])
    }

    pub fn signature(&self) -> Option<&str> {
        self.transaction
            .as_ref()
            .and_then(|t| t.signatures.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub inner_instructions: Option<Vec<InnerInstructionGroup>>,
    #[serde(default)]
    pub pre_token_balances: Option<Vec<TokenBalance>>,
    #[serde(default)]
    pub post_token_balances: Option<Vec<TokenBalance>>,
}

impl TransactionMeta {
    pub fn failed(&self) -> bool {
        matches!(&self.err, Some(v) if !v.is_null())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEnvelope {
    #[serde(default)]
    pub signatures: Vec<String>,
    pub message: TransactionMessage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMessage {
    #[serde(default)]
    pub account_keys: Vec<AccountKey>,
    #[serde(default)]
    pub instructions: Vec<RawInstruction>,
}

/// `jsonParsed` returns objects; legacy encodings return bare strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountKey {
    Parsed {
        pubkey: String,
        #[serde(default)]
        signer: bool,
        #[serde(default)]
        writable: bool,
    },
    Plain(String),
}

impl AccountKey {
    pub fn pubkey(&self) -> &str {
        match self {
            AccountKey::Parsed { pubkey, .. } => pubkey,
            AccountKey::Plain(pubkey) => pubkey,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InnerInstructionGroup {
    pub index: u32,
    #[serde(default)]
    pub instructions: Vec<RawInstruction>,
}

/// An instruction as the RPC returns it, before classification
///
/// Known programs come back with `program` and a `parsed` object; unknown
/// programs only carry `programId`, `accounts` and base58 `data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInstruction {
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub program_id: Option<String>,
    #[serde(default)]
    pub parsed: Option<Value>,
    #[serde(default)]
    pub stack_height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub account_index: usize,
    pub mint: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub program_id: Option<String>,
    pub ui_token_amount: UiTokenAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTokenAmount {
    /// Raw integer amount as a decimal string
    pub amount: String,
    pub decimals: u8,
    #[serde(default)]
    pub ui_amount: Option<f64>,
    #[serde(default)]
    pub ui_amount_string: Option<String>,
}

impl UiTokenAmount {
    pub fn raw(&self) -> Option<u64> {
        self.amount.parse().ok()
    }
}

/// Mint supply as read from `getTokenSupply`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSupply {
    pub raw_amount: u64,
    pub decimals: u8,
    pub ui_amount: f64,
}

impl TryFrom<UiTokenAmount> for TokenSupply {
    type Error = String;

    fn try_from(value: UiTokenAmount) -> Result<Self, Self::Error> {
        let raw_amount = value
            .raw()
            .ok_or_else(|| format!("unparseable supply amount '{}'", value.amount))?;
        let ui_amount = value
            .ui_amount
            .unwrap_or_else(|| crate::utils::math::scale_raw_amount(raw_amount, value.decimals));
        Ok(Self {
            raw_amount,
            decimals: value.decimals,
            ui_amount,
        })
    }
}
