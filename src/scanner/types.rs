use crate::config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, SPL_TOKEN_PROGRAM_ID};
use crate::errors::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What one scan is looking for. Fixed for the lifetime of the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTarget {
    pub owner_address: String,
    pub mint_address: String,
    /// Resolved once before the scan starts
    pub decimals: u8,
}

impl ScanTarget {
    pub fn new(owner_address: impl Into<String>, mint_address: impl Into<String>, decimals: u8) -> Self {
        Self {
            owner_address: owner_address.into(),
            mint_address: mint_address.into(),
            decimals,
        }
    }
}

/// Opaque "continue before this point in history" marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCursor(String);

impl ScanCursor {
    pub(crate) fn before(signature: &str) -> Self {
        Self(signature.to_string())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

/// One confirmed burn attributable to the target owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnEvent {
    pub signature: String,
    /// Token-scaled, strictly positive
    pub amount: f64,
    pub block_time: Option<i64>,
    pub slot: u64,
}

/// Snapshot handed to the caller after each page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanProgress {
    pub running_total: f64,
    /// Newest first; empty for `ScanMode::TotalOnly`
    pub events: Vec<BurnEvent>,
    pub done: bool,
}

impl ScanProgress {
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

/// Whether the caller wants the ledger or just the total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    TotalOnly,
    #[default]
    FullLedger,
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "total_only" | "total" => Ok(ScanMode::TotalOnly),
            "full_ledger" | "ledger" | "full" => Ok(ScanMode::FullLedger),
            other => Err(format!(
                "unknown scan mode '{}' (expected total-only or full-ledger)",
                other
            )),
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::TotalOnly => write!(f, "total-only"),
            ScanMode::FullLedger => write!(f, "full-ledger"),
        }
    }
}

/// Lifecycle of one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
    Completed,
    Cancelled,
    Failed,
}

impl ScanState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScanState::Completed | ScanState::Cancelled | ScanState::Failed
        )
    }
}

/// Terminal status reported to subscribers, separate from progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    Completed,
    Cancelled,
    Failed(String),
}

impl ScanStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, ScanStatus::Failed(_))
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStatus::Completed => write!(f, "completed"),
            ScanStatus::Cancelled => write!(f, "cancelled"),
            ScanStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Tunables for a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub page_size: usize,
    pub mode: ScanMode,
    /// Program used to derive the associated token account
    pub token_program: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            mode: ScanMode::FullLedger,
            token_program: SPL_TOKEN_PROGRAM_ID.to_string(),
        }
    }
}

impl ScanOptions {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> ScanResult<()> {
        if self.page_size == 0 {
            return Err(ScanError::InvalidOptions(
                "page size must be greater than 0".to_string(),
            ));
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(ScanError::InvalidOptions(format!(
                "page size {} exceeds RPC maximum of {}",
                self.page_size, MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }
}

/// Everything known about a scan once it stops
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub target: ScanTarget,
    /// Account whose history was walked
    pub scan_address: String,
    /// True when the associated token account was unusable and the owner was scanned
    pub fell_back_to_owner: bool,
    pub status: ScanStatus,
    pub progress: ScanProgress,
    pub pages_scanned: usize,
    pub transactions_inspected: usize,
    pub transactions_skipped: usize,
    pub elapsed_seconds: f64,
}
