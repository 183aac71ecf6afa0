use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Solana RPC operations
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Scan failures surfaced to the caller
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// RPC error types
#[derive(Error, Debug)]
pub enum RpcError {
    /// Failed to reach the RPC endpoint at all
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Address string is not a valid base58 public key
    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    /// JSON-RPC method returned an error object
    #[error("RPC call failed: {method} - {message}")]
    CallFailed { method: String, message: String },

    /// Endpoint kept answering 429 after all retries
    #[error("Rate limited: {method} after {attempts} attempts")]
    RateLimited { method: String, attempts: usize },

    /// Failed to deserialise RPC response data
    #[error("Deserialisation failed: {0}")]
    DeserialisationFailed(String),

    /// RPC request timed out
    #[error("Request timeout: {timeout_seconds}s for {operation}")]
    Timeout {
        timeout_seconds: u64,
        operation: String,
    },

    /// RPC returned unexpected or malformed response data
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RpcError::Timeout {
                timeout_seconds: 0,
                operation: err
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "http request".to_string()),
            }
        } else if err.is_decode() {
            RpcError::DeserialisationFailed(err.to_string())
        } else {
            RpcError::ConnectionFailed(err.to_string())
        }
    }
}

/// Stage of a scan at which a remote fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Signatures,
    Transactions,
    Metadata,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStage::Signatures => write!(f, "signature page"),
            FetchStage::Transactions => write!(f, "transaction batch"),
            FetchStage::Metadata => write!(f, "mint metadata"),
        }
    }
}

/// Scan-level failures. Cancellation and resolver fallback are not errors.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Network, rate-limit or timeout failure while walking history
    #[error("Transient fetch error during {stage}: {source}")]
    TransientFetch {
        stage: FetchStage,
        #[source]
        source: RpcError,
    },

    /// Scan options rejected before any network call
    #[error("Invalid scan options: {0}")]
    InvalidOptions(String),

    /// Scan reached the failed state; carries the reported reason
    #[error("Scan failed: {0}")]
    Failed(String),

    /// Scan task ended without reporting a status
    #[error("Scan task aborted: {0}")]
    Aborted(String),
}

impl ScanError {
    pub fn signatures(source: RpcError) -> Self {
        ScanError::TransientFetch {
            stage: FetchStage::Signatures,
            source,
        }
    }

    pub fn transactions(source: RpcError) -> Self {
        ScanError::TransientFetch {
            stage: FetchStage::Transactions,
            source,
        }
    }

    pub fn metadata(source: RpcError) -> Self {
        ScanError::TransientFetch {
            stage: FetchStage::Metadata,
            source,
        }
    }
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, RpcError>;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::DeserialisationFailed(err.to_string())
    }
}
