use crate::config::SolanaRpcConfig;
use crate::errors::{RpcError, RpcResult};
use crate::rpc::source::{HistorySource, TokenMetadataSource, TransactionLookup};
use crate::rpc::types::{
    ParsedTransaction, RpcResponse, SignatureRecord, TokenSupply, UiTokenAmount, WithContext,
};
use crate::rpc::{calculate_next_backoff, execute_with_timeout};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Solana JSON-RPC client with rate-limit backoff
pub struct SolanaRpcClient {
    http: reqwest::Client,
    config: SolanaRpcConfig,
    next_id: AtomicU64,
    error_count: Arc<AtomicU64>,
}

impl SolanaRpcClient {
    /// Create a new RPC client. No network traffic happens here.
    pub fn new(config: SolanaRpcConfig) -> RpcResult<Self> {
        if !config.url.starts_with("http") {
            return Err(RpcError::ConnectionFailed(format!(
                "RPC URL must be http(s): {}",
                config.url
            )));
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| RpcError::ConnectionFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            next_id: AtomicU64::new(1),
            error_count: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Test RPC connection, returning the node's `solana-core` version
    pub async fn test_connection(&self) -> RpcResult<String> {
        let version: Value = self.call("getVersion", json!([])).await?;
        let core = version
            .get("solana-core")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::InvalidResponse("getVersion without solana-core".to_string()))?;
        debug!("Solana RPC connection test successful - solana-core {}", core);
        Ok(core.to_string())
    }

    /// One page of `getSignaturesForAddress`
    pub async fn get_signatures_for_address(
        &self,
        address: &str,
        before: Option<&str>,
        limit: usize,
    ) -> RpcResult<Vec<SignatureRecord>> {
        let mut options = json!({
            "limit": limit,
            "commitment": self.config.commitment,
        });
        if let Some(before) = before {
            options["before"] = json!(before);
        }

        self.call("getSignaturesForAddress", json!([address, options]))
            .await
    }

    /// Fetch many transactions in a single JSON-RPC batch request
    pub async fn get_transactions(&self, signatures: &[String]) -> RpcResult<Vec<TransactionLookup>> {
        if signatures.is_empty() {
            return Ok(Vec::new());
        }

        let base_id = self
            .next_id
            .fetch_add(signatures.len() as u64, Ordering::Relaxed);
        let batch: Vec<Value> = signatures
            .iter()
            .enumerate()
            .map(|(offset, signature)| {
                build_request(
                    base_id + offset as u64,
                    "getTransaction",
                    json!([
                        signature,
                        {
                            "encoding": "jsonParsed",
                            "maxSupportedTransactionVersion": 0,
                            "commitment": self.config.commitment,
                        }
                    ]),
                )
            })
            .collect();

        let text = self
            .post_with_retry("getTransaction", &Value::Array(batch))
            .await?;
        parse_batch_response(&text, base_id, signatures.len())
    }

    /// Existence probe without pulling account data
    pub async fn get_account_exists(&self, address: &str) -> RpcResult<bool> {
        let info: WithContext<Option<Value>> = self
            .call(
                "getAccountInfo",
                json!([
                    address,
                    {
                        "encoding": "base64",
                        "commitment": self.config.commitment,
                        "dataSlice": { "offset": 0, "length": 0 },
                    }
                ]),
            )
            .await?;
        Ok(info.value.is_some())
    }

    /// Supply and decimals of a mint
    pub async fn get_token_supply(&self, mint: &str) -> RpcResult<TokenSupply> {
        let supply: WithContext<UiTokenAmount> = self
            .call(
                "getTokenSupply",
                json!([mint, { "commitment": self.config.commitment }]),
            )
            .await?;
        TokenSupply::try_from(supply.value).map_err(RpcError::InvalidResponse)
    }

    /// Get the current error count from RPC operations
    pub fn get_error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &SolanaRpcConfig {
        &self.config
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> RpcResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = build_request(id, method, params);
        let text = self.post_with_retry(method, &body).await?;

        let response: RpcResponse<T> = serde_json::from_str(&text).map_err(|e| {
            RpcError::DeserialisationFailed(format!("{} response: {}", method, e))
        })?;

        if let Some(err) = response.error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
            return Err(RpcError::CallFailed {
                method: method.to_string(),
                message: format!("code {}: {}", err.code, err.message),
            });
        }

        response
            .result
            .ok_or_else(|| RpcError::InvalidResponse(format!("{} returned null result", method)))
    }

    /// POST a request body, backing off on HTTP 429 up to `max_retries` times
    async fn post_with_retry(&self, method: &str, body: &Value) -> RpcResult<String> {
        let mut attempts = 0;
        let mut backoff = Duration::from_millis(self.config.initial_backoff_ms);

        loop {
            attempts += 1;
            let request = self.http.post(&self.config.url).json(body).send();

            let outcome = execute_with_timeout(self.config.timeout_seconds, async {
                let response = request.await?;
                let status = response.status();
                let text = response.text().await?;
                Ok::<_, reqwest::Error>((status, text))
            })
            .await;

            match outcome {
                Ok(Ok((status, _))) if status == StatusCode::TOO_MANY_REQUESTS => {
                    self.error_count.fetch_add(1, Ordering::Relaxed);

                    if attempts > self.config.max_retries {
                        error!("{} still rate limited after {} attempts", method, attempts);
                        return Err(RpcError::RateLimited {
                            method: method.to_string(),
                            attempts,
                        });
                    }

                    warn!(
                        "{} rate limited on attempt {}, retrying in {:?}",
                        method, attempts, backoff
                    );
                    sleep(backoff).await;

                    backoff = calculate_next_backoff(
                        backoff,
                        self.config.backoff_multiplier,
                        self.config.max_backoff_seconds,
                    );
                }
                Ok(Ok((status, text))) if !status.is_success() => {
                    self.error_count.fetch_add(1, Ordering::Relaxed);
                    let snippet: String = text.chars().take(200).collect();
                    return Err(RpcError::CallFailed {
                        method: method.to_string(),
                        message: format!("HTTP {}: {}", status, snippet),
                    });
                }
                Ok(Ok((_, text))) => {
                    if attempts > 1 {
                        debug!("{} succeeded after {} attempts", method, attempts);
                    }
                    return Ok(text);
                }
                Ok(Err(e)) => {
                    self.error_count.fetch_add(1, Ordering::Relaxed);
                    return Err(e.into());
                }
                Err(_) => {
                    self.error_count.fetch_add(1, Ordering::Relaxed);
                    return Err(RpcError::Timeout {
                        timeout_seconds: self.config.timeout_seconds,
                        operation: method.to_string(),
                    });
                }
            }
        }
    }
}

#[async_trait]
impl HistorySource for SolanaRpcClient {
    async fn account_exists(&self, address: &str) -> RpcResult<bool> {
        self.get_account_exists(address).await
    }

    async fn signatures_for_address(
        &self,
        address: &str,
        before: Option<&str>,
        limit: usize,
    ) -> RpcResult<Vec<SignatureRecord>> {
        self.get_signatures_for_address(address, before, limit).await
    }

    async fn parsed_transactions(
        &self,
        signatures: &[String],
    ) -> RpcResult<Vec<TransactionLookup>> {
        self.get_transactions(signatures).await
    }
}

#[async_trait]
impl TokenMetadataSource for SolanaRpcClient {
    async fn token_supply(&self, mint: &str) -> RpcResult<TokenSupply> {
        self.get_token_supply(mint).await
    }
}

fn build_request(id: u64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

/// Match batch responses back to request order by id
///
/// Entries are decoded one by one so a single odd transaction only marks
/// its own slot as malformed.
fn parse_batch_response(text: &str, base_id: u64, count: usize) -> RpcResult<Vec<TransactionLookup>> {
    let parsed: Value = serde_json::from_str(text)
        .map_err(|e| RpcError::DeserialisationFailed(format!("getTransaction batch: {}", e)))?;

    let entries = match parsed {
        Value::Array(entries) => entries,
        Value::Object(_) => {
            // Some providers refuse batches with a single top-level error
            let response: RpcResponse<Value> = serde_json::from_value(parsed)?;
            let message = response
                .error
                .map(|e| format!("code {}: {}", e.code, e.message))
                .unwrap_or_else(|| "non-array batch response".to_string());
            return Err(RpcError::CallFailed {
                method: "getTransaction".to_string(),
                message,
            });
        }
        other => {
            return Err(RpcError::InvalidResponse(format!(
                "unexpected batch response: {}",
                other
            )))
        }
    };

    let mut by_id: HashMap<u64, TransactionLookup> = HashMap::with_capacity(entries.len());
    for entry in entries {
        let response: RpcResponse<Value> = match serde_json::from_value(entry) {
            Ok(response) => response,
            Err(e) => {
                debug!("Dropping undecodable batch entry: {}", e);
                continue;
            }
        };
        let Some(id) = response.id else {
            continue;
        };

        let lookup = match (response.error, response.result) {
            (Some(err), _) => TransactionLookup::Unavailable(format!("code {}: {}", err.code, err.message)),
            (None, None) | (None, Some(Value::Null)) => TransactionLookup::Missing,
            (None, Some(value)) => match serde_json::from_value::<ParsedTransaction>(value) {
                Ok(tx) => TransactionLookup::Found(Box::new(tx)),
                Err(e) => TransactionLookup::Malformed(e.to_string()),
            },
        };
        by_id.insert(id, lookup);
    }

    Ok((0..count as u64)
        .map(|offset| {
            by_id
                .remove(&(base_id + offset))
                .unwrap_or_else(|| TransactionLookup::Unavailable("no response for request".to_string()))
        })
        .collect())
}
