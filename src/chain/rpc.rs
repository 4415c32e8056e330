//! Solana JSON-RPC access over plain HTTP.
//!
//! Three methods are consumed: `getLatestBlockhash`, `sendTransaction`,
//! and `getSignatureStatuses` for confirmation polling. Calls are
//! single-attempt; `sendTransaction` is issued with `maxRetries: 0` so the
//! RPC node does not retry behind our back either.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::time::Instant;
use tracing::instrument;

use crate::config::SolanaConfig;

const ERROR_BODY_SNIPPET_LEN: usize = 220;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("rpc request failed ({kind}): {source}")]
    Transport {
        kind: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("rpc http {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },

    #[error("{method} returned error: {error}")]
    Rpc { method: &'static str, error: String },

    #[error("{method} response decode failed: {source}. body={body}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("{method} response missing result: {response}")]
    MissingResult {
        method: &'static str,
        response: String,
    },

    #[error("transaction {signature} failed on-chain: {err}")]
    TransactionFailed { signature: String, err: String },

    #[error("transaction {signature} not confirmed within the timeout")]
    ConfirmTimeout { signature: String },
}

/// What one `getSignatureStatuses` response says about a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationPoll {
    Pending,
    Confirmed,
    Failed(String),
}

pub struct SolanaRpc {
    http: reqwest::Client,
    rpc_url: String,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl SolanaRpc {
    pub fn new(config: &SolanaConfig) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|source| RpcError::Transport {
                kind: "build",
                source,
            })?;

        Ok(Self {
            http,
            rpc_url: config.rpc_url.clone(),
            confirm_timeout: Duration::from_secs(config.confirm_timeout_seconds),
            poll_interval: Duration::from_millis(config.confirm_poll_ms),
        })
    }

    /// Current blockhash, the freshness token the sale builder needs.
    #[instrument(skip(self))]
    pub async fn latest_blockhash(&self) -> Result<String, RpcError> {
        let method = "getLatestBlockhash";
        let result = self
            .call(method, json!([{"commitment": "confirmed"}]))
            .await?;

        result
            .pointer("/value/blockhash")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RpcError::MissingResult {
                method,
                response: result.to_string(),
            })
    }

    /// Broadcast one signed transaction, returning its signature.
    #[instrument(skip(self, tx_b64))]
    pub async fn send_transaction(&self, tx_b64: &str) -> Result<String, RpcError> {
        let method = "sendTransaction";
        let params = json!([
            tx_b64,
            {
                "encoding": "base64",
                "skipPreflight": false,
                "preflightCommitment": "confirmed",
                "maxRetries": 0
            }
        ]);

        let result = self.call(method, params).await?;
        result
            .as_str()
            .filter(|signature| !signature.is_empty())
            .map(str::to_string)
            .ok_or_else(|| RpcError::MissingResult {
                method,
                response: result.to_string(),
            })
    }

    /// Block until the signature reaches confirmed commitment, the cluster
    /// reports a transaction error, or the configured timeout elapses.
    #[instrument(skip(self))]
    pub async fn confirm_signature(&self, signature: &str) -> Result<(), RpcError> {
        let method = "getSignatureStatuses";
        let deadline = Instant::now() + self.confirm_timeout;

        loop {
            let result = self
                .call(
                    method,
                    json!([[signature], {"searchTransactionHistory": false}]),
                )
                .await?;

            match parse_confirmation(&result) {
                ConfirmationPoll::Confirmed => return Ok(()),
                ConfirmationPoll::Failed(err) => {
                    return Err(RpcError::TransactionFailed {
                        signature: signature.to_string(),
                        err,
                    });
                }
                ConfirmationPoll::Pending => {}
            }

            if Instant::now() >= deadline {
                return Err(RpcError::ConfirmTimeout {
                    signature: signature.to_string(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn call(&self, method: &'static str, params: Value) -> Result<Value, RpcError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| RpcError::Transport {
                kind: transport_error_kind(&source),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| RpcError::Transport {
                kind: "read",
                source,
            })?;

        if !status.is_success() {
            return Err(RpcError::HttpStatus {
                status,
                body: summarize_body(&body),
            });
        }

        let parsed: Value =
            serde_json::from_str(&body).map_err(|source| RpcError::Decode {
                method,
                source,
                body: summarize_body(&body),
            })?;

        if let Some(error) = parsed.get("error") {
            return Err(RpcError::Rpc {
                method,
                error: error.to_string(),
            });
        }

        parsed
            .get("result")
            .cloned()
            .ok_or_else(|| RpcError::MissingResult {
                method,
                response: parsed.to_string(),
            })
    }
}

/// Interpret a `getSignatureStatuses` result for a single signature.
fn parse_confirmation(result: &Value) -> ConfirmationPoll {
    let Some(status) = result.pointer("/value/0").filter(|v| !v.is_null()) else {
        return ConfirmationPoll::Pending;
    };

    if let Some(err) = status.get("err").filter(|v| !v.is_null()) {
        return ConfirmationPoll::Failed(err.to_string());
    }

    match status.get("confirmationStatus").and_then(Value::as_str) {
        Some("confirmed") | Some("finalized") => ConfirmationPoll::Confirmed,
        _ => ConfirmationPoll::Pending,
    }
}

fn transport_error_kind(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connect"
    } else {
        "send"
    }
}

fn summarize_body(body: &str) -> String {
    body.chars().take(ERROR_BODY_SNIPPET_LEN).collect()
}
