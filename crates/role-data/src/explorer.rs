//! Etherscan-style block explorer log search.
//!
//! Queries `module=logs&action=getLogs` for the logs a contract emitted with
//! a given topic0 inside a block range. The explorer is only used to locate
//! candidate transactions; receipts come from the RPC node.
//!
//! Response envelope:
//! ```text
//! { "status": "1", "message": "OK", "result": [ { "address": "0x..", "topics": [..], ... } ] }
//! { "status": "0", "message": "No records found", "result": [] }
//! { "status": "0", "message": "NOTOK", "result": "Invalid API Key" }
//! ```

use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::types::LogEntry;

/// Client-level timeout for every explorer request.
pub const EXPLORER_TIMEOUT: Duration = Duration::from_secs(15);

/// Message the explorer returns alongside status `0` when nothing matched.
const NO_RECORDS_MESSAGE: &str = "No records found";

/// Errors returned by the explorer log search.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("failed to build explorer HTTP client")]
    ClientInit(#[source] reqwest::Error),

    #[error("explorer request failed")]
    Http(#[from] reqwest::Error),

    #[error("explorer returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("explorer API error: {message} ({result})")]
    Api { message: String, result: String },

    #[error("malformed explorer response: {0}")]
    Malformed(String),
}

/// Anything that can search event logs by block range, address and topic0.
#[allow(async_fn_in_trait)]
pub trait LogSearch {
    /// Returns the logs emitted by `address` with `topic` as topic0 between
    /// `from_block` and `to_block` (both inclusive), in explorer order.
    async fn get_logs(
        &self,
        from_block: u64,
        to_block: u64,
        address: Address,
        topic: B256,
    ) -> Result<Vec<LogEntry>, ExplorerError>;
}

/// HTTP client for an Etherscan-compatible API.
pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ExplorerClient {
    /// Creates a client for `base_url` (e.g. `https://api.etherscan.io/api`).
    ///
    /// # Errors
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ExplorerError> {
        let http = reqwest::Client::builder()
            .timeout(EXPLORER_TIMEOUT)
            .build()
            .map_err(ExplorerError::ClientInit)?;

        Ok(Self {
            http,
            base_url: base_url.trim().to_string(),
            api_key: api_key.trim().to_string(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl LogSearch for ExplorerClient {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn get_logs(
        &self,
        from_block: u64,
        to_block: u64,
        address: Address,
        topic: B256,
    ) -> Result<Vec<LogEntry>, ExplorerError> {
        let from = from_block.to_string();
        let to = to_block.to_string();
        let address = format!("{address:#x}");
        let topic = topic.to_string();

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("module", "logs"),
                ("action", "getLogs"),
                ("fromBlock", from.as_str()),
                ("toBlock", to.as_str()),
                ("address", address.as_str()),
                ("topic0", topic.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExplorerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let logs = parse_logs_response(&body)?;

        debug!(logs = logs.len(), "explorer log search complete");
        Ok(logs)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: String,
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLog {
    address: String,
    topics: Vec<Option<String>>,
    data: String,
    block_number: String,
    #[serde(default)]
    time_stamp: Option<String>,
    #[serde(default)]
    log_index: Option<String>,
    transaction_hash: String,
}

/// Parses a full explorer response body into log entries.
fn parse_logs_response(body: &str) -> Result<Vec<LogEntry>, ExplorerError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| ExplorerError::Malformed(format!("invalid JSON envelope: {e}")))?;

    if envelope.status != "1" {
        let empty_result = envelope.result.as_array().is_some_and(|a| a.is_empty());
        if envelope.message.starts_with(NO_RECORDS_MESSAGE) || empty_result {
            return Ok(Vec::new());
        }

        let result = match envelope.result {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        return Err(ExplorerError::Api {
            message: envelope.message,
            result,
        });
    }

    let raw: Vec<RawLog> = serde_json::from_value(envelope.result)
        .map_err(|e| ExplorerError::Malformed(format!("invalid log array: {e}")))?;

    raw.into_iter().map(RawLog::into_entry).collect()
}

impl RawLog {
    fn into_entry(self) -> Result<LogEntry, ExplorerError> {
        let transaction_hash = self.transaction_hash.parse::<B256>().map_err(|_| {
            ExplorerError::Malformed(format!("invalid transaction hash {}", self.transaction_hash))
        })?;
        let address = self
            .address
            .parse::<Address>()
            .map_err(|_| ExplorerError::Malformed(format!("invalid address {}", self.address)))?;

        let topics = self
            .topics
            .into_iter()
            .enumerate()
            .map(|(index, topic)| match topic.as_deref().map(str::trim) {
                None | Some("") => Err(ExplorerError::Malformed(format!(
                    "missing topic at index {index}"
                ))),
                Some(t) => t
                    .parse::<B256>()
                    .map_err(|_| ExplorerError::Malformed(format!("invalid topic {t}"))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let data = self
            .data
            .parse::<Bytes>()
            .map_err(|_| ExplorerError::Malformed(format!("invalid data {}", self.data)))?;

        let block_number = parse_hex_u64(&self.block_number).ok_or_else(|| {
            ExplorerError::Malformed(format!("invalid block number {}", self.block_number))
        })?;

        Ok(LogEntry {
            transaction_hash,
            address,
            topics,
            data,
            block_number,
            log_index: self.log_index.as_deref().and_then(parse_hex_u64),
            timestamp: self.time_stamp.as_deref().and_then(parse_hex_u64),
        })
    }
}

/// Parses an explorer quantity. Hex with `0x` prefix, or decimal; `0x` alone is zero.
fn parse_hex_u64(value: &str) -> Option<u64> {
    let trimmed = value.trim();
    if let Some(hex) = trimmed.strip_prefix("0x") {
        if hex.is_empty() {
            return Some(0);
        }
        return u64::from_str_radix(hex, 16).ok();
    }
    trimmed.parse::<u64>().ok()
}
