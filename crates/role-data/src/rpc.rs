//! Alloy RPC provider integration for chain head and receipt lookups.

use alloy::primitives::B256;
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::Log;
use alloy::transports::TransportError;
use thiserror::Error;

use crate::types::{LogEntry, TransactionReceipt};

/// Errors returned by the RPC node.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid RPC URL: {0}")]
    InvalidUrl(String),

    #[error("{method} request failed")]
    Transport {
        method: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("transaction receipt not found for {0}")]
    ReceiptNotFound(B256),
}

/// The chain operations a role scan needs from a node.
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    /// Number of the latest block known to the node.
    async fn latest_block_number(&self) -> Result<u64, RpcError>;

    /// Full receipt of a mined transaction.
    async fn transaction_receipt(&self, hash: B256) -> Result<TransactionReceipt, RpcError>;
}

/// JSON-RPC client over HTTP.
pub struct RpcClient {
    provider: RootProvider,
}

impl RpcClient {
    /// Creates a client for `rpc_url`. No request is sent until the first call.
    ///
    /// # Errors
    /// Returns error if `rpc_url` is not a valid URL.
    pub fn connect(rpc_url: &str) -> Result<Self, RpcError> {
        let url = rpc_url
            .trim()
            .parse()
            .map_err(|_| RpcError::InvalidUrl(rpc_url.to_string()))?;

        Ok(Self {
            provider: RootProvider::new_http(url),
        })
    }
}

impl ChainClient for RpcClient {
    #[tracing::instrument(skip(self))]
    async fn latest_block_number(&self) -> Result<u64, RpcError> {
        let block_number = self
            .provider
            .get_block_number()
            .await
            .map_err(|source| RpcError::Transport {
                method: "eth_blockNumber",
                source,
            })?;

        tracing::debug!(block_number, "resolved chain head");
        Ok(block_number)
    }

    #[tracing::instrument(skip(self), fields(hash = %hash))]
    async fn transaction_receipt(&self, hash: B256) -> Result<TransactionReceipt, RpcError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|source| RpcError::Transport {
                method: "eth_getTransactionReceipt",
                source,
            })?
            .ok_or(RpcError::ReceiptNotFound(hash))?;

        let block_number = receipt.block_number.unwrap_or_default();
        let logs = receipt
            .inner
            .logs()
            .iter()
            .map(|log| log_entry(log, receipt.transaction_hash, block_number))
            .collect::<Vec<_>>();

        tracing::debug!(logs = logs.len(), "fetched transaction receipt");

        Ok(TransactionReceipt {
            transaction_hash: receipt.transaction_hash,
            logs,
        })
    }
}

/// Maps an RPC log to a [`LogEntry`], filling missing positional fields from the receipt.
fn log_entry(log: &Log, transaction_hash: B256, block_number: u64) -> LogEntry {
    LogEntry {
        transaction_hash: log.transaction_hash.unwrap_or(transaction_hash),
        address: log.inner.address,
        topics: log.inner.data.topics().to_vec(),
        data: log.inner.data.data.clone(),
        block_number: log.block_number.unwrap_or(block_number),
        log_index: log.log_index,
        timestamp: log.block_timestamp,
    }
}
