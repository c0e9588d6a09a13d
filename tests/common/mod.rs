//! Shared test helpers and utilities.
//!
//! In-memory [`ChainClient`] and [`LogSearch`] doubles plus factory functions
//! for role-event logs with sensible defaults.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy::primitives::{address, keccak256, Address, Bytes, B256};
use alloy::transports::TransportErrorKind;
use role_data::{ChainClient, ExplorerError, LogEntry, LogSearch, RpcError, TransactionReceipt};
use role_scan::{ScanRequest, ROLE_GRANTED_TOPIC, ROLE_REVOKED_TOPIC};

/// Contract every sample log is emitted by.
pub const CONTRACT: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");

/// Account receiving roles in sample logs.
pub const ACCOUNT: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

/// Admin granting roles in sample logs.
pub const SENDER: Address = address!("70997970c51812e339d9b73b0245ad59e15ebbf9");

/// Explorer arguments recorded by [`FakeExplorer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogQuery {
    pub from_block: u64,
    pub to_block: u64,
    pub address: Address,
    pub topic: B256,
}

/// Node double with a fixed head and a receipt table.
#[derive(Default)]
pub struct FakeChain {
    pub head: u64,
    /// When set, `eth_blockNumber` fails with this message.
    pub head_failure: Option<String>,
    pub receipts: HashMap<B256, TransactionReceipt>,
    head_calls: AtomicUsize,
    receipt_calls: Mutex<Vec<B256>>,
}

impl FakeChain {
    pub fn with_head(head: u64) -> Self {
        Self {
            head,
            ..Default::default()
        }
    }

    pub fn unreachable_head(message: &str) -> Self {
        Self {
            head_failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn with_receipt(mut self, hash: B256, logs: Vec<LogEntry>) -> Self {
        self.receipts.insert(
            hash,
            TransactionReceipt {
                transaction_hash: hash,
                logs,
            },
        );
        self
    }

    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    pub fn receipt_calls(&self) -> Vec<B256> {
        self.receipt_calls.lock().expect("lock").clone()
    }
}

impl ChainClient for FakeChain {
    async fn latest_block_number(&self) -> Result<u64, RpcError> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        match &self.head_failure {
            Some(message) => Err(RpcError::Transport {
                method: "eth_blockNumber",
                source: TransportErrorKind::custom_str(message),
            }),
            None => Ok(self.head),
        }
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<TransactionReceipt, RpcError> {
        self.receipt_calls.lock().expect("lock").push(hash);
        self.receipts
            .get(&hash)
            .cloned()
            .ok_or(RpcError::ReceiptNotFound(hash))
    }
}

/// Explorer double returning canned logs per topic0 and recording every query.
#[derive(Default)]
pub struct FakeExplorer {
    pub logs: HashMap<B256, Vec<LogEntry>>,
    /// Failure for every search.
    pub failure: Option<String>,
    /// Failures for searches on one topic0.
    pub topic_failures: HashMap<B256, String>,
    queries: Mutex<Vec<LogQuery>>,
}

impl FakeExplorer {
    pub fn with_logs(mut self, topic: B256, logs: Vec<LogEntry>) -> Self {
        self.logs.insert(topic, logs);
        self
    }

    pub fn with_topic_failure(mut self, topic: B256, message: &str) -> Self {
        self.topic_failures.insert(topic, message.to_string());
        self
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn queries(&self) -> Vec<LogQuery> {
        self.queries.lock().expect("lock").clone()
    }
}

impl LogSearch for FakeExplorer {
    async fn get_logs(
        &self,
        from_block: u64,
        to_block: u64,
        address: Address,
        topic: B256,
    ) -> Result<Vec<LogEntry>, ExplorerError> {
        self.queries.lock().expect("lock").push(LogQuery {
            from_block,
            to_block,
            address,
            topic,
        });

        if let Some(message) = self.failure.as_ref().or(self.topic_failures.get(&topic)) {
            return Err(ExplorerError::Api {
                message: "NOTOK".to_string(),
                result: message.clone(),
            });
        }

        Ok(self.logs.get(&topic).cloned().unwrap_or_default())
    }
}

/// Transaction hash ending in `n`.
pub fn tx_hash(n: u8) -> B256 {
    B256::with_last_byte(n)
}

/// A role log emitted by [`CONTRACT`] in transaction `tx`.
///
/// Topics: `[topic0, keccak256(role), ACCOUNT, SENDER]`.
pub fn role_log(topic0: B256, role: &str, tx: u8) -> LogEntry {
    LogEntry {
        transaction_hash: tx_hash(tx),
        address: CONTRACT,
        topics: vec![
            topic0,
            keccak256(role),
            ACCOUNT.into_word(),
            SENDER.into_word(),
        ],
        data: Bytes::new(),
        block_number: 18_000_000 + u64::from(tx),
        log_index: Some(0),
        timestamp: Some(1_708_617_600), // 2024-02-22T16:00:00Z
    }
}

pub fn granted_log(role: &str, tx: u8) -> LogEntry {
    role_log(ROLE_GRANTED_TOPIC, role, tx)
}

pub fn revoked_log(role: &str, tx: u8) -> LogEntry {
    role_log(ROLE_REVOKED_TOPIC, role, tx)
}

/// An ERC-20 `Transfer` log; never decodes as a role event.
pub fn transfer_log(tx: u8) -> LogEntry {
    LogEntry {
        transaction_hash: tx_hash(tx),
        address: address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
        topics: vec![
            keccak256("Transfer(address,address,uint256)"),
            ACCOUNT.into_word(),
            SENDER.into_word(),
        ],
        data: Bytes::from(vec![0u8; 32]),
        block_number: 18_000_000 + u64::from(tx),
        log_index: Some(1),
        timestamp: None,
    }
}

/// A validated receipt-scan request for [`CONTRACT`].
pub fn receipt_request(from_block: u64, to_block: u64) -> ScanRequest {
    ScanRequest {
        rpc_url: Some("http://localhost:8545".to_string()),
        explorer_api_key: "KEY".to_string(),
        explorer_base_url: "https://api.etherscan.io/api".to_string(),
        contract_address: CONTRACT,
        topics: vec![ROLE_GRANTED_TOPIC],
        from_block,
        to_block,
    }
}

/// A validated direct-topic request for [`CONTRACT`].
pub fn topic_request(from_block: u64, to_block: u64) -> ScanRequest {
    ScanRequest {
        rpc_url: None,
        topics: vec![ROLE_GRANTED_TOPIC, ROLE_REVOKED_TOPIC],
        ..receipt_request(from_block, to_block)
    }
}
