//! Error types for role scans.
//!
//! Only [`DecodeError`] is recoverable: a log that does not match the
//! expected event is skipped and the scan goes on. Everything else aborts
//! the run.

use std::fmt;

use alloy::primitives::B256;
use role_data::{ExplorerError, RpcError};
use thiserror::Error;

/// Required scan inputs, named the way they are reported to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    RpcUrl,
    EtherscanApiKey,
    EtherscanBaseUrl,
    ContractAddress,
    Topic,
    FromBlock,
    ToBlock,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RpcUrl => "RPC URL",
            Self::EtherscanApiKey => "Etherscan API key",
            Self::EtherscanBaseUrl => "Etherscan base URL",
            Self::ContractAddress => "Smart contract address",
            Self::Topic => "Topic",
            Self::FromBlock => "From block",
            Self::ToBlock => "To block",
        })
    }
}

/// Invalid or missing scan input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required.")]
    Missing(Field),

    #[error("invalid smart contract address {0:?}: expected a 20-byte hex address")]
    InvalidAddress(String),

    #[error("invalid topic {0:?}: expected a 32-byte hex hash")]
    InvalidTopic(String),

    #[error("invalid block range: from block {from} is greater than to block {to}")]
    InvalidRange { from: u64, to: u64 },

    #[error("To block must be a block number; 0 (chain head) needs an RPC URL to resolve.")]
    UnresolvedToBlock,
}

/// A log that could not be decoded as the expected event.
#[derive(Debug, Error)]
#[error("failed to unpack {event} from log {log_index:?} of transaction {transaction_hash}")]
pub struct DecodeError {
    pub event: &'static str,
    pub transaction_hash: B256,
    pub log_index: Option<u64>,
    #[source]
    pub source: alloy::sol_types::Error,
}

/// A log whose topic array is too short for direct extraction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopicError {
    #[error("log in transaction {transaction_hash} has {found} topics, expected {expected}")]
    MissingTopics {
        transaction_hash: B256,
        expected: usize,
        found: usize,
    },
}

/// Everything that can stop or interrupt a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to resolve the chain head")]
    ChainHead(#[source] RpcError),

    #[error("unable to find logs for topic {topic} in blocks {from_block}..={to_block}")]
    Logs {
        topic: B256,
        from_block: u64,
        to_block: u64,
        #[source]
        source: ExplorerError,
    },

    #[error("unable to get transaction receipt {hash}")]
    Receipt {
        hash: B256,
        #[source]
        source: RpcError,
    },

    #[error(transparent)]
    Topics(#[from] TopicError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ScanError {
    /// Whether the scan can continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
