//! Type definitions shared by the explorer client, the RPC client and the scanner.

use std::fmt;

use alloy::primitives::{Address, Bytes, B256};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Event log as returned by the explorer log search or found inside a receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Transaction that emitted this log.
    pub transaction_hash: B256,
    /// Contract that emitted this log.
    pub address: Address,
    /// Indexed topics, topic0 first.
    pub topics: Vec<B256>,
    /// Non-indexed payload.
    pub data: Bytes,
    /// Block containing the transaction.
    pub block_number: u64,
    /// Log index within the block, when the source reports it.
    pub log_index: Option<u64>,
    /// Block timestamp in unix seconds, when the source reports it.
    pub timestamp: Option<u64>,
}

impl LogEntry {
    /// Event signature topic, if any.
    pub fn topic0(&self) -> Option<&B256> {
        self.topics.first()
    }

    /// Block timestamp as a UTC datetime.
    pub fn block_time(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .and_then(|ts| DateTime::from_timestamp(i64::try_from(ts).ok()?, 0))
    }
}

/// Receipt of a mined transaction, reduced to the logs it emitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Hash of the transaction.
    pub transaction_hash: B256,
    /// Every log emitted by the transaction, in emission order.
    pub logs: Vec<LogEntry>,
}

/// Which access-control event a [`RoleEvent`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleEventKind {
    /// `RoleGranted(bytes32,address,address)`
    Granted,
    /// `RoleRevoked(bytes32,address,address)`
    Revoked,
}

impl RoleEventKind {
    /// Solidity event name.
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Granted => "RoleGranted",
            Self::Revoked => "RoleRevoked",
        }
    }
}

impl fmt::Display for RoleEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// A decoded role grant or revocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoleEvent {
    /// Grant or revocation.
    pub kind: RoleEventKind,
    /// Role identifier (keccak256 of the role name, or zero for the admin role).
    pub role: B256,
    /// Account that received or lost the role.
    pub account: Address,
    /// Account that made the change.
    pub sender: Address,
    /// Contract that emitted the event.
    pub contract: Address,
    /// Transaction that emitted the event.
    pub transaction_hash: B256,
    /// Block containing the transaction.
    pub block_number: u64,
}

impl fmt::Display for RoleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {{ role: {}, account: {:#x}, sender: {:#x} }}",
            self.kind, self.role, self.account, self.sender
        )
    }
}
