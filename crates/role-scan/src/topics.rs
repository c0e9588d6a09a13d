//! Direct topic extraction for role events.
//!
//! All three `RoleGranted`/`RoleRevoked` parameters are indexed, so the
//! event can be read straight from the topics without an ABI lookup:
//! role = topic1, account = topic2[12..32], sender = topic3[12..32].

use alloy::primitives::{Address, B256};
use role_data::{LogEntry, RoleEvent, RoleEventKind};

use crate::error::TopicError;

/// topic0 plus three indexed parameters.
const ROLE_EVENT_TOPICS: usize = 4;

/// Extracts a role event from `log` by fixed topic offsets.
///
/// # Errors
/// Returns [`TopicError::MissingTopics`] if the log has fewer than four topics.
pub fn extract_role_event(log: &LogEntry, kind: RoleEventKind) -> Result<RoleEvent, TopicError> {
    let [_, role, account, sender, ..] = log.topics.as_slice() else {
        return Err(TopicError::MissingTopics {
            transaction_hash: log.transaction_hash,
            expected: ROLE_EVENT_TOPICS,
            found: log.topics.len(),
        });
    };

    Ok(RoleEvent {
        kind,
        role: *role,
        account: address_from_topic(account),
        sender: address_from_topic(sender),
        contract: log.address,
        transaction_hash: log.transaction_hash,
        block_number: log.block_number,
    })
}

/// Addresses are right-aligned in 32-byte topics: bytes 12..32 hold the address.
pub fn address_from_topic(topic: &B256) -> Address {
    Address::from_slice(&topic[12..])
}
