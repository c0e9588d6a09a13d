//! OpenZeppelin `AccessControl` event binding.
//!
//! Event layouts are compiled in with `alloy::sol!`; topic0 for each event is
//! a compile-time constant (`SolEvent::SIGNATURE_HASH`).

use alloy::primitives::{Address, LogData};
use alloy::sol_types::SolEvent;
use role_data::{LogEntry, RoleEvent, RoleEventKind};

use crate::error::DecodeError;

/// Compile-time ABI definitions for the `IAccessControl` events.
pub mod events {
    use alloy::sol;

    sol! {
        /// Emitted when `newAdminRole` replaces `previousAdminRole` as the admin of `role`.
        #[derive(Debug, PartialEq, Eq)]
        event RoleAdminChanged(
            bytes32 indexed role,
            bytes32 indexed previousAdminRole,
            bytes32 indexed newAdminRole
        );

        /// Emitted when `account` is granted `role` by `sender`.
        #[derive(Debug, PartialEq, Eq)]
        event RoleGranted(bytes32 indexed role, address indexed account, address indexed sender);

        /// Emitted when `account` loses `role`, revoked by `sender`.
        #[derive(Debug, PartialEq, Eq)]
        event RoleRevoked(bytes32 indexed role, address indexed account, address indexed sender);
    }
}

use events::{RoleGranted, RoleRevoked};

/// Event decoder bound to one emitting contract.
#[derive(Clone, Copy, Debug)]
pub struct AccessControl {
    address: Address,
}

impl AccessControl {
    /// Binds a decoder to the contract at `address`.
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Contract this decoder is bound to.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Decodes `log` as `RoleGranted`.
    ///
    /// # Errors
    /// Returns [`DecodeError`] if topic0 is not the `RoleGranted` signature or
    /// the topics do not fit the event layout.
    pub fn parse_role_granted(&self, log: &LogEntry) -> Result<RoleEvent, DecodeError> {
        let RoleGranted {
            role,
            account,
            sender,
        } = decode::<RoleGranted>(log)?;

        Ok(self.role_event(RoleEventKind::Granted, log, role, account, sender))
    }

    /// Decodes `log` as `RoleRevoked`.
    ///
    /// # Errors
    /// Returns [`DecodeError`] if topic0 is not the `RoleRevoked` signature or
    /// the topics do not fit the event layout.
    pub fn parse_role_revoked(&self, log: &LogEntry) -> Result<RoleEvent, DecodeError> {
        let RoleRevoked {
            role,
            account,
            sender,
        } = decode::<RoleRevoked>(log)?;

        Ok(self.role_event(RoleEventKind::Revoked, log, role, account, sender))
    }

    fn role_event(
        &self,
        kind: RoleEventKind,
        log: &LogEntry,
        role: alloy::primitives::B256,
        account: Address,
        sender: Address,
    ) -> RoleEvent {
        RoleEvent {
            kind,
            role,
            account,
            sender,
            contract: self.address,
            transaction_hash: log.transaction_hash,
            block_number: log.block_number,
        }
    }
}

fn decode<E: SolEvent>(log: &LogEntry) -> Result<E, DecodeError> {
    let data = LogData::new_unchecked(log.topics.clone(), log.data.clone());
    E::decode_log_data(&data, true).map_err(|source| DecodeError {
        event: E::SIGNATURE,
        transaction_hash: log.transaction_hash,
        log_index: log.log_index,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, keccak256, Bytes, B256};

    fn word(addr: Address) -> B256 {
        addr.into_word()
    }

    fn granted_log(emitter: Address) -> LogEntry {
        LogEntry {
            transaction_hash: B256::with_last_byte(7),
            address: emitter,
            topics: vec![
                RoleGranted::SIGNATURE_HASH,
                keccak256("MINTER_ROLE"),
                word(address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266")),
                word(address!("70997970c51812e339d9b73b0245ad59e15ebbf9")),
            ],
            data: Bytes::new(),
            block_number: 100,
            log_index: Some(3),
            timestamp: None,
        }
    }

    #[test]
    fn decodes_role_granted() {
        let emitter = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
        let event = AccessControl::new(emitter)
            .parse_role_granted(&granted_log(emitter))
            .expect("should decode RoleGranted");

        assert_eq!(event.kind, RoleEventKind::Granted);
        assert_eq!(event.role, keccak256("MINTER_ROLE"));
        assert_eq!(event.account, address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
        assert_eq!(event.sender, address!("70997970c51812e339d9b73b0245ad59e15ebbf9"));
        assert_eq!(event.contract, emitter);
        assert_eq!(event.block_number, 100);
    }

    #[test]
    fn rejects_other_event_signature() {
        let emitter = Address::ZERO;
        let mut log = granted_log(emitter);
        log.topics[0] = RoleRevoked::SIGNATURE_HASH;

        let err = AccessControl::new(emitter)
            .parse_role_granted(&log)
            .expect_err("RoleRevoked log must not decode as RoleGranted");
        assert_eq!(err.event, "RoleGranted(bytes32,address,address)");
        assert_eq!(err.log_index, Some(3));

        let revoked = AccessControl::new(emitter)
            .parse_role_revoked(&log)
            .expect("should decode RoleRevoked");
        assert_eq!(revoked.kind, RoleEventKind::Revoked);
    }

    #[test]
    fn rejects_short_topic_array() {
        let mut log = granted_log(Address::ZERO);
        log.topics.truncate(2);

        assert!(AccessControl::new(Address::ZERO)
            .parse_role_granted(&log)
            .is_err());
    }

    #[test]
    fn signature_hashes_match_known_topics() {
        assert_eq!(
            RoleGranted::SIGNATURE_HASH,
            keccak256("RoleGranted(bytes32,address,address)")
        );
        assert_eq!(
            RoleRevoked::SIGNATURE_HASH,
            keccak256("RoleRevoked(bytes32,address,address)")
        );
    }
}
