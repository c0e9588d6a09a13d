//! Scan request intake: raw flag values in, validated [`ScanRequest`] out.
//!
//! Validation runs before any client is built, so a missing value never
//! costs a network round trip.

use alloy::primitives::{Address, B256};
use alloy::sol_types::SolEvent;

use crate::access_control::events::{RoleGranted, RoleRevoked};
use crate::error::{ConfigError, Field};

/// topic0 of `RoleGranted(bytes32,address,address)`.
pub const ROLE_GRANTED_TOPIC: B256 = RoleGranted::SIGNATURE_HASH;

/// topic0 of `RoleRevoked(bytes32,address,address)`.
pub const ROLE_REVOKED_TOPIC: B256 = RoleRevoked::SIGNATURE_HASH;

/// Flag values as the user supplied them. `None` and blank strings are both "missing".
#[derive(Clone, Debug, Default)]
pub struct ScanFlags {
    pub rpc_url: Option<String>,
    pub etherscan_api_key: Option<String>,
    pub etherscan_base_url: Option<String>,
    pub sc_address: Option<String>,
    pub topic: Option<String>,
    pub from_block: Option<u64>,
    pub to_block: Option<u64>,
}

/// Validated scan parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanRequest {
    /// RPC node URL; only receipt scans need one.
    pub rpc_url: Option<String>,
    pub explorer_api_key: String,
    pub explorer_base_url: String,
    pub contract_address: Address,
    /// topic0 values to search, in the order their sections are reported.
    pub topics: Vec<B256>,
    pub from_block: u64,
    /// `0` means "the chain head at scan time".
    pub to_block: u64,
}

impl ScanFlags {
    /// Validates flags for a receipt scan.
    ///
    /// Requires RPC URL, explorer key and base URL, contract address and a
    /// topic. Block bounds default to `0`; a zero `to_block` is resolved to the
    /// chain head later.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found, checking fields in that order.
    pub fn validate_receipts(&self) -> Result<ScanRequest, ConfigError> {
        let rpc_url = required(&self.rpc_url, Field::RpcUrl)?;
        let explorer_api_key = required(&self.etherscan_api_key, Field::EtherscanApiKey)?;
        let explorer_base_url = required(&self.etherscan_base_url, Field::EtherscanBaseUrl)?;
        let contract_address = parse_address(required(&self.sc_address, Field::ContractAddress)?)?;
        let topic = parse_topic(required(&self.topic, Field::Topic)?)?;

        let from_block = self.from_block.unwrap_or_default();
        let to_block = self.to_block.unwrap_or_default();
        check_range(from_block, to_block)?;

        Ok(ScanRequest {
            rpc_url: Some(rpc_url.to_string()),
            explorer_api_key: explorer_api_key.to_string(),
            explorer_base_url: explorer_base_url.to_string(),
            contract_address,
            topics: vec![topic],
            from_block,
            to_block,
        })
    }

    /// Validates flags for a direct-topic scan.
    ///
    /// Requires explorer key and base URL, contract address and both block
    /// bounds. `to_block` must be a concrete block: there is no node to
    /// resolve `0` against. Topics are always `RoleGranted` then
    /// `RoleRevoked`; any `topic` or `rpc_url` flag is ignored.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found.
    pub fn validate_topics(&self) -> Result<ScanRequest, ConfigError> {
        let explorer_api_key = required(&self.etherscan_api_key, Field::EtherscanApiKey)?;
        let explorer_base_url = required(&self.etherscan_base_url, Field::EtherscanBaseUrl)?;
        let contract_address = parse_address(required(&self.sc_address, Field::ContractAddress)?)?;
        let from_block = self.from_block.ok_or(ConfigError::Missing(Field::FromBlock))?;
        let to_block = self.to_block.ok_or(ConfigError::Missing(Field::ToBlock))?;
        if to_block == 0 {
            return Err(ConfigError::UnresolvedToBlock);
        }
        check_range(from_block, to_block)?;

        Ok(ScanRequest {
            rpc_url: None,
            explorer_api_key: explorer_api_key.to_string(),
            explorer_base_url: explorer_base_url.to_string(),
            contract_address,
            topics: vec![ROLE_GRANTED_TOPIC, ROLE_REVOKED_TOPIC],
            from_block,
            to_block,
        })
    }
}

fn required(value: &Option<String>, field: Field) -> Result<&str, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(field))
}

fn parse_address(value: &str) -> Result<Address, ConfigError> {
    value
        .parse::<Address>()
        .map_err(|_| ConfigError::InvalidAddress(value.to_string()))
}

fn parse_topic(value: &str) -> Result<B256, ConfigError> {
    value
        .parse::<B256>()
        .map_err(|_| ConfigError::InvalidTopic(value.to_string()))
}

fn check_range(from: u64, to: u64) -> Result<(), ConfigError> {
    if to != 0 && from > to {
        return Err(ConfigError::InvalidRange { from, to });
    }
    Ok(())
}
