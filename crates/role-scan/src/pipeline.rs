//! Scan pipeline: explorer log search, transaction dedup, receipt decoding.
//!
//! Every stage runs sequentially. The only parallel step is the pure
//! extraction of transaction hashes from discovered logs, which keeps input
//! order.

use std::collections::HashSet;

use alloy::primitives::{Address, B256};
use rayon::prelude::*;
use role_data::{ChainClient, LogEntry, LogSearch, RoleEvent, RoleEventKind};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::access_control::AccessControl;
use crate::error::{ConfigError, Field, ScanError};
use crate::request::{ScanRequest, ROLE_GRANTED_TOPIC, ROLE_REVOKED_TOPIC};
use crate::topics::extract_role_event;

const SECTION_RULE: &str = "==========";
const SEPARATOR: &str = "--------------------------------------------------";

/// Outcome of one scan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Decoded events in the order they were found.
    pub events: Vec<RoleEvent>,
    /// Logs returned by the explorer across all searched topics.
    pub logs_discovered: usize,
    /// Unique transactions whose receipts were fetched.
    pub transactions: usize,
    /// Logs inspected inside fetched receipts.
    pub receipt_logs: usize,
    /// Receipt logs skipped because they did not decode.
    pub skipped: usize,
}

/// Resolves an open-ended `to_block` (`0`) to the current chain head.
///
/// # Errors
/// Returns [`ScanError::ChainHead`] if the node cannot be queried.
pub async fn resolve_to_block<C: ChainClient>(chain: &C, to_block: u64) -> Result<u64, ScanError> {
    if to_block != 0 {
        return Ok(to_block);
    }

    let head = chain
        .latest_block_number()
        .await
        .map_err(ScanError::ChainHead)?;
    info!(to_block = head, "resolved open-ended range to chain head");
    Ok(head)
}

/// Runs one explorer log search.
///
/// # Errors
/// Returns [`ScanError::Logs`] carrying the topic and range on any explorer failure.
pub async fn discover_logs<S: LogSearch>(
    search: &S,
    from_block: u64,
    to_block: u64,
    address: Address,
    topic: B256,
) -> Result<Vec<LogEntry>, ScanError> {
    let logs = search
        .get_logs(from_block, to_block, address, topic)
        .await
        .map_err(|source| ScanError::Logs {
            topic,
            from_block,
            to_block,
            source,
        })?;

    info!(
        from_block,
        to_block,
        topic = %topic,
        logs = logs.len(),
        "explorer returned logs"
    );
    Ok(logs)
}

/// Transaction hashes of `logs`, each once, in order of first occurrence.
pub fn unique_transaction_hashes(logs: &[LogEntry]) -> Vec<B256> {
    let hashes: Vec<B256> = logs.par_iter().map(|log| log.transaction_hash).collect();

    let mut seen = HashSet::with_capacity(hashes.len());
    hashes.into_iter().filter(|hash| seen.insert(*hash)).collect()
}

/// Fetches each receipt and decodes every log in it as `RoleGranted`.
///
/// Logs that do not decode are logged and skipped; a receipt that cannot be
/// fetched aborts the whole run.
///
/// # Errors
/// Returns [`ScanError::Receipt`] naming the first hash whose receipt failed.
pub async fn resolve_receipts<C: ChainClient>(
    chain: &C,
    hashes: &[B256],
    report: &mut ScanReport,
) -> Result<(), ScanError> {
    for &hash in hashes {
        let receipt = chain
            .transaction_receipt(hash)
            .await
            .map_err(|source| ScanError::Receipt { hash, source })?;
        report.transactions += 1;

        for log in &receipt.logs {
            report.receipt_logs += 1;

            let access_control = AccessControl::new(log.address);
            match access_control.parse_role_granted(log) {
                Ok(event) => {
                    info!("Role: {event}");
                    report.events.push(event);
                }
                Err(e) => {
                    warn!(
                        contract = %log.address,
                        cause = %e.source,
                        "{e}"
                    );
                    report.skipped += 1;
                }
            }
        }
    }

    Ok(())
}

/// Receipt scan: explorer search, dedup, receipt fetch and ABI decode.
///
/// # Errors
/// Returns the first unrecoverable [`ScanError`]; decode failures never surface here.
#[tracing::instrument(skip_all, fields(contract = %request.contract_address))]
pub async fn scan_receipts<C, S>(
    chain: &C,
    search: &S,
    request: &ScanRequest,
) -> Result<ScanReport, ScanError>
where
    C: ChainClient,
    S: LogSearch,
{
    let topic = *request
        .topics
        .first()
        .ok_or(ConfigError::Missing(Field::Topic))?;
    let to_block = resolve_to_block(chain, request.to_block).await?;

    let logs = discover_logs(
        search,
        request.from_block,
        to_block,
        request.contract_address,
        topic,
    )
    .await?;

    let hashes = unique_transaction_hashes(&logs);
    debug!(
        logs = logs.len(),
        transactions = hashes.len(),
        "deduplicated transaction hashes"
    );

    let mut report = ScanReport {
        logs_discovered: logs.len(),
        ..Default::default()
    };
    resolve_receipts(chain, &hashes, &mut report).await?;

    info!(
        events = report.events.len(),
        transactions = report.transactions,
        skipped = report.skipped,
        "receipt scan complete"
    );
    Ok(report)
}

/// Direct-topic scan: one explorer search per role topic, decoded by topic offsets.
///
/// Sections are reported in request order (granted first for validated requests).
///
/// # Errors
/// Returns [`ScanError::Config`] for an open-ended range, [`ScanError::Logs`]
/// on explorer failure and [`ScanError::Topics`] for a log with too few topics.
#[tracing::instrument(skip_all, fields(contract = %request.contract_address))]
pub async fn scan_topics<S: LogSearch>(
    search: &S,
    request: &ScanRequest,
) -> Result<ScanReport, ScanError> {
    if request.to_block == 0 {
        return Err(ConfigError::UnresolvedToBlock.into());
    }

    let mut report = ScanReport::default();

    for &topic in &request.topics {
        let kind = role_event_kind(topic)
            .ok_or_else(|| ConfigError::InvalidTopic(topic.to_string()))?;

        info!("{SECTION_RULE} {kind} logs: start {SECTION_RULE}");

        let logs = discover_logs(
            search,
            request.from_block,
            request.to_block,
            request.contract_address,
            topic,
        )
        .await?;
        report.logs_discovered += logs.len();

        for log in &logs {
            debug!(
                transaction = %log.transaction_hash,
                block = log.block_number,
                time = ?log.block_time(),
                "role log"
            );
            let event = extract_role_event(log, kind)?;
            info!("Role: {}", event.role);
            info!("Account: {:#x}", event.account);
            info!("Sender: {:#x}", event.sender);
            info!("{SEPARATOR}");
            report.events.push(event);
        }

        info!("{SECTION_RULE} {kind} logs: end {SECTION_RULE}");
    }

    Ok(report)
}

fn role_event_kind(topic: B256) -> Option<RoleEventKind> {
    if topic == ROLE_GRANTED_TOPIC {
        Some(RoleEventKind::Granted)
    } else if topic == ROLE_REVOKED_TOPIC {
        Some(RoleEventKind::Revoked)
    } else {
        None
    }
}
