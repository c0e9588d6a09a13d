//! role-data crate
//!
//! Access to the two external services a role scan depends on: the
//! Etherscan-style log-search API and the Ethereum JSON-RPC node.

pub mod explorer;
pub mod rpc;
pub mod types;

pub use explorer::{ExplorerClient, ExplorerError, LogSearch};
pub use rpc::{ChainClient, RpcClient, RpcError};
pub use types::{LogEntry, RoleEvent, RoleEventKind, TransactionReceipt};
