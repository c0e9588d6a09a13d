//! role-scan crate
//!
//! Finds `AccessControl` role grants and revocations for one contract:
//! request validation, the compile-time event binding, direct topic
//! extraction and the scan pipeline that ties the explorer and the node
//! together.

pub mod access_control;
pub mod error;
pub mod pipeline;
pub mod request;
pub mod topics;

pub use access_control::AccessControl;
pub use error::{ConfigError, DecodeError, Field, ScanError, TopicError};
pub use pipeline::{scan_receipts, scan_topics, ScanReport};
pub use request::{ScanFlags, ScanRequest, ROLE_GRANTED_TOPIC, ROLE_REVOKED_TOPIC};
