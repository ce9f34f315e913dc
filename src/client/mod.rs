//! Ledger Client Module
//!
//! This module handles:
//! - Classification submission with bounded linear-backoff retries
//! - Lookup normalization (unknown senders come back as a neutral sentinel)
//! - Historical listing by change-feed replay
//! - Submission-gate introspection

pub mod transport;
pub mod client;

pub use transport::{InProcessTransport, LedgerTransport};
pub use client::{CooldownInfo, LedgerClient, LedgerClientConfig, ReputationView, SubmitReceipt};
