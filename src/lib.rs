//! MailShield Core - Reputation Ledger & Risk Fusion
//!
//! Classifies inbound email senders by combining independent evidence
//! sources and persisting confident verdicts in a shared reputation
//! ledger, so future lookups for the same sender skip the expensive
//! analysis.
//!
//! Three layers, leaf first:
//! - [`ledger`]: the authoritative record store with a per-submitter
//!   cooldown gate and an append-only change feed
//! - [`client`]: retrying transport wrapper with confirmation handles
//! - [`fusion`]: the weighted risk engine with the LLM fast-path skip and
//!   asynchronous auto-report write-back
//!
//! The mail-client scraper, the statistical classifiers and the LLM are
//! external collaborators behind traits in [`fusion::collaborators`].

pub mod constants;
pub mod error;
pub mod ledger;
pub mod client;
pub mod fusion;

pub use error::{ClientError, LedgerError};
pub use ledger::{Classification, ReputationLedger};
pub use client::{LedgerClient, LedgerClientConfig};
pub use fusion::{EmailRecord, EngineConfig, FusionEngine, RiskAssessment, RiskLabel};

/// Initialize logging for binaries and examples embedding this crate.
/// Respects `RUST_LOG`, defaults to `info`.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
