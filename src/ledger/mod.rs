//! Reputation Ledger Module
//!
//! The authoritative store of sender classifications.
//!
//! ## Structure
//! - `types`: records, gates, change-feed events, read results
//! - `state`: the write/read state machine and owner operations
//! - `store`: JSON snapshot persistence
//!
//! Per-identifier lifecycle: Unknown -> Classified -> Reclassified
//! (self-loop) -> Removed, where a later write re-enters Classified.

pub mod types;
pub mod state;
pub mod store;

pub use types::{
    Classification,
    LedgerEvent,
    LedgerEventKind,
    LedgerStats,
    QueryResult,
    ReputationRecord,
    SubmissionGate,
};

pub use state::{normalize_identifier, LedgerSnapshot, ReputationLedger};
pub use store::LedgerStore;
