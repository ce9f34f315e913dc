//! Ledger Types
//!
//! Core types for the reputation ledger.
//! No logic here - just data structures.

use serde::{Deserialize, Serialize};

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Sender classification stored in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// Known malicious sender
    Spam,
    /// Known legitimate sender
    Ham,
}

impl Classification {
    pub fn from_is_spam(is_spam: bool) -> Self {
        if is_spam {
            Classification::Spam
        } else {
            Classification::Ham
        }
    }

    pub fn is_spam(&self) -> bool {
        matches!(self, Classification::Spam)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Spam => "spam",
            Classification::Ham => "ham",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// REPUTATION RECORD
// ============================================================================

/// One live record per sender identifier.
///
/// A second write to the same identifier replaces this record; it never
/// coexists with an older version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationRecord {
    /// Normalized sender email address - the unique ledger key
    pub identifier: String,
    pub classification: Classification,
    /// Ledger-assigned Unix timestamp of the authoritative write
    pub created_at: i64,
    /// Identity that authored the current record
    pub submitter: String,
    /// Free-text justification, may be empty
    pub reason: String,
}

// ============================================================================
// SUBMISSION GATE
// ============================================================================

/// Per-submitter rate gate state.
///
/// The gate is keyed by submitter identity, not by identifier: an accepted
/// write to any identifier closes the gate for the full cooldown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionGate {
    /// Unix timestamp of this submitter's most recent accepted write
    pub last_submission_at: i64,
}

impl SubmissionGate {
    pub fn next_eligible_at(&self, cooldown_seconds: u64) -> i64 {
        self.last_submission_at + cooldown_seconds as i64
    }

    pub fn is_open(&self, cooldown_seconds: u64, now: i64) -> bool {
        now >= self.next_eligible_at(cooldown_seconds)
    }
}

// ============================================================================
// CHANGE FEED EVENTS
// ============================================================================

/// Kind of ledger write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEventKind {
    /// First-ever write for this identifier
    Created,
    /// Overwrite of an existing record
    Updated,
    /// Owner-issued erasure
    Removed,
}

/// Append-only change-feed entry.
///
/// Carries the literal identifier alongside each event, so historical
/// listings need no event/transaction pairing to recover the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Monotonic sequence number assigned by the ledger
    pub seq: u64,
    pub kind: LedgerEventKind,
    pub identifier: String,
    pub classification: Classification,
    pub submitter: String,
    pub timestamp: i64,
}

// ============================================================================
// READ RESULTS
// ============================================================================

/// Full query result; zero-valued with `exists = false` when absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub exists: bool,
    pub is_spam: bool,
    pub created_at: i64,
    pub submitter: String,
    pub reason: String,
}

impl QueryResult {
    pub fn from_record(record: &ReputationRecord) -> Self {
        Self {
            exists: true,
            is_spam: record.classification.is_spam(),
            created_at: record.created_at,
            submitter: record.submitter.clone(),
            reason: record.reason.clone(),
        }
    }
}

/// Ledger-wide counters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LedgerStats {
    /// Live record count - first writes only, decremented on removal
    pub total_count: u64,
    /// Reserved second field of the stats read contract, always 0
    pub reserved: u64,
}

// ============================================================================
// TESTS
// ============================================================================
