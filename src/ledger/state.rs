//! Reputation Ledger State Machine
//!
//! Authoritative key-value store of sender reputation records plus the
//! per-submitter rate gate and an append-only change feed. Writes are
//! serialized by the interior lock; reads never block writers for long.
//!
//! Retry policy does NOT live here - a cooldown rejection is final from the
//! ledger's point of view and leaves no partial state behind.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;

use crate::constants;
use crate::error::{LedgerError, LedgerResult};
use super::types::{
    Classification, LedgerEvent, LedgerEventKind, LedgerStats, QueryResult, ReputationRecord,
    SubmissionGate,
};

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Canonical form of a ledger key: trimmed, lowercased.
///
/// Identifiers are case- and whitespace-insensitive; every public operation
/// normalizes before touching state.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ============================================================================
// LEDGER
// ============================================================================

pub struct ReputationLedger {
    /// Identity allowed to call `set_cooldown` / `remove`
    owner: String,
    inner: RwLock<LedgerInner>,
}

#[derive(Default)]
struct LedgerInner {
    records: HashMap<String, ReputationRecord>,
    gates: HashMap<String, SubmissionGate>,
    feed: Vec<LedgerEvent>,
    next_seq: u64,
    cooldown_seconds: u64,
}

impl ReputationLedger {
    /// Create a ledger owned by `owner`, cooldown from the environment.
    pub fn new(owner: impl Into<String>) -> Self {
        Self::with_cooldown(owner, constants::get_cooldown_secs())
    }

    pub fn with_cooldown(owner: impl Into<String>, cooldown_seconds: u64) -> Self {
        Self {
            owner: owner.into(),
            inner: RwLock::new(LedgerInner {
                cooldown_seconds,
                ..Default::default()
            }),
        }
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Create or replace the record for `identifier`.
    ///
    /// Rejects an empty identifier and a closed submitter gate; on
    /// acceptance the gate closes for the full cooldown regardless of
    /// which identifier was written.
    pub fn classify(
        &self,
        submitter: &str,
        identifier: &str,
        is_spam: bool,
        reason: &str,
    ) -> LedgerResult<LedgerEvent> {
        self.classify_at(submitter, identifier, is_spam, reason, Utc::now().timestamp())
    }

    /// `classify` with an explicit clock, used by tests.
    pub fn classify_at(
        &self,
        submitter: &str,
        identifier: &str,
        is_spam: bool,
        reason: &str,
        now: i64,
    ) -> LedgerResult<LedgerEvent> {
        let identifier = normalize_identifier(identifier);
        if identifier.is_empty() {
            return Err(LedgerError::EmptyIdentifier);
        }

        let mut inner = self.inner.write();

        if let Some(gate) = inner.gates.get(submitter) {
            if !gate.is_open(inner.cooldown_seconds, now) {
                return Err(LedgerError::CooldownActive {
                    next_eligible_at: gate.next_eligible_at(inner.cooldown_seconds),
                });
            }
        }

        let classification = Classification::from_is_spam(is_spam);
        let kind = if inner.records.contains_key(&identifier) {
            LedgerEventKind::Updated
        } else {
            LedgerEventKind::Created
        };

        inner.records.insert(
            identifier.clone(),
            ReputationRecord {
                identifier: identifier.clone(),
                classification,
                created_at: now,
                submitter: submitter.to_string(),
                reason: reason.to_string(),
            },
        );
        inner
            .gates
            .insert(submitter.to_string(), SubmissionGate { last_submission_at: now });

        let event = LedgerEvent {
            seq: inner.next_seq,
            kind,
            identifier,
            classification,
            submitter: submitter.to_string(),
            timestamp: now,
        };
        inner.next_seq += 1;
        inner.feed.push(event.clone());

        log::debug!(
            "Ledger write: {} = {} by {} ({:?})",
            event.identifier,
            event.classification,
            event.submitter,
            event.kind
        );
        Ok(event)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Full read; zero-valued with `exists = false` when no record.
    pub fn query(&self, identifier: &str) -> QueryResult {
        let identifier = normalize_identifier(identifier);
        let inner = self.inner.read();
        inner
            .records
            .get(&identifier)
            .map(QueryResult::from_record)
            .unwrap_or_default()
    }

    /// Lightweight read without metadata.
    pub fn peek(&self, identifier: &str) -> (bool, Option<Classification>) {
        let identifier = normalize_identifier(identifier);
        let inner = self.inner.read();
        match inner.records.get(&identifier) {
            Some(record) => (true, Some(record.classification)),
            None => (false, None),
        }
    }

    pub fn stats(&self) -> LedgerStats {
        let inner = self.inner.read();
        LedgerStats {
            total_count: inner.records.len() as u64,
            reserved: 0,
        }
    }

    /// Whether `identity` may write now, and when it next may.
    pub fn can_submit(&self, identity: &str) -> (bool, i64) {
        self.can_submit_at(identity, Utc::now().timestamp())
    }

    pub fn can_submit_at(&self, identity: &str, now: i64) -> (bool, i64) {
        let inner = self.inner.read();
        match inner.gates.get(identity) {
            Some(gate) => {
                let next = gate.next_eligible_at(inner.cooldown_seconds);
                (gate.is_open(inner.cooldown_seconds, now), next.max(now))
            }
            // Never-seen submitter: immediately eligible
            None => (true, now),
        }
    }

    pub fn cooldown_seconds(&self) -> u64 {
        self.inner.read().cooldown_seconds
    }

    pub fn gate(&self, identity: &str) -> Option<SubmissionGate> {
        self.inner.read().gates.get(identity).cloned()
    }

    /// Change-feed snapshot, newest first, bounded by `limit`.
    pub fn events(&self, limit: usize) -> Vec<LedgerEvent> {
        let inner = self.inner.read();
        inner.feed.iter().rev().take(limit).cloned().collect()
    }

    // ------------------------------------------------------------------
    // Owner operations
    // ------------------------------------------------------------------

    pub fn set_cooldown(&self, caller: &str, seconds: u64) -> LedgerResult<()> {
        if caller != self.owner {
            return Err(LedgerError::NotOwner);
        }
        let mut inner = self.inner.write();
        log::info!("Ledger cooldown changed: {}s -> {}s", inner.cooldown_seconds, seconds);
        inner.cooldown_seconds = seconds;
        Ok(())
    }

    /// Fully erase a record. Fails if it does not exist.
    ///
    /// The remover's own submission gate is left untouched; the gate and
    /// the record store are independent.
    pub fn remove(&self, caller: &str, identifier: &str) -> LedgerResult<()> {
        self.remove_at(caller, identifier, Utc::now().timestamp())
    }

    pub fn remove_at(&self, caller: &str, identifier: &str, now: i64) -> LedgerResult<()> {
        if caller != self.owner {
            return Err(LedgerError::NotOwner);
        }
        let identifier = normalize_identifier(identifier);
        let mut inner = self.inner.write();
        let record = inner
            .records
            .remove(&identifier)
            .ok_or_else(|| LedgerError::NotFound(identifier.clone()))?;

        let event = LedgerEvent {
            seq: inner.next_seq,
            kind: LedgerEventKind::Removed,
            identifier,
            classification: record.classification,
            submitter: caller.to_string(),
            timestamp: now,
        };
        inner.next_seq += 1;
        inner.feed.push(event);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Snapshot (persistence support)
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> LedgerSnapshot {
        let inner = self.inner.read();
        LedgerSnapshot {
            records: inner.records.values().cloned().collect(),
            gates: inner.gates.clone(),
            feed: inner.feed.clone(),
            cooldown_seconds: inner.cooldown_seconds,
        }
    }

    /// Replace state from a snapshot. Derived keys are rebuilt from the
    /// record list, so a hand-edited snapshot stays consistent.
    pub fn restore(&self, snapshot: LedgerSnapshot) {
        let mut inner = self.inner.write();
        inner.records = snapshot
            .records
            .into_iter()
            .map(|r| (normalize_identifier(&r.identifier), r))
            .collect();
        inner.gates = snapshot.gates;
        inner.next_seq = snapshot.feed.last().map(|e| e.seq + 1).unwrap_or(0);
        inner.feed = snapshot.feed;
        inner.cooldown_seconds = snapshot.cooldown_seconds;
    }
}

/// Serializable full-state snapshot
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LedgerSnapshot {
    pub records: Vec<ReputationRecord>,
    pub gates: HashMap<String, SubmissionGate>,
    pub feed: Vec<LedgerEvent>,
    pub cooldown_seconds: u64,
}

// ============================================================================
// TESTS
// ============================================================================
