//! Ledger Transport
//!
//! Request/response seam between the client and the ledger. The provided
//! implementation runs in-process over a shared `ReputationLedger`; the
//! trait exists so tests (and any future remote runtime) can substitute
//! their own.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ClientError, ClientResult};
use crate::ledger::{LedgerEvent, QueryResult, ReputationLedger, SubmissionGate};

#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Submit a classification write. One shot - retries belong to the client.
    async fn classify(
        &self,
        submitter: &str,
        identifier: &str,
        is_spam: bool,
        reason: &str,
    ) -> ClientResult<LedgerEvent>;

    async fn query(&self, identifier: &str) -> ClientResult<QueryResult>;

    /// Change-feed snapshot, newest first.
    async fn events(&self, limit: usize) -> ClientResult<Vec<LedgerEvent>>;

    async fn can_submit(&self, identity: &str) -> ClientResult<(bool, i64)>;

    async fn cooldown_seconds(&self) -> ClientResult<u64>;

    async fn gate(&self, identity: &str) -> ClientResult<Option<SubmissionGate>>;
}

/// Transport over a ledger living in the same process.
pub struct InProcessTransport {
    ledger: Arc<ReputationLedger>,
}

impl InProcessTransport {
    pub fn new(ledger: Arc<ReputationLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl LedgerTransport for InProcessTransport {
    async fn classify(
        &self,
        submitter: &str,
        identifier: &str,
        is_spam: bool,
        reason: &str,
    ) -> ClientResult<LedgerEvent> {
        self.ledger
            .classify(submitter, identifier, is_spam, reason)
            .map_err(ClientError::from)
    }

    async fn query(&self, identifier: &str) -> ClientResult<QueryResult> {
        Ok(self.ledger.query(identifier))
    }

    async fn events(&self, limit: usize) -> ClientResult<Vec<LedgerEvent>> {
        Ok(self.ledger.events(limit))
    }

    async fn can_submit(&self, identity: &str) -> ClientResult<(bool, i64)> {
        Ok(self.ledger.can_submit(identity))
    }

    async fn cooldown_seconds(&self) -> ClientResult<u64> {
        Ok(self.ledger.cooldown_seconds())
    }

    async fn gate(&self, identity: &str) -> ClientResult<Option<SubmissionGate>> {
        Ok(self.ledger.gate(identity))
    }
}
