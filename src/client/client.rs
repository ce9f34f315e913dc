//! Ledger Client
//!
//! Resilient wrapper around the ledger transport: bounded linear-backoff
//! retries on cooldown rejections, fixed call timeouts, lookup
//! normalization, and historical listing by change-feed replay.
//!
//! No business policy lives here - that belongs to the fusion engine.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants;
use crate::error::{ClientError, ClientResult};
use crate::ledger::{
    normalize_identifier, Classification, LedgerEventKind, ReputationLedger, ReputationRecord,
};
use super::transport::{InProcessTransport, LedgerTransport};

// ============================================================================
// CONFIG
// ============================================================================

/// Client configuration
#[derive(Debug, Clone)]
pub struct LedgerClientConfig {
    /// Identity used for ledger writes; empty = writes fail NotConfigured
    pub submitter: String,
    /// Retry budget for a classification submission
    pub max_attempts: u32,
    /// Linear backoff base: wait `attempt * base_delay` after a cooldown hit
    pub base_delay: Duration,
    /// Deadline for read calls
    pub read_timeout: Duration,
    /// Deadline for write calls - writes wait for confirmation
    pub write_timeout: Duration,
}

impl Default for LedgerClientConfig {
    fn default() -> Self {
        Self {
            submitter: constants::get_submitter_identity(),
            max_attempts: constants::DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(constants::DEFAULT_BASE_DELAY_SECS),
            read_timeout: Duration::from_secs(constants::READ_TIMEOUT_SECS),
            write_timeout: Duration::from_secs(constants::WRITE_TIMEOUT_SECS),
        }
    }
}

// ============================================================================
// VIEW TYPES
// ============================================================================

/// Confirmation handle for an accepted write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub confirmation: Uuid,
    pub identifier: String,
    pub classification: Classification,
    /// Attempt on which the write was accepted (1-based)
    pub attempts: u32,
}

/// Lookup result with absence normalized into an explicit unknown sentinel.
///
/// Score scale is 0..100: 90 for known ham, 10 for known spam, 50 when the
/// sender is unknown. Vote counts are 0/1 - the ledger keeps no tally, the
/// latest write wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationView {
    pub identifier: String,
    pub exists: bool,
    pub classification: Option<Classification>,
    pub reputation_score: u8,
    pub spam_votes: u32,
    pub ham_votes: u32,
    pub total_reports: u32,
    pub created_at: i64,
    pub submitter: String,
    pub reason: String,
}

impl ReputationView {
    /// Neutral sentinel for a never-seen sender
    pub fn unknown(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            exists: false,
            classification: None,
            reputation_score: 50,
            spam_votes: 0,
            ham_votes: 0,
            total_reports: 0,
            created_at: 0,
            submitter: String::new(),
            reason: String::new(),
        }
    }
}

/// Submitter-gate introspection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownInfo {
    pub cooldown_seconds: u64,
    /// 0 when the identity has never submitted
    pub last_submission_at: i64,
    pub eligible_now: bool,
    pub next_eligible_at: i64,
}

// ============================================================================
// CLIENT
// ============================================================================

/// Client for the reputation ledger.
///
/// Cheap to clone; the transport handle is shared and holds no record
/// cache - every lookup is a fresh read.
#[derive(Clone)]
pub struct LedgerClient {
    transport: Arc<dyn LedgerTransport>,
    config: LedgerClientConfig,
}

impl LedgerClient {
    pub fn new(transport: Arc<dyn LedgerTransport>, config: LedgerClientConfig) -> Self {
        Self { transport, config }
    }

    /// Client over a ledger in the same process.
    pub fn in_process(ledger: Arc<ReputationLedger>, config: LedgerClientConfig) -> Self {
        Self::new(Arc::new(InProcessTransport::new(ledger)), config)
    }

    pub fn submitter(&self) -> &str {
        &self.config.submitter
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Submit a classification with the configured retry budget.
    pub async fn submit_classification(
        &self,
        identifier: &str,
        is_spam: bool,
        reason: &str,
    ) -> ClientResult<SubmitReceipt> {
        self.submit_classification_with_attempts(identifier, is_spam, reason, self.config.max_attempts)
            .await
    }

    /// Submit a classification, retrying cooldown rejections up to
    /// `max_attempts` with linear backoff (2s, 4s, ...). Any other failure
    /// surfaces immediately. This is the only client operation that blocks
    /// the calling task for more than one call timeout.
    pub async fn submit_classification_with_attempts(
        &self,
        identifier: &str,
        is_spam: bool,
        reason: &str,
        max_attempts: u32,
    ) -> ClientResult<SubmitReceipt> {
        if self.config.submitter.is_empty() {
            return Err(ClientError::NotConfigured(
                "no submitter identity - set LEDGER_SUBMITTER_IDENTITY".to_string(),
            ));
        }

        let identifier = normalize_identifier(identifier);
        if identifier.is_empty() {
            // Rejected locally, never sent to the ledger
            return Err(ClientError::Validation("identifier must not be empty".to_string()));
        }

        let max_attempts = max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let call = self
                .transport
                .classify(&self.config.submitter, &identifier, is_spam, reason);

            match tokio::time::timeout(self.config.write_timeout, call).await {
                Ok(Ok(event)) => {
                    log::info!(
                        "Ledger write confirmed: {} = {} (attempt {}/{})",
                        event.identifier,
                        event.classification,
                        attempt,
                        max_attempts
                    );
                    return Ok(SubmitReceipt {
                        confirmation: Uuid::new_v4(),
                        identifier: event.identifier,
                        classification: event.classification,
                        attempts: attempt,
                    });
                }
                Ok(Err(err)) if err.is_retryable() && attempt < max_attempts => {
                    let wait = self.config.base_delay * attempt;
                    log::warn!(
                        "Cooldown active for '{}', retrying in {}s (attempt {}/{})",
                        identifier,
                        wait.as_secs(),
                        attempt,
                        max_attempts
                    );
                    last_error = Some(err);
                    tokio::time::sleep(wait).await;
                }
                Ok(Err(err)) if err.is_retryable() => {
                    // Budget used up on a cooldown rejection
                    return Err(ClientError::Exhausted {
                        attempts: max_attempts,
                        last_error: err.to_string(),
                    });
                }
                Ok(Err(err)) => {
                    log::error!("Ledger rejected write for '{}': {}", identifier, err);
                    return Err(err);
                }
                Err(_) => {
                    return Err(ClientError::NetworkTimeout(self.config.write_timeout.as_secs()));
                }
            }
        }

        // Unreachable in practice; the loop returns on every arm
        Err(ClientError::Exhausted {
            attempts: max_attempts,
            last_error: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Every read call carries the fixed read deadline; submission is the
    /// only operation allowed to block longer.
    async fn with_read_timeout<T>(
        &self,
        call: impl Future<Output = ClientResult<T>>,
    ) -> ClientResult<T> {
        tokio::time::timeout(self.config.read_timeout, call)
            .await
            .map_err(|_| ClientError::NetworkTimeout(self.config.read_timeout.as_secs()))?
    }

    /// Look up a sender. Absence is not an error - it comes back as the
    /// neutral unknown sentinel.
    pub async fn lookup(&self, identifier: &str) -> ClientResult<ReputationView> {
        let identifier = normalize_identifier(identifier);

        let result = self.with_read_timeout(self.transport.query(&identifier)).await?;

        if !result.exists {
            return Ok(ReputationView::unknown(&identifier));
        }

        let classification = Classification::from_is_spam(result.is_spam);
        Ok(ReputationView {
            identifier,
            exists: true,
            classification: Some(classification),
            reputation_score: if result.is_spam { 10 } else { 90 },
            spam_votes: if result.is_spam { 1 } else { 0 },
            ham_votes: if result.is_spam { 0 } else { 1 },
            total_reports: 1,
            created_at: result.created_at,
            submitter: result.submitter,
            reason: result.reason,
        })
    }

    /// Historical listing: newest first, one entry per identifier (the
    /// latest record), removed identifiers excluded, at most `limit` rows.
    /// Built by replaying the change feed - the feed carries literal
    /// identifiers, so no decode step is needed.
    pub async fn list_all(&self, limit: usize) -> ClientResult<Vec<ReputationRecord>> {
        let events = self.with_read_timeout(self.transport.events(usize::MAX)).await?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::new();

        // Events arrive newest first; the first event per identifier is
        // authoritative for whether a record is currently live.
        for event in events {
            if records.len() >= limit {
                break;
            }
            if !seen.insert(event.identifier.clone()) {
                continue;
            }
            if event.kind == LedgerEventKind::Removed {
                continue;
            }

            let result = self.with_read_timeout(self.transport.query(&event.identifier)).await?;
            if !result.exists {
                // Removed between snapshot and resolution
                continue;
            }
            records.push(ReputationRecord {
                identifier: event.identifier,
                classification: Classification::from_is_spam(result.is_spam),
                created_at: result.created_at,
                submitter: result.submitter,
                reason: result.reason,
            });
        }

        Ok(records)
    }

    /// Inspect an identity's submission gate.
    pub async fn cooldown_info(&self, identity: &str) -> ClientResult<CooldownInfo> {
        let cooldown_seconds = self.with_read_timeout(self.transport.cooldown_seconds()).await?;
        let gate = self.with_read_timeout(self.transport.gate(identity)).await?;
        let (eligible_now, next_eligible_at) =
            self.with_read_timeout(self.transport.can_submit(identity)).await?;

        Ok(CooldownInfo {
            cooldown_seconds,
            last_submission_at: gate.map(|g| g.last_submission_at).unwrap_or(0),
            eligible_now,
            next_eligible_at,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::ledger::{LedgerEvent, QueryResult, SubmissionGate};

    fn test_config() -> LedgerClientConfig {
        LedgerClientConfig {
            submitter: "agent-1".to_string(),
            ..Default::default()
        }
    }

    /// Transport scripted to reject with cooldown N times, then accept.
    struct FlakyTransport {
        cooldown_rejections: u32,
        calls: Mutex<u32>,
    }

    impl FlakyTransport {
        fn new(cooldown_rejections: u32) -> Self {
            Self { cooldown_rejections, calls: Mutex::new(0) }
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock()
        }
    }

    #[async_trait]
    impl LedgerTransport for FlakyTransport {
        async fn classify(
            &self,
            submitter: &str,
            identifier: &str,
            is_spam: bool,
            _reason: &str,
        ) -> ClientResult<LedgerEvent> {
            let mut calls = self.calls.lock();
            *calls += 1;
            if *calls <= self.cooldown_rejections {
                return Err(ClientError::CooldownActive { next_eligible_at: 0 });
            }
            Ok(LedgerEvent {
                seq: 0,
                kind: LedgerEventKind::Created,
                identifier: identifier.to_string(),
                classification: Classification::from_is_spam(is_spam),
                submitter: submitter.to_string(),
                timestamp: 0,
            })
        }

        async fn query(&self, _identifier: &str) -> ClientResult<QueryResult> {
            Ok(QueryResult::default())
        }

        async fn events(&self, _limit: usize) -> ClientResult<Vec<LedgerEvent>> {
            Ok(vec![])
        }

        async fn can_submit(&self, _identity: &str) -> ClientResult<(bool, i64)> {
            Ok((true, 0))
        }

        async fn cooldown_seconds(&self) -> ClientResult<u64> {
            Ok(0)
        }

        async fn gate(&self, _identity: &str) -> ClientResult<Option<SubmissionGate>> {
            Ok(None)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_on_third_attempt_with_two_waits() {
        let transport = Arc::new(FlakyTransport::new(2));
        let client = LedgerClient::new(transport.clone(), test_config());

        let started = tokio::time::Instant::now();
        let receipt = client
            .submit_classification("evil@scam.net", true, "confident verdict")
            .await
            .unwrap();

        assert_eq!(receipt.attempts, 3);
        assert_eq!(transport.call_count(), 3);
        // Exactly two waits of increasing duration: 2s then 4s
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_exhausted() {
        let transport = Arc::new(FlakyTransport::new(u32::MAX));
        let client = LedgerClient::new(transport.clone(), test_config());

        let err = client.submit_classification("evil@scam.net", true, "").await.unwrap_err();

        assert!(matches!(err, ClientError::Exhausted { attempts: 3, .. }));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_non_cooldown_rejection_not_retried() {
        struct RejectingTransport(Mutex<u32>);

        #[async_trait]
        impl LedgerTransport for RejectingTransport {
            async fn classify(&self, _: &str, _: &str, _: bool, _: &str) -> ClientResult<LedgerEvent> {
                *self.0.lock() += 1;
                Err(ClientError::RejectedByLedger("bad write".to_string()))
            }
            async fn query(&self, _: &str) -> ClientResult<QueryResult> {
                Ok(QueryResult::default())
            }
            async fn events(&self, _: usize) -> ClientResult<Vec<LedgerEvent>> {
                Ok(vec![])
            }
            async fn can_submit(&self, _: &str) -> ClientResult<(bool, i64)> {
                Ok((true, 0))
            }
            async fn cooldown_seconds(&self) -> ClientResult<u64> {
                Ok(0)
            }
            async fn gate(&self, _: &str) -> ClientResult<Option<SubmissionGate>> {
                Ok(None)
            }
        }

        let transport = Arc::new(RejectingTransport(Mutex::new(0)));
        let client = LedgerClient::new(transport.clone(), test_config());

        let err = client.submit_classification("evil@scam.net", true, "").await.unwrap_err();
        assert!(matches!(err, ClientError::RejectedByLedger(_)));
        assert_eq!(*transport.0.lock(), 1);
    }

    #[tokio::test]
    async fn test_empty_identifier_rejected_locally() {
        let transport = Arc::new(FlakyTransport::new(0));
        let client = LedgerClient::new(transport.clone(), test_config());

        let err = client.submit_classification("   ", true, "").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_submitter_is_not_configured() {
        let transport = Arc::new(FlakyTransport::new(0));
        let config = LedgerClientConfig { submitter: String::new(), ..Default::default() };
        let client = LedgerClient::new(transport.clone(), config);

        let err = client.submit_classification("a@b.com", true, "").await.unwrap_err();
        assert!(matches!(err, ClientError::NotConfigured(_)));
        assert_eq!(transport.call_count(), 0);
    }

    // ------------------------------------------------------------------
    // Against a real in-process ledger
    // ------------------------------------------------------------------

    fn in_process_client(cooldown: u64) -> (Arc<ReputationLedger>, LedgerClient) {
        let ledger = Arc::new(ReputationLedger::with_cooldown("owner", cooldown));
        let client = LedgerClient::in_process(ledger.clone(), test_config());
        (ledger, client)
    }

    #[tokio::test]
    async fn test_lookup_known_and_unknown() {
        let (ledger, client) = in_process_client(0);
        ledger.classify("reporter", "Evil@Scam.NET", true, "spotted in the wild").unwrap();

        let view = client.lookup(" EVIL@scam.net ").await.unwrap();
        assert!(view.exists);
        assert_eq!(view.classification, Some(Classification::Spam));
        assert_eq!(view.reputation_score, 10);
        assert_eq!(view.spam_votes, 1);
        assert_eq!(view.reason, "spotted in the wild");

        let view = client.lookup("nobody@nowhere.org").await.unwrap();
        assert!(!view.exists);
        assert_eq!(view.classification, None);
        assert_eq!(view.reputation_score, 50);
        assert_eq!(view.total_reports, 0);

        // Ham side of the 90/10/50 sentinel table
        ledger.classify("reporter", "ok@corp.com", false, "long-standing vendor").unwrap();
        let view = client.lookup("ok@corp.com").await.unwrap();
        assert!(view.exists);
        assert_eq!(view.classification, Some(Classification::Ham));
        assert_eq!(view.reputation_score, 90);
        assert_eq!(view.ham_votes, 1);
        assert_eq!(view.spam_votes, 0);
        assert_eq!(view.total_reports, 1);
    }

    #[tokio::test]
    async fn test_list_all_dedup_order_and_limit() {
        let (ledger, client) = in_process_client(0);
        ledger.classify_at("a", "one@x.com", true, "", 100).unwrap();
        ledger.classify_at("a", "two@x.com", false, "", 110).unwrap();
        ledger.classify_at("a", "one@x.com", false, "appealed", 120).unwrap();
        ledger.classify_at("a", "three@x.com", true, "", 130).unwrap();
        ledger.remove_at("owner", "three@x.com", 140).unwrap();

        let records = client.list_all(10).await.unwrap();
        assert_eq!(records.len(), 2);
        // Newest first, one row per identifier, removed rows gone
        assert_eq!(records[0].identifier, "one@x.com");
        assert_eq!(records[0].classification, Classification::Ham);
        assert_eq!(records[0].reason, "appealed");
        assert_eq!(records[1].identifier, "two@x.com");

        let records = client.list_all(1).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, "one@x.com");
    }

    /// Transport whose reads never complete - a stalled remote ledger.
    struct StalledReadsTransport;

    #[async_trait]
    impl LedgerTransport for StalledReadsTransport {
        async fn classify(&self, _: &str, _: &str, _: bool, _: &str) -> ClientResult<LedgerEvent> {
            std::future::pending().await
        }
        async fn query(&self, _: &str) -> ClientResult<QueryResult> {
            std::future::pending().await
        }
        async fn events(&self, _: usize) -> ClientResult<Vec<LedgerEvent>> {
            std::future::pending().await
        }
        async fn can_submit(&self, _: &str) -> ClientResult<(bool, i64)> {
            std::future::pending().await
        }
        async fn cooldown_seconds(&self) -> ClientResult<u64> {
            std::future::pending().await
        }
        async fn gate(&self, _: &str) -> ClientResult<Option<SubmissionGate>> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_info_bounded_by_read_timeout() {
        let client = LedgerClient::new(Arc::new(StalledReadsTransport), test_config());

        let started = tokio::time::Instant::now();
        let err = client.cooldown_info("agent-1").await.unwrap_err();

        assert!(matches!(err, ClientError::NetworkTimeout(10)));
        // The first stalled call hits the deadline; no indefinite block
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_all_bounded_by_read_timeout() {
        let client = LedgerClient::new(Arc::new(StalledReadsTransport), test_config());

        let err = client.list_all(10).await.unwrap_err();
        assert!(matches!(err, ClientError::NetworkTimeout(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_bounded_by_read_timeout() {
        let client = LedgerClient::new(Arc::new(StalledReadsTransport), test_config());

        let err = client.lookup("a@b.com").await.unwrap_err();
        assert!(matches!(err, ClientError::NetworkTimeout(10)));
    }

    #[tokio::test]
    async fn test_cooldown_info() {
        let (ledger, client) = in_process_client(300);

        let info = client.cooldown_info("agent-1").await.unwrap();
        assert_eq!(info.cooldown_seconds, 300);
        assert_eq!(info.last_submission_at, 0);
        assert!(info.eligible_now);

        ledger.classify("agent-1", "a@b.com", true, "").unwrap();
        let info = client.cooldown_info("agent-1").await.unwrap();
        assert!(!info.eligible_now);
        assert_eq!(info.next_eligible_at, info.last_submission_at + 300);
    }
}
