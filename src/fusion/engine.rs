//! Risk Fusion Engine
//!
//! Orchestrates one assessment: ledger lookup first (fast path), then the
//! content/URL classifiers and - unless the fast path applies - the LLM,
//! fused under a three-way weight policy. Confident fresh verdicts are
//! written back to the ledger asynchronously.
//!
//! No collaborator failure is allowed to abort an assessment; every source
//! degrades to "no signal" instead.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::client::LedgerClient;
use crate::constants::{self, NEUTRAL_SCORE};
use crate::error::ClientResult;
use crate::fusion::collaborators::{ContentClassifier, LlmAnalyzer, LlmVerdict, UrlClassifier};
use crate::fusion::identity::{extract_urls, normalize_sender};
use crate::fusion::types::{
    ComponentScores, EmailRecord, FeedbackOutcome, FeedbackRequest, RiskAssessment, RiskLabel,
};
use crate::fusion::weights::WeightPolicy;

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Write confident fresh verdicts back to the ledger
    pub auto_report: bool,
    /// Minimum confidence before an auto-report fires
    pub min_confidence: f32,
    /// Deadline for each collaborator call
    pub collaborator_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_report: constants::is_auto_report_enabled(),
            min_confidence: constants::get_min_confidence_threshold(),
            collaborator_timeout: Duration::from_secs(30),
        }
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct FusionEngine {
    client: LedgerClient,
    content: Arc<dyn ContentClassifier>,
    url: Arc<dyn UrlClassifier>,
    llm: Arc<dyn LlmAnalyzer>,
    config: EngineConfig,
}

impl FusionEngine {
    pub fn new(
        client: LedgerClient,
        content: Arc<dyn ContentClassifier>,
        url: Arc<dyn UrlClassifier>,
        llm: Arc<dyn LlmAnalyzer>,
        config: EngineConfig,
    ) -> Self {
        Self { client, content, url, llm, config }
    }

    /// Assess one email. Never fails - degraded signals are substituted
    /// with the neutral score.
    pub async fn assess(&self, email: &EmailRecord, force_fresh: bool) -> RiskAssessment {
        // The lookup key is the normalized sender address, never a link domain
        let identifier = normalize_sender(&email.sender);

        // Ledger lookup is on the critical path: it decides whether the
        // LLM runs at all. A failed or timed-out lookup fails open toward
        // full analysis, never toward skipping it.
        let ledger_view = if identifier.is_empty() {
            None
        } else {
            match self.client.lookup(&identifier).await {
                Ok(view) if view.exists => Some(view),
                Ok(_) => None,
                Err(err) => {
                    log::warn!("Ledger lookup failed for '{}': {} - treating as miss", identifier, err);
                    None
                }
            }
        };
        let ledger_hit = ledger_view.is_some();

        let urls = if email.urls.is_empty() {
            extract_urls(&format!("{} {}", email.subject, email.body))
        } else {
            email.urls.clone()
        };

        let policy = WeightPolicy::select(ledger_hit, force_fresh);

        // Content, URL and (when it runs) LLM calls are independent
        let content_fut = self.guarded_score("content", self.content.score_content(&email.body));
        let url_fut = self.guarded_score("url", self.url.score_urls(&urls));

        let (content_score, url_score, llm_verdict) = if policy.skips_llm() {
            let stored_reason = ledger_view
                .as_ref()
                .map(|v| v.reason.as_str())
                .filter(|r| !r.is_empty())
                .unwrap_or("known sender")
                .to_string();
            let (content_score, url_score) = tokio::join!(content_fut, url_fut);
            let verdict =
                LlmVerdict::neutral(format!("LLM analysis skipped - ledger verdict reused: {}", stored_reason));
            (content_score, url_score, verdict)
        } else {
            let llm_fut = self.guarded_llm(email, &identifier);
            let (content_score, url_score, verdict) = tokio::join!(content_fut, url_fut, llm_fut);
            (content_score, url_score, verdict)
        };

        let ledger_component = match ledger_view.as_ref().and_then(|v| v.classification) {
            Some(classification) if classification.is_spam() => 1.0,
            Some(_) => 0.0,
            // Weight is forced to 0 in this branch; the value never counts
            None => 0.0,
        };

        let scores = ComponentScores {
            content: content_score,
            url: url_score,
            llm: llm_verdict.risk_score,
            ledger: ledger_component,
        };
        let weights = policy.weights();
        let final_risk = weights.apply(&scores);
        let label = RiskLabel::from_risk(final_risk);
        let confidence = label.confidence(final_risk);

        log::info!(
            "Assessed '{}': risk={:.3} label={} (policy={:?}, ledger_hit={}, forced={})",
            identifier,
            final_risk,
            label,
            policy,
            ledger_hit,
            force_fresh
        );

        self.maybe_auto_report(&identifier, final_risk, confidence, label, ledger_hit, force_fresh);

        RiskAssessment {
            final_risk,
            label,
            confidence,
            reasoning: llm_verdict.reason,
            actions: llm_verdict.actions,
            ledger_hit,
            forced_fresh_used: force_fresh,
            weights,
            component_scores: scores,
        }
    }

    /// Human override path: writes through the same retry logic, and its
    /// failures ARE surfaced, unlike auto-report.
    pub async fn submit_feedback(&self, feedback: FeedbackRequest) -> ClientResult<FeedbackOutcome> {
        let receipt = self
            .client
            .submit_classification(
                &feedback.identifier,
                feedback.classification.is_spam(),
                &feedback.reason,
            )
            .await?;

        log::info!(
            "Feedback recorded: {} = {} (confirmation {})",
            receipt.identifier,
            receipt.classification,
            receipt.confirmation
        );
        Ok(FeedbackOutcome {
            identifier: receipt.identifier,
            classification: receipt.classification,
            confirmation: receipt.confirmation,
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Run a classifier call under the collaborator deadline; failure or
    /// timeout degrades to the neutral score.
    async fn guarded_score(
        &self,
        source: &str,
        call: impl Future<Output = Result<f32, String>>,
    ) -> f32 {
        match tokio::time::timeout(self.config.collaborator_timeout, call).await {
            Ok(Ok(score)) => score.clamp(0.0, 1.0),
            Ok(Err(err)) => {
                log::warn!("{} classifier failed: {} - using neutral score", source, err);
                NEUTRAL_SCORE
            }
            Err(_) => {
                log::warn!("{} classifier timed out - using neutral score", source);
                NEUTRAL_SCORE
            }
        }
    }

    async fn guarded_llm(&self, email: &EmailRecord, identifier: &str) -> LlmVerdict {
        let call = self.llm.analyze(&email.sender, &email.subject, &email.body);
        match tokio::time::timeout(self.config.collaborator_timeout, call).await {
            Ok(Ok(mut verdict)) => {
                verdict.risk_score = verdict.risk_score.clamp(0.0, 1.0);
                verdict
            }
            Ok(Err(err)) => {
                log::warn!("LLM analysis failed for '{}': {}", identifier, err);
                LlmVerdict::neutral(format!("LLM analysis failed: {}", err))
            }
            Err(_) => {
                log::warn!("LLM analysis timed out for '{}'", identifier);
                LlmVerdict::neutral("LLM analysis timed out")
            }
        }
    }

    /// Fire-and-forget write-back. Only a genuinely fresh determination is
    /// reported; failures are logged and never reach the caller.
    fn maybe_auto_report(
        &self,
        identifier: &str,
        final_risk: f32,
        confidence: f32,
        label: RiskLabel,
        ledger_hit: bool,
        force_fresh: bool,
    ) {
        if !self.config.auto_report
            || identifier.is_empty()
            || confidence < self.config.min_confidence
            || (ledger_hit && !force_fresh)
        {
            return;
        }

        let client = self.client.clone();
        let identifier = identifier.to_string();
        let is_spam = final_risk > 0.5;
        let reason = format!("Auto-report: final risk {:.2} ({})", final_risk, label);

        tokio::spawn(async move {
            match client.submit_classification(&identifier, is_spam, &reason).await {
                Ok(receipt) => log::info!(
                    "Auto-reported {} as {} (confirmation {})",
                    receipt.identifier,
                    receipt.classification,
                    receipt.confirmation
                ),
                Err(err) => log::warn!("Auto-report failed for '{}': {}", identifier, err),
            }
        });
    }
}

// ============================================================================
// TESTS
// ============================================================================
