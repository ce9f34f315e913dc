//! External Collaborators
//!
//! Trait seams for the statistical classifiers and the language-model
//! analyzer. The engine only depends on these contracts; the real
//! implementations (embedding models, URL feature models, LLM calls) live
//! outside this crate.

use async_trait::async_trait;

use crate::constants::NEUTRAL_SCORE;

/// Verdict returned by the language-model analyzer
#[derive(Debug, Clone)]
pub struct LlmVerdict {
    /// Risk score in [0, 1]
    pub risk_score: f32,
    /// Textual justification
    pub reason: String,
    /// Recommended actions for the user
    pub actions: Vec<String>,
}

impl LlmVerdict {
    /// Placeholder used when the call is skipped or fails
    pub fn neutral(reason: impl Into<String>) -> Self {
        Self {
            risk_score: NEUTRAL_SCORE,
            reason: reason.into(),
            actions: Vec::new(),
        }
    }
}

/// Spam probability for email text
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    /// Returns a spam probability in [0, 1]
    async fn score_content(&self, body: &str) -> Result<f32, String>;
}

/// Spam probability for a link list
#[async_trait]
pub trait UrlClassifier: Send + Sync {
    /// Returns a spam probability in [0, 1]
    async fn score_urls(&self, urls: &[String]) -> Result<f32, String>;
}

/// Language-model risk analysis
#[async_trait]
pub trait LlmAnalyzer: Send + Sync {
    async fn analyze(&self, sender: &str, subject: &str, body: &str) -> Result<LlmVerdict, String>;
}
