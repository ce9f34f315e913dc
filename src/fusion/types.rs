//! Fusion Types
//!
//! Core types for the risk fusion engine.
//! No logic here - just data structures.

use serde::{Deserialize, Serialize};

use crate::ledger::Classification;

// ============================================================================
// INPUT
// ============================================================================

/// Structured email record produced by the mail-client scraper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailRecord {
    pub sender: String,
    pub subject: String,
    pub body: String,
    /// Links extracted by the scraper; when empty the engine extracts its own
    pub urls: Vec<String>,
}

// ============================================================================
// RISK LABEL
// ============================================================================

/// Final risk bucket shown to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    /// final_risk < 0.3
    Safe,
    /// 0.3 <= final_risk < 0.6
    Suspicious,
    /// final_risk >= 0.6
    Phishing,
}

impl RiskLabel {
    pub fn from_risk(final_risk: f32) -> Self {
        if final_risk < 0.3 {
            RiskLabel::Safe
        } else if final_risk < 0.6 {
            RiskLabel::Suspicious
        } else {
            RiskLabel::Phishing
        }
    }

    /// Confidence is risk for Phishing, 1 - risk otherwise. The asymmetry
    /// is part of the contract.
    pub fn confidence(&self, final_risk: f32) -> f32 {
        match self {
            RiskLabel::Phishing => final_risk,
            _ => 1.0 - final_risk,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Safe => "safe",
            RiskLabel::Suspicious => "suspicious",
            RiskLabel::Phishing => "phishing",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            RiskLabel::Safe => 0,
            RiskLabel::Suspicious => 1,
            RiskLabel::Phishing => 2,
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SCORES & WEIGHTS
// ============================================================================

/// Per-source risk signals, all in [0, 1]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComponentScores {
    pub content: f32,
    pub url: f32,
    pub llm: f32,
    /// 1.0 stored spam, 0.0 stored ham; meaningless when the ledger weight is 0
    pub ledger: f32,
}

/// Weight tuple applied to the component scores; always sums to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub content: f32,
    pub url: f32,
    pub llm: f32,
    pub ledger: f32,
}

impl FusionWeights {
    pub fn sum(&self) -> f32 {
        self.content + self.url + self.llm + self.ledger
    }

    pub fn apply(&self, scores: &ComponentScores) -> f32 {
        let risk = self.content * scores.content
            + self.url * scores.url
            + self.llm * scores.llm
            + self.ledger * scores.ledger;
        risk.clamp(0.0, 1.0)
    }
}

// ============================================================================
// ASSESSMENT
// ============================================================================

/// Result of one `assess` call. Ephemeral - never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub final_risk: f32,
    pub label: RiskLabel,
    /// Confidence under the per-label asymmetry
    pub confidence: f32,
    pub reasoning: String,
    pub actions: Vec<String>,
    /// Whether a reputation record existed for the sender at query time
    pub ledger_hit: bool,
    /// Whether the caller bypassed the ledger fast path
    pub forced_fresh_used: bool,
    pub weights: FusionWeights,
    pub component_scores: ComponentScores,
}

// ============================================================================
// FEEDBACK
// ============================================================================

/// Human override of a verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub identifier: String,
    pub classification: Classification,
    pub reason: String,
}

/// Outcome of a feedback write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackOutcome {
    pub identifier: String,
    pub classification: Classification,
    pub confirmation: uuid::Uuid,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_boundaries() {
        assert_eq!(RiskLabel::from_risk(0.0), RiskLabel::Safe);
        assert_eq!(RiskLabel::from_risk(0.29), RiskLabel::Safe);
        assert_eq!(RiskLabel::from_risk(0.3), RiskLabel::Suspicious);
        assert_eq!(RiskLabel::from_risk(0.59), RiskLabel::Suspicious);
        assert_eq!(RiskLabel::from_risk(0.6), RiskLabel::Phishing);
        assert_eq!(RiskLabel::from_risk(1.0), RiskLabel::Phishing);
    }

    #[test]
    fn test_confidence_asymmetry() {
        // Phishing reports the risk itself; the other labels report 1 - risk
        assert!((RiskLabel::Phishing.confidence(0.8) - 0.8).abs() < 1e-6);
        assert!((RiskLabel::Safe.confidence(0.1) - 0.9).abs() < 1e-6);
        assert!((RiskLabel::Suspicious.confidence(0.4) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_weights_apply_clamps() {
        let weights = FusionWeights { content: 1.0, url: 1.0, llm: 1.0, ledger: 1.0 };
        let scores = ComponentScores { content: 1.0, url: 1.0, llm: 1.0, ledger: 1.0 };
        assert_eq!(weights.apply(&scores), 1.0);
    }
}
