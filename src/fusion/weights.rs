//! Fusion Weight Policy
//!
//! The weight tuple is a pure function of two booleans. An explicit
//! three-way policy keeps the table single-sourced and testable on its own.

use serde::{Deserialize, Serialize};

use super::types::FusionWeights;

/// Which weighting regime applies to an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightPolicy {
    /// Stored verdict dominates; LLM was skipped
    LedgerFastPath,
    /// Stored verdict present but the caller demanded fresh analysis
    LedgerWithFreshAnalysis,
    /// Unknown sender; the LLM carries the most weight
    NoLedgerSignal,
}

impl WeightPolicy {
    pub fn select(ledger_hit: bool, force_fresh: bool) -> Self {
        match (ledger_hit, force_fresh) {
            (true, false) => WeightPolicy::LedgerFastPath,
            (true, true) => WeightPolicy::LedgerWithFreshAnalysis,
            (false, _) => WeightPolicy::NoLedgerSignal,
        }
    }

    /// The one place the weight table lives.
    pub fn weights(&self) -> FusionWeights {
        match self {
            WeightPolicy::LedgerFastPath => FusionWeights {
                content: 0.10,
                url: 0.10,
                llm: 0.10,
                ledger: 0.70,
            },
            WeightPolicy::LedgerWithFreshAnalysis => FusionWeights {
                content: 0.20,
                url: 0.20,
                llm: 0.40,
                ledger: 0.20,
            },
            WeightPolicy::NoLedgerSignal => FusionWeights {
                content: 0.30,
                url: 0.20,
                llm: 0.50,
                ledger: 0.00,
            },
        }
    }

    /// Whether this policy skips the LLM call
    pub fn skips_llm(&self) -> bool {
        matches!(self, WeightPolicy::LedgerFastPath)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_covers_all_cases() {
        assert_eq!(WeightPolicy::select(true, false), WeightPolicy::LedgerFastPath);
        assert_eq!(WeightPolicy::select(true, true), WeightPolicy::LedgerWithFreshAnalysis);
        assert_eq!(WeightPolicy::select(false, false), WeightPolicy::NoLedgerSignal);
        assert_eq!(WeightPolicy::select(false, true), WeightPolicy::NoLedgerSignal);
    }

    #[test]
    fn test_weights_sum_to_one() {
        for policy in [
            WeightPolicy::LedgerFastPath,
            WeightPolicy::LedgerWithFreshAnalysis,
            WeightPolicy::NoLedgerSignal,
        ] {
            assert!((policy.weights().sum() - 1.0).abs() < 1e-6, "{:?}", policy);
        }
    }

    #[test]
    fn test_only_fast_path_skips_llm() {
        assert!(WeightPolicy::LedgerFastPath.skips_llm());
        assert!(!WeightPolicy::LedgerWithFreshAnalysis.skips_llm());
        assert!(!WeightPolicy::NoLedgerSignal.skips_llm());
    }

    #[test]
    fn test_miss_policy_has_no_ledger_weight() {
        assert_eq!(WeightPolicy::NoLedgerSignal.weights().ledger, 0.0);
    }
}
