//! Risk Fusion Module
//!
//! Blends ledger, content-classifier, URL-classifier and LLM signals into
//! one risk score. This is the only place with business policy - the
//! ledger is a passive state machine and the client a resilient transport
//! wrapper.
//!
//! ## Structure
//! - `types`: input/output contracts (EmailRecord, RiskAssessment, ...)
//! - `identity`: sender normalization and link extraction
//! - `collaborators`: external classifier/LLM trait seams
//! - `weights`: the three-way weight policy
//! - `engine`: the orchestrator

pub mod types;
pub mod identity;
pub mod collaborators;
pub mod weights;
pub mod engine;

pub use types::{
    ComponentScores,
    EmailRecord,
    FeedbackOutcome,
    FeedbackRequest,
    FusionWeights,
    RiskAssessment,
    RiskLabel,
};

pub use identity::{extract_domains, extract_urls, normalize_sender};
pub use collaborators::{ContentClassifier, LlmAnalyzer, LlmVerdict, UrlClassifier};
pub use weights::WeightPolicy;
pub use engine::{EngineConfig, FusionEngine};
