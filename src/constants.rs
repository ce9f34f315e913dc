//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change a default cooldown or threshold, only edit this file.

/// Default per-submitter cooldown between accepted ledger writes (seconds)
pub const DEFAULT_COOLDOWN_SECS: u64 = 300;

/// Default retry budget for a classification submission
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Base delay for linear retry backoff (seconds): attempt * base
pub const DEFAULT_BASE_DELAY_SECS: u64 = 2;

/// Timeout for ledger read calls (seconds)
pub const READ_TIMEOUT_SECS: u64 = 10;

/// Timeout for ledger write calls - writes wait for confirmation (seconds)
pub const WRITE_TIMEOUT_SECS: u64 = 60;

/// Default minimum confidence before a verdict is auto-reported
pub const DEFAULT_MIN_CONFIDENCE_THRESHOLD: f32 = 0.8;

/// Neutral placeholder score when a signal source is unavailable or skipped
pub const NEUTRAL_SCORE: f32 = 0.5;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "MailShield";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get ledger cooldown from environment or use default
pub fn get_cooldown_secs() -> u64 {
    std::env::var("LEDGER_COOLDOWN_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_COOLDOWN_SECS)
}

/// Get the submitter identity for ledger writes (empty = not configured)
pub fn get_submitter_identity() -> String {
    std::env::var("LEDGER_SUBMITTER_IDENTITY").unwrap_or_default()
}

/// Check if confident verdicts are auto-reported to the ledger
pub fn is_auto_report_enabled() -> bool {
    std::env::var("AUTO_REPORT_CONFIDENT_CLASSIFICATIONS")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}

/// Get minimum confidence for auto-report from environment or use default
pub fn get_min_confidence_threshold() -> f32 {
    std::env::var("MIN_CONFIDENCE_FOR_REPORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MIN_CONFIDENCE_THRESHOLD)
}
