//! Error handling
//!
//! Two layers: `LedgerError` is what the ledger state machine rejects with,
//! `ClientError` is the taxonomy the ledger client surfaces to callers.

use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;
pub type ClientResult<T> = Result<T, ClientError>;

/// Rejections produced by the ledger state machine itself.
///
/// Preconditions are enforced synchronously; a rejection leaves no partial
/// state behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    #[error("submitter is in cooldown until {next_eligible_at}")]
    CooldownActive { next_eligible_at: i64 },

    #[error("no record exists for identifier '{0}'")]
    NotFound(String),

    #[error("operation restricted to the ledger owner")]
    NotOwner,
}

/// Errors surfaced by the ledger client.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Missing endpoint or submitter credential - nothing was sent.
    #[error("ledger client not configured: {0}")]
    NotConfigured(String),

    /// Rejected locally before reaching the ledger.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The submitter's rate gate is closed; retried by the client.
    #[error("cooldown active until {next_eligible_at}")]
    CooldownActive { next_eligible_at: i64 },

    /// A transport call exceeded its deadline.
    #[error("ledger call timed out after {0}s")]
    NetworkTimeout(u64),

    /// Any other ledger-side precondition failure. Not retried.
    #[error("rejected by ledger: {0}")]
    RejectedByLedger(String),

    /// The retry budget was used up without an accepted write.
    #[error("gave up after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

impl From<LedgerError> for ClientError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::CooldownActive { next_eligible_at } => {
                ClientError::CooldownActive { next_eligible_at }
            }
            LedgerError::EmptyIdentifier => {
                ClientError::Validation("identifier must not be empty".to_string())
            }
            other => ClientError::RejectedByLedger(other.to_string()),
        }
    }
}

impl ClientError {
    /// Only cooldown rejections are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::CooldownActive { .. })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_maps_to_retryable() {
        let err: ClientError = LedgerError::CooldownActive { next_eligible_at: 42 }.into();
        assert!(err.is_retryable());
        assert!(matches!(err, ClientError::CooldownActive { next_eligible_at: 42 }));
    }

    #[test]
    fn test_other_rejections_not_retryable() {
        let err: ClientError = LedgerError::NotFound("x@y.com".to_string()).into();
        assert!(!err.is_retryable());

        let err: ClientError = LedgerError::EmptyIdentifier.into();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
