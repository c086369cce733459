//! Error taxonomy for the pipeline engine

use thiserror::Error;

/// Failures reported by the remote lead store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or refused the request.
    #[error("lead store unavailable: {0}")]
    Unavailable(String),

    /// The referenced document does not exist (or no longer exists).
    #[error("document not found: {0}")]
    NotFound(String),
}

/// Failures the engine surfaces to its callers.
///
/// Both variants are recoverable: a failed subscription leaves the board
/// empty and eligible for re-establishment on the next operator change; a
/// failed commit leaves the board in its pre-gesture state because the
/// live view is never mutated locally.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Establishing the live scoped query failed.
    #[error("failed to establish lead subscription for operator {operator_id}")]
    SubscriptionEstablish {
        operator_id: String,
        #[source]
        source: StoreError,
    },

    /// The stage update was rejected by the store. The engine does not
    /// retry; the same commit is idempotent and may be re-issued.
    #[error("failed to commit stage transition for lead {lead_id}")]
    TransitionCommit {
        lead_id: String,
        #[source]
        source: StoreError,
    },
}
