//! Error taxonomy for the router pipeline.
//!
//! Every stage returns a structured [`RouterError`] rather than relying on
//! stringly-typed failures. See §7 for the policy each variant implies at
//! the orchestrator boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("artifact unavailable: {0}")]
    ArtifactUnavailable(String),

    #[error("feature extraction timed out after {elapsed_ms}ms")]
    FeatureTimeout { elapsed_ms: u64 },

    #[error("triage classifier unavailable: {0}")]
    TriageUnavailable(String),

    #[error("no candidates configured for bucket {bucket}")]
    NoCandidates { bucket: String },

    #[error("internal error: {0}")]
    InternalError(String),
}

impl RouterError {
    /// Whether this error is non-fatal: the caller may continue with a
    /// best-effort result instead of falling all the way back.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RouterError::FeatureTimeout { .. } | RouterError::TriageUnavailable(_)
        )
    }
}
