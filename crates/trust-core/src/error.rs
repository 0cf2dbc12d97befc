//! Error types for the certification pipeline.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Pipeline stage an error originated from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Stage {
    /// Validating process configuration.
    Configuration,
    /// Querying the fact providers.
    Facts,
    /// Encoding the fact set into the prover input vector.
    Encoding,
    /// Running the external proof generator.
    Proving,
    /// Submitting the proof to the on-chain verifier.
    Verification,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::Facts => "fact collection",
            Stage::Encoding => "encoding",
            Stage::Proving => "proving",
            Stage::Verification => "verification",
        };
        f.write_str(name)
    }
}

/// Errors that terminate a certification run.
///
/// None of these are retried: a second prover invocation may observe stale
/// witness state and a second transaction would double-submit.
#[derive(Error, Debug)]
pub enum CertifyError {
    /// Process configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The contract address is not a hex string of even length.
    #[error("malformed contract address {address:?}: {reason}")]
    MalformedAddress {
        /// The offending address as supplied.
        address: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The contract address has an even length other than 40 hex digits.
    #[error("unsupported contract address length {length}, expected {expected} hex digits")]
    UnsupportedAddressLength {
        /// Number of hex digits supplied.
        length: usize,
        /// Number of hex digits required.
        expected: usize,
    },

    /// A fact provider response lacks a field or carries it with the wrong type.
    #[error("missing fact `{field}` from {provider}: {reason}")]
    MissingFact {
        /// Provider that answered.
        provider: &'static str,
        /// JSON path of the field.
        field: String,
        /// Why the field was rejected.
        reason: String,
    },

    /// A fact provider could not be queried or reported an API-level error.
    #[error("{provider} request failed: {message}")]
    ProviderRequest {
        /// Provider that failed.
        provider: &'static str,
        /// Transport or API error message.
        message: String,
    },

    /// No prover instance is reachable.
    #[error("prover unavailable: {0}")]
    ProverUnavailable(String),

    /// The prover ran but exited with a non-zero status.
    #[error("prover execution failed: {0}")]
    ProverExecutionFailed(String),

    /// The proof artifact could not be decoded or failed structural checks.
    #[error("malformed prover output: {0}")]
    MalformedProverOutput(String),

    /// The verification transaction was refused, reverted or never mined.
    #[error("verification transaction rejected: {0}")]
    TransactionRejected(String),

    /// The read-only verifier call failed.
    #[error("verifier call failed: {0}")]
    VerifierCallFailed(String),

    /// An external call exceeded its time bound.
    #[error("{stage} timed out after {after:?}")]
    Timeout {
        /// Stage whose external call timed out.
        stage: Stage,
        /// The bound that was exceeded.
        after: Duration,
    },
}

impl CertifyError {
    /// Returns the stage this error aborted.
    pub fn stage(&self) -> Stage {
        match self {
            CertifyError::Configuration(_) => Stage::Configuration,
            CertifyError::MissingFact { .. } | CertifyError::ProviderRequest { .. } => Stage::Facts,
            CertifyError::MalformedAddress { .. } | CertifyError::UnsupportedAddressLength { .. } => {
                Stage::Encoding
            }
            CertifyError::ProverUnavailable(_)
            | CertifyError::ProverExecutionFailed(_)
            | CertifyError::MalformedProverOutput(_) => Stage::Proving,
            CertifyError::TransactionRejected(_) | CertifyError::VerifierCallFailed(_) => {
                Stage::Verification
            }
            CertifyError::Timeout { stage, .. } => *stage,
        }
    }

    /// Builds a [`CertifyError::MissingFact`].
    pub fn missing_fact(
        provider: &'static str,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CertifyError::MissingFact {
            provider,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for certification operations.
pub type Result<T> = std::result::Result<T, CertifyError>;
