//! Review ingestion pipeline
//!
//! Moves review records from the operational reviews API into the analytics
//! store, idempotently. The module split mirrors the phases of a run:
//!
//! - Config: source endpoint + destination store settings, env-driven
//! - Client: HTTP reads/writes against the reviews collection endpoint
//! - Normalize: free-text sentiment labels → a fixed vocabulary
//! - Storage: schema bootstrap, duplicate-absorbing inserts, read-back
//! - Seed: optional demo-data priming of an empty source
//! - Pipeline: phase sequencing and the one-shot HTTPS→HTTP fallback
//!
//! Deduplication is owned entirely by the store: `api_id` carries a UNIQUE
//! constraint and inserts use `ON CONFLICT DO NOTHING`, so a re-run (or a
//! concurrent run) inserting the same external id is a benign no-op.

pub mod client;
pub mod config;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod seed;
pub mod storage;

// Re-export main types
pub use client::{ReviewsClient, SubmitOutcome};
pub use config::{IngestConfig, SourceConfig, StoreConfig};
pub use models::{CuratedReview, ReviewDraft, SourceReview, StoredReview};
pub use normalize::normalize_sentiment;
pub use pipeline::{PipelineStats, ReviewsPipeline};
pub use storage::ReviewStore;

/// Result type for review ingestion operations
pub type Result<T> = std::result::Result<T, ReviewsError>;

/// Error taxonomy for the ingestion pipeline
///
/// Source-side failures (`Transport`, `Tls`, `HttpStatus`, `Protocol`) are
/// fatal to a run except for the single TLS-triggered fallback; store-side
/// failures are always fatal. Duplicate inserts are not errors at all — they
/// are absorbed per row by the uniqueness constraint on `api_id`.
#[derive(Debug, thiserror::Error)]
pub enum ReviewsError {
    /// Network-level failure: unreachable host, DNS, reset, timeout
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Certificate validation failure; eligible for the one-shot HTTP fallback
    #[error("TLS certificate error: {0}")]
    Tls(String),

    /// The source answered with a non-2xx status
    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The source broke the JSON contract (wrong content type, bad body)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Could not reach or authenticate against the destination store
    #[error("Store connection error: {0}")]
    StoreConnect(#[source] sqlx::Error),

    /// A store statement failed for a reason other than a duplicate row
    #[error("Store operation error: {0}")]
    StoreOperation(#[source] sqlx::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReviewsError {
    /// Classify a request failure, separating certificate trouble (which
    /// drives the fallback transition) from plain transport trouble.
    pub fn from_request(err: reqwest::Error) -> Self {
        if error_chain_mentions_certificate(&err) {
            ReviewsError::Tls(err.to_string())
        } else {
            ReviewsError::Transport(err)
        }
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Walk an error's source chain looking for certificate-validation wording.
///
/// reqwest flattens TLS backends' errors into opaque `hyper`/`io` chains, so
/// matching the rendered messages is the only backend-agnostic signal.
fn error_chain_mentions_certificate(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        let message = e.to_string().to_ascii_lowercase();
        if message.contains("certificate")
            || message.contains("self signed")
            || message.contains("self-signed")
            || message.contains("unknown issuer")
        {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeError {
        message: &'static str,
        source: Option<Box<FakeError>>,
    }

    impl std::fmt::Display for FakeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for FakeError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.source
                .as_deref()
                .map(|e| e as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn test_detects_certificate_failure_at_top_level() {
        let err = FakeError {
            message: "invalid peer certificate: UnknownIssuer",
            source: None,
        };
        assert!(error_chain_mentions_certificate(&err));
    }

    #[test]
    fn test_detects_certificate_failure_deep_in_chain() {
        let err = FakeError {
            message: "error sending request",
            source: Some(Box::new(FakeError {
                message: "client error (Connect)",
                source: Some(Box::new(FakeError {
                    message: "self signed certificate in certificate chain",
                    source: None,
                })),
            })),
        };
        assert!(error_chain_mentions_certificate(&err));
    }

    #[test]
    fn test_plain_connection_failure_is_not_tls() {
        let err = FakeError {
            message: "error sending request",
            source: Some(Box::new(FakeError {
                message: "connection refused",
                source: None,
            })),
        };
        assert!(!error_chain_mentions_certificate(&err));
    }
}
