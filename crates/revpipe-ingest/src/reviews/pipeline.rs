//! Run orchestration
//!
//! Sequences one ingestion pass:
//! `START → (SEED) → FETCH → BOOTSTRAP → UPSERT → REPORT → END`, with a
//! single `FALLBACK` transition out of FETCH when the secure endpoint fails
//! certificate validation.

use tracing::{info, warn};

use super::client::ReviewsClient;
use super::config::IngestConfig;
use super::models::SourceReview;
use super::seed::seed_if_empty;
use super::storage::ReviewStore;
use super::{Result, ReviewsError};

/// Rows shown in the end-of-run sample
const REPORT_SAMPLE_ROWS: i64 = 5;

/// Characters of review text shown per sample row
const REPORT_PREVIEW_CHARS: usize = 60;

/// Transport selection for the source endpoint.
///
/// The HTTPS→HTTP downgrade is modeled as an explicit state transition, not a
/// retry loop: from `InsecureFallback` there is no further state to move to,
/// so the downgrade can happen at most once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transport {
    /// The configured base URL with the configured verification mode
    Configured,
    /// The `http://` rewrite of a secure base, verification off
    InsecureFallback,
}

/// Outcome counters for one ingestion pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Demo reviews seeded into an empty source
    pub seeded: usize,
    /// Reviews fetched from the source
    pub fetched: usize,
    /// Rows actually inserted (excludes skips and duplicates)
    pub inserted: u64,
    /// Whether the run downgraded to the insecure transport
    pub fell_back: bool,
}

/// One-shot review ingestion pipeline
pub struct ReviewsPipeline {
    config: IngestConfig,
    store: ReviewStore,
}

impl ReviewsPipeline {
    pub fn new(config: IngestConfig) -> Self {
        let store = ReviewStore::new(config.store.clone());
        Self { config, store }
    }

    /// Run one full ingestion pass.
    pub async fn run(&self) -> Result<PipelineStats> {
        if !self.config.source.verify_tls {
            // The single process-wide acknowledgement of insecure mode;
            // individual requests stay quiet about it.
            warn!(
                base = %self.config.source.base_url,
                "TLS certificate verification is disabled"
            );
        }

        let (reviews, seeded, transport) = self.acquire_reviews().await?;
        let (base, _) = self.endpoint(transport);
        info!(fetched = reviews.len(), base = %base, "Fetched reviews from source");

        self.store.ensure_table().await?;

        let inserted = self.store.insert_curated(&reviews).await?;
        info!(inserted, table = %self.config.store.table, "Upsert complete");

        self.report().await;

        Ok(PipelineStats {
            seeded,
            fetched: reviews.len(),
            inserted,
            fell_back: transport == Transport::InsecureFallback,
        })
    }

    /// Seed (when enabled) and fetch, downgrading the transport at most once.
    ///
    /// Seeding runs before each fetch attempt because a fallback switches the
    /// base URL — the original seed attempt talked to the unreachable base.
    async fn acquire_reviews(&self) -> Result<(Vec<SourceReview>, usize, Transport)> {
        let mut transport = Transport::Configured;

        loop {
            let (base, verify_tls) = self.endpoint(transport);
            let client = ReviewsClient::new(base, verify_tls, self.config.source.timeout_secs)?;

            let seeded = if self.config.source.seed_if_empty {
                seed_if_empty(&client).await
            } else {
                0
            };

            match client.fetch_all().await {
                Ok(reviews) => return Ok((reviews, seeded, transport)),
                Err(err) => match self.next_transport(transport, &err) {
                    Some(next) => {
                        warn!(
                            error = %err,
                            "TLS failure on secure base, falling back to HTTP"
                        );
                        transport = next;
                    }
                    None => return Err(err),
                },
            }
        }
    }

    /// Effective (base URL, verify) pair for a transport state
    fn endpoint(&self, transport: Transport) -> (String, bool) {
        match transport {
            Transport::Configured => (
                self.config.source.base_url.clone(),
                self.config.source.verify_tls,
            ),
            Transport::InsecureFallback => {
                let base = self
                    .config
                    .source
                    .insecure_base()
                    .unwrap_or_else(|| self.config.source.base_url.clone());
                (base, false)
            }
        }
    }

    /// Decide the single allowed fallback transition.
    ///
    /// Fires only from the configured transport, only for a TLS failure, only
    /// when the base is secure and fallback is enabled. Everything else —
    /// including a TLS failure after the downgrade — stays fatal.
    fn next_transport(&self, current: Transport, err: &ReviewsError) -> Option<Transport> {
        match (current, err) {
            (Transport::Configured, ReviewsError::Tls(_))
                if self.config.source.allow_http_fallback
                    && self.config.source.insecure_base().is_some() =>
            {
                Some(Transport::InsecureFallback)
            }
            _ => None,
        }
    }

    /// Best-effort read-back of the latest rows; never fails the run.
    async fn report(&self) {
        match self.store.latest(REPORT_SAMPLE_ROWS).await {
            Ok(rows) => {
                info!(rows = rows.len(), "Sample of latest stored reviews");
                for row in rows {
                    info!(
                        api_id = row.api_id,
                        sentiment = row.sentiment.as_deref().unwrap_or("NULL"),
                        occurred_at = %row.occurred_at,
                        text = %row.preview(REPORT_PREVIEW_CHARS),
                        "Stored review"
                    );
                }
            }
            Err(err) => warn!(error = %err, "Could not fetch sample rows"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::config::{SourceConfig, StoreConfig};
    use reqwest::StatusCode;

    fn pipeline_with(base_url: &str, allow_http_fallback: bool) -> ReviewsPipeline {
        ReviewsPipeline::new(IngestConfig {
            source: SourceConfig {
                base_url: base_url.to_string(),
                verify_tls: true,
                allow_http_fallback,
                timeout_secs: 5,
                seed_if_empty: false,
            },
            store: StoreConfig::default(),
        })
    }

    fn tls_error() -> ReviewsError {
        ReviewsError::Tls("invalid peer certificate".to_string())
    }

    #[test]
    fn test_tls_failure_on_secure_base_falls_back_once() {
        let pipeline = pipeline_with("https://localhost:5001", true);

        let next = pipeline.next_transport(Transport::Configured, &tls_error());
        assert_eq!(next, Some(Transport::InsecureFallback));

        // No second transition: a TLS failure on the fallback stays fatal.
        let again = pipeline.next_transport(Transport::InsecureFallback, &tls_error());
        assert_eq!(again, None);
    }

    #[test]
    fn test_no_fallback_when_disabled() {
        let pipeline = pipeline_with("https://localhost:5001", false);
        assert_eq!(
            pipeline.next_transport(Transport::Configured, &tls_error()),
            None
        );
    }

    #[test]
    fn test_no_fallback_from_insecure_base() {
        let pipeline = pipeline_with("http://localhost:5000", true);
        assert_eq!(
            pipeline.next_transport(Transport::Configured, &tls_error()),
            None
        );
    }

    #[test]
    fn test_non_tls_errors_never_fall_back() {
        let pipeline = pipeline_with("https://localhost:5001", true);
        let err = ReviewsError::HttpStatus {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            url: "https://localhost:5001/api/reviews".to_string(),
        };
        assert_eq!(pipeline.next_transport(Transport::Configured, &err), None);
    }

    #[test]
    fn test_fallback_endpoint_rewrites_scheme_and_disables_verification() {
        let pipeline = pipeline_with("https://localhost:5001", true);

        let (base, verify) = pipeline.endpoint(Transport::Configured);
        assert_eq!(base, "https://localhost:5001");
        assert!(verify);

        let (base, verify) = pipeline.endpoint(Transport::InsecureFallback);
        assert_eq!(base, "http://localhost:5001");
        assert!(!verify);
    }
}
