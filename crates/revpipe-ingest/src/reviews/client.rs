//! HTTP client for the reviews source API

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::models::{ReviewDraft, SourceReview};
use super::{Result, ReviewsError};

/// Longest body snippet echoed into protocol error messages
const BODY_SNIPPET_CHARS: usize = 200;

/// Client for the reviews collection endpoint (`{base}/api/reviews`).
///
/// Built once per transport state: the fixed timeout, the JSON accept header
/// and the certificate-validation mode are baked in at construction, never
/// per call.
pub struct ReviewsClient {
    http: Client,
    base_url: String,
}

/// Response to a review submission.
///
/// Echo endpoints do not always speak JSON back; a non-JSON body is returned
/// raw instead of being treated as a failure.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Json(Value),
    Raw(String),
}

impl ReviewsClient {
    /// Build a client for `base_url` with a fixed timeout.
    ///
    /// `verify_tls == false` disables certificate validation for every call
    /// made through this client.
    pub fn new(base_url: impl Into<String>, verify_tls: bool, timeout_secs: u64) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("revpipe-ingest/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        if !verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| ReviewsError::config(format!("Failed to build HTTP client: {}", e)))?;

        let base: String = base_url.into();
        Ok(Self {
            http,
            base_url: base.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn reviews_url(&self) -> String {
        format!("{}/api/reviews", self.base_url)
    }

    /// Fetch the full reviews collection.
    pub async fn fetch_all(&self) -> Result<Vec<SourceReview>> {
        let url = self.reviews_url();

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ReviewsError::from_request)?;

        let response = check_status(response, &url)?;
        let content_type = content_type_of(&response);
        if !content_type.starts_with("application/json") {
            let body = response.text().await.unwrap_or_default();
            return Err(ReviewsError::protocol(format!(
                "Expected JSON from {}, got '{}'; body: {}",
                url,
                content_type,
                snippet(&body)
            )));
        }

        let reviews: Vec<SourceReview> = response
            .json()
            .await
            .map_err(|e| ReviewsError::protocol(format!("Invalid JSON from {}: {}", url, e)))?;

        debug!(count = reviews.len(), url = %url, "Fetched reviews");
        Ok(reviews)
    }

    /// Submit one review draft.
    pub async fn submit(&self, draft: &ReviewDraft) -> Result<SubmitOutcome> {
        let url = self.reviews_url();

        let response = self
            .http
            .post(&url)
            .json(draft)
            .send()
            .await
            .map_err(ReviewsError::from_request)?;

        let response = check_status(response, &url)?;
        let content_type = content_type_of(&response);
        if content_type.contains("application/json") {
            let value: Value = response
                .json()
                .await
                .map_err(|e| ReviewsError::protocol(format!("Invalid JSON from {}: {}", url, e)))?;
            Ok(SubmitOutcome::Json(value))
        } else {
            let body = response
                .text()
                .await
                .map_err(|e| ReviewsError::protocol(format!("Unreadable body from {}: {}", url, e)))?;
            Ok(SubmitOutcome::Raw(body))
        }
    }
}

fn check_status(response: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status: StatusCode = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ReviewsError::HttpStatus {
            status,
            url: url.to_string(),
        })
    }
}

fn content_type_of(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}
