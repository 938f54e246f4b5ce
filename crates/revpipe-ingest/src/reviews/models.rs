//! Wire and storage models for review records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::normalize::normalize_sentiment;

/// Review as served by the remote source.
///
/// Every field is optional: the upstream is not trusted to send complete
/// records, and incomplete ones are skipped during curation rather than
/// failing the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceReview {
    pub id: Option<i64>,
    pub text: Option<String>,
    pub sentiment: Option<String>,
    pub date: Option<String>,
}

/// Body of a review submission (`POST {base}/api/reviews`)
#[derive(Debug, Clone, Serialize)]
pub struct ReviewDraft {
    pub text: String,
    pub sentiment: Option<String>,
    pub date: String,
}

/// Validated, normalized review ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct CuratedReview {
    /// Identifier assigned by the source system; the sole dedup key
    pub api_id: i64,
    pub text: String,
    pub sentiment: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl CuratedReview {
    /// Curate a raw source record.
    ///
    /// Returns `None` when the record must be skipped: missing `id`, text
    /// that trims to empty, or a missing or unparseable timestamp.
    pub fn from_source(raw: &SourceReview) -> Option<Self> {
        let api_id = raw.id?;

        let text = raw.text.as_deref().unwrap_or("").trim();
        if text.is_empty() {
            return None;
        }

        let occurred_at = parse_timestamp(raw.date.as_deref()?)?;

        Some(Self {
            api_id,
            text: text.to_string(),
            sentiment: normalize_sentiment(raw.sentiment.as_deref()),
            occurred_at,
        })
    }
}

/// Row read back from the destination table for the run report
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredReview {
    pub api_id: i64,
    pub text: String,
    pub sentiment: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
}

impl StoredReview {
    /// Text preview for log output, truncated to `limit` characters
    pub fn preview(&self, limit: usize) -> String {
        self.text.chars().take(limit).collect()
    }
}

/// Parse an ISO-8601 timestamp, tolerating a missing UTC offset
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    // Sources sometimes drop the offset ("2025-09-03T12:05:00"); read as UTC
    value
        .parse::<chrono::NaiveDateTime>()
        .ok()
        .map(|naive| naive.and_utc())
}
