//! Demo-data seeding for an empty source
//!
//! Mainly a demo/testing aid, but it exercises the write path of the client.
//! Seeding is strictly best-effort: no failure here may fail the run.

use std::time::Duration;

use tracing::{info, warn};

use super::client::ReviewsClient;
use super::models::ReviewDraft;

/// Pause between seed submissions so the source isn't hammered
pub const SEED_DELAY_MS: u64 = 100;

/// Fixed demo reviews used to prime an empty source
pub fn demo_reviews() -> Vec<ReviewDraft> {
    vec![
        ReviewDraft {
            text: "Great burger! Crispy fries!".to_string(),
            sentiment: Some("Positive".to_string()),
            date: "2025-09-03T12:05:00Z".to_string(),
        },
        ReviewDraft {
            text: "Service was slow and inattentive.".to_string(),
            sentiment: Some("Negative".to_string()),
            date: "2025-09-03T12:06:00Z".to_string(),
        },
        ReviewDraft {
            text: "Burger was okay, nothing special.".to_string(),
            sentiment: Some("Neutral".to_string()),
            date: "2025-09-03T12:07:00Z".to_string(),
        },
    ]
}

/// Seed demo reviews into the source when it is empty.
///
/// Returns the number of reviews seeded. Fetch failures, a non-empty source
/// and per-submission failures all resolve to a plain count — individual
/// failures are logged and the loop continues with the next draft.
pub async fn seed_if_empty(client: &ReviewsClient) -> usize {
    let current = match client.fetch_all().await {
        Ok(reviews) => reviews,
        Err(err) => {
            warn!(error = %err, "Seed check could not fetch current reviews");
            return 0;
        }
    };

    if !current.is_empty() {
        return 0;
    }

    let mut seeded = 0;
    for draft in demo_reviews() {
        match client.submit(&draft).await {
            Ok(_) => seeded += 1,
            Err(err) => {
                warn!(error = %err, text = %draft.text, "Failed to submit demo review");
            }
        }
        tokio::time::sleep(Duration::from_millis(SEED_DELAY_MS)).await;
    }

    if seeded > 0 {
        info!(seeded, base = %client.base_url(), "Seeded demo reviews into source");
    }
    seeded
}
