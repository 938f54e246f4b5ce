//! Destination store: schema bootstrap, dedup inserts, read-back

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use super::config::StoreConfig;
use super::models::{CuratedReview, SourceReview, StoredReview};
use super::{Result, ReviewsError};

/// Gateway to the analytics store.
///
/// Connections are phase-scoped: every public method opens its own small pool
/// and drops it on return, so a run never holds a connection between phases.
/// This keeps the pipeline friendly to cron/serverless-style invocation.
pub struct ReviewStore {
    config: StoreConfig,
}

impl ReviewStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    async fn connect(&self) -> Result<PgPool> {
        PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .acquire_timeout(Duration::from_secs(self.config.connect_timeout_secs))
            .connect(&self.config.url)
            .await
            .map_err(ReviewsError::StoreConnect)
    }

    /// Ensure the destination table and its indexes exist.
    ///
    /// Idempotent: safe to call on every run, no effect when the table is
    /// already there. Any failure is fatal to the run.
    pub async fn ensure_table(&self) -> Result<()> {
        let pool = self.connect().await?;

        for statement in bootstrap_statements(&self.config.table) {
            sqlx::query(&statement)
                .execute(&pool)
                .await
                .map_err(ReviewsError::StoreOperation)?;
        }

        debug!(table = %self.config.table, "Destination table ready");
        Ok(())
    }

    /// Insert fetched reviews, returning the number of rows actually stored.
    ///
    /// Incomplete records are skipped without counting. Duplicates are
    /// absorbed per row by the uniqueness constraint on `api_id`
    /// (`ON CONFLICT DO NOTHING`), which also makes concurrent runs safe —
    /// whichever run wins the insert, the loser sees a no-op. Rows are
    /// committed individually, so work done before a fatal store error
    /// survives; any non-duplicate failure aborts the rest of the batch.
    pub async fn insert_curated(&self, reviews: &[SourceReview]) -> Result<u64> {
        let pool = self.connect().await?;
        let statement = insert_statement(&self.config.table);

        let mut inserted = 0u64;
        for raw in reviews {
            let Some(review) = CuratedReview::from_source(raw) else {
                debug!(id = ?raw.id, "Skipping incomplete review");
                continue;
            };

            let result = sqlx::query(&statement)
                .bind(review.api_id)
                .bind(&review.text)
                .bind(review.sentiment.as_deref())
                .bind(review.occurred_at)
                .execute(&pool)
                .await
                .map_err(ReviewsError::StoreOperation)?;

            if result.rows_affected() == 1 {
                inserted += 1;
            } else {
                debug!(api_id = review.api_id, "Already ingested, skipping duplicate");
            }
        }

        Ok(inserted)
    }

    /// Most-recently-dated rows, newest first.
    pub async fn latest(&self, limit: i64) -> Result<Vec<StoredReview>> {
        let pool = self.connect().await?;

        let statement = format!(
            "SELECT api_id, text, sentiment, occurred_at, ingested_at \
             FROM {} ORDER BY occurred_at DESC LIMIT $1",
            self.config.table
        );

        sqlx::query_as::<_, StoredReview>(&statement)
            .bind(limit)
            .fetch_all(&pool)
            .await
            .map_err(ReviewsError::StoreOperation)
    }
}

/// DDL for the destination table. `IF NOT EXISTS` carries the idempotence;
/// the UNIQUE constraint on `api_id` carries the dedup contract.
fn bootstrap_statements(table: &str) -> Vec<String> {
    let suffix = index_suffix(table);
    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id BIGSERIAL PRIMARY KEY,
                api_id BIGINT NOT NULL UNIQUE,
                text TEXT NOT NULL,
                sentiment TEXT NULL,
                occurred_at TIMESTAMPTZ NOT NULL,
                ingested_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"
        ),
        format!("CREATE INDEX IF NOT EXISTS ix_{suffix}_occurred_at ON {table} (occurred_at)"),
        format!("CREATE INDEX IF NOT EXISTS ix_{suffix}_sentiment ON {table} (sentiment)"),
    ]
}

fn insert_statement(table: &str) -> String {
    format!(
        "INSERT INTO {table} (api_id, text, sentiment, occurred_at) \
         VALUES ($1, $2, $3, $4) ON CONFLICT (api_id) DO NOTHING"
    )
}

/// Index-name fragment for a possibly schema-qualified table name
fn index_suffix(table: &str) -> String {
    table.replace('.', "_")
}
