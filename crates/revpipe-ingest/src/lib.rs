//! Revpipe Ingest Library
//!
//! One-shot, idempotent ingestion of review records from a remote HTTP API
//! into a PostgreSQL analytics table.
//!
//! The pipeline performs exactly one pass per invocation:
//! seed the source when it is empty (optional) → fetch all reviews →
//! bootstrap the destination schema → validate, normalize and insert with
//! duplicate absorption → log a small read-back sample. All memory of prior
//! runs lives in the destination table's uniqueness constraint, so re-runs
//! and overlapping runs are safe.
//!
//! # Example
//!
//! ```no_run
//! use revpipe_ingest::reviews::{IngestConfig, ReviewsPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::load()?;
//!     let stats = ReviewsPipeline::new(config).run().await?;
//!     println!("inserted {} new rows", stats.inserted);
//!     Ok(())
//! }
//! ```

pub mod reviews;
