//! Revpipe Ingest - one ingestion pass per invocation

use clap::Parser;
use revpipe_common::logging::{init_logging, LogConfig, LogLevel};
use revpipe_ingest::reviews::{IngestConfig, ReviewsError, ReviewsPipeline};
use tracing::{error, info};

/// Exit code when the review source is irrecoverably unreachable
const EXIT_SOURCE_UNREACHABLE: i32 = 1;

/// Exit code when the destination store (or the configuration) fails
const EXIT_STORE_FAILURE: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "revpipe-ingest")]
#[command(author, version, about = "Incremental review ingestion into the analytics store")]
struct Cli {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Environment configuration wins; --verbose only raises the default level
    let mut log_config = LogConfig::from_env().unwrap_or_default();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    if let Err(err) = init_logging(&log_config) {
        eprintln!("Failed to initialize logging: {}", err);
        std::process::exit(EXIT_STORE_FAILURE);
    }

    let config = match IngestConfig::load() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Invalid configuration");
            std::process::exit(EXIT_STORE_FAILURE);
        }
    };

    info!(
        api_base = %config.source.base_url,
        verify_tls = config.source.verify_tls,
        fallback = config.source.allow_http_fallback,
        seed_if_empty = config.source.seed_if_empty,
        table = %config.store.table,
        "Starting review ingestion"
    );

    let pipeline = ReviewsPipeline::new(config);
    match pipeline.run().await {
        Ok(stats) => {
            info!(
                seeded = stats.seeded,
                fetched = stats.fetched,
                inserted = stats.inserted,
                fell_back = stats.fell_back,
                "Ingestion complete"
            );
        }
        Err(err) => {
            error!(error = %err, "Ingestion failed");
            std::process::exit(exit_code(&err));
        }
    }
}

/// Map a pipeline failure to its distinct process exit code
fn exit_code(err: &ReviewsError) -> i32 {
    match err {
        ReviewsError::Transport(_)
        | ReviewsError::Tls(_)
        | ReviewsError::HttpStatus { .. }
        | ReviewsError::Protocol(_) => EXIT_SOURCE_UNREACHABLE,
        ReviewsError::StoreConnect(_)
        | ReviewsError::StoreOperation(_)
        | ReviewsError::Config(_) => EXIT_STORE_FAILURE,
    }
}
