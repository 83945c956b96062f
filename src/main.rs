//! contpal - business report ingestion and word frequency analysis.
//!
//! A tool for ingesting bundles of business documents (PDF, DOCX, plain
//! text), resolving which company and fiscal year each one belongs to, and
//! accumulating per-year word frequency statistics.

use contpal::cli;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "contpal=info"
    } else {
        "contpal=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    cli::run()
}
