//! ledgerflow - Ledger pagination and per-account aggregation
//!
//! Fetches every page of ledger entries with a pool of concurrent workers,
//! aggregates entry counts and totals per account, and emits the result.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin ledgerflow -- --sink both
//! ```
//!
//! ## Environment Variables
//!
//! - LEDGER_SOURCE_URL - Base URL of the ledger API (required)
//! - LEDGER_TOKEN - Access token appended to requests (optional)
//! - LEDGER_PAGE_SIZE - Entries per page (default: 1)
//! - LEDGER_POOL_SIZE - Concurrent fetch workers (default: 50)
//! - LEDGER_START_OFFSET - First offset to fetch (default: 0)
//! - LEDGER_HTTP_TIMEOUT_SECS - Per-request timeout (default: 30)
//! - LEDGER_SUBMIT_URL - Submission endpoint, for --sink remote|both
//! - LEDGER_OUTPUT_PATH - Output file, for --sink file
//! - LEDGER_RESULT_KEY - Top-level key wrapping the result (default: result)
//! - RUST_LOG - Logging level (optional, default: info)

use ledgerflow::config::{Config, SinkKind};
use ledgerflow::emit::ResultEmitter;
use ledgerflow::engine::run_pagination;
use ledgerflow::source::{HttpPageSource, PageSource};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    if let Err(e) = run().await {
        log::error!("❌ Run aborted: {}", e);
        eprintln!("ledgerflow: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    // Logs go to stderr; stdout carries the emitted aggregate
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.rust_log))
        .target(env_logger::Target::Stderr)
        .init();

    let sink = SinkKind::parse_from_args()?;
    config.validate_sink(sink)?;

    log::info!("🚀 Starting ledgerflow");
    log::info!("   Source: {}", config.source_url);
    log::info!("   Page size: {}", config.page_size);
    log::info!("   Pool size: {}", config.pool_size);
    log::info!("   Start offset: {}", config.start_offset);
    log::info!("   Sink: {}", sink.as_str());

    let source: Arc<dyn PageSource> = Arc::new(HttpPageSource::from_config(&config)?);
    let mut emitter = ResultEmitter::from_config(sink, &config)?;
    log::info!("📊 Sinks: {}", emitter.sink_types().join(", "));

    let report = run_pagination(source, config.pool_size, config.start_offset).await?;

    emitter.emit(&report.accounts).await?;

    log::info!(
        "✅ Emitted {} accounts ({} entries)",
        report.stats.accounts,
        report.stats.entries
    );
    Ok(())
}
