//! Thesis format checker server
//!
//! Accepts `.docx` thesis uploads, runs the compliance rule book over them and
//! serves the rendered PDF reports. Endpoints:
//!
//! - `POST /api/analyze` (multipart field `file`)
//! - `GET /api/report/{job_id}.pdf`
//! - `GET /health`
//! - `/` and `/static/*` for the bundled front-end
//!
//! Rate limiting is per client IP via tower-governor. Cached reports are
//! swept after the retention period.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use compliance_engine::ComplianceEngine;
use shared_types::ReportConfig;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod cleanup;
mod error;
mod state;
#[cfg(test)]
mod tests;

use api::{handle_analyze, handle_analyze_get, handle_health, handle_index, handle_report};
use state::AppState;

/// Command-line arguments for the thesis server
#[derive(Parser, Debug)]
#[command(name = "thesis-server")]
#[command(about = "Thesis format checker: .docx analysis and PDF reports")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Rule book
    #[arg(long, default_value = "config/rules.yaml")]
    rules: PathBuf,

    /// Report configuration
    #[arg(long, default_value = "config/report.yaml")]
    report: PathBuf,

    /// Directory for uploads while they are analysed
    #[arg(long, default_value = "uploads_tmp")]
    upload_dir: PathBuf,

    /// Directory for cached reports
    #[arg(long, default_value = "reports_tmp")]
    reports_dir: PathBuf,

    /// Directory served under /static
    #[arg(long, default_value = "apps/thesis-server/static")]
    static_dir: PathBuf,

    /// Minutes a cached report stays downloadable
    #[arg(long, default_value = "90")]
    retention_minutes: u64,

    /// Maximum upload size in megabytes
    #[arg(long, default_value = "50")]
    max_upload_mb: usize,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "5")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Routes, body limit, CORS and request tracing. Rate limiting is added in
/// `main` because it needs the peer address.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/api/analyze", post(handle_analyze).get(handle_analyze_get))
        .route("/api/report/:file", get(handle_report))
        .nest_service("/static", ServeDir::new(&state.static_dir))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting thesis server on {}:{}", args.host, args.port);

    let engine = ComplianceEngine::from_path(&args.rules)
        .with_context(|| format!("loading rules from {}", args.rules.display()))?;
    let report = ReportConfig::from_path(&args.report)
        .with_context(|| format!("loading report configuration from {}", args.report.display()))?;

    std::fs::create_dir_all(&args.upload_dir)?;
    std::fs::create_dir_all(&args.reports_dir)?;

    let state = AppState {
        upload_dir: args.upload_dir.clone(),
        reports_dir: args.reports_dir.clone(),
        static_dir: args.static_dir.clone(),
        retention: Duration::from_secs(args.retention_minutes * 60),
        max_upload_bytes: args.max_upload_mb * 1024 * 1024,
        ..AppState::new(engine, report)
    };

    // Sweep at a tenth of the retention period, at least once a minute
    let every = Duration::from_secs((args.retention_minutes * 6).max(60));
    cleanup::spawn_sweeper(state.clone(), every);

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.max(1).into())
            .burst_size(args.rate_limit.max(1) * 2)
            .finish()
            .context("invalid rate limit")?,
    );

    let app = app(state).layer(GovernorLayer {
        config: governor_conf,
    });

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Report retention: {} minutes", args.retention_minutes);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
