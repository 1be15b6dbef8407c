use std::sync::Arc;
use std::time::Instant;

use panedeck_proto::config::Config;
use panedeck_proto::platform;
use panedeck_tui::app::App;
use panedeck_tui::provider::{IssueSource, MemoryIssues};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("panedeck.log");
    let ui_state_path = data_dir.join("ui_state.json");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("panedeck log: {}", log_path.display());

    tracing::info!("panedeck starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load_or_default();

    // ── Issue source ─────────────────────────────────────────────────────────
    let issues: Arc<dyn IssueSource> = match &config.paths.issues_file {
        Some(path) => match MemoryIssues::from_file(path) {
            Ok(source) => Arc::new(source),
            Err(e) => {
                tracing::warn!("issues file {}: {:#}; using sample issues", path.display(), e);
                Arc::new(MemoryIssues::sample())
            }
        },
        None => Arc::new(MemoryIssues::sample()),
    };

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = App::new(config, issues, Some(ui_state_path), Instant::now());
    app.run().await?;

    Ok(())
}
