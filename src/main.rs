// =============================================================================
// ETF Sentinel — Main Entry Point
// =============================================================================
//
// One process invocation is one evaluation run: intended to be fired once
// per trading day by an external scheduler (cron / CI workflow). The stage
// table is loaded before the run and persisted after it; everything in
// between is in-memory.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod config;
mod history;
mod indicators;
mod notify;
mod orchestrator;
mod stage;
mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::history::YahooClient;
use crate::notify::TelegramClient;
use crate::orchestrator::Orchestrator;
use crate::stage::StageStore;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("ETF Sentinel — starting evaluation run");

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        tickers = ?config.tickers,
        ma_short = config.ma_short_window,
        ma_long = config.ma_long_window,
        rsi_period = config.rsi_period,
        lookback_days = config.lookback_days,
        "configuration loaded"
    );

    // ── 2. Stage state ───────────────────────────────────────────────────
    // An unreadable state file aborts the run: treating corrupt state as
    // empty would spuriously restart every active countdown.
    let store = StageStore::new(&config.state_path);
    let mut table = store.load().context("failed to load stage state")?;

    // ── 3. Collaborators ─────────────────────────────────────────────────
    let history = Arc::new(YahooClient::new());
    let notifier = Arc::new(TelegramClient::new(
        config.bot_token.clone(),
        config.chat_id.clone(),
    ));

    // ── 4. Evaluate all instruments against today ────────────────────────
    let today = chrono::Utc::now().date_naive();
    let orchestrator = Orchestrator::new(config, history, notifier);
    let report = orchestrator.run(&mut table, today).await;

    // ── 5. Persist the mutated table in one atomic write ─────────────────
    store.save(&table).context("failed to persist stage state")?;

    info!(
        evaluated = report.evaluated,
        skipped = report.skipped,
        stages_started = report.stages_started,
        stages_progressed = report.stages_progressed,
        stages_completed = report.stages_completed,
        active_stages = table.len(),
        "ETF Sentinel run complete"
    );
    Ok(())
}
