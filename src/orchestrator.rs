// =============================================================================
// Run Orchestrator — one full evaluation pass over all instruments
// =============================================================================
//
// Pipeline per instrument, sequential, one at a time:
//
//   1. Fetch daily history from the history source
//   2. Compute indicator snapshots (MA short/long + RSI)
//   3. Guards: enough complete snapshots, most recent bar not in the future
//   4. Run the stage rules against the persisted record
//   5. Apply the outcome to the in-memory stage table
//   6. Notify the operator (delivery failures are logged, never fatal)
//
// Fetch or guard failures skip the instrument — no state mutation, no
// notification — and the run continues. The caller owns loading the table
// before the run and persisting it afterwards, so a crash mid-run never
// half-writes state.
// =============================================================================

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::history::HistorySource;
use crate::indicators::{compute_snapshots, last_two_complete, IndicatorParams, Reading};
use crate::notify::Notifier;
use crate::stage::{evaluate, StageOutcome, StageRules, StageTable};
use crate::types::{Stage, StageRecord};

/// Per-run accounting, mostly for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub evaluated: usize,
    pub skipped: usize,
    pub stages_started: usize,
    pub stages_progressed: usize,
    pub stages_completed: usize,
}

/// One line of the end-of-run RSI summary.
#[derive(Debug, Clone)]
struct SummaryRow {
    ticker: String,
    close: Option<f64>,
    rsi: Option<f64>,
}

/// Drives one evaluation run across all configured instruments.
pub struct Orchestrator {
    config: Config,
    params: IndicatorParams,
    rules: StageRules,
    history: Arc<dyn HistorySource>,
    notifier: Arc<dyn Notifier>,
}

impl Orchestrator {
    pub fn new(config: Config, history: Arc<dyn HistorySource>, notifier: Arc<dyn Notifier>) -> Self {
        let params = IndicatorParams {
            ma_short_window: config.ma_short_window,
            ma_long_window: config.ma_long_window,
            rsi_period: config.rsi_period,
        };
        let rules = StageRules::from_config(&config);
        Self {
            config,
            params,
            rules,
            history,
            notifier,
        }
    }

    /// Evaluate every configured instrument against `today` and mutate the
    /// stage table in place. The table is not persisted here.
    pub async fn run(&self, table: &mut StageTable, today: NaiveDate) -> RunReport {
        let mut report = RunReport::default();
        let mut summary = Vec::with_capacity(self.config.tickers.len());

        for ticker in &self.config.tickers {
            match self.evaluate_ticker(ticker, table, today, &mut report).await {
                Some(last) => {
                    report.evaluated += 1;
                    summary.push(SummaryRow {
                        ticker: ticker.clone(),
                        close: Some(last.close),
                        rsi: Some(last.rsi),
                    });
                }
                None => {
                    report.skipped += 1;
                    summary.push(SummaryRow {
                        ticker: ticker.clone(),
                        close: None,
                        rsi: None,
                    });
                }
            }
        }

        self.notify(&summary_message(&summary)).await;

        info!(
            evaluated = report.evaluated,
            skipped = report.skipped,
            started = report.stages_started,
            progressed = report.stages_progressed,
            completed = report.stages_completed,
            "run finished"
        );
        report
    }

    /// Process one instrument. Returns the latest complete reading, or
    /// `None` when the instrument was skipped.
    async fn evaluate_ticker(
        &self,
        ticker: &str,
        table: &mut StageTable,
        today: NaiveDate,
        report: &mut RunReport,
    ) -> Option<Reading> {
        let prices = match self.history.fetch_daily(ticker, self.config.lookback_days).await {
            Ok(prices) => prices,
            Err(e) => {
                warn!(ticker, error = %e, "history fetch failed — skipping instrument");
                return None;
            }
        };

        let snapshots = compute_snapshots(&prices, &self.params);
        let (prev, last) = match last_two_complete(&snapshots) {
            Some(pair) => pair,
            None => {
                warn!(
                    ticker,
                    bars = prices.len(),
                    min = self.params.min_history(),
                    "insufficient history — skipping instrument"
                );
                return None;
            }
        };

        // A bar dated past the reference date means the feed handed back
        // partially-formed data; do not evaluate against it.
        if last.date > today {
            warn!(
                ticker,
                bar_date = %last.date,
                reference = %today,
                "most recent bar is in the future — skipping instrument"
            );
            return None;
        }

        let outcome = evaluate(&self.rules, ticker, &prev, &last, table.get(ticker));
        self.apply_outcome(ticker, outcome, table, &last, report).await;

        Some(last)
    }

    /// Mutate the stage table per the outcome and send the matching
    /// notification.
    async fn apply_outcome(
        &self,
        ticker: &str,
        outcome: StageOutcome,
        table: &mut StageTable,
        last: &Reading,
        report: &mut RunReport,
    ) {
        match outcome {
            StageOutcome::Started { record } => {
                info!(
                    ticker,
                    stage = %record.stage,
                    days = record.days_remaining,
                    "stage started"
                );
                let message = start_message(&self.config, &record, last);
                table.insert(ticker.to_string(), record);
                report.stages_started += 1;
                self.notify(&message).await;
            }
            StageOutcome::Progressed { record, days_reported } => {
                info!(
                    ticker,
                    stage = %record.stage,
                    days_remaining = days_reported,
                    "stage in progress"
                );
                let message = progress_message(&record, days_reported);
                table.insert(ticker.to_string(), record);
                report.stages_progressed += 1;
                self.notify(&message).await;
            }
            StageOutcome::Completed { stage } => {
                // The staged purchase program ran its course; removal is
                // silent by design.
                info!(ticker, stage = %stage, "stage completed, record removed");
                table.remove(ticker);
                report.stages_completed += 1;
            }
            StageOutcome::Idle => {
                debug!(ticker, "no signal, no active stage");
            }
        }
    }

    /// Fire-and-forget delivery: a failed send is logged and swallowed.
    async fn notify(&self, message: &str) {
        if let Err(e) = self.notifier.send_text(message).await {
            warn!(error = %e, "notification delivery failed — continuing");
        }
    }
}

// =============================================================================
// Message templates
// =============================================================================

fn start_message(config: &Config, record: &StageRecord, last: &Reading) -> String {
    match record.stage {
        Stage::MaShort => format!(
            "🟡 <b>{}</b> — 1st tranche signal\n\
             Close {:.2} broke below MA{} ({:.2})\n\
             Staged entry open for {} day(s)",
            record.ticker, last.close, config.ma_short_window, last.ma_short, record.days_remaining
        ),
        Stage::MaLong => format!(
            "🟠 <b>{}</b> — 2nd tranche signal\n\
             Close {:.2} broke below MA{} ({:.2})\n\
             Staged entry open for {} day(s)",
            record.ticker, last.close, config.ma_long_window, last.ma_long, record.days_remaining
        ),
        Stage::Rsi => format!(
            "🔴 <b>{}</b> — 3rd tranche signal\n\
             Close {:.2} under MA{} ({:.2}) with RSI {:.1} (oversold ≤ {:.0})\n\
             Staged entry open for {} day(s)",
            record.ticker,
            last.close,
            config.ma_long_window,
            last.ma_long,
            last.rsi,
            config.rsi_oversold,
            record.days_remaining
        ),
    }
}

fn progress_message(record: &StageRecord, days_reported: u32) -> String {
    format!(
        "⏳ <b>{}</b> — {} tranche ({}) in progress, {} day(s) remaining",
        record.ticker,
        record.stage.tranche(),
        record.stage,
        days_reported
    )
}

fn summary_message(rows: &[SummaryRow]) -> String {
    let mut lines = vec!["📊 <b>Daily RSI summary</b>".to_string()];

    for row in rows {
        let line = match (row.close, row.rsi) {
            (Some(close), Some(rsi)) => {
                let marker = if rsi <= 30.0 {
                    " 🔻 oversold"
                } else if rsi >= 70.0 {
                    " 🔺 overbought"
                } else {
                    ""
                };
                format!("{}: {:.2} | RSI {:.1}{}", row.ticker, close, rsi, marker)
            }
            _ => format!("{}: N/A", row.ticker),
        };
        lines.push(line);
    }

    lines.join("\n")
}
