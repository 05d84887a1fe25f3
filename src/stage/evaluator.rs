// =============================================================================
// Stage Rule Evaluator — staged-entry state machine
// =============================================================================
//
// Per instrument, per run, exactly one of four things happens:
//
//   1. A transition rule fires  => a new stage starts, replacing any active
//      stage regardless of which rule opened it.
//   2. No rule fires, a stage is active with days remaining => the stage
//      progresses and its countdown is decremented by one.
//   3. No rule fires, the countdown is already exhausted => the stage is
//      deleted; the staged purchase program is complete.
//   4. No rule fires, no stage is active => nothing.
//
// Transition rules in strict priority order (first match wins):
//
//   RSI re-entry       close below long MA with RSI <= oversold   (3rd tranche)
//   Long-MA breakdown  close crossed from above to at-or-below    (2nd tranche)
//   Short-MA breakdown close crossed from above to at-or-below    (1st tranche)
//
// The MA rules require yesterday's close *above* the average — plain
// dwelling below an MA never re-fires a breakdown, only the crossing does.
// The RSI rule has no such hysteresis: an oversold close below the long MA
// always restarts the deepest stage, so a shallower signal that fired
// earlier can never mask it.
// =============================================================================

use crate::indicators::Reading;
use crate::types::{Stage, StageRecord};

/// Thresholds and countdown lengths for the transition rules.
#[derive(Debug, Clone, Copy)]
pub struct StageRules {
    /// RSI at or below this value counts as oversold.
    pub rsi_oversold: f64,

    /// Countdown length for MA-breakdown stages.
    pub ma_stage_days: u32,

    /// Countdown length for the RSI re-entry stage.
    pub rsi_stage_days: u32,
}

impl Default for StageRules {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            ma_stage_days: 5,
            rsi_stage_days: 40,
        }
    }
}

impl StageRules {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            rsi_oversold: config.rsi_oversold,
            ma_stage_days: config.ma_stage_days,
            rsi_stage_days: config.rsi_stage_days,
        }
    }
}

/// What one evaluation decided for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// A transition rule fired; `record` replaces any active stage.
    Started { record: StageRecord },

    /// The active stage continues. `record` carries the decremented
    /// countdown; `days_reported` is the pre-decrement value the operator
    /// sees in the progress notification.
    Progressed { record: StageRecord, days_reported: u32 },

    /// The countdown reached zero with no new signal; the record is deleted
    /// and no notification is sent.
    Completed { stage: Stage },

    /// No rule fired and no stage was active.
    Idle,
}

/// Evaluate the transition rules for one instrument.
///
/// `prev` and `last` are the two most-recent fully-defined snapshots;
/// `existing` is the persisted stage for this instrument, if any. The
/// function is pure — applying the outcome to the stage table is the
/// caller's job, which keeps the priority and countdown laws testable
/// without any I/O.
pub fn evaluate(
    rules: &StageRules,
    ticker: &str,
    prev: &Reading,
    last: &Reading,
    existing: Option<&StageRecord>,
) -> StageOutcome {
    // Rule 1 — RSI re-entry: oversold below the long MA. Highest priority so
    // the deepest signal is never masked by an in-flight shallower stage.
    if last.close < last.ma_long && last.rsi <= rules.rsi_oversold {
        return StageOutcome::Started {
            record: StageRecord::new(ticker, Stage::Rsi, rules.rsi_stage_days, last.date),
        };
    }

    // Rule 2 — long-MA breakdown: crossed from above to at-or-below.
    if prev.close > prev.ma_long && last.close <= last.ma_long {
        return StageOutcome::Started {
            record: StageRecord::new(ticker, Stage::MaLong, rules.ma_stage_days, last.date),
        };
    }

    // Rule 3 — short-MA breakdown.
    if prev.close > prev.ma_short && last.close <= last.ma_short {
        return StageOutcome::Started {
            record: StageRecord::new(ticker, Stage::MaShort, rules.ma_stage_days, last.date),
        };
    }

    // No transition: advance or retire the stage already in flight.
    match existing {
        Some(record) if record.days_remaining > 0 => {
            let mut updated = record.clone();
            updated.days_remaining -= 1;
            StageOutcome::Progressed {
                days_reported: record.days_remaining,
                record: updated,
            }
        }
        Some(record) => StageOutcome::Completed { stage: record.stage },
        None => StageOutcome::Idle,
    }
}
