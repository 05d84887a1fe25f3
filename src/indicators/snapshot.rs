// =============================================================================
// Indicator snapshots — one fused view per trading day
// =============================================================================
//
// A snapshot bundles the close with both moving averages and RSI for one
// date. Each value is a pure function of the series up to and including that
// date — there is no lookahead, so re-computing over a prefix of the series
// reproduces the prefix of the snapshots exactly.
// =============================================================================

use chrono::NaiveDate;

use crate::indicators::rsi::calculate_rsi;
use crate::indicators::sma::calculate_sma;
use crate::types::PricePoint;

/// Window sizes fed to the indicator engine.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorParams {
    pub ma_short_window: usize,
    pub ma_long_window: usize,
    pub rsi_period: usize,
}

impl IndicatorParams {
    /// Minimum series length for at least one fully-defined snapshot.
    pub fn min_history(&self) -> usize {
        self.ma_short_window
            .max(self.ma_long_window)
            .max(self.rsi_period)
            + 1
    }
}

/// Derived indicator values for one trading day. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
    pub rsi: Option<f64>,
}

impl IndicatorSnapshot {
    /// A snapshot is complete when every indicator has a full window behind it.
    pub fn is_complete(&self) -> bool {
        self.ma_short.is_some() && self.ma_long.is_some() && self.rsi.is_some()
    }

    /// The fully-defined view of a complete snapshot, or `None` during warm-up.
    pub fn reading(&self) -> Option<Reading> {
        Some(Reading {
            date: self.date,
            close: self.close,
            ma_short: self.ma_short?,
            ma_long: self.ma_long?,
            rsi: self.rsi?,
        })
    }
}

/// A complete snapshot with every indicator present — the only shape the
/// stage rules ever see, so rule code never handles missing values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub date: NaiveDate,
    pub close: f64,
    pub ma_short: f64,
    pub ma_long: f64,
    pub rsi: f64,
}

/// Compute one snapshot per price point, in input order.
pub fn compute_snapshots(prices: &[PricePoint], params: &IndicatorParams) -> Vec<IndicatorSnapshot> {
    let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();

    let ma_short = calculate_sma(&closes, params.ma_short_window);
    let ma_long = calculate_sma(&closes, params.ma_long_window);
    let rsi = calculate_rsi(&closes, params.rsi_period);

    prices
        .iter()
        .enumerate()
        .map(|(i, point)| IndicatorSnapshot {
            date: point.date,
            close: point.close,
            ma_short: ma_short[i],
            ma_long: ma_long[i],
            rsi: rsi[i],
        })
        .collect()
}

/// The two most-recent fully-defined snapshots as `(prev, last)` readings.
///
/// Returns `None` when fewer than two complete snapshots exist — the caller
/// treats that as insufficient history and skips the instrument.
pub fn last_two_complete(snapshots: &[IndicatorSnapshot]) -> Option<(Reading, Reading)> {
    let mut iter = snapshots.iter().rev().filter_map(|s| s.reading());
    let last = iter.next()?;
    let prev = iter.next()?;
    Some((prev, last))
}
