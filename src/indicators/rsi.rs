// =============================================================================
// Relative Strength Index (RSI) — plain rolling-window variant
// =============================================================================
//
// RSI measures the balance of recent gains against recent losses:
//
//   delta_t    = close_t - close_{t-1}
//   gain_t     = max(delta_t, 0),  loss_t = max(-delta_t, 0)
//   avg_gain_t = rolling mean of the last `period` gains
//   avg_loss_t = rolling mean of the last `period` losses
//   RS         = avg_gain / avg_loss
//   RSI        = 100 - 100 / (1 + RS)
//
// This is the simple rolling-mean formulation, NOT Wilder's exponential
// smoothing: the averages are plain means over a fixed trailing window, so
// an old delta drops out of the value entirely once it leaves the window.
//
// Thresholds: RSI <= 30 => oversold, RSI >= 70 => overbought.
// =============================================================================

use crate::indicators::window::RollingMean;

/// Compute the RSI series for `closes`, aligned index-for-index with input.
///
/// `rsi[i]` is defined once `period` deltas precede it, i.e. from index
/// `period` onward (`period + 1` closes consumed).
///
/// # Edge cases
/// - `period == 0` or `closes.len() < period + 1` => all `None`
/// - `avg_loss == 0` with `avg_gain > 0` => RSI saturates at exactly 100
/// - `avg_loss == 0` and `avg_gain == 0` (flat window) => `None`: there is
///   no price movement to measure, and pinning a neutral number would let
///   the oversold rule compare against an invented value
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains = RollingMean::new(period);
    let mut losses = RollingMean::new(period);
    let mut result = Vec::with_capacity(closes.len());

    for (i, &close) in closes.iter().enumerate() {
        if i == 0 {
            // No delta exists for the first close.
            result.push(None);
            continue;
        }

        let delta = close - closes[i - 1];
        let avg_gain = gains.push(delta.max(0.0));
        let avg_loss = losses.push((-delta).max(0.0));

        let rsi = match (avg_gain, avg_loss) {
            (Some(gain), Some(loss)) => rsi_from_averages(gain, loss),
            _ => None,
        };
        result.push(rsi);
    }

    result
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` for a windowful of zero movement or a non-finite result.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        return None;
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn defined(series: &[Option<f64>]) -> Vec<f64> {
        series.iter().filter_map(|v| *v).collect()
    }

    // ---- alignment & warm-up ---------------------------------------------

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero_is_all_none() {
        let series = calculate_rsi(&[1.0, 2.0, 3.0], 0);
        assert!(series.iter().all(|v| v.is_none()));
    }

    #[test]
    fn rsi_insufficient_closes_is_all_none() {
        // 14 closes give only 13 deltas — one short of a full window.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 14);
        assert!(series.iter().all(|v| v.is_none()));
    }

    #[test]
    fn rsi_first_defined_index_is_period() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), closes.len());
        for (i, value) in series.iter().enumerate() {
            assert_eq!(value.is_some(), i >= 14, "index {i}");
        }
    }

    // ---- value behaviour --------------------------------------------------

    #[test]
    fn rsi_all_gains_saturates_at_100() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        for value in defined(&calculate_rsi(&closes, 14)) {
            assert!((value - 100.0).abs() < 1e-10, "expected 100.0, got {value}");
        }
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        for value in defined(&calculate_rsi(&closes, 14)) {
            assert!(value.abs() < 1e-10, "expected 0.0, got {value}");
        }
    }

    #[test]
    fn rsi_flat_market_is_undefined() {
        // Zero movement in the window — no strength to measure.
        let closes = vec![100.0; 30];
        let series = calculate_rsi(&closes, 14);
        assert!(series.iter().all(|v| v.is_none()));
    }

    #[test]
    fn rsi_always_within_bounds() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13, 44.01, 43.50,
        ];
        for value in defined(&calculate_rsi(&closes, 14)) {
            assert!((0.0..=100.0).contains(&value), "RSI {value} out of range");
        }
    }

    #[test]
    fn rsi_old_deltas_leave_the_window() {
        // One large early loss followed by steady gains: with a plain rolling
        // window the loss eventually drops out entirely and RSI hits 100.
        // Wilder's smoothing would keep a trace of it forever.
        let mut closes = vec![100.0, 80.0];
        let mut price = 80.0;
        for _ in 0..10 {
            price += 1.0;
            closes.push(price);
        }
        let series = calculate_rsi(&closes, 5);
        let last = series.last().unwrap().unwrap();
        assert!((last - 100.0).abs() < 1e-10, "expected 100.0, got {last}");
    }

    #[test]
    fn rsi_balanced_moves_are_50() {
        // Alternating +1 / -1: average gain equals average loss.
        let closes: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let series = calculate_rsi(&closes, 4);
        let last = series.last().unwrap().unwrap();
        assert!((last - 50.0).abs() < 1e-10, "expected 50.0, got {last}");
    }
}
