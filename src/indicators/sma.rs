// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// SMA_t = mean(close_{t-period+1} .. close_t)
//
// The output is aligned with the input: element `i` is the mean of the
// `period` closes ending at `i`, or `None` while fewer than `period` closes
// exist. Indicators must read `None` during warm-up, not zero — a zero would
// look like a catastrophic price to the breakdown rules.
// =============================================================================

use crate::indicators::window::RollingMean;

/// Compute the SMA series for `closes` with the given look-back `period`.
///
/// # Edge cases
/// - `period == 0` => all `None` (no meaningful window)
/// - `closes.len() < period` => all `None`
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut window = RollingMean::new(period);
    closes.iter().map(|&close| window.push(close)).collect()
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_empty_input() {
        assert!(calculate_sma(&[], 5).is_empty());
    }

    #[test]
    fn sma_period_zero_is_all_none() {
        assert_eq!(calculate_sma(&[1.0, 2.0, 3.0], 0), vec![None, None, None]);
    }

    #[test]
    fn sma_output_aligned_with_input() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sma = calculate_sma(&closes, 3);
        assert_eq!(sma.len(), closes.len());
        assert_eq!(sma[0], None);
        assert_eq!(sma[1], None);
        assert_eq!(sma[2], Some(2.0));
        assert_eq!(sma[3], Some(3.0));
        assert_eq!(sma[4], Some(4.0));
    }

    #[test]
    fn sma_shorter_than_period_is_all_none() {
        let sma = calculate_sma(&[10.0, 20.0], 3);
        assert_eq!(sma, vec![None, None]);
    }

    #[test]
    fn sma_constant_series() {
        let closes = [42.0; 10];
        let sma = calculate_sma(&closes, 4);
        for value in sma.iter().skip(3) {
            assert!((value.unwrap() - 42.0).abs() < 1e-12);
        }
    }
}
