// =============================================================================
// Price History Module
// =============================================================================
//
// Narrow contract to whatever serves daily closes. The orchestrator only
// ever sees the trait, so tests drive it with canned in-memory series.

use anyhow::Result;
use async_trait::async_trait;

use crate::types::PricePoint;

pub mod yahoo;

pub use yahoo::YahooClient;

/// Source of daily price history for one instrument.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch up to `lookback_days` calendar days of daily closes, oldest
    /// first. An empty or short series is a valid answer ("no data"), not
    /// an error; errors mean the fetch itself failed.
    async fn fetch_daily(&self, ticker: &str, lookback_days: u32) -> Result<Vec<PricePoint>>;
}
