// =============================================================================
// Yahoo Finance chart client — daily close history
// =============================================================================
//
// GET https://query1.finance.yahoo.com/v8/finance/chart/{ticker}
//       ?range={n}d&interval=1d
//
// The v8 chart payload carries parallel arrays: unix `timestamp`s and
// `indicators.quote[0].close` values. Closes can be null mid-array (halted
// sessions); those entries are dropped rather than zero-filled, because a
// zero close would read as a crash to the breakdown rules.
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use tracing::{debug, instrument, warn};

use crate::history::HistorySource;
use crate::types::PricePoint;

/// Unauthenticated Yahoo Finance v8 chart API client.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            // Yahoo rejects requests without a browser-ish user agent.
            .user_agent("Mozilla/5.0 (compatible; etf-sentinel/1.0)")
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("failed to build reqwest client");

        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            client,
        }
    }

    /// Extract `(date, close)` pairs from a v8 chart payload.
    ///
    /// A missing or empty `chart.result` is "no data" and yields an empty
    /// series; a structurally broken payload is an error.
    fn parse_chart(body: &serde_json::Value) -> Result<Vec<PricePoint>> {
        if let Some(err) = body["chart"]["error"].as_object() {
            warn!(error = ?err, "chart payload carries an error object — treating as no data");
            return Ok(Vec::new());
        }

        let result = match body["chart"]["result"].as_array().and_then(|r| r.first()) {
            Some(result) => result,
            None => return Ok(Vec::new()),
        };

        let timestamps = match result["timestamp"].as_array() {
            Some(ts) => ts,
            // Valid payloads for delisted tickers omit the array entirely.
            None => return Ok(Vec::new()),
        };

        let closes = result["indicators"]["quote"][0]["close"]
            .as_array()
            .context("chart payload missing indicators.quote[0].close")?;

        anyhow::ensure!(
            timestamps.len() == closes.len(),
            "chart payload arrays disagree: {} timestamps vs {} closes",
            timestamps.len(),
            closes.len()
        );

        let mut points = Vec::with_capacity(timestamps.len());
        for (ts, close) in timestamps.iter().zip(closes) {
            let secs = ts.as_i64().context("non-integer timestamp in chart payload")?;
            let close = match close.as_f64() {
                Some(value) if value.is_finite() => value,
                // Null close: session without a settled price.
                _ => continue,
            };
            let date = DateTime::from_timestamp(secs, 0)
                .context("timestamp out of range in chart payload")?
                .date_naive();
            points.push(PricePoint { date, close });
        }

        Ok(points)
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistorySource for YahooClient {
    #[instrument(skip(self), name = "yahoo::fetch_daily")]
    async fn fetch_daily(&self, ticker: &str, lookback_days: u32) -> Result<Vec<PricePoint>> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}d&interval=1d",
            self.base_url, ticker, lookback_days
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET chart request failed for {ticker}"))?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse chart response for {ticker}"))?;

        if !status.is_success() {
            anyhow::bail!("Yahoo chart endpoint returned {} for {}: {}", status, ticker, body);
        }

        let points = Self::parse_chart(&body)
            .with_context(|| format!("failed to extract price history for {ticker}"))?;

        debug!(ticker, count = points.len(), "daily history fetched");
        Ok(points)
    }
}
