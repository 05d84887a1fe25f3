// =============================================================================
// Configuration — environment-driven settings with defaults
// =============================================================================
//
// Every tunable lives here and is overridable through the environment (a
// `.env` file is honoured via dotenv in main). Defaults match the reference
// staged-entry parameters: MA windows 60/120, RSI period 14, oversold 30,
// MA-stage countdown 5 days, RSI-stage countdown 40 days, 300-day lookback.
//
// Telegram credentials carry no default: a sentinel that cannot notify is
// misconfigured, so missing credentials abort startup with context.
// =============================================================================

use anyhow::{Context, Result};

// =============================================================================
// Default-value helpers
// =============================================================================

fn default_tickers() -> Vec<String> {
    ["TQQQ", "SOXL", "TNA", "BULZ", "TECL", "WEBL", "UPRO", "WANT"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_lookback_days() -> u32 {
    300
}

fn default_ma_short_window() -> usize {
    60
}

fn default_ma_long_window() -> usize {
    120
}

fn default_rsi_period() -> usize {
    14
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_ma_stage_days() -> u32 {
    5
}

fn default_rsi_stage_days() -> u32 {
    40
}

fn default_state_path() -> String {
    "stage_state.csv".to_string()
}

// =============================================================================
// Config
// =============================================================================

/// Top-level configuration for a sentinel run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Instruments the sentinel evaluates, in run order.
    pub tickers: Vec<String>,

    /// Calendar days of daily history requested from the history source.
    pub lookback_days: u32,

    /// Short moving-average window (trading days).
    pub ma_short_window: usize,

    /// Long moving-average window (trading days).
    pub ma_long_window: usize,

    /// RSI rolling-mean period (trading days).
    pub rsi_period: usize,

    /// RSI at or below this value counts as oversold.
    pub rsi_oversold: f64,

    /// Countdown length for MA-breakdown stages (evaluation cycles).
    pub ma_stage_days: u32,

    /// Countdown length for the RSI re-entry stage (evaluation cycles).
    pub rsi_stage_days: u32,

    /// Path of the persisted stage table.
    pub state_path: String,

    /// Telegram Bot API token.
    pub bot_token: String,

    /// Telegram chat the notifications are delivered to.
    pub chat_id: String,
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` are required; every other
    /// variable falls back to its default when unset. Set but unparsable
    /// numeric values are an error rather than a silent fallback.
    pub fn from_env() -> Result<Self> {
        let bot_token =
            std::env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN is not set")?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").context("TELEGRAM_CHAT_ID is not set")?;

        let tickers = match std::env::var("SENTINEL_TICKERS") {
            Ok(raw) => parse_ticker_list(&raw),
            Err(_) => default_tickers(),
        };
        anyhow::ensure!(!tickers.is_empty(), "SENTINEL_TICKERS resolved to an empty list");

        Ok(Self {
            tickers,
            lookback_days: env_parse("SENTINEL_LOOKBACK_DAYS", default_lookback_days())?,
            ma_short_window: env_parse("SENTINEL_MA_SHORT", default_ma_short_window())?,
            ma_long_window: env_parse("SENTINEL_MA_LONG", default_ma_long_window())?,
            rsi_period: env_parse("SENTINEL_RSI_PERIOD", default_rsi_period())?,
            rsi_oversold: env_parse("SENTINEL_RSI_OVERSOLD", default_rsi_oversold())?,
            ma_stage_days: env_parse("SENTINEL_MA_STAGE_DAYS", default_ma_stage_days())?,
            rsi_stage_days: env_parse("SENTINEL_RSI_STAGE_DAYS", default_rsi_stage_days())?,
            state_path: std::env::var("SENTINEL_STATE_PATH").unwrap_or_else(|_| default_state_path()),
            bot_token,
            chat_id,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            lookback_days: default_lookback_days(),
            ma_short_window: default_ma_short_window(),
            ma_long_window: default_ma_long_window(),
            rsi_period: default_rsi_period(),
            rsi_oversold: default_rsi_oversold(),
            ma_stage_days: default_ma_stage_days(),
            rsi_stage_days: default_rsi_stage_days(),
            state_path: default_state_path(),
            bot_token: String::new(),
            chat_id: String::new(),
        }
    }
}

// =============================================================================
// Parsing helpers
// =============================================================================

/// Split a comma-separated ticker list, trimming and upper-casing entries.
fn parse_ticker_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Read `key` from the environment, parsing into `T`; unset means `default`.
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("failed to parse {key}='{raw}'")),
        Err(_) => Ok(default),
    }
}
