// =============================================================================
// Shared types used across the ETF sentinel
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily closing price for one instrument.
///
/// Series are ordered by date ascending with unique dates per instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Which rule opened the currently-active staged-entry program.
///
/// The variants double as tranche identifiers: a short-MA breakdown starts
/// the 1st tranche, a long-MA breakdown the 2nd, and an oversold RSI reading
/// below the long MA the 3rd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "MA_SHORT")]
    MaShort,
    #[serde(rename = "MA_LONG")]
    MaLong,
    #[serde(rename = "RSI")]
    Rsi,
}

impl Stage {
    /// Tranche ordinal used in operator-facing messages.
    pub fn tranche(&self) -> &'static str {
        match self {
            Self::MaShort => "1st",
            Self::MaLong => "2nd",
            Self::Rsi => "3rd",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MaShort => write!(f, "MA_SHORT"),
            Self::MaLong => write!(f, "MA_LONG"),
            Self::Rsi => write!(f, "RSI"),
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MA_SHORT" => Ok(Self::MaShort),
            "MA_LONG" => Ok(Self::MaLong),
            "RSI" => Ok(Self::Rsi),
            other => anyhow::bail!("unknown stage '{other}'"),
        }
    }
}

/// One active staged-entry program for one instrument.
///
/// Invariant: at most one record exists per ticker at any time. A record is
/// created when a transition rule fires, decremented once per run while no
/// new rule fires, and deleted when `days_remaining` reaches zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub ticker: String,
    pub stage: Stage,
    pub days_remaining: u32,
    pub started: NaiveDate,
}

impl StageRecord {
    pub fn new(
        ticker: impl Into<String>,
        stage: Stage,
        days_remaining: u32,
        started: NaiveDate,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            stage,
            days_remaining,
            started,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn stage_display_roundtrip() {
        for stage in [Stage::MaShort, Stage::MaLong, Stage::Rsi] {
            let parsed = Stage::from_str(&stage.to_string()).unwrap();
            assert_eq!(parsed, stage);
        }
    }

    #[test]
    fn stage_from_str_rejects_unknown() {
        assert!(Stage::from_str("MA_MEDIUM").is_err());
        assert!(Stage::from_str("").is_err());
    }

    #[test]
    fn stage_tranche_labels() {
        assert_eq!(Stage::MaShort.tranche(), "1st");
        assert_eq!(Stage::MaLong.tranche(), "2nd");
        assert_eq!(Stage::Rsi.tranche(), "3rd");
    }

    #[test]
    fn stage_record_serde_roundtrip() {
        let record = StageRecord::new(
            "TQQQ",
            Stage::MaLong,
            5,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        let json = serde_json::to_string(&record).unwrap();
        let back: StageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
