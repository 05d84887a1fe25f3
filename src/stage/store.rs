// =============================================================================
// Stage Store — CSV-backed persistence for active stage records
// =============================================================================
//
// The persisted state is a small tabular record set, one row per active
// stage: `ticker,stage,days_remaining,started`. The whole table is loaded
// once at run start and written back once at run end; nothing is flushed
// mid-run, so a crash leaves either the previous table or the new one, never
// a mix. Writes use the tmp + rename pattern to survive a crash mid-write.
//
// A missing file means "no prior state" and loads as an empty table. An
// unreadable or unparsable file is a hard error: treating corrupt state as
// empty would silently restart every countdown.
// =============================================================================

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::types::StageRecord;

/// In-memory stage table: at most one record per ticker.
pub type StageTable = HashMap<String, StageRecord>;

/// File-backed loader/saver for the stage table.
pub struct StageStore {
    path: PathBuf,
}

impl StageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted table.
    ///
    /// # Errors
    /// Fails on an unreadable file, a malformed row, or a duplicate ticker
    /// (the at-most-one-record invariant is enforced on the way in).
    pub fn load(&self) -> Result<StageTable> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no persisted stage state, starting empty");
            return Ok(StageTable::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("failed to open stage state at {}", self.path.display()))?;

        let mut table = StageTable::new();
        for row in reader.deserialize::<StageRecord>() {
            let record = row.with_context(|| {
                format!("malformed stage record in {}", self.path.display())
            })?;
            let ticker = record.ticker.clone();
            if table.insert(ticker.clone(), record).is_some() {
                anyhow::bail!(
                    "duplicate stage record for '{}' in {}",
                    ticker,
                    self.path.display()
                );
            }
        }

        info!(
            path = %self.path.display(),
            active_stages = table.len(),
            "stage state loaded"
        );
        Ok(table)
    }

    /// Persist the table, replacing the previous file atomically.
    pub fn save(&self, table: &StageTable) -> Result<()> {
        let tmp_path = self.path.with_extension("csv.tmp");

        {
            let mut writer = csv::Writer::from_path(&tmp_path).with_context(|| {
                format!("failed to create tmp stage state at {}", tmp_path.display())
            })?;

            // Sorted by ticker so the file diffs cleanly between runs.
            let mut records: Vec<&StageRecord> = table.values().collect();
            records.sort_by(|a, b| a.ticker.cmp(&b.ticker));

            for record in records {
                writer
                    .serialize(record)
                    .with_context(|| format!("failed to serialise stage record for '{}'", record.ticker))?;
            }
            writer.flush().context("failed to flush stage state")?;
        }

        std::fs::rename(&tmp_path, &self.path).with_context(|| {
            format!("failed to move stage state into place at {}", self.path.display())
        })?;

        info!(
            path = %self.path.display(),
            active_stages = table.len(),
            "stage state saved (atomic)"
        );
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stage;
    use chrono::NaiveDate;

    /// Per-test scratch file under the OS temp dir, removed on drop.
    struct ScratchFile(PathBuf);

    impl ScratchFile {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "etf_sentinel_{}_{}.csv",
                name,
                std::process::id()
            ));
            let _ = std::fs::remove_file(&path);
            Self(path)
        }
    }

    impl Drop for ScratchFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
            let _ = std::fs::remove_file(self.0.with_extension("csv.tmp"));
        }
    }

    fn record(ticker: &str, stage: Stage, days: u32) -> StageRecord {
        StageRecord::new(ticker, stage, days, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
    }

    #[test]
    fn missing_file_loads_as_empty_table() {
        let scratch = ScratchFile::new("missing");
        let store = StageStore::new(&scratch.0);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let scratch = ScratchFile::new("roundtrip");
        let store = StageStore::new(&scratch.0);

        let mut table = StageTable::new();
        table.insert("TQQQ".into(), record("TQQQ", Stage::MaShort, 4));
        table.insert("SOXL".into(), record("SOXL", Stage::Rsi, 40));
        store.save(&table).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn save_overwrites_previous_state_completely() {
        let scratch = ScratchFile::new("overwrite");
        let store = StageStore::new(&scratch.0);

        let mut table = StageTable::new();
        table.insert("TQQQ".into(), record("TQQQ", Stage::MaLong, 5));
        table.insert("TNA".into(), record("TNA", Stage::MaShort, 2));
        store.save(&table).unwrap();

        // A completed stage disappears from the table; the saved file must
        // not resurrect it.
        table.remove("TNA");
        store.save(&table).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("TQQQ"));
        assert!(!loaded.contains_key("TNA"));
    }

    #[test]
    fn corrupt_file_is_an_error_not_empty_state() {
        let scratch = ScratchFile::new("corrupt");
        std::fs::write(&scratch.0, "ticker,stage,days_remaining,started\nTQQQ,MA_SHORT,not_a_number,2024-05-10\n").unwrap();

        let store = StageStore::new(&scratch.0);
        assert!(store.load().is_err());
    }

    #[test]
    fn duplicate_ticker_is_an_error() {
        let scratch = ScratchFile::new("duplicate");
        std::fs::write(
            &scratch.0,
            "ticker,stage,days_remaining,started\n\
             TQQQ,MA_SHORT,3,2024-05-10\n\
             TQQQ,RSI,40,2024-05-11\n",
        )
        .unwrap();

        let store = StageStore::new(&scratch.0);
        assert!(store.load().is_err());
    }

    #[test]
    fn stage_column_uses_canonical_names() {
        let scratch = ScratchFile::new("columns");
        let store = StageStore::new(&scratch.0);

        let mut table = StageTable::new();
        table.insert("BULZ".into(), record("BULZ", Stage::Rsi, 40));
        store.save(&table).unwrap();

        let content = std::fs::read_to_string(&scratch.0).unwrap();
        assert!(content.starts_with("ticker,stage,days_remaining,started"));
        assert!(content.contains("BULZ,RSI,40,2024-05-10"));
    }

    #[test]
    fn no_tmp_file_left_behind_after_save() {
        let scratch = ScratchFile::new("tmp");
        let store = StageStore::new(&scratch.0);
        store.save(&StageTable::new()).unwrap();
        assert!(!scratch.0.with_extension("csv.tmp").exists());
        assert!(scratch.0.exists());
    }
}
