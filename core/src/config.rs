use crate::{
    indicator::YearSelection,
    types::{IndicatorCode, Year},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CACHE_TTL_SECS: u64 = 86_400;
pub const DEFAULT_BATCH_SIZE: u32 = 10;

/// Upstream indicator codes for the three merged series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorCodes {
    pub birth_rate:     IndicatorCode,
    pub population:     IndicatorCode,
    pub gdp_per_capita: IndicatorCode,
}

impl Default for IndicatorCodes {
    fn default() -> Self {
        Self {
            birth_rate:     "SP.DYN.CBRT.IN".into(),
            population:     "SP.POP.TOTL".into(),
            gdp_per_capita: "NY.GDP.PCAP.CD".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotteryConfig {
    /// Snapshot lifetime, measured from the last write.
    pub cache_ttl_secs: u64,
    /// Observation year; `None` takes each country's most recent value.
    pub year:           Option<Year>,
    pub indicators:     IndicatorCodes,
    /// Draws in one "ten-draw" batch.
    pub batch_size:     u32,
    /// Directory of upstream dumps, relative to the data dir.
    pub worldbank_dir:  String,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            year:           None,
            indicators:     IndicatorCodes::default(),
            batch_size:     DEFAULT_BATCH_SIZE,
            worldbank_dir:  "worldbank".into(),
        }
    }
}

impl LotteryConfig {
    /// Load from the data/ directory.
    /// In tests, use LotteryConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/config/lottery.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: LotteryConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        if config.batch_size == 0 {
            anyhow::bail!("{path}: batch_size must be at least 1");
        }
        Ok(config)
    }

    /// Fixed settings for tests: pinned year, short TTL.
    pub fn default_test() -> Self {
        Self {
            cache_ttl_secs: 3_600,
            year:           Some(2022),
            ..Self::default()
        }
    }

    pub fn year_selection(&self) -> YearSelection {
        self.year.into()
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        // chrono caps durations at i64::MAX milliseconds.
        let secs = self.cache_ttl_secs.min((i64::MAX / 1_000) as u64) as i64;
        chrono::Duration::seconds(secs)
    }

    pub fn worldbank_path(&self, data_dir: &str) -> String {
        format!("{data_dir}/{}", self.worldbank_dir)
    }
}
