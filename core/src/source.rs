//! Data source seam.
//!
//! The upstream statistics API is an external collaborator. The pipeline
//! only sees this trait; `FileSource` reads dumps of the API responses and
//! `StaticSource` serves in-memory tables.

use crate::{
    error::{LotteryError, LotteryResult},
    indicator::{
        parse_country_response, parse_indicator_response, IndicatorTable, MetadataTable,
        YearSelection,
    },
};
use std::collections::HashMap;
use std::path::PathBuf;

pub trait DataSource {
    fn fetch_indicator(&self, code: &str, selection: YearSelection) -> LotteryResult<IndicatorTable>;

    fn fetch_countries(&self) -> LotteryResult<MetadataTable>;
}

/// Reads `{dir}/{indicator}.json` and `{dir}/countries.json`, each holding
/// a raw `[metadata, records]` response body.
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read(&self, file_name: &str) -> LotteryResult<String> {
        let path = self.dir.join(file_name);
        std::fs::read_to_string(&path).map_err(|e| LotteryError::UpstreamFetch {
            resource: path.display().to_string(),
            message:  e.to_string(),
        })
    }
}

impl DataSource for FileSource {
    fn fetch_indicator(&self, code: &str, selection: YearSelection) -> LotteryResult<IndicatorTable> {
        let body = self.read(&format!("{code}.json"))?;
        parse_indicator_response(code, &body, selection)
    }

    fn fetch_countries(&self) -> LotteryResult<MetadataTable> {
        let body = self.read("countries.json")?;
        parse_country_response("countries", &body)
    }
}

/// In-memory tables, already resolved to one value per country.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    indicators: HashMap<String, IndicatorTable>,
    countries:  MetadataTable,
}

impl StaticSource {
    pub fn new(countries: MetadataTable) -> Self {
        Self { indicators: HashMap::new(), countries }
    }

    pub fn with_indicator(mut self, code: &str, table: IndicatorTable) -> Self {
        self.indicators.insert(code.to_string(), table);
        self
    }
}

impl DataSource for StaticSource {
    /// Tables are served as stored; `selection` was applied when they were built.
    fn fetch_indicator(&self, code: &str, _selection: YearSelection) -> LotteryResult<IndicatorTable> {
        self.indicators
            .get(code)
            .cloned()
            .ok_or_else(|| LotteryError::UpstreamFetch {
                resource: code.to_string(),
                message:  "indicator not available".into(),
            })
    }

    fn fetch_countries(&self) -> LotteryResult<MetadataTable> {
        Ok(self.countries.clone())
    }
}
