//! Upstream indicator parsing.
//!
//! The statistics source answers every query with a two-element envelope
//! `[metadata, records]`. Anything else is a malformed response and the
//! whole fetch is rejected; no partial table is ever produced.

use crate::{
    error::{LotteryError, LotteryResult},
    types::{CountryCode, Year},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One observation of one indicator for one country and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIndicatorRecord {
    pub country_code: CountryCode,
    pub value:        Option<f64>,
    pub year:         Year,
}

/// Which year of a series feeds the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "year", rename_all = "snake_case")]
pub enum YearSelection {
    Exact(Year),
    /// Latest year carrying a non-null value, per country.
    MostRecent,
}

impl From<Option<Year>> for YearSelection {
    fn from(year: Option<Year>) -> Self {
        match year {
            Some(y) => Self::Exact(y),
            None => Self::MostRecent,
        }
    }
}

/// A single indicator resolved to at most one value per country.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorTable {
    values: HashMap<CountryCode, (Year, f64)>,
}

impl IndicatorTable {
    /// Resolve raw records to one genuine value per country.
    /// Null values are dropped, never zero-filled.
    pub fn from_records(records: &[RawIndicatorRecord], selection: YearSelection) -> Self {
        let mut values: HashMap<CountryCode, (Year, f64)> = HashMap::new();
        for rec in records {
            let Some(value) = rec.value else { continue };
            if !value.is_finite() || rec.country_code.is_empty() {
                continue;
            }
            match selection {
                YearSelection::Exact(year) => {
                    if rec.year == year {
                        values.insert(rec.country_code.clone(), (rec.year, value));
                    }
                }
                YearSelection::MostRecent => {
                    let newer = values
                        .get(&rec.country_code)
                        .map_or(true, |(seen, _)| rec.year > *seen);
                    if newer {
                        values.insert(rec.country_code.clone(), (rec.year, value));
                    }
                }
            }
        }
        Self { values }
    }

    /// Build directly from `(code, value)` pairs, all tagged with one year.
    pub fn from_values<I, S>(year: Year, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<CountryCode>,
    {
        let values = entries
            .into_iter()
            .map(|(code, value)| (code.into(), (year, value)))
            .collect();
        Self { values }
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.values.get(code).map(|(_, v)| *v)
    }

    pub fn year_of(&self, code: &str) -> Option<Year> {
        self.values.get(code).map(|(y, _)| *y)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Country metadata as published by the upstream source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryMetadata {
    pub country_code: CountryCode,
    pub display_name: String,
    pub iso2_code:    String,
    pub region:       String,
    pub income_level: String,
    pub capital:      String,
    pub longitude:    f64,
    pub latitude:     f64,
}

pub type MetadataTable = HashMap<CountryCode, CountryMetadata>;

// ── Wire shapes ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireIndicatorRecord {
    #[serde(default)]
    countryiso3code: String,
    value:           Option<f64>,
    date:            String,
}

#[derive(Debug, Deserialize)]
struct WireLabel {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCountry {
    id:           String,
    name:         String,
    #[serde(default)]
    iso2_code:    String,
    region:       WireLabel,
    income_level: WireLabel,
    #[serde(default)]
    capital_city: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    longitude:    f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    latitude:     f64,
}

/// Coordinates arrive as numbers or numeric strings; empty means 0.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0.0),
        Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0)),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected number or numeric string, got {other}"
        ))),
    }
}

/// Split the `[metadata, records]` envelope, returning the records array.
fn unwrap_envelope(resource: &str, body: Value) -> LotteryResult<Value> {
    let Value::Array(mut parts) = body else {
        return Err(LotteryError::malformed(resource, "response is not a JSON array"));
    };
    if parts.len() != 2 {
        return Err(LotteryError::malformed(
            resource,
            format!("expected [metadata, records], got {} element(s)", parts.len()),
        ));
    }
    let records = parts.pop().unwrap_or(Value::Null);
    if !records.is_array() {
        return Err(LotteryError::malformed(resource, "records element is not an array"));
    }
    Ok(records)
}

/// Parse an indicator response body into raw records.
pub fn parse_indicator_records(resource: &str, body: &str) -> LotteryResult<Vec<RawIndicatorRecord>> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| LotteryError::malformed(resource, e.to_string()))?;
    let records = unwrap_envelope(resource, json)?;
    let wire: Vec<WireIndicatorRecord> = serde_json::from_value(records)
        .map_err(|e| LotteryError::malformed(resource, e.to_string()))?;

    wire.into_iter()
        .filter(|r| !r.countryiso3code.is_empty())
        .map(|r| {
            let year = r.date.trim().parse::<Year>().map_err(|_| {
                LotteryError::malformed(resource, format!("unparseable date '{}'", r.date))
            })?;
            Ok(RawIndicatorRecord {
                country_code: r.countryiso3code,
                value:        r.value,
                year,
            })
        })
        .collect()
}

/// Parse an indicator response body and resolve it to a table.
pub fn parse_indicator_response(
    resource: &str,
    body: &str,
    selection: YearSelection,
) -> LotteryResult<IndicatorTable> {
    let records = parse_indicator_records(resource, body)?;
    let table = IndicatorTable::from_records(&records, selection);
    log::debug!(
        "{resource}: {} raw records resolved to {} countries",
        records.len(),
        table.len()
    );
    Ok(table)
}

/// Parse the country metadata response body.
pub fn parse_country_response(resource: &str, body: &str) -> LotteryResult<MetadataTable> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| LotteryError::malformed(resource, e.to_string()))?;
    let records = unwrap_envelope(resource, json)?;
    let wire: Vec<WireCountry> = serde_json::from_value(records)
        .map_err(|e| LotteryError::malformed(resource, e.to_string()))?;

    Ok(wire
        .into_iter()
        .map(|c| {
            let meta = CountryMetadata {
                country_code: c.id.clone(),
                display_name: c.name,
                iso2_code:    c.iso2_code,
                region:       c.region.value,
                income_level: c.income_level.value,
                capital:      c.capital_city,
                longitude:    c.longitude,
                latitude:     c.latitude,
            };
            (c.id, meta)
        })
        .collect())
}
