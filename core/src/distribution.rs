//! Distribution builder.
//!
//! RULE: `is_real_country` is the only eligibility predicate. The builder
//! stamps it onto every entry once, and both `total_weight` and the sampler
//! read that stamp, so the summed set and the drawable set cannot diverge.

use crate::{
    error::{LotteryError, LotteryResult},
    merger::MergedCountryRecord,
    types::{AGGREGATES_REGION, PROBABILITY_PRECISION},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// True for real countries: not an aggregate, and a 2-letter uppercase ISO2 code.
pub fn is_real_country(record: &MergedCountryRecord) -> bool {
    record.region != AGGREGATES_REGION
        && record.iso2.len() == 2
        && record.iso2.bytes().all(|b| b.is_ascii_uppercase())
}

/// Round a percentage to the fixed probability precision.
pub fn round_probability(value: f64) -> f64 {
    let scale = 10f64.powi(PROBABILITY_PRECISION);
    (value * scale).round() / scale
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub record:      MergedCountryRecord,
    /// Percentage share of the total weight; 0 for excluded entries.
    pub probability: f64,
    pub eligible:    bool,
}

impl DistributionEntry {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn weight(&self) -> f64 {
        self.record.weight
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub(crate) entries:      Vec<DistributionEntry>,
    pub(crate) total_weight: f64,
}

impl Distribution {
    pub fn entries(&self) -> &[DistributionEntry] {
        &self.entries
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Entries open to sampling, in the stable order used to sum the weight.
    pub fn eligible(&self) -> impl Iterator<Item = &DistributionEntry> + '_ {
        self.entries.iter().filter(|e| e.eligible)
    }

    pub fn eligible_count(&self) -> usize {
        self.eligible().count()
    }

    /// Find an entry by 3-letter id or 2-letter ISO code, case-insensitively.
    pub fn lookup(&self, code: &str) -> LotteryResult<&DistributionEntry> {
        let wanted = code.trim();
        self.entries
            .iter()
            .find(|e| {
                e.record.id.eq_ignore_ascii_case(wanted)
                    || (!e.record.iso2.is_empty() && e.record.iso2.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| LotteryError::UnknownCountry { code: code.to_string() })
    }

    /// Probability mass per region, over eligible entries.
    pub fn share_by_region(&self) -> BTreeMap<String, f64> {
        self.share_by(|e| &e.record.region)
    }

    /// Probability mass per income level, over eligible entries.
    pub fn share_by_income_level(&self) -> BTreeMap<String, f64> {
        self.share_by(|e| &e.record.income_level)
    }

    fn share_by<F>(&self, key: F) -> BTreeMap<String, f64>
    where
        F: Fn(&DistributionEntry) -> &String,
    {
        let mut weights: BTreeMap<String, f64> = BTreeMap::new();
        for entry in self.eligible() {
            *weights.entry(key(entry).clone()).or_insert(0.0) += entry.weight();
        }
        weights
            .into_iter()
            .map(|(group, w)| (group, round_probability(w / self.total_weight * 100.0)))
            .collect()
    }
}

pub fn build_distribution(records: Vec<MergedCountryRecord>) -> LotteryResult<Distribution> {
    let mut entries: Vec<DistributionEntry> = records
        .into_iter()
        .map(|record| {
            let eligible = is_real_country(&record);
            DistributionEntry { record, probability: 0.0, eligible }
        })
        .collect();

    let mut total_weight = 0.0;
    for entry in entries.iter().filter(|e| e.eligible) {
        let w = entry.weight();
        if !w.is_finite() || w < 0.0 {
            return Err(LotteryError::InvalidWeight {
                id:     entry.record.id.clone(),
                weight: w,
            });
        }
        total_weight += w;
    }

    if total_weight <= 0.0 {
        return Err(LotteryError::EmptyDistribution);
    }

    for entry in entries.iter_mut().filter(|e| e.eligible) {
        entry.probability = round_probability(entry.weight() / total_weight * 100.0);
    }

    log::debug!(
        "distribution: {} entries, {} eligible, total weight {total_weight:.0}",
        entries.len(),
        entries.iter().filter(|e| e.eligible).count()
    );

    Ok(Distribution { entries, total_weight })
}
