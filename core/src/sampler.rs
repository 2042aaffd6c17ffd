//! Weighted sampler.
//!
//! Inverse-CDF sampling over the eligible entries: roll `r` in
//! `[0, total_weight)`, walk the entries in distribution order subtracting
//! each weight, and stop where the remainder reaches zero. Draws are
//! independent and with replacement.

use crate::{
    distribution::{Distribution, DistributionEntry},
    error::{LotteryError, LotteryResult},
    rng::UniformSource,
};
use serde::Serialize;
use std::collections::HashMap;

/// One drawn entry, ranked when it is part of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawResult<'a> {
    pub rank:  Option<u32>,
    pub entry: &'a DistributionEntry,
}

impl DrawResult<'_> {
    /// The "one in N" odds of this outcome.
    pub fn odds(&self) -> Option<f64> {
        (self.entry.probability > 0.0).then(|| 100.0 / self.entry.probability)
    }
}

pub fn draw_one<'a, R>(distribution: &'a Distribution, rng: &mut R) -> LotteryResult<&'a DistributionEntry>
where
    R: UniformSource + ?Sized,
{
    let mut last: Option<&DistributionEntry> = None;
    let mut remainder = rng.next_f64() * distribution.total_weight;

    // Zero-weight entries have probability 0 and are never returned.
    for entry in distribution.eligible().filter(|e| e.weight() > 0.0) {
        remainder -= entry.weight();
        if remainder <= 0.0 {
            return Ok(entry);
        }
        last = Some(entry);
    }

    match last {
        Some(entry) => {
            log::warn!(
                "draw: remainder {remainder:e} left after last entry, falling back to {}",
                entry.id()
            );
            Ok(entry)
        }
        None => Err(LotteryError::EmptyDistribution),
    }
}

/// `count` independent draws, ranked 1..=count in draw order.
pub fn draw_many<'a, R>(
    distribution: &'a Distribution,
    count: u32,
    rng: &mut R,
) -> LotteryResult<Vec<DrawResult<'a>>>
where
    R: UniformSource + ?Sized,
{
    (1..=count)
        .map(|rank| {
            draw_one(distribution, &mut *rng).map(|entry| DrawResult { rank: Some(rank), entry })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyLine {
    pub id:         String,
    pub name:       String,
    pub count:      u32,
    pub first_rank: Option<u32>,
}

/// Per-country tally of a batch, most frequent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub draws: u32,
    pub lines: Vec<TallyLine>,
}

impl BatchSummary {
    pub fn from_results(results: &[DrawResult<'_>]) -> Self {
        let mut lines: Vec<TallyLine> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for result in results {
            let id = result.entry.id();
            match index.get(id) {
                Some(&i) => lines[i].count += 1,
                None => {
                    index.insert(id, lines.len());
                    lines.push(TallyLine {
                        id:         id.to_string(),
                        name:       result.entry.record.name.clone(),
                        count:      1,
                        first_rank: result.rank,
                    });
                }
            }
        }

        // Stable sort keeps first-seen order among equal counts.
        lines.sort_by(|a, b| b.count.cmp(&a.count));
        Self { draws: results.len() as u32, lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{distribution::build_distribution, merger::MergedCountryRecord, rng::FixedSequence};

    fn record(id: &str, iso2: &str, weight: f64) -> MergedCountryRecord {
        MergedCountryRecord {
            id:                   id.into(),
            name:                 id.into(),
            iso2:                 iso2.into(),
            region:               "Test".into(),
            income_level:         "Test".into(),
            capital:              String::new(),
            longitude:            0.0,
            latitude:             0.0,
            birth_rate_per_mille: 10.0,
            population:           weight * 100.0,
            gdp_per_capita:       0.0,
            births:               weight.round(),
            weight,
        }
    }

    #[test]
    fn float_exhaustion_falls_back_to_last_eligible_entry() {
        let mut dist = build_distribution(vec![
            record("AAA", "AA", 1.0),
            record("BBB", "BB", 2.0),
            record("ZZZ", "", 4.0),
        ])
        .unwrap();
        // Simulate accumulated float error: the stored total overshoots the
        // sum of eligible weights, so a roll near 1.0 walks past the end.
        dist.total_weight += 1e-6;
        let mut rng = FixedSequence::new(vec![0.999_999_999]);

        let entry = draw_one(&dist, &mut rng).unwrap();

        assert_eq!(entry.id(), "BBB", "fallback must be the last eligible entry");
    }

    #[test]
    fn zero_roll_never_selects_zero_weight_entry() {
        let mut dist = build_distribution(vec![record("AAA", "AA", 5.0)]).unwrap();
        dist.entries.insert(
            0,
            DistributionEntry { record: record("NIL", "NL", 0.0), probability: 0.0, eligible: true },
        );
        let mut rng = FixedSequence::new(vec![0.0]);

        let entry = draw_one(&dist, &mut rng).unwrap();

        assert_eq!(entry.id(), "AAA");
    }

    #[test]
    fn no_drawable_entry_is_an_error() {
        let mut dist = build_distribution(vec![record("AAA", "AA", 5.0)]).unwrap();
        dist.entries[0].eligible = false;
        let mut rng = FixedSequence::new(vec![0.5]);

        let err = draw_one(&dist, &mut rng).unwrap_err();

        assert!(matches!(err, LotteryError::EmptyDistribution));
    }
}
