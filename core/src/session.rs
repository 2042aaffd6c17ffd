//! Draw session: a distribution paired with its seeded RNG.
//!
//! RULES:
//!   - One RNG per session, seeded once; the same seed replays the same
//!     sequence of draws against the same distribution.
//!   - Every batch uses a fresh derived stream, so a batch is
//!     reproducible from (seed, batch index) alone.

use crate::{
    distribution::{Distribution, DistributionEntry},
    error::LotteryResult,
    rng::DrawRng,
    sampler::{draw_many, draw_one, BatchSummary, DrawResult},
};

pub struct DrawSession {
    distribution: Distribution,
    rng:          DrawRng,
    seed:         u64,
    draws_made:   u64,
    batches_made: u64,
}

impl DrawSession {
    pub fn new(distribution: Distribution, seed: u64) -> Self {
        Self {
            distribution,
            rng: DrawRng::new(seed),
            seed,
            draws_made: 0,
            batches_made: 0,
        }
    }

    /// Session seeded from OS entropy; `seed()` reports what was chosen.
    pub fn from_entropy(distribution: Distribution) -> Self {
        let seed = DrawRng::from_entropy().seed();
        Self::new(distribution, seed)
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn draws_made(&self) -> u64 {
        self.draws_made
    }

    /// A single unranked draw.
    pub fn draw(&mut self) -> LotteryResult<DrawResult<'_>> {
        let entry: &DistributionEntry = draw_one(&self.distribution, &mut self.rng)?;
        self.draws_made += 1;
        log::debug!("draw #{}: {}", self.draws_made, entry.id());
        Ok(DrawResult { rank: None, entry })
    }

    /// `count` ranked draws from the next derived stream.
    pub fn draw_batch(&mut self, count: u32) -> LotteryResult<Vec<DrawResult<'_>>> {
        // A failed batch leaves the stream index unclaimed.
        let index = self.batches_made + 1;
        let mut stream = DrawRng::derived(self.seed, index);
        let results = draw_many(&self.distribution, count, &mut stream)?;
        self.batches_made = index;
        self.draws_made += u64::from(count);
        log::debug!(
            "batch #{}: {count} draws, {} distinct countries",
            self.batches_made,
            BatchSummary::from_results(&results).lines.len()
        );
        Ok(results)
    }
}
