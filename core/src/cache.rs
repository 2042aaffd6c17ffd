//! Cache gate.
//!
//! One global snapshot of the built distribution, valid for a TTL measured
//! from its last write. Freshness is decided from explicit inputs (`now`,
//! `ttl`); nothing here reads the wall clock.

use crate::{
    config::LotteryConfig,
    distribution::Distribution,
    error::LotteryResult,
    pipeline::build_from_source,
    source::DataSource,
    store::SnapshotStore,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub written_at:   DateTime<Utc>,
    pub distribution: Distribution,
}

impl CacheSnapshot {
    pub fn new(written_at: DateTime<Utc>, distribution: Distribution) -> Self {
        Self { written_at, distribution }
    }

    /// Fresh while `0 <= now - written_at < ttl`. A write stamped in the
    /// future is treated as stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now.signed_duration_since(self.written_at);
        age >= Duration::zero() && age < ttl
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.written_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    Hit,
    /// No usable snapshot; the pipeline ran and the snapshot was rewritten.
    Rebuilt,
}

/// Read the stored snapshot. Undecodable rows are reported as absent.
pub fn read_snapshot(store: &SnapshotStore) -> LotteryResult<Option<CacheSnapshot>> {
    let Some((written_at, json)) = store.latest_snapshot()? else {
        return Ok(None);
    };
    let Some(written_at) = Utc.timestamp_opt(written_at, 0).single() else {
        log::warn!("cache: snapshot timestamp {written_at} out of range, ignoring");
        return Ok(None);
    };
    match serde_json::from_str::<Distribution>(&json) {
        Ok(distribution) => Ok(Some(CacheSnapshot::new(written_at, distribution))),
        Err(e) => {
            log::warn!("cache: snapshot unreadable, ignoring: {e}");
            Ok(None)
        }
    }
}

pub fn write_snapshot(store: &SnapshotStore, snapshot: &CacheSnapshot) -> LotteryResult<()> {
    let json = serde_json::to_string(&snapshot.distribution)?;
    store.save_snapshot(snapshot.written_at.timestamp(), &json)?;
    log::debug!("cache: snapshot written at {}", snapshot.written_at);
    Ok(())
}

/// Serve the distribution from a fresh snapshot, or rerun the pipeline and
/// overwrite the snapshot. Pipeline errors propagate; nothing is written.
pub fn load_distribution(
    store:  &SnapshotStore,
    source: &dyn DataSource,
    config: &LotteryConfig,
    now:    DateTime<Utc>,
) -> LotteryResult<(Distribution, CacheStatus)> {
    let ttl = config.cache_ttl();
    if let Some(snapshot) = read_snapshot(store)? {
        if snapshot.is_fresh(now, ttl) {
            log::info!(
                "cache: hit, snapshot age {}s",
                snapshot.age(now).num_seconds()
            );
            return Ok((snapshot.distribution, CacheStatus::Hit));
        }
        log::info!("cache: snapshot expired, rebuilding");
    } else {
        log::info!("cache: no snapshot, building");
    }

    let distribution = build_from_source(source, config)?;
    let snapshot = CacheSnapshot::new(now, distribution);
    write_snapshot(store, &snapshot)?;
    Ok((snapshot.distribution, CacheStatus::Rebuilt))
}
