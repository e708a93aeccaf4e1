//! Counters, gauges, and a health snapshot for operators. Atomic
//! increments only — no locking on the hot path.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::artifact::ArtifactStore;
use crate::cache::DecisionCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub artifact_version: Option<String>,
    pub last_artifact_load_age_seconds: Option<u64>,
    pub cache_entries: u64,
}

#[derive(Default)]
pub struct Observability {
    request_count: AtomicU64,
    error_count: AtomicU64,
    cache_hit_count: AtomicU64,
}

impl Observability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hit_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn cache_hit_count(&self) -> u64 {
        self.cache_hit_count.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn health(&self, artifact_store: &ArtifactStore, cache: &DecisionCache) -> HealthSnapshot {
        let artifact_version = artifact_store.version();
        let age = artifact_store.age_seconds();

        let status = match (&artifact_version, age) {
            (None, _) => HealthStatus::Unhealthy,
            (Some(_), Some(age)) if age > 3_600 => HealthStatus::Degraded,
            _ => HealthStatus::Healthy,
        };

        let cache_entries = cache.entry_count();
        HealthSnapshot { status, artifact_version, last_artifact_load_age_seconds: age, cache_entries }
    }
}
