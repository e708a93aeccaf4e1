//! Holds at most one current artifact plus the timestamp of its last
//! successful load, atomically replaceable. Readers never block on a
//! refresh in flight: they only ever touch the `ArcSwap`, never the
//! refresh gate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use tracing::{debug, warn};

use super::fetch::ArtifactSource;
use super::model::Artifact;
use crate::error::RouterError;

struct Snapshot {
    artifact: Arc<Artifact>,
    last_load: Instant,
}

pub struct ArtifactStore {
    snapshot: ArcSwapOption<Snapshot>,
    refresh_gate: tokio::sync::Mutex<()>,
    source: Arc<dyn ArtifactSource>,
    reload_interval: Duration,
}

impl ArtifactStore {
    pub fn new(source: Arc<dyn ArtifactSource>, reload_seconds: u64) -> Self {
        ArtifactStore {
            snapshot: ArcSwapOption::empty(),
            refresh_gate: tokio::sync::Mutex::new(()),
            source,
            reload_interval: Duration::from_secs(reload_seconds),
        }
    }

    /// Returns a consistent snapshot of the current artifact. Cold-start
    /// (no artifact loaded yet) fetches synchronously and fails the call on
    /// error. A warm artifact past its reload interval is refreshed; any
    /// refresh failure is swallowed and the existing artifact returned.
    pub async fn ensure_current(&self) -> Result<Arc<Artifact>, RouterError> {
        match self.snapshot.load_full() {
            None => self.cold_start().await,
            Some(snap) => {
                if snap.last_load.elapsed() >= self.reload_interval {
                    Ok(self.refresh_or_keep(snap).await)
                } else {
                    Ok(snap.artifact.clone())
                }
            }
        }
    }

    async fn cold_start(&self) -> Result<Arc<Artifact>, RouterError> {
        let _guard = self.refresh_gate.lock().await;
        // Another task may have won the race while we waited for the gate.
        if let Some(snap) = self.snapshot.load_full() {
            return Ok(snap.artifact.clone());
        }
        let payload = self.source.fetch().await?;
        let artifact = Arc::new(Artifact::from_payload(payload)?);
        self.publish(artifact.clone());
        Ok(artifact)
    }

    async fn refresh_or_keep(&self, current: Arc<Snapshot>) -> Arc<Artifact> {
        let _guard = self.refresh_gate.lock().await;
        // Re-check: someone else may have already refreshed while we
        // waited for the gate.
        if let Some(snap) = self.snapshot.load_full() {
            if !Arc::ptr_eq(&snap, &current) || snap.last_load.elapsed() < self.reload_interval {
                return snap.artifact.clone();
            }
        }

        match self.source.fetch().await.and_then(Artifact::from_payload) {
            Ok(artifact) => {
                let artifact = Arc::new(artifact);
                debug!(version = %artifact.version, "artifact refreshed");
                self.publish(artifact.clone());
                artifact
            }
            Err(err) => {
                warn!(error = %err, "artifact refresh failed, keeping previous version");
                current.artifact.clone()
            }
        }
    }

    fn publish(&self, artifact: Arc<Artifact>) {
        self.snapshot.store(Some(Arc::new(Snapshot { artifact, last_load: Instant::now() })));
    }

    /// Age of the current artifact in seconds, for the observability
    /// surface. `None` if no artifact has ever loaded.
    pub fn age_seconds(&self) -> Option<u64> {
        self.snapshot.load_full().map(|s| s.last_load.elapsed().as_secs())
    }

    pub fn version(&self) -> Option<String> {
        self.snapshot.load_full().map(|s| s.artifact.version.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::model::{ArtifactPayload, ArtifactPenalties, ArtifactThresholds};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn payload(version: &str) -> ArtifactPayload {
        ArtifactPayload {
            version: version.into(),
            alpha: 0.7,
            thresholds: ArtifactThresholds { cheap: 0.3, hard: 0.7 },
            penalties: ArtifactPenalties { latency_sd: 0.1, ctx_over_80pct: 0.2 },
            qhat: HashMap::from([("m".to_string(), vec![0.5])]),
            chat: HashMap::from([("m".to_string(), 0.1)]),
            centroids: vec![vec![0.0; 384]],
            gbdt: None,
        }
    }

    struct FlakySource {
        calls: AtomicUsize,
        fail_after: usize,
    }

    #[async_trait]
    impl ArtifactSource for FlakySource {
        async fn fetch(&self) -> Result<ArtifactPayload, RouterError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_after {
                Ok(payload(&format!("v{n}")))
            } else {
                Err(RouterError::ArtifactUnavailable("simulated outage".into()))
            }
        }
    }

    #[tokio::test]
    async fn cold_start_fetches() {
        let source = Arc::new(FlakySource { calls: AtomicUsize::new(0), fail_after: 10 });
        let store = ArtifactStore::new(source, 300);
        let artifact = store.ensure_current().await.unwrap();
        assert_eq!(artifact.version, "v0");
    }

    #[tokio::test]
    async fn cold_start_failure_propagates() {
        let source = Arc::new(FlakySource { calls: AtomicUsize::new(0), fail_after: 0 });
        let store = ArtifactStore::new(source, 300);
        assert!(store.ensure_current().await.is_err());
    }

    #[tokio::test]
    async fn outage_preserves_existing_artifact() {
        let source = Arc::new(FlakySource { calls: AtomicUsize::new(0), fail_after: 1 });
        let store = ArtifactStore::new(source, 0);
        let first = store.ensure_current().await.unwrap();
        assert_eq!(first.version, "v0");
        // reload_interval is 0, so the next call attempts a refresh, which
        // the flaky source now fails; the prior artifact must survive.
        let second = store.ensure_current().await.unwrap();
        assert_eq!(second.version, "v0");
    }
}
