//! The routing artifact: an immutable snapshot published by the training
//! pipeline. Heavy fields are behind `Arc` so cloning the handle for
//! `ArcSwap::load_full` never deep-copies the tables.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::RouterError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtDescriptor {
    pub framework: String,
    pub model_ref: String,
    pub feature_schema: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactThresholds {
    pub cheap: f64,
    pub hard: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPenalties {
    pub latency_sd: f64,
    pub ctx_over_80pct: f64,
}

/// Wire format fetched from the artifact URL, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPayload {
    pub version: String,
    pub alpha: f64,
    pub thresholds: ArtifactThresholds,
    pub penalties: ArtifactPenalties,
    pub qhat: HashMap<String, Vec<f64>>,
    pub chat: HashMap<String, f64>,
    pub centroids: Vec<Vec<f32>>,
    pub gbdt: Option<GbdtDescriptor>,
}

/// Validated, immutable artifact. Never mutated after construction;
/// replacement in the store is atomic.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub version: String,
    pub alpha: f64,
    pub thresholds: ArtifactThresholds,
    pub penalties: ArtifactPenalties,
    pub qhat: Arc<HashMap<String, Vec<f64>>>,
    pub chat: Arc<HashMap<String, f64>>,
    pub centroids: Arc<Vec<Vec<f32>>>,
    pub gbdt: Option<Arc<GbdtDescriptor>>,
}

impl Artifact {
    /// Decode-and-validate per §4.3: thresholds in [0,1] with cheap < hard;
    /// alpha in [0,1]; qhat and chat non-empty.
    pub fn from_payload(payload: ArtifactPayload) -> Result<Self, RouterError> {
        let bad = |msg: &str| RouterError::ArtifactUnavailable(msg.to_string());

        if !(0.0..=1.0).contains(&payload.alpha) {
            return Err(bad("artifact alpha out of [0,1]"));
        }
        if !(0.0..=1.0).contains(&payload.thresholds.cheap)
            || !(0.0..=1.0).contains(&payload.thresholds.hard)
        {
            return Err(bad("artifact thresholds out of [0,1]"));
        }
        if payload.thresholds.cheap >= payload.thresholds.hard {
            return Err(bad("artifact thresholds.cheap must be < thresholds.hard"));
        }
        if payload.qhat.is_empty() {
            return Err(bad("artifact qhat is empty"));
        }
        if payload.chat.is_empty() {
            return Err(bad("artifact chat is empty"));
        }

        Ok(Artifact {
            version: payload.version,
            alpha: payload.alpha,
            thresholds: payload.thresholds,
            penalties: payload.penalties,
            qhat: Arc::new(payload.qhat),
            chat: Arc::new(payload.chat),
            centroids: Arc::new(payload.centroids),
            gbdt: payload.gbdt.map(Arc::new),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> ArtifactPayload {
        ArtifactPayload {
            version: "v1".into(),
            alpha: 0.7,
            thresholds: ArtifactThresholds { cheap: 0.3, hard: 0.7 },
            penalties: ArtifactPenalties { latency_sd: 0.1, ctx_over_80pct: 0.2 },
            qhat: HashMap::from([("m1".to_string(), vec![0.5, 0.6])]),
            chat: HashMap::from([("m1".to_string(), 0.2)]),
            centroids: vec![vec![0.0; 384]],
            gbdt: None,
        }
    }

    #[test]
    fn valid_payload_decodes() {
        assert!(Artifact::from_payload(valid_payload()).is_ok());
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut p = valid_payload();
        p.thresholds.cheap = 0.9;
        p.thresholds.hard = 0.1;
        assert!(Artifact::from_payload(p).is_err());
    }

    #[test]
    fn rejects_empty_qhat() {
        let mut p = valid_payload();
        p.qhat.clear();
        assert!(Artifact::from_payload(p).is_err());
    }

    #[test]
    fn rejects_alpha_out_of_range() {
        let mut p = valid_payload();
        p.alpha = 1.5;
        assert!(Artifact::from_payload(p).is_err());
    }
}
