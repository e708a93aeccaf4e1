//! Bucket Selector: combines triage probabilities with capacity
//! guardrails to choose a final bucket. Guardrails override probabilities.

use crate::artifact::Artifact;
use crate::types::{Bucket, BucketProbabilities, Features};

const CHEAP_CAPACITY: u64 = 16_000;
const MID_CAPACITY: u64 = 128_000;

pub fn select(probabilities: &BucketProbabilities, features: &Features, artifact: &Artifact) -> Bucket {
    let cheap_over = features.token_count as f64 > 0.8 * CHEAP_CAPACITY as f64;
    let mid_over = features.token_count as f64 > 0.8 * MID_CAPACITY as f64;

    if cheap_over {
        return if mid_over { Bucket::Hard } else { Bucket::Mid };
    }

    if probabilities.hard > artifact.thresholds.hard {
        Bucket::Hard
    } else if probabilities.cheap > artifact.thresholds.cheap {
        Bucket::Cheap
    } else {
        Bucket::Mid
    }
}
