//! Triage Classifier: maps features to a three-way bucket probability
//! distribution. The shipped implementation is the deterministic heuristic
//! named in the design notes as the specification itself; a real GBDT
//! would implement the same [`Triage`] trait against the artifact's
//! declared feature schema.

use crate::artifact::Artifact;
use crate::types::{BucketProbabilities, Features};

pub trait Triage: Send + Sync {
    fn predict(&self, features: &Features, artifact: &Artifact) -> BucketProbabilities;
}

pub struct HeuristicTriage;

impl Triage for HeuristicTriage {
    fn predict(&self, features: &Features, _artifact: &Artifact) -> BucketProbabilities {
        let mut p = BucketProbabilities::uniform();

        if features.has_code {
            p.mid += 0.2;
            p.cheap -= 0.1;
            p.hard -= 0.1;
        }
        if features.has_math {
            p.hard += 0.2;
            p.cheap -= 0.1;
            p.mid -= 0.1;
        }
        if features.token_count > 50_000 {
            p.hard += 0.15;
            p.cheap -= 0.075;
            p.mid -= 0.075;
        } else if features.token_count < 1_000 {
            p.cheap += 0.15;
            p.mid -= 0.075;
            p.hard -= 0.075;
        }

        p.renormalize()
    }
}
