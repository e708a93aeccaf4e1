//! Feature Extractor: produces a fixed-shape [`Features`] record from a
//! request under a deadline. All substeps are synchronous CPU work driven
//! off a single `Instant` checkpoint; exceeding `feature_timeout` yields a
//! warning but never an error — the extractor always returns a
//! best-effort record.

pub mod embedding;
pub mod entropy;
pub mod lexical;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::artifact::Artifact;
use crate::types::{Features, Request};
use embedding::EmbeddingCache;

pub fn extract(
    request: &Request,
    artifact: &Artifact,
    top_p: usize,
    cache: &EmbeddingCache,
    feature_timeout: Duration,
) -> Features {
    let start = Instant::now();
    let prompt_text = request.prompt_text();

    let emb = match cache.get(&prompt_text) {
        Some(e) => e,
        None => {
            let e = Arc::new(embedding::fallback_embedding(&prompt_text));
            cache.insert(prompt_text.clone(), e.clone());
            e
        }
    };

    let (cluster_id, top_p_distances) = embedding::nearest_centroids(&emb, &artifact.centroids, top_p);

    let has_code = lexical::has_code(&prompt_text);
    let has_math = lexical::has_math(&prompt_text);
    let ngram_entropy = entropy::trigram_entropy(&prompt_text);

    let char_count = prompt_text.chars().count() as u64;
    let token_count = char_count.div_ceil(4);
    let context_ratio = (token_count as f64 / 128_000.0).min(1.0);

    if start.elapsed() > feature_timeout {
        warn!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            budget_ms = feature_timeout.as_millis() as u64,
            "feature extraction exceeded deadline, returning best-effort record"
        );
    }

    Features {
        embedding: (*emb).clone(),
        cluster_id,
        top_p_distances,
        token_count,
        has_code,
        has_math,
        ngram_entropy,
        context_ratio,
        avg_latency: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::model::{Artifact as ArtifactModel, ArtifactPayload, ArtifactPenalties, ArtifactThresholds};
    use crate::types::{Headers, Message};
    use std::collections::HashMap;

    fn artifact() -> ArtifactModel {
        let payload = ArtifactPayload {
            version: "v1".into(),
            alpha: 0.7,
            thresholds: ArtifactThresholds { cheap: 0.3, hard: 0.7 },
            penalties: ArtifactPenalties { latency_sd: 0.1, ctx_over_80pct: 0.2 },
            qhat: HashMap::from([("m".to_string(), vec![0.5])]),
            chat: HashMap::from([("m".to_string(), 0.1)]),
            centroids: vec![vec![0.0; 384], vec![1.0; 384]],
            gbdt: None,
        };
        ArtifactModel::from_payload(payload).unwrap()
    }

    fn request(text: &str) -> Request {
        Request::new(vec![Message { role: "user".into(), content: text.into() }], None, Headers::new())
    }

    #[test]
    fn zero_length_prompt_is_valid() {
        let cache = EmbeddingCache::new(10, Duration::from_secs(60));
        let f = extract(&request(""), &artifact(), 5, &cache, Duration::from_millis(25));
        assert_eq!(f.token_count, 0);
        assert_eq!(f.context_ratio, 0.0);
        assert!(!f.has_code);
        assert!(!f.has_math);
    }

    #[test]
    fn token_count_matches_ceil_chars_over_4() {
        let cache = EmbeddingCache::new(10, Duration::from_secs(60));
        let f = extract(&request("Hello, how are you?"), &artifact(), 5, &cache, Duration::from_millis(25));
        assert_eq!(f.token_count, 5);
    }

    #[test]
    fn embedding_cache_is_reused_across_calls() {
        let cache = EmbeddingCache::new(10, Duration::from_secs(60));
        let a = artifact();
        let f1 = extract(&request("same text"), &a, 5, &cache, Duration::from_millis(25));
        let f2 = extract(&request("same text"), &a, 5, &cache, Duration::from_millis(25));
        assert_eq!(f1.embedding, f2.embedding);
    }
}
