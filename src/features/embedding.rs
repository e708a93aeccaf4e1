//! Embedding resolution: cache lookup, deterministic fallback, and
//! nearest-centroid search against the artifact.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use sha2::{Digest, Sha256};

const EMBEDDING_DIM: usize = 384;

/// Keyed by exact prompt text; last-writer-wins on races, which the spec
/// explicitly allows.
pub struct EmbeddingCache {
    inner: Cache<String, Arc<Vec<f32>>>,
}

impl EmbeddingCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        EmbeddingCache {
            inner: Cache::builder().max_capacity(max_capacity).time_to_live(ttl).build(),
        }
    }

    pub fn get(&self, text: &str) -> Option<Arc<Vec<f32>>> {
        self.inner.get(text)
    }

    pub fn insert(&self, text: String, embedding: Arc<Vec<f32>>) {
        self.inner.insert(text, embedding);
    }
}

/// Deterministic fallback embedding: SHA-256 the text, then for each
/// dimension i emit `(byte[i mod 32] / 255 - 0.5) * 2`. Always available;
/// a real embedding service is optional.
pub fn fallback_embedding(text: &str) -> Vec<f32> {
    let digest = Sha256::digest(text.as_bytes());
    (0..EMBEDDING_DIM)
        .map(|i| {
            let byte = digest[i % 32] as f32;
            (byte / 255.0 - 0.5) * 2.0
        })
        .collect()
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f32>().sqrt()
}

/// Top-K nearest centroids, ascending by distance. Returns
/// `(cluster_id, distances)` where `cluster_id` is the index of the
/// nearest centroid and `distances` is the ascending list of the K
/// nearest distances.
pub fn nearest_centroids(embedding: &[f32], centroids: &[Vec<f32>], k: usize) -> (usize, Vec<f32>) {
    if centroids.is_empty() {
        return (0, Vec::new());
    }
    let mut ranked: Vec<(usize, f32)> =
        centroids.iter().enumerate().map(|(i, c)| (i, euclidean_distance(embedding, c))).collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    let cluster_id = ranked[0].0;
    let distances = ranked.iter().take(k).map(|(_, d)| *d).collect();
    (cluster_id, distances)
}
