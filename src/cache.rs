//! Decision Cache: a bounded, TTL-keyed cache of prior decisions by
//! request fingerprint. Process-local and best-effort — correctness must
//! not depend on persistence across restarts.

use std::time::Duration;

use moka::sync::Cache;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::types::{Decision, Request};

pub struct DecisionCache {
    inner: Cache<String, Decision>,
}

impl DecisionCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        DecisionCache { inner: Cache::builder().max_capacity(max_capacity).time_to_live(ttl).build() }
    }

    pub fn get(&self, fingerprint: &str) -> Option<Decision> {
        self.inner.get(fingerprint)
    }

    pub fn insert(&self, fingerprint: String, decision: Decision) {
        self.inner.insert(fingerprint, decision);
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

/// Stable fingerprint of a request's intent: `(method, canonical body
/// json)` hashed with SHA-256. Canonicalization recursively sorts object
/// keys so the fingerprint is insensitive to serialization order.
pub fn fingerprint(method: &str, request: &Request) -> String {
    let body = serde_json::json!({
        "messages": request.messages.iter().map(|m| serde_json::json!({
            "role": m.role,
            "content": m.content,
        })).collect::<Vec<_>>(),
        "model": request.model,
    });
    let canonical = canonicalize(&body);

    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\0");
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn canonicalize(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let entries: Vec<String> =
                keys.iter().map(|k| format!("{:?}:{}", k, canonicalize(&map[*k]))).collect();
            format!("{{{}}}", entries.join(","))
        }
        Value::Array(items) => {
            let entries: Vec<String> = items.iter().map(canonicalize).collect();
            format!("[{}]", entries.join(","))
        }
        other => other.to_string(),
    }
}
