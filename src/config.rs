//! Typed router configuration. A host constructs this however it likes
//! (environment, file, code) and hands it to the router at construction
//! time; deserialization is provided but loading is the host's job.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::RouterError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    pub cheap: f64,
    pub hard: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Penalties {
    pub latency_sd: f64,
    pub ctx_over_80pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketDefaults {
    #[serde(default)]
    pub gpt5_reasoning_effort: Option<String>,
    #[serde(default)]
    pub gemini_thinking_budget: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterPrefs {
    #[serde(default)]
    pub exclude_authors: Vec<String>,
    pub provider: crate::types::ProviderPrefs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthAdaptersConfig {
    #[serde(default = "default_auth_adapters")]
    pub enabled: Vec<String>,
}

fn default_auth_adapters() -> Vec<String> {
    vec!["openai-key".into(), "anthropic-oauth".into(), "google-oauth".into()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuningConfig {
    pub artifact_url: String,
    #[serde(default = "default_reload_seconds")]
    pub reload_seconds: u64,
}

fn default_reload_seconds() -> u64 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    pub thresholds: Thresholds,
    #[serde(default = "default_top_p")]
    pub top_p: usize,
    pub penalties: Penalties,
    pub bucket_defaults: HashMap<String, BucketDefaults>,
    pub cheap_candidates: Vec<String>,
    pub mid_candidates: Vec<String>,
    pub hard_candidates: Vec<String>,
    pub openrouter: OpenRouterPrefs,
    #[serde(default)]
    pub auth_adapters: AuthAdaptersConfig,
    pub tuning: TuningConfig,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub feature_timeout_ms: u64,
    #[serde(default = "default_embedding_timeout_ms")]
    pub embedding_timeout_ms: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_max_cache_size")]
    pub max_cache_size: u64,
    #[serde(default = "default_true")]
    pub enable_caching: bool,
    #[serde(default = "default_true")]
    pub enable_auth: bool,
    #[serde(default = "default_true")]
    pub enable_fallbacks: bool,
    #[serde(default = "default_true")]
    pub enable_observability: bool,
}

fn default_alpha() -> f64 {
    0.7
}
fn default_top_p() -> usize {
    5
}
fn default_timeout_ms() -> u64 {
    25
}
fn default_embedding_timeout_ms() -> u64 {
    15_000
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_max_cache_size() -> u64 {
    10_000
}
fn default_true() -> bool {
    true
}

impl Default for AuthAdaptersConfig {
    fn default() -> Self {
        AuthAdaptersConfig { enabled: default_auth_adapters() }
    }
}

impl Config {
    /// Reject malformed configuration at construction rather than
    /// silently defaulting, matching the "fail loud, fail once" posture of
    /// the router's other validation boundaries.
    pub fn validate(&self) -> Result<(), RouterError> {
        let bad = |msg: &str| RouterError::ConfigInvalid(msg.to_string());

        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(bad("alpha must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.thresholds.cheap) || !(0.0..=1.0).contains(&self.thresholds.hard) {
            return Err(bad("thresholds must be in [0, 1]"));
        }
        if self.thresholds.cheap >= self.thresholds.hard {
            return Err(bad("thresholds.cheap must be < thresholds.hard"));
        }
        for (name, list) in [
            ("cheap_candidates", &self.cheap_candidates),
            ("mid_candidates", &self.mid_candidates),
            ("hard_candidates", &self.hard_candidates),
        ] {
            if list.is_empty() {
                return Err(bad(&format!("{name} must not be empty")));
            }
        }
        if self.tuning.artifact_url.is_empty() {
            return Err(bad("tuning.artifact_url is required"));
        }
        if self.timeout_ms < 1 {
            return Err(bad("timeout must be >= 1ms"));
        }
        if self.max_cache_size < 1 {
            return Err(bad("max_cache_size must be >= 1"));
        }
        Ok(())
    }

    pub fn candidates_for(&self, bucket: crate::types::Bucket) -> &[String] {
        match bucket {
            crate::types::Bucket::Cheap => &self.cheap_candidates,
            crate::types::Bucket::Mid => &self.mid_candidates,
            crate::types::Bucket::Hard => &self.hard_candidates,
        }
    }
}
