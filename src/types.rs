//! Shared data types flowing through the pipeline: requests, extracted
//! features, auth detection results, and the final routing decision.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Case-insensitive, multi-valued header map. Keys are stored lower-cased;
/// lookups fold the query key the same way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Headers(HashMap<String, Vec<String>>);

impl Headers {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.entry(key.to_lowercase()).or_default().push(value.into());
    }

    /// First value for `key`, case-insensitive, or `None` if absent.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_lowercase()).and_then(|v| v.first()).map(|s| s.as_str())
    }
}

/// An ordered `(provider, model)` fallback target attached to an outgoing
/// request, provider inferred per [`ProviderKind::infer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackTarget {
    pub provider: ProviderKind,
    pub model: String,
}

/// An inbound chat-completion request. Immutable for the duration of one
/// decision; the pre-hook mutates `provider`/`model`/`fallbacks` in place
/// once a decision has been applied (see `Decision::apply_to`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub headers: Headers,
    #[serde(default)]
    pub provider: Option<ProviderKind>,
    #[serde(default)]
    pub fallbacks: Vec<FallbackTarget>,
}

impl Request {
    pub fn new(messages: Vec<Message>, model: Option<String>, headers: Headers) -> Self {
        Request { messages, model, headers, provider: None, fallbacks: Vec::new() }
    }

    /// Message contents joined by newlines, the extractor's `prompt_text`.
    pub fn prompt_text(&self) -> String {
        self.messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join("\n")
    }
}

/// Feature record produced once per request by the feature extractor.
/// Write-once by construction: there is no setter, only the constructor
/// used by `features::extract`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Features {
    pub embedding: Vec<f32>,
    pub cluster_id: usize,
    pub top_p_distances: Vec<f32>,
    pub token_count: u64,
    pub has_code: bool,
    pub has_math: bool,
    pub ngram_entropy: f64,
    pub context_ratio: f64,
    pub avg_latency: Option<f64>,
}

impl Features {
    /// A minimal best-effort record for the emergency fallback path: empty
    /// embedding, `token_count` estimated from `char_count`.
    pub fn minimal(char_count: u64) -> Self {
        Features {
            embedding: Vec::new(),
            cluster_id: 0,
            top_p_distances: Vec::new(),
            token_count: char_count.div_ceil(4),
            has_code: false,
            has_math: false,
            ngram_entropy: 0.0,
            context_ratio: (char_count.div_ceil(4) as f64 / 128_000.0).min(1.0),
            avg_latency: None,
        }
    }
}

/// The coarse capability tier a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Cheap,
    Mid,
    Hard,
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Bucket::Cheap => "cheap",
            Bucket::Mid => "mid",
            Bucket::Hard => "hard",
        };
        f.write_str(s)
    }
}

/// Three-way bucket probability distribution, summing to 1 within 1e-2.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BucketProbabilities {
    pub cheap: f64,
    pub mid: f64,
    pub hard: f64,
}

impl BucketProbabilities {
    pub fn uniform() -> Self {
        BucketProbabilities { cheap: 1.0 / 3.0, mid: 1.0 / 3.0, hard: 1.0 / 3.0 }
    }

    /// Renormalize so the three components sum to 1, clamping negatives to 0.
    pub fn renormalize(mut self) -> Self {
        self.cheap = self.cheap.max(0.0);
        self.mid = self.mid.max(0.0);
        self.hard = self.hard.max(0.0);
        let sum = self.cheap + self.mid + self.hard;
        if sum > 0.0 {
            self.cheap /= sum;
            self.mid /= sum;
            self.hard /= sum;
        } else {
            return Self::uniform();
        }
        self
    }
}

/// Provider class a selected model id is inferred to belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Openai,
    Anthropic,
    Google,
    Openrouter,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderKind::Openai => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
            ProviderKind::Openrouter => "openrouter",
        };
        f.write_str(s)
    }
}

impl ProviderKind {
    /// First matching substring in `model_id` per §4.6: openai/gpt, then
    /// anthropic/claude, then google/gemini, else openrouter.
    pub fn infer(model_id: &str) -> Self {
        let lower = model_id.to_lowercase();
        if lower.contains("openai") || lower.contains("gpt") {
            ProviderKind::Openai
        } else if lower.contains("anthropic") || lower.contains("claude") {
            ProviderKind::Anthropic
        } else if lower.contains("google") || lower.contains("gemini") {
            ProviderKind::Google
        } else {
            ProviderKind::Openrouter
        }
    }
}

/// Credential style the caller presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Env,
    Oauth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthInfo {
    pub provider: ProviderKind,
    pub token_type: String,
    pub token: String,
}

/// Sort preference and budget for an outbound provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderSort {
    Price,
    Quality,
    Latency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPrefs {
    pub sort: ProviderSort,
    pub max_price: u32,
    pub allow_fallbacks: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthDecision {
    pub mode: AuthMode,
    pub token_ref: Option<String>,
}

/// The final routed decision returned by the pre-hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub kind: ProviderKind,
    pub model: String,
    pub params: HashMap<String, serde_json::Value>,
    pub provider_prefs: ProviderPrefs,
    pub auth: AuthDecision,
    pub fallbacks: Vec<String>,
    pub bucket: Bucket,
    pub bucket_probabilities: BucketProbabilities,
    pub fallback_reason: Option<String>,
}

impl Decision {
    /// Apply this decision to an outgoing request per §4.8 step 5 / §6:
    /// set the selected provider and model, and attach the ordered
    /// fallback list as `(provider, model)` pairs, each provider inferred
    /// from its model id.
    pub fn apply_to(&self, request: &mut Request) {
        request.provider = Some(self.kind);
        request.model = Some(self.model.clone());
        request.fallbacks = self
            .fallbacks
            .iter()
            .map(|model| FallbackTarget { provider: ProviderKind::infer(model), model: model.clone() })
            .collect();
    }
}
