//! α-Scorer: ranks candidate models inside a bucket and assembles the
//! final [`Decision`]. `score = alpha·Q − (1−alpha)·C − penalties`.

use std::collections::HashMap;

use crate::artifact::Artifact;
use crate::config::Config;
use crate::types::{
    AuthDecision, AuthInfo, AuthMode, Bucket, BucketProbabilities, Decision, Features, ProviderKind,
    ProviderPrefs, ProviderSort,
};

const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

pub fn select(
    bucket: Bucket,
    features: &Features,
    auth_info: Option<&AuthInfo>,
    exclude_anthropic: bool,
    artifact: &Artifact,
    config: &Config,
    probabilities: BucketProbabilities,
) -> Decision {
    if bucket == Bucket::Mid && !exclude_anthropic {
        if let Some(auth) = auth_info {
            if auth.provider == ProviderKind::Anthropic {
                return Decision {
                    kind: ProviderKind::Anthropic,
                    model: ANTHROPIC_DEFAULT_MODEL.to_string(),
                    params: HashMap::new(),
                    provider_prefs: ProviderPrefs {
                        sort: ProviderSort::Latency,
                        max_price: 100,
                        allow_fallbacks: false,
                    },
                    auth: AuthDecision { mode: AuthMode::Oauth, token_ref: None },
                    fallbacks: Vec::new(),
                    bucket,
                    bucket_probabilities: probabilities,
                    fallback_reason: None,
                };
            }
        }
    }

    let candidates = reorder_candidates(bucket, features, config.candidates_for(bucket));

    let mut scored: Vec<(String, f64, f64)> = Vec::new(); // (id, score, cost)
    for id in &candidates {
        let Some(qhat_row) = artifact.qhat.get(id) else { continue };
        if qhat_row.is_empty() {
            continue;
        }
        let Some(&cost) = artifact.chat.get(id) else { continue };

        let quality = qhat_row.get(features.cluster_id).copied().unwrap_or_else(|| mean(qhat_row));
        let penalty = penalty(id, features, artifact);
        let score = artifact.alpha * quality - (1.0 - artifact.alpha) * cost - penalty;
        scored.push((id.clone(), score, cost));
    }

    let selected = if scored.is_empty() {
        candidates.first().cloned().unwrap_or_default()
    } else {
        scored.sort_by(|a, b| {
            let delta = a.1 - b.1;
            if delta.abs() < 1e-3 {
                a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal)
            } else {
                b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
            }
        });
        scored[0].0.clone()
    };

    let fallbacks: Vec<String> = candidates.iter().filter(|id| **id != selected).cloned().collect();

    let params = reasoning_params(bucket, &selected, config);
    let kind = ProviderKind::infer(&selected);
    let provider_prefs = provider_prefs_for(bucket, config);

    Decision {
        kind,
        model: selected,
        params,
        provider_prefs,
        auth: AuthDecision { mode: AuthMode::Env, token_ref: None },
        fallbacks,
        bucket,
        bucket_probabilities: probabilities,
        fallback_reason: None,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Stable-partition "gemini" candidates first when the hard bucket carries
/// an unusually large context; otherwise keep configured order.
fn reorder_candidates(bucket: Bucket, features: &Features, candidates: &[String]) -> Vec<String> {
    if bucket == Bucket::Hard && features.token_count > 200_000 {
        let (gemini, rest): (Vec<String>, Vec<String>) =
            candidates.iter().cloned().partition(|id| id.to_lowercase().contains("gemini"));
        let mut reordered = gemini;
        reordered.extend(rest);
        reordered
    } else {
        candidates.to_vec()
    }
}

fn base_latency_seconds(id: &str) -> f64 {
    let lower = id.to_lowercase();
    if lower.contains("deepseek-r1") {
        3.0
    } else if lower.contains("qwen3-coder") {
        2.5
    } else if lower.contains("gpt-5") {
        8.0
    } else if lower.contains("gemini-2.5-pro") {
        6.0
    } else {
        5.0
    }
}

fn expected_latency(id: &str, features: &Features) -> f64 {
    let mut latency = base_latency_seconds(id);
    if features.token_count > 5_000 {
        latency *= 1.0 + 0.5 * (features.token_count as f64 / 10_000.0).min(3.0);
    }
    let lower = id.to_lowercase();
    if (lower.contains("gpt-5") || lower.contains("gemini")) && (features.has_code || features.has_math) {
        latency *= 1.5;
    }
    latency
}

fn penalty(id: &str, features: &Features, artifact: &Artifact) -> f64 {
    let mut total = 0.0;
    let lower = id.to_lowercase();

    if features.context_ratio > 0.8 {
        total += artifact.penalties.ctx_over_80pct;
    }

    if let Some(observed) = features.avg_latency {
        if observed > 0.0 {
            let expected = expected_latency(id, features);
            let deviation = (expected - observed).abs() / observed;
            if deviation > 0.2 {
                total += artifact.penalties.latency_sd * deviation;
            }
        }
    }

    if features.has_code && lower.contains("deepseek") {
        total -= 0.05;
    }
    if features.has_math && !lower.contains("gpt-5") && !lower.contains("gemini") {
        total += 0.10;
    }
    if features.token_count > 100_000 && !lower.contains("gemini") {
        total += 0.15;
    }

    total
}

fn reasoning_params(bucket: Bucket, model_id: &str, config: &Config) -> HashMap<String, serde_json::Value> {
    let mut params = HashMap::new();
    if bucket == Bucket::Cheap {
        return params;
    }

    let key = match bucket {
        Bucket::Mid => "mid",
        Bucket::Hard => "hard",
        Bucket::Cheap => unreachable!(),
    };
    let Some(defaults) = config.bucket_defaults.get(key) else { return params };
    let lower = model_id.to_lowercase();

    if lower.contains("gpt") {
        if let Some(effort) = &defaults.gpt5_reasoning_effort {
            params.insert("reasoning_effort".to_string(), serde_json::Value::String(effort.clone()));
        }
    } else if lower.contains("gemini") {
        if let Some(budget) = defaults.gemini_thinking_budget {
            params.insert("thinkingBudget".to_string(), serde_json::Value::from(budget));
        }
    }

    params
}

fn provider_prefs_for(bucket: Bucket, config: &Config) -> ProviderPrefs {
    match bucket {
        Bucket::Cheap => config.openrouter.provider.clone(),
        Bucket::Mid => ProviderPrefs { sort: ProviderSort::Quality, max_price: 50, allow_fallbacks: true },
        Bucket::Hard => ProviderPrefs { sort: ProviderSort::Quality, max_price: 100, allow_fallbacks: true },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::model::{ArtifactPayload, ArtifactPenalties, ArtifactThresholds};
    use crate::config::{AuthAdaptersConfig, BucketDefaults, OpenRouterPrefs, Penalties, Thresholds, TuningConfig};

    fn artifact() -> Artifact {
        Artifact::from_payload(ArtifactPayload {
            version: "v1".into(),
            alpha: 0.7,
            thresholds: ArtifactThresholds { cheap: 0.3, hard: 0.7 },
            penalties: ArtifactPenalties { latency_sd: 0.1, ctx_over_80pct: 0.2 },
            qhat: HashMap::from([
                ("openai/gpt-5".to_string(), vec![0.9, 0.8]),
                ("deepseek/deepseek-r1".to_string(), vec![0.7, 0.75]),
                ("google/gemini-2.5-pro".to_string(), vec![0.85, 0.82]),
            ]),
            chat: HashMap::from([
                ("openai/gpt-5".to_string(), 0.8),
                ("deepseek/deepseek-r1".to_string(), 0.2),
                ("google/gemini-2.5-pro".to_string(), 0.5),
            ]),
            centroids: vec![vec![0.0; 384], vec![1.0; 384]],
            gbdt: None,
        })
        .unwrap()
    }

    fn config() -> Config {
        Config {
            alpha: 0.7,
            thresholds: Thresholds { cheap: 0.3, hard: 0.7 },
            top_p: 5,
            penalties: Penalties { latency_sd: 0.1, ctx_over_80pct: 0.2 },
            bucket_defaults: HashMap::from([
                (
                    "mid".to_string(),
                    BucketDefaults { gpt5_reasoning_effort: Some("medium".into()), gemini_thinking_budget: Some(1024) },
                ),
                (
                    "hard".to_string(),
                    BucketDefaults { gpt5_reasoning_effort: Some("high".into()), gemini_thinking_budget: Some(4096) },
                ),
            ]),
            cheap_candidates: vec!["qwen/qwen3-coder".into()],
            mid_candidates: vec![
                "openai/gpt-5".into(),
                "deepseek/deepseek-r1".into(),
                "google/gemini-2.5-pro".into(),
            ],
            hard_candidates: vec![
                "openai/gpt-5".into(),
                "deepseek/deepseek-r1".into(),
                "google/gemini-2.5-pro".into(),
            ],
            openrouter: OpenRouterPrefs {
                exclude_authors: vec![],
                provider: ProviderPrefs { sort: ProviderSort::Price, max_price: 30, allow_fallbacks: true },
            },
            auth_adapters: AuthAdaptersConfig::default(),
            tuning: TuningConfig { artifact_url: "https://example.com".into(), reload_seconds: 300 },
            timeout_ms: 25,
            feature_timeout_ms: 25,
            embedding_timeout_ms: 15_000,
            cache_ttl_secs: 300,
            max_cache_size: 10_000,
            enable_caching: true,
            enable_auth: true,
            enable_fallbacks: true,
            enable_observability: true,
        }
    }

    fn features(token_count: u64, has_code: bool, has_math: bool) -> Features {
        Features {
            embedding: vec![],
            cluster_id: 0,
            top_p_distances: vec![],
            token_count,
            has_code,
            has_math,
            ngram_entropy: 0.0,
            context_ratio: 0.0,
            avg_latency: None,
        }
    }

    #[test]
    fn model_never_appears_in_its_own_fallbacks() {
        let decision = select(
            Bucket::Mid,
            &features(5_000, false, false),
            None,
            false,
            &artifact(),
            &config(),
            BucketProbabilities::uniform(),
        );
        assert!(!decision.fallbacks.contains(&decision.model));
    }

    #[test]
    fn anthropic_auth_short_circuits_mid_bucket() {
        let auth = AuthInfo { provider: ProviderKind::Anthropic, token_type: "bearer".into(), token: "t".into() };
        let decision = select(
            Bucket::Mid,
            &features(5_000, false, false),
            Some(&auth),
            false,
            &artifact(),
            &config(),
            BucketProbabilities::uniform(),
        );
        assert_eq!(decision.model, ANTHROPIC_DEFAULT_MODEL);
        assert!(decision.fallbacks.is_empty());
        assert_eq!(decision.auth.mode, AuthMode::Oauth);
    }

    #[test]
    fn exclude_anthropic_skips_short_circuit() {
        let auth = AuthInfo { provider: ProviderKind::Anthropic, token_type: "bearer".into(), token: "t".into() };
        let decision = select(
            Bucket::Mid,
            &features(5_000, false, false),
            Some(&auth),
            true,
            &artifact(),
            &config(),
            BucketProbabilities::uniform(),
        );
        assert_ne!(decision.model, ANTHROPIC_DEFAULT_MODEL);
    }

    #[test]
    fn hard_bucket_reorders_gemini_first_over_large_context() {
        let decision = select(
            Bucket::Hard,
            &features(250_000, false, false),
            None,
            false,
            &artifact(),
            &config(),
            BucketProbabilities::uniform(),
        );
        // context-over-80% and the >100k-non-gemini penalty push gemini to
        // the front of the candidate order even before scoring.
        assert!(decision.model.contains("gemini") || decision.fallbacks[0].contains("gemini"));
    }

    #[test]
    fn code_prompt_in_mid_sets_reasoning_params_for_gpt() {
        let decision = select(
            Bucket::Mid,
            &features(5_000, true, false),
            None,
            false,
            &artifact(),
            &config(),
            BucketProbabilities::uniform(),
        );
        if decision.model.contains("gpt") {
            assert!(decision.params.contains_key("reasoning_effort"));
        }
    }

    #[test]
    fn cheap_bucket_has_empty_params() {
        let decision = select(
            Bucket::Cheap,
            &features(100, false, false),
            None,
            false,
            &artifact(),
            &config(),
            BucketProbabilities::uniform(),
        );
        assert!(decision.params.is_empty());
    }

    #[test]
    fn no_scored_candidates_falls_back_to_first_configured() {
        let mut a = artifact();
        // Strip qhat entirely so every candidate is skipped.
        let empty_artifact = Artifact::from_payload(ArtifactPayload {
            version: a.version.clone(),
            alpha: a.alpha,
            thresholds: a.thresholds.clone(),
            penalties: a.penalties.clone(),
            qhat: HashMap::from([("placeholder".to_string(), vec![0.1])]),
            chat: HashMap::from([("placeholder".to_string(), 0.1)]),
            centroids: (*a.centroids).clone(),
            gbdt: None,
        })
        .unwrap();
        a = empty_artifact;

        let decision = select(
            Bucket::Mid,
            &features(5_000, false, false),
            None,
            false,
            &a,
            &config(),
            BucketProbabilities::uniform(),
        );
        assert_eq!(decision.model, "openai/gpt-5");
    }
}
