//! Pre-Hook Orchestrator and Post-Hook: sequences auth detection, feature
//! extraction, triage, bucket selection, and scoring under a deadline,
//! applying the emergency fallback decision on any failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use crate::artifact::{ArtifactSource, ArtifactStore};
use crate::auth::AuthRegistry;
use crate::bucket;
use crate::cache::{self, DecisionCache};
use crate::config::Config;
use crate::error::RouterError;
use crate::features::{self, embedding::EmbeddingCache};
use crate::observability::Observability;
use crate::scorer;
use crate::triage::{HeuristicTriage, Triage};
use crate::types::{
    AuthDecision, AuthInfo, AuthMode, Bucket, BucketProbabilities, Decision, FallbackTarget, Features,
    ProviderKind, ProviderPrefs, ProviderSort, Request,
};

/// Diagnostic keys a host attaches to its own call context, mirroring
/// `heimdall_bucket` / `heimdall_features` / `heimdall_decision` /
/// `heimdall_auth_info` / `heimdall_fallback_reason` / `heimdall_cache_hit`.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticContext {
    pub bucket: Option<Bucket>,
    pub features: Option<Features>,
    pub decision: Option<Decision>,
    pub auth_info: Option<AuthInfo>,
    pub fallback_reason: Option<String>,
    pub cache_hit: bool,
}

pub struct PreHookOrchestrator {
    config: Config,
    artifact_store: ArtifactStore,
    decision_cache: DecisionCache,
    embedding_cache: EmbeddingCache,
    auth_registry: AuthRegistry,
    triage: Box<dyn Triage>,
    observability: Observability,
}

impl PreHookOrchestrator {
    pub fn new(config: Config, artifact_source: Arc<dyn ArtifactSource>) -> Result<Self, RouterError> {
        config.validate()?;
        let artifact_store = ArtifactStore::new(artifact_source, config.tuning.reload_seconds);
        let decision_cache =
            DecisionCache::new(config.max_cache_size, Duration::from_secs(config.cache_ttl_secs));
        let embedding_cache =
            EmbeddingCache::new(config.max_cache_size, Duration::from_secs(config.cache_ttl_secs));
        let auth_registry = AuthRegistry::from_enabled(&config.auth_adapters.enabled);

        Ok(PreHookOrchestrator {
            config,
            artifact_store,
            decision_cache,
            embedding_cache,
            auth_registry,
            triage: Box::new(HeuristicTriage),
            observability: Observability::new(),
        })
    }

    pub fn observability(&self) -> &Observability {
        &self.observability
    }

    pub fn artifact_store(&self) -> &ArtifactStore {
        &self.artifact_store
    }

    pub fn decision_cache(&self) -> &DecisionCache {
        &self.decision_cache
    }

    /// Entry point a host calls per request. Never errors: any pipeline
    /// failure resolves to the emergency fallback decision. Returns the
    /// request with the decision applied (provider/model/fallbacks set)
    /// alongside the diagnostic context the host attaches to its call
    /// context.
    #[instrument(skip(self, request))]
    pub async fn pre_hook(&self, request: &Request) -> (Request, DiagnosticContext) {
        let start = Instant::now();
        self.observability.record_request();
        let mut ctx = DiagnosticContext::default();

        if self.config.enable_caching {
            let fp = cache::fingerprint("pre_hook", request);
            if let Some(decision) = self.decision_cache.get(&fp) {
                self.observability.record_cache_hit();
                ctx.cache_hit = true;
                ctx.bucket = Some(decision.bucket);
                ctx.decision = Some(decision.clone());
                // A cache hit skips full feature extraction; the host still
                // gets a token-count estimate for its post-hook event.
                ctx.features = Some(Features::minimal(request.prompt_text().chars().count() as u64));
                debug!(bucket = %decision.bucket, "cache hit");
                let mut applied = request.clone();
                decision.apply_to(&mut applied);
                return (applied, ctx);
            }
        }

        let outcome = match self.decide(request, &mut ctx).await {
            Ok(decision) => decision,
            Err(err) => {
                self.observability.record_error();
                warn!(error = %err, "pre-hook failed, returning emergency fallback decision");
                let decision = emergency_fallback(request);
                ctx.features = Some(Features::minimal(request.prompt_text().chars().count() as u64));
                ctx.fallback_reason = decision.fallback_reason.clone();
                decision
            }
        };

        if self.config.enable_caching {
            let fp = cache::fingerprint("pre_hook", request);
            self.decision_cache.insert(fp, outcome.clone());
        }

        ctx.bucket = Some(outcome.bucket);
        ctx.decision = Some(outcome.clone());
        debug!(bucket = %outcome.bucket, "decision computed");

        let elapsed = start.elapsed();
        if elapsed > Duration::from_millis(10) {
            warn!(elapsed_ms = elapsed.as_millis() as u64, "pre-hook exceeded 10ms warm budget");
        }

        let mut applied = request.clone();
        outcome.apply_to(&mut applied);
        (applied, ctx)
    }

    async fn decide(&self, request: &Request, ctx: &mut DiagnosticContext) -> Result<Decision, RouterError> {
        let artifact = self.artifact_store.ensure_current().await?;

        let auth_info =
            if self.config.enable_auth { self.auth_registry.find_match(&request.headers) } else { None };
        ctx.auth_info = auth_info.clone();

        let features = features::extract(
            request,
            &artifact,
            self.config.top_p,
            &self.embedding_cache,
            Duration::from_millis(self.config.feature_timeout_ms),
        );
        ctx.features = Some(features.clone());

        let probabilities = self.triage.predict(&features, &artifact);
        let bucket = bucket::select(&probabilities, &features, &artifact);

        let decision = scorer::select(
            bucket,
            &features,
            auth_info.as_ref(),
            false,
            &artifact,
            &self.config,
            probabilities,
        );
        Ok(decision)
    }

    /// Invoked by the host after the provider call with the `Decision` and
    /// `Features` produced by the matching `pre_hook` call (both available
    /// from its `DiagnosticContext`). Never fails the call on its own.
    pub fn post_hook(&self, decision: &Decision, features: &Features, cache_hit: bool, provider_status: Option<u16>) {
        if self.config.enable_fallbacks
            && provider_status == Some(429)
            && decision.kind == ProviderKind::Anthropic
        {
            warn!(
                model = %decision.model,
                would_redecide_excluding_anthropic = true,
                "provider returned 429; a redecision excluding anthropic would be appropriate"
            );
        }

        if self.config.enable_observability {
            debug!(
                bucket = %decision.bucket,
                token_count = features.token_count,
                cache_hit,
                fallback_reason = ?decision.fallback_reason,
                "post-hook observability event"
            );
        }
    }
}

/// The deterministic safe decision returned when the pipeline cannot
/// complete, per §7.
pub fn emergency_fallback(_request: &Request) -> Decision {
    Decision {
        kind: ProviderKind::Openrouter,
        model: "qwen/qwen3-coder".to_string(),
        params: std::collections::HashMap::new(),
        provider_prefs: ProviderPrefs { sort: ProviderSort::Quality, max_price: 30, allow_fallbacks: true },
        auth: AuthDecision { mode: AuthMode::Env, token_ref: None },
        fallbacks: vec!["deepseek/deepseek-r1".to_string()],
        bucket: Bucket::Cheap,
        bucket_probabilities: BucketProbabilities { cheap: 1.0, mid: 0.0, hard: 0.0 },
        fallback_reason: Some("error_fallback".to_string()),
    }
}
