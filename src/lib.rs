//! Pre-dispatch request router for an LLM gateway.
//!
//! The router sits between an inbound chat-completion request and the
//! outbound provider call. For every request it selects a bucket (cheap,
//! mid, hard), a model within that bucket, reasoning parameters, and an
//! ordered fallback list, all within a sub-25ms budget. See
//! [`orchestrator::PreHookOrchestrator`] for the entry point a host
//! gateway calls into.

pub mod artifact;
pub mod auth;
pub mod bucket;
pub mod cache;
pub mod config;
pub mod error;
pub mod features;
pub mod observability;
pub mod orchestrator;
pub mod scorer;
pub mod triage;
pub mod types;

pub use config::Config;
pub use error::RouterError;
pub use orchestrator::PreHookOrchestrator;
pub use types::{AuthInfo, Decision, FallbackTarget, Features, Request};
