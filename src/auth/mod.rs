//! Auth Adapter Registry: classifies the credential style a caller
//! presented from request headers. Never validates tokens against a
//! remote service — it is a pure classifier.

mod adapters;

pub use adapters::BuiltinAdapter;

use crate::types::{AuthInfo, Headers};

/// Capability-set trait each adapter implements: a predicate and a
/// projection, never open polymorphism.
pub trait AuthAdapter: Send + Sync {
    fn id(&self) -> &'static str;
    fn matches(&self, headers: &Headers) -> bool;
    fn extract(&self, headers: &Headers) -> AuthInfo;
}

/// Ordered list of adapters; `find_match` returns the first whose
/// predicate holds. Registration order is significant and observable.
pub struct AuthRegistry {
    adapters: Vec<Box<dyn AuthAdapter>>,
}

impl AuthRegistry {
    /// Build a registry containing the built-in adapters named in
    /// `enabled`, in that order. Unknown names are skipped.
    pub fn from_enabled(enabled: &[String]) -> Self {
        let mut adapters: Vec<Box<dyn AuthAdapter>> = Vec::new();
        for name in enabled {
            if let Some(adapter) = BuiltinAdapter::by_id(name) {
                adapters.push(Box::new(adapter));
            }
        }
        AuthRegistry { adapters }
    }

    pub fn find_match(&self, headers: &Headers) -> Option<AuthInfo> {
        self.adapters.iter().find(|a| a.matches(headers)).map(|a| a.extract(headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_auth(value: &str) -> Headers {
        let mut h = Headers::new();
        h.insert("Authorization", value);
        h
    }

    #[test]
    fn registration_order_is_observable() {
        // google-oauth registered before openai-key: a header matching
        // neither falls through; one matching openai must still hit
        // openai-key even though it's registered second here.
        let registry = AuthRegistry::from_enabled(&[
            "google-oauth".to_string(),
            "openai-key".to_string(),
        ]);
        let info = registry.find_match(&headers_with_auth("Bearer sk-abc")).unwrap();
        assert_eq!(info.token_type, "bearer");
    }

    #[test]
    fn case_inverted_header_key_matches() {
        let mut h = Headers::new();
        h.insert("AUTHORIZATION", "Bearer sk-abc");
        let registry = AuthRegistry::from_enabled(&["openai-key".to_string()]);
        assert!(registry.find_match(&h).is_some());
    }

    #[test]
    fn absent_header_matches_nothing() {
        let registry =
            AuthRegistry::from_enabled(&["openai-key".to_string(), "anthropic-oauth".to_string()]);
        assert!(registry.find_match(&Headers::new()).is_none());
    }

    #[test]
    fn unknown_adapter_name_is_skipped() {
        let registry = AuthRegistry::from_enabled(&["not-a-real-adapter".to_string()]);
        assert!(registry.find_match(&headers_with_auth("Bearer sk-abc")).is_none());
    }
}
