//! Built-in adapters. A closed enum rather than open polymorphism, per the
//! router's capability-set design: new variants can be appended without
//! changing callers of [`super::AuthRegistry`].

use super::AuthAdapter;
use crate::types::{AuthInfo, Headers, ProviderKind};

#[derive(Debug, Clone, Copy)]
pub enum BuiltinAdapter {
    OpenaiKey,
    AnthropicOauth,
    GoogleOauth,
}

impl BuiltinAdapter {
    pub fn by_id(id: &str) -> Option<Self> {
        match id {
            "openai-key" => Some(BuiltinAdapter::OpenaiKey),
            "anthropic-oauth" => Some(BuiltinAdapter::AnthropicOauth),
            "google-oauth" => Some(BuiltinAdapter::GoogleOauth),
            _ => None,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            BuiltinAdapter::OpenaiKey => "Bearer sk-",
            BuiltinAdapter::AnthropicOauth => "Bearer anthropic_",
            BuiltinAdapter::GoogleOauth => "Bearer ya29.",
        }
    }

    fn provider(&self) -> ProviderKind {
        match self {
            BuiltinAdapter::OpenaiKey => ProviderKind::Openai,
            BuiltinAdapter::AnthropicOauth => ProviderKind::Anthropic,
            BuiltinAdapter::GoogleOauth => ProviderKind::Google,
        }
    }
}

impl AuthAdapter for BuiltinAdapter {
    fn id(&self) -> &'static str {
        match self {
            BuiltinAdapter::OpenaiKey => "openai-key",
            BuiltinAdapter::AnthropicOauth => "anthropic-oauth",
            BuiltinAdapter::GoogleOauth => "google-oauth",
        }
    }

    fn matches(&self, headers: &Headers) -> bool {
        headers.first("authorization").is_some_and(|v| v.starts_with(self.prefix()))
    }

    fn extract(&self, headers: &Headers) -> AuthInfo {
        let token = headers
            .first("authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or_default()
            .to_string();
        AuthInfo { provider: self.provider(), token_type: "bearer".to_string(), token }
    }
}
