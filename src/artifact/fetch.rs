//! Artifact fetch behind a small trait so tests can substitute a mock
//! source instead of a real `reqwest::Client`.

use std::time::Duration;

use async_trait::async_trait;

use super::model::ArtifactPayload;
use crate::error::RouterError;

#[async_trait]
pub trait ArtifactSource: Send + Sync {
    async fn fetch(&self) -> Result<ArtifactPayload, RouterError>;
}

pub struct HttpArtifactSource {
    client: reqwest::Client,
    url: String,
}

impl HttpArtifactSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RouterError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RouterError::InternalError(format!("building http client: {e}")))?;
        Ok(HttpArtifactSource { client, url: url.into() })
    }
}

#[async_trait]
impl ArtifactSource for HttpArtifactSource {
    async fn fetch(&self) -> Result<ArtifactPayload, RouterError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RouterError::ArtifactUnavailable(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(RouterError::ArtifactUnavailable(format!(
                "non-2xx status: {}",
                resp.status()
            )));
        }

        resp.json::<ArtifactPayload>()
            .await
            .map_err(|e| RouterError::ArtifactUnavailable(format!("decode failed: {e}")))
    }
}
