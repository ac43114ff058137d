//! Client for the note publishing endpoint.

use super::{ApiConfig, RemoteError, REQUEST_TIMEOUT};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PUBLISH_PATH: &str = "/publish_note";

/// Publish payload. Tags are plain ordered display texts; the notes service
/// has no concept of provenance. `image_urls` allows multiple references, but
/// the current flow always supplies exactly one.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublishRequest {
    pub text: String,
    pub tags: Vec<String>,
    pub image_urls: Vec<String>,
}

#[derive(Deserialize)]
struct PublishResponse {
    success: bool,
    #[serde(default)]
    msg: Option<String>,
}

#[async_trait]
pub trait PublishBackend: Send + Sync {
    /// Publish the note. Exactly one network call; no retries.
    async fn publish(&self, request: &PublishRequest) -> Result<(), RemoteError>;
}

pub struct HttpPublishClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl HttpPublishClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PublishBackend for HttpPublishClient {
    async fn publish(&self, request: &PublishRequest) -> Result<(), RemoteError> {
        let url = self.config.endpoint(PUBLISH_PATH);
        debug!(url = %url, tags = request.tags.len(), "publishing note");

        let response = self
            .client
            .post(&url)
            .json(request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body: PublishResponse = response.json().await?;
        if !body.success {
            return Err(RemoteError::Rejected { message: body.msg });
        }

        Ok(())
    }
}
