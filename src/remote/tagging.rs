//! Client for the tag suggestion endpoint.

use super::{ApiConfig, RemoteError, REQUEST_TIMEOUT};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const GENERATE_TAGS_PATH: &str = "/generate_tags";

#[derive(Serialize)]
struct TagQuery<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct TagResponse {
    success: bool,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

#[async_trait]
pub trait TagSuggestionBackend: Send + Sync {
    /// Ask the service for tag suggestions for the recognized text. Order is
    /// preserved; callers decide what a failure means.
    async fn suggest_tags(&self, text: &str) -> Result<Vec<String>, RemoteError>;
}

pub struct HttpTagClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl HttpTagClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TagSuggestionBackend for HttpTagClient {
    async fn suggest_tags(&self, text: &str) -> Result<Vec<String>, RemoteError> {
        let url = self.config.endpoint(GENERATE_TAGS_PATH);
        debug!(url = %url, chars = text.chars().count(), "requesting tag suggestions");

        let response = self
            .client
            .post(&url)
            .json(&TagQuery { text })
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body: TagResponse = response.json().await?;
        if !body.success {
            return Err(RemoteError::Rejected { message: None });
        }

        Ok(body.tags.unwrap_or_default())
    }
}
