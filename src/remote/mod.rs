pub mod publish;
pub mod recognition;
pub mod tagging;

pub use publish::{HttpPublishClient, PublishBackend, PublishRequest};
pub use recognition::{HttpRecognitionClient, Recognition, RecognitionBackend};
pub use tagging::{HttpTagClient, TagSuggestionBackend};

use std::time::Duration;

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Endpoint configuration. The base path is the only knob the workflow has;
/// everything under it is fixed by the service contract.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "/api".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The endpoint answered but reported `success: false`.
    #[error("endpoint rejected the request")]
    Rejected { message: Option<String> },
    /// The endpoint was unreachable, answered non-2xx, or sent an unreadable
    /// body.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// The request could not be assembled.
    #[error("malformed request: {0}")]
    Request(String),
}
