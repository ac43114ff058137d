//! Client for the handwriting recognition endpoint.

use super::{ApiConfig, RemoteError, REQUEST_TIMEOUT};
use crate::picker::ImageFile;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const RECOGNIZE_PATH: &str = "/upload_image";
const IMAGE_FIELD: &str = "image";
const TEMPLATE_FIELD: &str = "prompt_template";
const DEFAULT_TEMPLATE: &str = "default";

/// Outcome of a successful recognition call: the transcribed text plus the
/// server-assigned reference to the uploaded image, passed through to publish
/// unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    pub text: String,
    pub image_url: String,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    success: bool,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

#[async_trait]
pub trait RecognitionBackend: Send + Sync {
    /// Send the canonical image file for recognition. Exactly one network
    /// call; no retries.
    async fn recognize(&self, file: &ImageFile) -> Result<Recognition, RemoteError>;
}

pub struct HttpRecognitionClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl HttpRecognitionClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl RecognitionBackend for HttpRecognitionClient {
    async fn recognize(&self, file: &ImageFile) -> Result<Recognition, RemoteError> {
        let url = self.config.endpoint(RECOGNIZE_PATH);
        debug!(
            url = %url,
            file_name = file.name(),
            size = file.size(),
            "sending image for recognition"
        );

        let image_part = reqwest::multipart::Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())
            .map_err(|err| RemoteError::Request(format!("image part: {err}")))?;
        let form = reqwest::multipart::Form::new()
            .part(IMAGE_FIELD, image_part)
            .text(TEMPLATE_FIELD, DEFAULT_TEMPLATE);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body: RecognizeResponse = response.json().await?;
        if !body.success {
            return Err(RemoteError::Rejected { message: body.msg });
        }

        Ok(Recognition {
            text: body.text.unwrap_or_default(),
            image_url: body.image_url.unwrap_or_default(),
        })
    }
}
