use crate::{
    picker::{normalize_picked_payload, ImageFile, PickedPayload, PickerError},
    remote::{
        ApiConfig, HttpPublishClient, HttpRecognitionClient, HttpTagClient, PublishBackend,
        PublishRequest, Recognition, RecognitionBackend, RemoteError, TagSuggestionBackend,
    },
    tags::{Tag, TagId, TagSet},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Current phase of the single note workflow. Step transitions are the sole
/// driver of which interaction surface is reachable.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Upload,
    Loading,
    Editing,
    Done,
    Error,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Loading => "loading",
            Self::Editing => "editing",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("a remote call is already in flight")]
    Busy,
    #[error("action is not available in the {0} step")]
    WrongStep(Step),
}

/// Presentation seam for the destructive-action confirm dialog. Tag removal
/// only mutates the session when this returns true.
pub trait RemovalPrompt: Send + Sync {
    fn confirm_removal(&self, tag: &Tag) -> bool;
}

/// Read-only view of the session for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub step: Step,
    pub text: String,
    pub image_url: String,
    pub tags: Vec<Tag>,
    pub tag_input: String,
    pub status_message: Option<String>,
}

pub(crate) const MAX_TEXT_CHARS: usize = 500;

const MSG_RECOGNIZING: &str = "Recognizing handwriting...";
const MSG_GENERATING_TAGS: &str = "Generating tags...";
const MSG_PUBLISHING: &str = "Publishing note...";
const MSG_PUBLISHED: &str = "Note published.";
const MSG_INVALID_FILE: &str = "The selected file is not a usable image. Please reselect.";
const MSG_NO_HANDWRITING: &str = "No handwriting was detected.";
const MSG_RECOGNITION_FALLBACK: &str = "Image upload or recognition failed. Please try again.";
const MSG_PUBLISH_REJECTED: &str = "Publishing failed.";
const MSG_PUBLISH_FALLBACK: &str = "Publishing failed. Please try again.";

#[derive(Debug, Default)]
struct Session {
    step: Step,
    raw_image: Option<ImageFile>,
    image_url: String,
    text: String,
    tags: TagSet,
    tag_input: String,
    status_message: Option<String>,
}

impl Session {
    fn set_text(&mut self, text: String) {
        self.text = if text.chars().count() > MAX_TEXT_CHARS {
            text.chars().take(MAX_TEXT_CHARS).collect()
        } else {
            text
        };
    }

    fn reset(&mut self) {
        *self = Session::default();
    }

    // Loading rejects everything; any other mismatch names the current step.
    fn ensure_step(&self, expected: Step) -> Result<(), ControllerError> {
        match self.step {
            Step::Loading => Err(ControllerError::Busy),
            step if step == expected => Ok(()),
            step => Err(ControllerError::WrongStep(step)),
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            step: self.step,
            text: self.text.clone(),
            image_url: self.image_url.clone(),
            tags: self.tags.to_vec(),
            tag_input: self.tag_input.clone(),
            status_message: self.status_message.clone(),
        }
    }
}

/// Drives the photographed-note workflow: normalize the picked file, recognize
/// handwriting, synthesize tags, let the user edit, publish. Owns all mutable
/// session data; one instance per user context.
pub struct InkFlowController {
    recognizer: Arc<dyn RecognitionBackend>,
    tagger: Arc<dyn TagSuggestionBackend>,
    publisher: Arc<dyn PublishBackend>,
    session: Mutex<Session>,
}

impl InkFlowController {
    pub fn new(
        recognizer: Arc<dyn RecognitionBackend>,
        tagger: Arc<dyn TagSuggestionBackend>,
        publisher: Arc<dyn PublishBackend>,
    ) -> Self {
        Self {
            recognizer,
            tagger,
            publisher,
            session: Mutex::new(Session::default()),
        }
    }

    /// Wire the controller to the real HTTP endpoints under `config.base_url`.
    pub fn with_api(config: ApiConfig) -> Self {
        Self::new(
            Arc::new(HttpRecognitionClient::new(config.clone())),
            Arc::new(HttpTagClient::new(config.clone())),
            Arc::new(HttpPublishClient::new(config)),
        )
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn step(&self) -> Step {
        self.session.lock().await.step
    }

    /// The normalized image backing the current session, for preview
    /// rendering. Present only after recognition succeeded.
    pub async fn raw_image(&self) -> Option<ImageFile> {
        self.session.lock().await.raw_image.clone()
    }

    /// Run the upload half of the workflow: normalize the picker payload,
    /// recognize the handwriting, then fetch tag suggestions (best effort).
    /// Remote failures land in the `Error` step rather than in `Err`; the
    /// returned step says where the session ended up.
    pub async fn submit_image(&self, payload: PickedPayload) -> Result<Step, ControllerError> {
        let file = {
            let mut session = self.session.lock().await;
            session.ensure_step(Step::Upload)?;
            match normalize_picked_payload(payload) {
                Ok(file) => {
                    session.step = Step::Loading;
                    session.status_message = Some(MSG_RECOGNIZING.to_string());
                    file
                }
                Err(PickerError::InvalidFilePayload) => {
                    session.step = Step::Error;
                    session.status_message = Some(MSG_INVALID_FILE.to_string());
                    return Ok(Step::Error);
                }
            }
        };

        let recognition = match self.recognizer.recognize(&file).await {
            Ok(recognition) => recognition,
            Err(err) => {
                let message = match err {
                    RemoteError::Rejected { message } => {
                        message.unwrap_or_else(|| MSG_NO_HANDWRITING.to_string())
                    }
                    err => {
                        warn!(error = %err, "recognition call failed");
                        MSG_RECOGNITION_FALLBACK.to_string()
                    }
                };
                return Ok(self.fail(message).await);
            }
        };

        let Recognition { text, image_url } = recognition;
        {
            let mut session = self.session.lock().await;
            session.raw_image = Some(file);
            session.image_url = image_url;
            session.set_text(text.clone());
            session.status_message = Some(MSG_GENERATING_TAGS.to_string());
        }

        // Best effort: recognition already succeeded, so a failed suggestion
        // call degrades to an empty tag set instead of aborting the flow.
        let suggestions = match self.tagger.suggest_tags(&text).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                warn!(error = %err, "tag synthesis failed; continuing with empty tag set");
                Vec::new()
            }
        };

        let mut session = self.session.lock().await;
        session.tags.adopt_suggestions(suggestions);
        session.step = Step::Editing;
        session.status_message = None;
        Ok(Step::Editing)
    }

    /// Replace the note text. Input past the 500-character bound is truncated.
    pub async fn set_text(&self, text: impl Into<String>) -> Result<(), ControllerError> {
        let mut session = self.session.lock().await;
        session.ensure_step(Step::Editing)?;
        session.set_text(text.into());
        Ok(())
    }

    pub async fn set_tag_input(&self, value: impl Into<String>) -> Result<(), ControllerError> {
        let mut session = self.session.lock().await;
        session.ensure_step(Step::Editing)?;
        session.tag_input = value.into();
        Ok(())
    }

    /// Commit the tag-input buffer as a user tag. The buffer is cleared only
    /// when a tag was actually added; blank or duplicate input leaves both the
    /// set and the buffer alone.
    pub async fn add_tag_from_input(&self) -> Result<Option<TagId>, ControllerError> {
        let mut session = self.session.lock().await;
        session.ensure_step(Step::Editing)?;
        let raw = session.tag_input.clone();
        let added = session.tags.add_user(&raw);
        if added.is_some() {
            session.tag_input.clear();
        }
        Ok(added)
    }

    /// Remove a tag after the prompt confirms. Returns whether the set
    /// changed: an unknown id or a declined prompt is a no-op.
    pub async fn remove_tag(
        &self,
        tag_id: &TagId,
        prompt: &dyn RemovalPrompt,
    ) -> Result<bool, ControllerError> {
        let mut session = self.session.lock().await;
        session.ensure_step(Step::Editing)?;
        let Some(tag) = session.tags.get(tag_id).cloned() else {
            return Ok(false);
        };
        if !prompt.confirm_removal(&tag) {
            return Ok(false);
        }
        Ok(session.tags.remove(tag_id))
    }

    /// Publish the current text, tag texts, and image reference. Failures
    /// land in the `Error` step; success is terminal until reset.
    pub async fn publish(&self) -> Result<Step, ControllerError> {
        let request = {
            let mut session = self.session.lock().await;
            session.ensure_step(Step::Editing)?;
            let request = PublishRequest {
                text: session.text.clone(),
                tags: session.tags.texts(),
                image_urls: vec![session.image_url.clone()],
            };
            session.step = Step::Loading;
            session.status_message = Some(MSG_PUBLISHING.to_string());
            request
        };

        match self.publisher.publish(&request).await {
            Ok(()) => {
                let mut session = self.session.lock().await;
                session.step = Step::Done;
                session.status_message = Some(MSG_PUBLISHED.to_string());
                Ok(Step::Done)
            }
            Err(err) => {
                let message = match err {
                    RemoteError::Rejected { message } => {
                        message.unwrap_or_else(|| MSG_PUBLISH_REJECTED.to_string())
                    }
                    err => {
                        warn!(error = %err, "publish call failed");
                        MSG_PUBLISH_FALLBACK.to_string()
                    }
                };
                Ok(self.fail(message).await)
            }
        }
    }

    /// Full session reset back to `Upload`. Serves retry after an error,
    /// "record another" after a publish, and back-out of editing (unsaved
    /// edits are discarded without confirmation).
    pub async fn reset(&self) -> Result<Step, ControllerError> {
        let mut session = self.session.lock().await;
        if session.step == Step::Loading {
            return Err(ControllerError::Busy);
        }
        session.reset();
        Ok(Step::Upload)
    }

    async fn fail(&self, message: String) -> Step {
        let mut session = self.session.lock().await;
        session.step = Step::Error;
        session.status_message = Some(message);
        Step::Error
    }
}
