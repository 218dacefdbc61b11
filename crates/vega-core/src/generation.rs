//! Generation request contract.
//!
//! Turns a script and an avatar into the vendor payload, validates the
//! avatar first, and races the vendor call against a cancellation token.
//! The vendor itself sits behind [`VideoGenerator`] so the wizard can be
//! driven without a network.

use serde::Serialize;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::catalog::AvatarOption;
use crate::config::RequestDefaults;
use crate::error::GenerationError;

/// Vendor payload for one lip-synced TTS video. Built right before the call
/// and dropped after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub text_prompt: String,
    pub tts_provider: String,
    pub openai_voice_name: String,
    pub openai_tts_model: String,
    pub input_face: String,
    pub selected_model: String,
}

impl GenerationRequest {
    /// Build the payload.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::MissingReferenceVideo` or
    /// `GenerationError::MissingVoice` if the avatar cannot drive a
    /// generation. Empty scripts are passed through unchanged.
    pub fn build(
        script: &str,
        avatar: &AvatarOption,
        defaults: &RequestDefaults,
    ) -> Result<Self, GenerationError> {
        let input_face = avatar
            .reference_video_uri
            .clone()
            .ok_or(GenerationError::MissingReferenceVideo {
                avatar_id: avatar.id,
            })?;
        let voice = avatar
            .voice_id
            .clone()
            .ok_or(GenerationError::MissingVoice {
                avatar_id: avatar.id,
            })?;

        Ok(Self {
            text_prompt: script.to_owned(),
            tts_provider: defaults.tts_provider.clone(),
            openai_voice_name: voice,
            openai_tts_model: defaults.tts_model.clone(),
            input_face,
            selected_model: defaults.selected_model.clone(),
        })
    }
}

/// A successfully generated video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedVideo {
    pub video_uri: String,
}

/// Outcome of one generation attempt.
pub type GenerationResult = Result<GeneratedVideo, GenerationError>;

/// Something that can turn a request into a video.
#[async_trait::async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Perform exactly one attempt. Implementations must not retry.
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult;
}

/// Validate, build, and send one generation request.
///
/// Cancellation wins over a concurrently finishing request.
///
/// # Errors
///
/// Returns precondition errors without calling `generator`,
/// `GenerationError::Cancelled` if `cancel` fires first, or whatever the
/// generator returns.
pub async fn submit(
    script: &str,
    avatar: &AvatarOption,
    defaults: &RequestDefaults,
    generator: &dyn VideoGenerator,
    cancel: &CancelToken,
) -> GenerationResult {
    let request = GenerationRequest::build(script, avatar, defaults)?;

    if cancel.is_cancelled() {
        debug!(avatar_id = avatar.id, "generation cancelled before send");
        return Err(GenerationError::Cancelled);
    }

    info!(
        avatar_id = avatar.id,
        voice = %request.openai_voice_name,
        script_chars = request.text_prompt.chars().count(),
        "submitting generation request"
    );

    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            debug!(avatar_id = avatar.id, "generation cancelled in flight");
            Err(GenerationError::Cancelled)
        }
        result = generator.generate(&request) => result,
    }
}
