//! Error types for `vega-core`.
//!
//! Each error variant carries enough context to diagnose the problem without
//! a debugger. Credentials never appear in error text, only the name of the
//! source they were expected to come from.

use crate::wizard::Step;

/// Errors from loading or validating an avatar catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The catalog document is not valid JSON or has the wrong shape.
    #[error("invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog contains no avatars.
    #[error("catalog must contain at least one avatar")]
    Empty,

    /// Two catalog entries share the same id.
    #[error("duplicate avatar id {id} in catalog")]
    DuplicateId { id: u32 },
}

/// Errors from driving the creation wizard out of order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// The requested avatar is not in the catalog.
    #[error("avatar {id} is not in the catalog")]
    UnknownAvatar { id: u32 },

    /// Tried to leave step 1 without choosing an avatar.
    #[error("no avatar selected")]
    NoAvatarSelected,

    /// The operation is only valid in a different step.
    #[error("operation requires step {expected}, wizard is at step {actual}")]
    WrongStep { expected: Step, actual: Step },
}

/// Errors from a single generation attempt against the vendor API.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The chosen avatar has no reference video to lip-sync.
    #[error("avatar {avatar_id} has no reference video")]
    MissingReferenceVideo { avatar_id: u32 },

    /// The chosen avatar has no synthesized voice.
    #[error("avatar {avatar_id} has no voice")]
    MissingVoice { avatar_id: u32 },

    /// No API key was available when the request was about to be sent.
    #[error("no API key available from {source_name}")]
    MissingCredential { source_name: String },

    /// Network or HTTP client error.
    #[error("vendor network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The configured request timeout elapsed.
    #[error("vendor request timed out")]
    Timeout,

    /// The vendor answered with a non-2xx status.
    #[error("vendor error {status}: {}", message.as_deref().unwrap_or("no message"))]
    Vendor { status: u16, message: Option<String> },

    /// The vendor answered 2xx but without `output.output_video`.
    #[error("unexpected response format")]
    UnexpectedResponse,

    /// The attempt was abandoned before it completed.
    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Whether the failure was caught before any request left the process.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::MissingReferenceVideo { .. } | Self::MissingVoice { .. } | Self::MissingCredential { .. }
        )
    }

    /// Text shown to the person driving the wizard.
    ///
    /// Every kind gets its own wording; vendor rejections keep the status
    /// code and the vendor's message verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingReferenceVideo { avatar_id } => format!(
                "Avatar {avatar_id} has no reference video and cannot be used to generate a video. \
                 Please start over and choose another avatar."
            ),
            Self::MissingVoice { avatar_id } => format!(
                "Avatar {avatar_id} has no voice and cannot be used to generate a video. \
                 Please start over and choose another avatar."
            ),
            Self::MissingCredential { .. } => {
                "Video generation is not configured (missing API key). Please contact support."
                    .to_owned()
            }
            Self::Network(_) => {
                "Failed to generate video: the video service could not be reached. \
                 Please try again later."
                    .to_owned()
            }
            Self::Timeout => {
                "Failed to generate video: the video service took too long to respond. \
                 Please try again later."
                    .to_owned()
            }
            Self::Vendor {
                status,
                message: Some(detail),
            } => format!(
                "Failed to generate video: server error: {status}. {}. Please try again later.",
                detail.trim_end_matches('.')
            ),
            Self::Vendor {
                status,
                message: None,
            } => format!("Failed to generate video: server error: {status}. Please try again later."),
            Self::UnexpectedResponse => {
                "Failed to generate video: unexpected response format. Please try again later."
                    .to_owned()
            }
            Self::Cancelled => "Video generation was cancelled.".to_owned(),
        }
    }
}
