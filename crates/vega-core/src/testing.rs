//! In-process generators for unit tests.

use std::sync::Mutex;

use crate::error::GenerationError;
use crate::generation::{GeneratedVideo, GenerationRequest, GenerationResult, VideoGenerator};

enum Canned {
    Video(String),
    Vendor { status: u16, message: Option<String> },
    Unexpected,
}

/// Records every request and answers with a canned outcome.
pub(crate) struct RecordingGenerator {
    canned: Canned,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl RecordingGenerator {
    pub(crate) fn succeeding(video_uri: &str) -> Self {
        Self::with(Canned::Video(video_uri.to_owned()))
    }

    pub(crate) fn vendor_error(status: u16, message: Option<&str>) -> Self {
        Self::with(Canned::Vendor {
            status,
            message: message.map(str::to_owned),
        })
    }

    pub(crate) fn unexpected() -> Self {
        Self::with(Canned::Unexpected)
    }

    fn with(canned: Canned) -> Self {
        Self {
            canned,
            requests: Mutex::new(Vec::new()),
        }
    }

    #[allow(clippy::unwrap_used)]
    pub(crate) fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl VideoGenerator for RecordingGenerator {
    #[allow(clippy::unwrap_used)]
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        self.requests.lock().unwrap().push(request.clone());
        match &self.canned {
            Canned::Video(uri) => Ok(GeneratedVideo {
                video_uri: uri.clone(),
            }),
            Canned::Vendor { status, message } => Err(GenerationError::Vendor {
                status: *status,
                message: message.clone(),
            }),
            Canned::Unexpected => Err(GenerationError::UnexpectedResponse),
        }
    }
}

/// Never answers.
pub(crate) struct PendingGenerator;

#[async_trait::async_trait]
impl VideoGenerator for PendingGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> GenerationResult {
        std::future::pending().await
    }
}
