//! Creation wizard state machine.
//!
//! Three linear steps with no way back:
//!
//! ```text
//! SelectAvatar --next (avatar chosen)--> WriteScript --begin--> Generate
//! ```
//!
//! Entering `Generate` is synchronous and happens before the vendor call
//! starts: [`Wizard::begin_generation`] flips the submitting flag, clears the
//! previous outcome, moves to step 3, and hands back a [`PendingGeneration`].
//! The caller awaits the request however it likes and reports back through
//! [`Wizard::complete_generation`], which ignores outcomes whose cancellation
//! token has fired. A failed generation is terminal; a new wizard starts over.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::catalog::{AvatarOption, Catalog};
use crate::config::RequestDefaults;
use crate::error::WizardError;
use crate::generation::{self, GenerationResult, VideoGenerator};
use crate::script::ScriptSource;

/// Wizard step. Numbered from 1 as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    SelectAvatar,
    WriteScript,
    Generate,
}

impl Step {
    pub const ALL: [Self; 3] = [Self::SelectAvatar, Self::WriteScript, Self::Generate];

    pub fn number(self) -> u8 {
        match self {
            Self::SelectAvatar => 1,
            Self::WriteScript => 2,
            Self::Generate => 3,
        }
    }

    /// Sidebar label.
    pub fn label(self) -> &'static str {
        match self {
            Self::SelectAvatar => "Choose your avatar",
            Self::WriteScript => "Write your script",
            Self::Generate => "Generate your video",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// What step 3 currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GenerationStatus {
    /// Not in step 3, or nothing observed yet.
    Preparing,
    InProgress,
    Succeeded { video_uri: String },
    Failed { message: String },
}

impl GenerationStatus {
    /// One-line text for the step-3 panel.
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Preparing => "Preparing to generate your video...",
            Self::InProgress => "Your video is being generated. Please wait...",
            Self::Succeeded { .. } => "Your video has been generated successfully!",
            Self::Failed { .. } => "If this error persists, please contact support.",
        }
    }
}

/// Sidebar entry: a step is active once the wizard has reached it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepIndicator {
    pub number: u8,
    pub label: &'static str,
    pub active: bool,
}

/// Serializable snapshot of a wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardView {
    pub step: u8,
    pub step_name: Step,
    pub steps: Vec<StepIndicator>,
    pub selected_avatar: Option<AvatarOption>,
    pub script: String,
    pub can_advance: bool,
    pub is_submitting: bool,
    pub last_error: Option<String>,
    pub result_video_uri: Option<String>,
    pub status: GenerationStatus,
    pub headline: &'static str,
}

/// Everything the vendor call needs, captured when step 3 was entered.
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    script: String,
    avatar: AvatarOption,
}

impl PendingGeneration {
    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn avatar(&self) -> &AvatarOption {
        &self.avatar
    }

    /// Send the request. Does not touch the wizard.
    pub async fn run(
        &self,
        defaults: &RequestDefaults,
        generator: &dyn VideoGenerator,
        cancel: &CancelToken,
    ) -> GenerationResult {
        generation::submit(&self.script, &self.avatar, defaults, generator, cancel).await
    }
}

/// One pass through the creation flow.
#[derive(Debug, Clone)]
pub struct Wizard {
    catalog: Arc<Catalog>,
    step: Step,
    selected_avatar: Option<AvatarOption>,
    script: String,
    is_submitting: bool,
    last_error: Option<String>,
    result_video_uri: Option<String>,
}

impl Wizard {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            step: Step::SelectAvatar,
            selected_avatar: None,
            script: String::new(),
            is_submitting: false,
            last_error: None,
            result_video_uri: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn selected_avatar(&self) -> Option<&AvatarOption> {
        self.selected_avatar.as_ref()
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn result_video_uri(&self) -> Option<&str> {
        self.result_video_uri.as_deref()
    }

    /// Choose an avatar. Replaces any earlier choice; stays in step 1.
    ///
    /// # Errors
    ///
    /// `WrongStep` outside step 1, `UnknownAvatar` for ids not in the catalog.
    pub fn select_avatar(&mut self, id: u32) -> Result<&AvatarOption, WizardError> {
        self.require(Step::SelectAvatar)?;
        let avatar = self
            .catalog
            .get(id)
            .cloned()
            .ok_or(WizardError::UnknownAvatar { id })?;
        debug!(avatar_id = id, "avatar selected");
        let selected: &AvatarOption = self.selected_avatar.insert(avatar);
        Ok(selected)
    }

    /// Whether "Next" is enabled in step 1.
    pub fn can_advance(&self) -> bool {
        self.step == Step::SelectAvatar && self.selected_avatar.is_some()
    }

    /// Step 1 → step 2.
    ///
    /// # Errors
    ///
    /// `WrongStep` outside step 1, `NoAvatarSelected` without a selection.
    pub fn advance_to_script(&mut self) -> Result<(), WizardError> {
        self.require(Step::SelectAvatar)?;
        if self.selected_avatar.is_none() {
            return Err(WizardError::NoAvatarSelected);
        }
        self.step = Step::WriteScript;
        Ok(())
    }

    /// Replace the script. Empty text is allowed.
    ///
    /// # Errors
    ///
    /// `WrongStep` outside step 2.
    pub fn set_script(&mut self, text: impl Into<String>) -> Result<(), WizardError> {
        self.require(Step::WriteScript)?;
        self.script = text.into();
        Ok(())
    }

    /// Replace the script with one from `source`.
    ///
    /// # Errors
    ///
    /// `WrongStep` outside step 2.
    pub fn use_generated_script(&mut self, source: &dyn ScriptSource) -> Result<&str, WizardError> {
        self.require(Step::WriteScript)?;
        self.script = source.generate_script();
        Ok(&self.script)
    }

    /// Step 2 → step 3, before any I/O.
    ///
    /// # Errors
    ///
    /// `WrongStep` outside step 2. A missing avatar here means the wizard
    /// was built inconsistently and yields `NoAvatarSelected`.
    pub fn begin_generation(&mut self) -> Result<PendingGeneration, WizardError> {
        self.require(Step::WriteScript)?;
        let avatar = self
            .selected_avatar
            .clone()
            .ok_or(WizardError::NoAvatarSelected)?;

        self.is_submitting = true;
        self.last_error = None;
        self.result_video_uri = None;
        self.step = Step::Generate;

        info!(avatar_id = avatar.id, "generation started");
        Ok(PendingGeneration {
            script: self.script.clone(),
            avatar,
        })
    }

    /// Commit the outcome of the request started by `begin_generation`.
    ///
    /// Returns `false` without touching state if `cancel` has fired or no
    /// request is outstanding.
    pub fn complete_generation(&mut self, outcome: GenerationResult, cancel: &CancelToken) -> bool {
        if cancel.is_cancelled() {
            debug!("discarding generation outcome after cancellation");
            return false;
        }
        if !self.is_submitting {
            debug!("discarding generation outcome with no request outstanding");
            return false;
        }

        self.is_submitting = false;
        match outcome {
            Ok(video) => {
                info!(video_uri = %video.video_uri, "generation succeeded");
                self.result_video_uri = Some(video.video_uri);
            }
            Err(err) => {
                warn!(error = %err, "generation failed");
                self.last_error = Some(err.user_message());
            }
        }
        true
    }

    /// Begin, send, and complete in one call. For single-owner callers.
    ///
    /// # Errors
    ///
    /// Errors from [`Wizard::begin_generation`]. Generation failures are not
    /// errors here; they land in [`Wizard::status`].
    pub async fn generate(
        &mut self,
        defaults: &RequestDefaults,
        generator: &dyn VideoGenerator,
        cancel: &CancelToken,
    ) -> Result<GenerationStatus, WizardError> {
        let pending = self.begin_generation()?;
        let outcome = pending.run(defaults, generator, cancel).await;
        self.complete_generation(outcome, cancel);
        Ok(self.status())
    }

    /// Step-3 display state, checked in the same order the UI renders it:
    /// in progress, then error, then video.
    pub fn status(&self) -> GenerationStatus {
        if self.is_submitting {
            GenerationStatus::InProgress
        } else if let Some(message) = &self.last_error {
            GenerationStatus::Failed {
                message: message.clone(),
            }
        } else if let Some(video_uri) = &self.result_video_uri {
            GenerationStatus::Succeeded {
                video_uri: video_uri.clone(),
            }
        } else {
            GenerationStatus::Preparing
        }
    }

    pub fn view(&self) -> WizardView {
        let status = self.status();
        WizardView {
            step: self.step.number(),
            step_name: self.step,
            steps: Step::ALL
                .iter()
                .map(|s| StepIndicator {
                    number: s.number(),
                    label: s.label(),
                    active: self.step >= *s,
                })
                .collect(),
            selected_avatar: self.selected_avatar.clone(),
            script: self.script.clone(),
            can_advance: self.can_advance(),
            is_submitting: self.is_submitting,
            last_error: self.last_error.clone(),
            result_video_uri: self.result_video_uri.clone(),
            headline: status.headline(),
            status,
        }
    }

    fn require(&self, expected: Step) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }
}
