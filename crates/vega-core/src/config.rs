//! Generation settings.
//!
//! Loads the vendor endpoint, request constants, and credential source from
//! environment variables with sensible defaults. All settings can be
//! overridden via `VEGA_*` environment variables.

use std::time::Duration;

/// Default vendor endpoint for lip-synced text-to-speech video.
pub const DEFAULT_ENDPOINT: &str = "https://api.gooey.ai/v2/LipsyncTTS";
/// Default environment variable holding the vendor API key.
pub const DEFAULT_API_KEY_VAR: &str = "GOOEY_API_KEY";

/// Constant fields sent with every generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDefaults {
    /// Text-to-speech provider name. Default: `OPEN_AI`.
    pub tts_provider: String,
    /// Text-to-speech model. Default: `tts_1`.
    pub tts_model: String,
    /// Lip-sync model. Default: `Wav2Lip`.
    pub selected_model: String,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            tts_provider: "OPEN_AI".to_owned(),
            tts_model: "tts_1".to_owned(),
            selected_model: "Wav2Lip".to_owned(),
        }
    }
}

/// Where the bearer credential comes from.
///
/// The credential is resolved on every request, never cached, so rotating
/// the environment variable takes effect without a restart.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read the named environment variable at call time.
    Env(String),
    /// A key supplied directly (CLI flag, tests).
    Fixed(String),
}

impl CredentialSource {
    /// Resolve the credential. Empty values count as absent.
    pub fn resolve(&self) -> Option<String> {
        let value = match self {
            Self::Env(var) => std::env::var(var).ok()?,
            Self::Fixed(key) => key.clone(),
        };
        let value = value.trim().to_owned();
        if value.is_empty() { None } else { Some(value) }
    }

    /// Human-readable origin, safe to log.
    pub fn describe(&self) -> String {
        match self {
            Self::Env(var) => format!("environment variable {var}"),
            Self::Fixed(_) => "explicit API key".to_owned(),
        }
    }
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
            Self::Fixed(_) => f.debug_tuple("Fixed").field(&"[redacted]").finish(),
        }
    }
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self::Env(DEFAULT_API_KEY_VAR.to_owned())
    }
}

/// Everything needed to talk to the vendor API.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Vendor endpoint URL.
    pub endpoint: String,
    /// Bearer credential source.
    pub credential: CredentialSource,
    /// Constant request fields.
    pub defaults: RequestDefaults,
    /// Request timeout. `None` waits for the vendor indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            credential: CredentialSource::default(),
            defaults: RequestDefaults::default(),
            timeout: None,
        }
    }
}

impl GenerationSettings {
    /// Load settings from environment variables.
    ///
    /// Environment variables:
    /// - `VEGA_LIPSYNC_ENDPOINT`: vendor endpoint (default: Gooey `LipsyncTTS`)
    /// - `VEGA_API_KEY_VAR`: name of the variable holding the key (default: `GOOEY_API_KEY`)
    /// - `VEGA_TTS_PROVIDER`: default: `OPEN_AI`
    /// - `VEGA_TTS_MODEL`: default: `tts_1`
    /// - `VEGA_LIPSYNC_MODEL`: default: `Wav2Lip`
    /// - `VEGA_REQUEST_TIMEOUT`: seconds; unset or `0` means no timeout
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GenerationSettings::from_env`] with a custom variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = RequestDefaults::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let endpoint = non_empty("VEGA_LIPSYNC_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());

        let credential = CredentialSource::Env(
            non_empty("VEGA_API_KEY_VAR").unwrap_or_else(|| DEFAULT_API_KEY_VAR.to_owned()),
        );

        let timeout = non_empty("VEGA_REQUEST_TIMEOUT")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            endpoint,
            credential,
            defaults: RequestDefaults {
                tts_provider: non_empty("VEGA_TTS_PROVIDER").unwrap_or(defaults.tts_provider),
                tts_model: non_empty("VEGA_TTS_MODEL").unwrap_or(defaults.tts_model),
                selected_model: non_empty("VEGA_LIPSYNC_MODEL").unwrap_or(defaults.selected_model),
            },
            timeout,
        }
    }
}
