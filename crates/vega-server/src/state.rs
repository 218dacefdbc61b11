//! Shared application state for the Vega Video server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. It holds the avatar catalog, the script source,
//! the vendor client, and the live wizard sessions.

use std::sync::Arc;

use vega_core::catalog::Catalog;
use vega_core::config::RequestDefaults;
use vega_core::generation::VideoGenerator;
use vega_core::script::ScriptSource;

use crate::sessions::SessionStore;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Avatars offered in step 1.
    pub catalog: Arc<Catalog>,
    /// Backs the "generate script" button in step 2.
    pub script_source: Arc<dyn ScriptSource>,
    /// Sends generation requests to the vendor.
    pub generator: Arc<dyn VideoGenerator>,
    /// Constant request fields (TTS provider, model, lip-sync model).
    pub request_defaults: RequestDefaults,
    /// Live wizards keyed by session id.
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        catalog: Arc<Catalog>,
        script_source: Arc<dyn ScriptSource>,
        generator: Arc<dyn VideoGenerator>,
        request_defaults: RequestDefaults,
        session_ttl: std::time::Duration,
    ) -> Self {
        Self {
            sessions: SessionStore::new(Arc::clone(&catalog), session_ttl),
            catalog,
            script_source,
            generator,
            request_defaults,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("avatars", &self.catalog.len())
            .finish_non_exhaustive()
    }
}
