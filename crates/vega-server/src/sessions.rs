//! In-memory wizard sessions.
//!
//! Each browser-side flow maps to one [`WizardSession`] keyed by a random
//! UUID. Sessions are never persisted. Removing a session, by request or by
//! expiry, fires its cancel handle so a late vendor response cannot be
//! committed to a wizard nobody is looking at.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use vega_core::cancel::{CancelHandle, CancelToken, cancel_pair};
use vega_core::catalog::Catalog;
use vega_core::error::WizardError;
use vega_core::generation::GenerationResult;
use vega_core::wizard::{PendingGeneration, Wizard, WizardView};

/// Errors from session lookups and wizard transitions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session with this id (never created, deleted, or expired).
    #[error("wizard session {id} not found")]
    NotFound { id: Uuid },

    /// The wizard rejected the transition.
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

/// One wizard plus its bookkeeping.
#[derive(Debug)]
pub struct WizardSession {
    wizard: Wizard,
    cancel: CancelHandle,
    last_seen: Instant,
}

impl WizardSession {
    fn touch(&mut self) {
        self.last_seen = Instant::now();
    }
}

/// All live sessions.
#[derive(Debug)]
pub struct SessionStore {
    catalog: Arc<Catalog>,
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, WizardSession>>,
}

impl SessionStore {
    pub fn new(catalog: Arc<Catalog>, ttl: Duration) -> Self {
        Self {
            catalog,
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a new wizard at step 1.
    pub async fn create(&self) -> (Uuid, WizardView) {
        let id = Uuid::new_v4();
        let wizard = Wizard::new(Arc::clone(&self.catalog));
        let view = wizard.view();
        let (cancel, _) = cancel_pair();

        self.sessions.write().await.insert(
            id,
            WizardSession {
                wizard,
                cancel,
                last_seen: Instant::now(),
            },
        );
        debug!(session = %id, "wizard session created");
        (id, view)
    }

    /// Current view of a session.
    ///
    /// # Errors
    ///
    /// `SessionError::NotFound` for unknown ids.
    pub async fn view(&self, id: Uuid) -> Result<WizardView, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound { id })?;
        session.touch();
        Ok(session.wizard.view())
    }

    /// Apply a user event to a session's wizard and return the new view.
    ///
    /// # Errors
    ///
    /// `SessionError::NotFound` for unknown ids, or the wizard's rejection.
    pub async fn update<T>(
        &self,
        id: Uuid,
        event: impl FnOnce(&mut Wizard) -> Result<T, WizardError>,
    ) -> Result<WizardView, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound { id })?;
        session.touch();
        event(&mut session.wizard)?;
        Ok(session.wizard.view())
    }

    /// Move a session to step 3 and hand out what the vendor call needs.
    ///
    /// The returned view already shows step 3 with a request in progress.
    ///
    /// # Errors
    ///
    /// `SessionError::NotFound` for unknown ids, or the wizard's rejection.
    pub async fn begin_generation(
        &self,
        id: Uuid,
    ) -> Result<(PendingGeneration, CancelToken, WizardView), SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound { id })?;
        session.touch();
        let pending = session.wizard.begin_generation()?;
        Ok((pending, session.cancel.token(), session.wizard.view()))
    }

    /// Commit a vendor outcome. Returns `false` if the session is gone or
    /// the token was cancelled.
    pub async fn complete_generation(
        &self,
        id: Uuid,
        outcome: GenerationResult,
        cancel: &CancelToken,
    ) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&id) else {
            debug!(session = %id, "generation finished for a session that no longer exists");
            return false;
        };
        session.touch();
        session.wizard.complete_generation(outcome, cancel)
    }

    /// Discard a session and cancel anything in flight for it.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                session.cancel.cancel();
                debug!(session = %id, "wizard session removed");
                true
            }
            None => false,
        }
    }

    /// Drop every session idle for longer than the TTL. Returns how many
    /// were removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, session| {
            let alive = now.duration_since(session.last_seen) <= self.ttl;
            if !alive {
                session.cancel.cancel();
                debug!(session = %id, "wizard session expired");
            }
            alive
        });
        let removed = before.saturating_sub(sessions.len());
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "expired wizard sessions swept");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
