//! Creation wizard routes: `/v1/wizard/*`
//!
//! One session per browser flow. Every mutating route returns the updated
//! wizard view so the client never has to re-fetch. Generation is started
//! with `POST /{id}/generate`, which answers immediately with the step-3
//! view and completes in a background task; clients poll `GET /{id}`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use vega_core::wizard::{Wizard, WizardView};

use crate::error::AppError;
use crate::routes::AppJson;
use crate::state::AppState;

/// Build the `/v1/wizard` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_session))
        .route("/{id}", get(get_session).delete(delete_session))
        .route("/{id}/avatar", post(select_avatar))
        .route("/{id}/next", post(advance))
        .route("/{id}/script", put(set_script))
        .route("/{id}/script/generate", post(generate_script))
        .route("/{id}/generate", post(generate))
}

// ── Request / Response types ─────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub wizard: WizardView,
}

#[derive(Debug, Deserialize)]
pub struct SelectAvatarRequest {
    pub avatar_id: u32,
}

#[derive(Debug, Deserialize)]
pub struct ScriptRequest {
    pub text: String,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// Start a new wizard at step 1.
async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionResponse>) {
    let (id, wizard) = state.sessions.create().await;
    (StatusCode::CREATED, Json(SessionResponse { id, wizard }))
}

/// Current view of a wizard.
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let wizard = state.sessions.view(id).await?;
    Ok(Json(SessionResponse { id, wizard }))
}

/// Discard a wizard and cancel its in-flight request, if any.
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("wizard session {id} not found")))
    }
}

/// Choose an avatar in step 1.
async fn select_avatar(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    AppJson(body): AppJson<SelectAvatarRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let wizard = state
        .sessions
        .update(id, |w| w.select_avatar(body.avatar_id).map(|_| ()))
        .await?;
    Ok(Json(SessionResponse { id, wizard }))
}

/// Step 1 → step 2.
async fn advance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let wizard = state.sessions.update(id, Wizard::advance_to_script).await?;
    Ok(Json(SessionResponse { id, wizard }))
}

/// Replace the script text in step 2.
async fn set_script(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    AppJson(body): AppJson<ScriptRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let wizard = state
        .sessions
        .update(id, |w| w.set_script(body.text))
        .await?;
    Ok(Json(SessionResponse { id, wizard }))
}

/// Fill the script from the configured script source.
async fn generate_script(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let source = Arc::clone(&state.script_source);
    let wizard = state
        .sessions
        .update(id, |w| w.use_generated_script(source.as_ref()).map(|_| ()))
        .await?;
    Ok(Json(SessionResponse { id, wizard }))
}

/// Enter step 3 and send the vendor request in the background.
async fn generate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let (pending, token, wizard) = state.sessions.begin_generation(id).await?;
    info!(session = %id, avatar_id = pending.avatar().id, "generation accepted");

    let bg = Arc::clone(&state);
    tokio::spawn(async move {
        let outcome = pending
            .run(&bg.request_defaults, bg.generator.as_ref(), &token)
            .await;
        if !bg.sessions.complete_generation(id, outcome, &token).await {
            debug!(session = %id, "generation outcome discarded");
        }
    });

    Ok((StatusCode::ACCEPTED, Json(SessionResponse { id, wizard })))
}
