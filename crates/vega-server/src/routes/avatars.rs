//! Avatar catalog route: `/v1/avatars`

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use vega_core::catalog::AvatarOption;

use crate::state::AppState;

/// Build the `/v1/avatars` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_avatars))
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AvatarListResponse {
    pub avatars: Vec<AvatarEntry>,
}

#[derive(Debug, Serialize)]
pub struct AvatarEntry {
    #[serde(flatten)]
    pub avatar: AvatarOption,
    /// Whether choosing this avatar can produce a video.
    pub generation_ready: bool,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// List the catalog in display order.
async fn list_avatars(State(state): State<Arc<AppState>>) -> Json<AvatarListResponse> {
    let avatars = state
        .catalog
        .avatars()
        .iter()
        .map(|a| AvatarEntry {
            generation_ready: a.is_generation_ready(),
            avatar: a.clone(),
        })
        .collect();

    Json(AvatarListResponse { avatars })
}
