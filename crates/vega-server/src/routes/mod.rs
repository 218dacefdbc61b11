//! HTTP routes and the router that ties them together.

pub mod avatars;
pub mod sys;
pub mod ui;
pub mod wizard;

use std::sync::Arc;

use axum::Router;
use axum::extract::FromRequest;
use axum::http::{HeaderValue, Method, header};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// In-flight requests allowed on the wizard routes.
const WIZARD_CONCURRENCY_LIMIT: usize = 64;

/// JSON request body whose rejections render as [`AppError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let wizard_routes = Router::new()
        .nest("/v1/wizard", wizard::router())
        .layer(ConcurrencyLimitLayer::new(WIZARD_CONCURRENCY_LIMIT));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/v1/sys", sys::router())
        .nest("/v1/avatars", avatars::router())
        .merge(wizard_routes)
        .merge(ui::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for driving the router in tests.

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use vega_core::catalog::Catalog;
    use vega_core::config::RequestDefaults;
    use vega_core::error::GenerationError;
    use vega_core::generation::{
        GeneratedVideo, GenerationRequest, GenerationResult, VideoGenerator,
    };
    use vega_core::script::PlaceholderScript;

    use crate::state::AppState;

    /// Stand-in for the lip-sync vendor. Answers with a fixed video or a
    /// 500, optionally holding the answer until [`FakeVendor::release`].
    pub struct FakeVendor {
        video_uri: Option<String>,
        gate: Option<Notify>,
        calls: AtomicUsize,
    }

    impl FakeVendor {
        pub fn succeeding(video_uri: &str) -> Self {
            Self {
                video_uri: Some(video_uri.to_owned()),
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                video_uri: None,
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn gated(video_uri: &str) -> Self {
            Self {
                gate: Some(Notify::new()),
                ..Self::succeeding(video_uri)
            }
        }

        pub fn release(&self) {
            if let Some(gate) = &self.gate {
                gate.notify_one();
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl VideoGenerator for FakeVendor {
        async fn generate(&self, _request: &GenerationRequest) -> GenerationResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.video_uri {
                Some(uri) => Ok(GeneratedVideo {
                    video_uri: uri.clone(),
                }),
                None => Err(GenerationError::Vendor {
                    status: 500,
                    message: Some("server overloaded".to_owned()),
                }),
            }
        }
    }

    pub fn state_with(generator: Arc<dyn VideoGenerator>) -> Arc<AppState> {
        Arc::new(AppState::new(
            Arc::new(Catalog::builtin()),
            Arc::new(PlaceholderScript),
            generator,
            RequestDefaults::default(),
            Duration::from_secs(60),
        ))
    }

    /// Send one request and return the status and parsed JSON body
    /// (`Null` for empty or non-JSON bodies).
    #[allow(clippy::unwrap_used)]
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}
