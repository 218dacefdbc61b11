//! Lip-sync vendor client.
//!
//! One `POST` per generation, bearer credential resolved at call time, no
//! retries. Non-2xx answers become `GenerationError::Vendor` with whatever
//! `message` the body carries; 2xx answers must contain
//! `output.output_video`.

use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{CredentialSource, GenerationSettings};
use crate::error::GenerationError;
use crate::generation::{GeneratedVideo, GenerationRequest, GenerationResult, VideoGenerator};

/// HTTP client for the lip-sync TTS endpoint.
pub struct LipsyncClient {
    endpoint: String,
    credential: CredentialSource,
    client: reqwest::Client,
}

impl std::fmt::Debug for LipsyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LipsyncClient")
            .field("endpoint", &self.endpoint)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

impl LipsyncClient {
    /// Create a client from settings.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Network` if the HTTP client cannot be built.
    pub fn new(settings: &GenerationSettings) -> Result<Self, GenerationError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("vega-video/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(GenerationError::Network)?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            credential: settings.credential.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl VideoGenerator for LipsyncClient {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let key = self
            .credential
            .resolve()
            .ok_or_else(|| GenerationError::MissingCredential {
                source_name: self.credential.describe(),
            })?;

        let resp = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("bearer {key}"))
            .json(request)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = error_message(&body);
            warn!(
                status = status.as_u16(),
                message = message.as_deref().unwrap_or(""),
                "vendor rejected generation request"
            );
            return Err(GenerationError::Vendor {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await.map_err(classify)?;
        let video = output_video(&body);
        match &video {
            Ok(v) => debug!(video_uri = %v.video_uri, "vendor returned video"),
            Err(_) => warn!(body_bytes = body.len(), "vendor response missing output.output_video"),
        }
        video
    }
}

fn classify(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Network(err)
    }
}

/// Pull `message` out of an error body; anything unparseable yields `None`.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_owned)
}

fn output_video(body: &str) -> GenerationResult {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|v| v.pointer("/output/output_video"))
        .and_then(Value::as_str)
        .filter(|uri| !uri.is_empty())
        .map(|uri| GeneratedVideo {
            video_uri: uri.to_owned(),
        })
        .ok_or(GenerationError::UnexpectedResponse)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::http::{HeaderMap, StatusCode, header};
    use axum::routing::post;
    use axum::Router;

    use super::*;
    use crate::catalog::Catalog;
    use crate::config::RequestDefaults;

    #[derive(Debug, Default, Clone)]
    struct Captured {
        authorization: Option<String>,
        content_type: Option<String>,
        body: Option<Value>,
    }

    /// Spawn a throwaway vendor that answers every POST with `status`/`body`
    /// after `delay`, and records what it received.
    async fn spawn_vendor(
        status: StatusCode,
        body: &'static str,
        delay: Duration,
    ) -> (String, Arc<Mutex<Captured>>) {
        let captured = Arc::new(Mutex::new(Captured::default()));
        let sink = Arc::clone(&captured);

        let handler = move |headers: HeaderMap, payload: String| {
            let sink = Arc::clone(&sink);
            async move {
                {
                    let mut c = sink.lock().unwrap();
                    c.authorization = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);
                    c.content_type = headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);
                    c.body = serde_json::from_str(&payload).ok();
                }
                tokio::time::sleep(delay).await;
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        };

        let app = Router::new().route("/v2/LipsyncTTS", post(handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/v2/LipsyncTTS"), captured)
    }

    fn client_for(endpoint: &str, key: &str) -> LipsyncClient {
        LipsyncClient::new(&GenerationSettings {
            endpoint: endpoint.to_owned(),
            credential: CredentialSource::Fixed(key.to_owned()),
            ..GenerationSettings::default()
        })
        .unwrap()
    }

    fn request() -> GenerationRequest {
        let catalog = Catalog::builtin();
        GenerationRequest::build("Hello there", catalog.get(1).unwrap(), &RequestDefaults::default())
            .unwrap()
    }

    #[tokio::test]
    async fn success_returns_output_video() {
        let (endpoint, _) = spawn_vendor(
            StatusCode::OK,
            r#"{"output":{"output_video":"https://x/y.mp4"}}"#,
            Duration::ZERO,
        )
        .await;
        let video = client_for(&endpoint, "sk-test")
            .generate(&request())
            .await
            .unwrap();
        assert_eq!(video.video_uri, "https://x/y.mp4");
    }

    #[tokio::test]
    async fn sends_bearer_and_json_payload() {
        let (endpoint, captured) = spawn_vendor(
            StatusCode::OK,
            r#"{"output":{"output_video":"https://x/y.mp4"}}"#,
            Duration::ZERO,
        )
        .await;
        client_for(&endpoint, "sk-test")
            .generate(&request())
            .await
            .unwrap();

        let c = captured.lock().unwrap().clone();
        assert_eq!(c.authorization.as_deref(), Some("bearer sk-test"));
        assert_eq!(c.content_type.as_deref(), Some("application/json"));

        let body = c.body.unwrap();
        assert_eq!(body["text_prompt"], "Hello there");
        assert_eq!(body["tts_provider"], "OPEN_AI");
        assert_eq!(body["openai_voice_name"], "alloy");
        assert_eq!(body["openai_tts_model"], "tts_1");
        assert_eq!(body["selected_model"], "Wav2Lip");
        assert_eq!(
            body["input_face"],
            "https://vegasongs.s3.ap-southeast-1.amazonaws.com/videos/avatar1.mp4"
        );
    }

    #[tokio::test]
    async fn server_error_keeps_status_and_message() {
        let (endpoint, _) = spawn_vendor(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"server overloaded"}"#,
            Duration::ZERO,
        )
        .await;
        let err = client_for(&endpoint, "sk-test")
            .generate(&request())
            .await
            .unwrap_err();
        match &err {
            GenerationError::Vendor { status, message } => {
                assert_eq!(*status, 500);
                assert_eq!(message.as_deref(), Some("server overloaded"));
            }
            other => panic!("expected vendor error, got {other:?}"),
        }
        let msg = err.user_message();
        assert!(msg.contains("500") && msg.contains("server overloaded"));
    }

    #[tokio::test]
    async fn unparseable_error_body_has_no_message() {
        let (endpoint, _) =
            spawn_vendor(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>", Duration::ZERO).await;
        let err = client_for(&endpoint, "sk-test")
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Vendor {
                status: 502,
                message: None
            }
        ));
    }

    #[tokio::test]
    async fn empty_success_body_is_unexpected() {
        let (endpoint, _) = spawn_vendor(StatusCode::OK, "{}", Duration::ZERO).await;
        let err = client_for(&endpoint, "sk-test")
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnexpectedResponse));
    }

    #[tokio::test]
    async fn missing_credential_fails_before_sending() {
        let (endpoint, captured) = spawn_vendor(StatusCode::OK, "{}", Duration::ZERO).await;
        let err = client_for(&endpoint, "  ")
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::MissingCredential { .. }));
        assert!(captured.lock().unwrap().body.is_none());
    }

    #[tokio::test]
    async fn unreachable_vendor_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{addr}/v2/LipsyncTTS"), "sk-test")
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Network(_)));
    }

    #[tokio::test]
    async fn slow_vendor_hits_timeout() {
        let (endpoint, _) = spawn_vendor(
            StatusCode::OK,
            r#"{"output":{"output_video":"https://x/y.mp4"}}"#,
            Duration::from_secs(5),
        )
        .await;
        let client = LipsyncClient::new(&GenerationSettings {
            endpoint,
            credential: CredentialSource::Fixed("sk-test".to_owned()),
            timeout: Some(Duration::from_millis(100)),
            ..GenerationSettings::default()
        })
        .unwrap();
        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Timeout));
    }

    #[test]
    fn output_video_rejects_wrong_shapes() {
        for body in [
            "",
            "null",
            r#"{"output":{}}"#,
            r#"{"output":{"output_video":""}}"#,
            r#"{"output":{"output_video":42}}"#,
            r#"{"output_video":"https://x/y.mp4"}"#,
        ] {
            assert!(
                matches!(output_video(body), Err(GenerationError::UnexpectedResponse)),
                "body {body:?} should be rejected"
            );
        }
    }

    #[test]
    fn error_message_tolerates_non_string() {
        assert_eq!(error_message(r#"{"message":{"nested":true}}"#), None);
        assert_eq!(error_message(r#"{"message":"nope"}"#).as_deref(), Some("nope"));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let client = client_for("http://127.0.0.1:1/", "sk-very-secret");
        assert!(!format!("{client:?}").contains("sk-very-secret"));
    }
}
