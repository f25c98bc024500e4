//! Route handler functions for all API endpoints.
//!
//! Each handler extracts its request via axum extractors, interacts with
//! AppState services, and returns JSON responses. The chat turn itself is
//! shared between the text and voice endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse};
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::warn;

use parley_core::types::{Message, SessionId};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Omitted on the first message of a conversation. The camelCase alias
    /// matches what the original frontend sends.
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub session_id: String,
    pub message_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceChatResponse {
    pub reply: String,
    pub session_id: String,
    pub message_count: usize,
    /// Base64-encoded MP3. Absent when synthesis is unavailable or failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SttResponse {
    pub success: bool,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub history: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

// =============================================================================
// Chat turn
// =============================================================================

struct ChatTurn {
    reply: String,
    session_id: SessionId,
    message_count: usize,
}

/// Run one chat turn: validate, resolve the session, obtain a reply against
/// the pre-append history, then append the user/assistant pair.
///
/// The reply is resolved before either message is appended, so a provider
/// failure leaves the session exactly as it was and the history never holds
/// a user message without its assistant reply.
async fn run_chat_turn(
    state: &AppState,
    message: &str,
    session_id: Option<&str>,
) -> Result<ChatTurn, ApiError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message cannot be empty".to_string()));
    }
    let max_chars = state.config.chat.max_message_chars;
    if message.chars().count() > max_chars {
        return Err(ApiError::BadRequest(format!(
            "message exceeds maximum length of {} characters",
            max_chars
        )));
    }

    let (session_id, _is_new) = state.store.get_or_create(session_id);
    let history = state.store.history(&session_id)?;

    let reply = state.resolver.resolve(message, &history).await?;

    state.store.append(&session_id, Message::user(message))?;
    let message_count = state
        .store
        .append(&session_id, Message::assistant(reply.clone()))?;

    Ok(ChatTurn {
        reply,
        session_id,
        message_count,
    })
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET /health - liveness probe.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET / and GET /ui - the embedded chat frontend.
pub async fn ui() -> impl IntoResponse {
    Html(parley_ui::CHAT_HTML)
}

/// POST /chat - one text chat turn with session bookkeeping.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let turn = run_chat_turn(&state, &request.message, request.session_id.as_deref()).await?;

    Ok(Json(ChatResponse {
        reply: turn.reply,
        session_id: turn.session_id.0,
        message_count: turn.message_count,
    }))
}

/// POST /voice/chat - a chat turn plus synthesized audio for the reply.
///
/// Synthesis failure degrades to a text-only response; the turn itself has
/// already succeeded and is never rolled back for a missing voice track.
pub async fn voice_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<VoiceChatResponse>, ApiError> {
    let turn = run_chat_turn(&state, &request.message, request.session_id.as_deref()).await?;

    let audio = match &state.speech {
        Some(speech) => match speech.synthesize(&turn.reply).await {
            Ok(bytes) => Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
            Err(e) => {
                warn!(error = %e, "Synthesis failed - returning text-only reply");
                None
            }
        },
        None => None,
    };

    Ok(Json(VoiceChatResponse {
        reply: turn.reply,
        session_id: turn.session_id.0,
        message_count: turn.message_count,
        audio,
    }))
}

/// POST /voice/stt - transcribe a raw audio body.
///
/// Reports `success: false` (still HTTP 200) when the provider is not
/// configured or the call fails; the frontend keys its local-recognition
/// fallback off that flag.
pub async fn voice_stt(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SttResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("audio payload is empty".to_string()));
    }

    let Some(speech) = &state.speech else {
        return Ok(Json(SttResponse {
            success: false,
            text: String::new(),
        }));
    };

    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        .unwrap_or_else(|| "audio/webm".to_string());

    match speech.transcribe(body.to_vec(), &mime).await {
        Ok(text) => Ok(Json(SttResponse {
            success: true,
            text,
        })),
        Err(e) => {
            warn!(error = %e, "Transcription failed");
            Ok(Json(SttResponse {
                success: false,
                text: String::new(),
            }))
        }
    }
}

/// GET /chat/history/{session_id} - the full ordered history of a session.
pub async fn chat_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state.store.history(&SessionId::from(session_id.as_str()))?;

    Ok(Json(HistoryResponse {
        session_id,
        history,
    }))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use parley_core::config::ParleyConfig;
    use parley_llm::{LlmError, ReplyResolver};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn make_state() -> AppState {
        // Default config has no credentials: echo resolver, no speech client.
        AppState::from_config(ParleyConfig::default())
    }

    fn make_app() -> axum::Router {
        crate::create_router(make_state())
    }

    fn chat_request(message: &str, session_id: Option<&str>) -> Request<Body> {
        let mut body = serde_json::json!({ "message": message });
        if let Some(id) = session_id {
            body["session_id"] = serde_json::json!(id);
        }
        Request::post("/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ---- /health ----

    #[tokio::test]
    async fn test_health_endpoint() {
        let resp = make_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let health: HealthResponse = body_json(resp).await;
        assert_eq!(health.status, "ok");
    }

    // ---- /chat validation ----

    #[tokio::test]
    async fn test_chat_rejects_empty_message() {
        let resp = make_app()
            .oneshot(chat_request("", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_rejects_whitespace_message() {
        let resp = make_app()
            .oneshot(chat_request("   \n\t ", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_rejects_over_long_message() {
        let long = "x".repeat(4001);
        let resp = make_app()
            .oneshot(chat_request(&long, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // ---- /chat echo behavior ----

    #[tokio::test]
    async fn test_chat_echo_reply() {
        let resp = make_app()
            .oneshot(chat_request("hello", None))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let chat: ChatResponse = body_json(resp).await;
        assert_eq!(chat.reply, "echo: hello");
        assert_eq!(chat.message_count, 2);
        assert!(!chat.session_id.is_empty());
    }

    #[tokio::test]
    async fn test_chat_echo_is_deterministic_across_calls() {
        let app = make_app();
        let first: ChatResponse = body_json(
            app.clone()
                .oneshot(chat_request("hello", None))
                .await
                .unwrap(),
        )
        .await;
        let second: ChatResponse = body_json(
            app.oneshot(chat_request("hello", None)).await.unwrap(),
        )
        .await;
        assert_eq!(first.reply, second.reply);
    }

    #[tokio::test]
    async fn test_chat_message_count_grows_by_two_per_turn() {
        let app = make_app();

        let first: ChatResponse =
            body_json(app.clone().oneshot(chat_request("one", None)).await.unwrap()).await;
        assert_eq!(first.message_count, 2);

        let mut session_id = first.session_id;
        for k in 2..=5 {
            let resp: ChatResponse = body_json(
                app.clone()
                    .oneshot(chat_request("again", Some(&session_id)))
                    .await
                    .unwrap(),
            )
            .await;
            assert_eq!(resp.message_count, 2 * k);
            assert_eq!(resp.session_id, session_id);
            session_id = resp.session_id;
        }
    }

    #[tokio::test]
    async fn test_chat_unknown_session_id_gets_fresh_session() {
        let resp: ChatResponse = body_json(
            make_app()
                .oneshot(chat_request("hello", Some("never-seen")))
                .await
                .unwrap(),
        )
        .await;
        assert_ne!(resp.session_id, "never-seen");
        assert_eq!(resp.message_count, 2);
    }

    #[tokio::test]
    async fn test_chat_accepts_camel_case_session_alias() {
        let app = make_app();
        let first: ChatResponse =
            body_json(app.clone().oneshot(chat_request("hi", None)).await.unwrap()).await;

        let body = serde_json::json!({ "message": "again", "sessionId": first.session_id });
        let resp: ChatResponse = body_json(
            app.oneshot(
                Request::post("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap(),
        )
        .await;

        assert_eq!(resp.session_id, first.session_id);
        assert_eq!(resp.message_count, 4);
    }

    // ---- /chat provider failure ----

    struct FailingResolver;

    #[async_trait]
    impl ReplyResolver for FailingResolver {
        async fn resolve(&self, _: &str, _: &[Message]) -> Result<String, LlmError> {
            Err(LlmError::Api("HTTP 500: upstream exploded".to_string()))
        }
    }

    #[tokio::test]
    async fn test_chat_provider_failure_is_bad_gateway() {
        let state = make_state().with_resolver(Arc::new(FailingResolver));
        let resp = crate::create_router(state)
            .oneshot(chat_request("hello", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_chat_provider_failure_leaves_session_untouched() {
        let state = make_state().with_resolver(Arc::new(FailingResolver));
        let (id, _) = state.store.get_or_create(None);

        let resp = crate::create_router(state.clone())
            .oneshot(chat_request("hello", Some(id.as_str())))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        // No orphaned user message in the history.
        assert!(state.store.history(&id).unwrap().is_empty());
    }

    // ---- /chat/history ----

    #[tokio::test]
    async fn test_history_alternates_and_matches_count() {
        let app = make_app();

        let first: ChatResponse =
            body_json(app.clone().oneshot(chat_request("one", None)).await.unwrap()).await;
        let last: ChatResponse = body_json(
            app.clone()
                .oneshot(chat_request("two", Some(&first.session_id)))
                .await
                .unwrap(),
        )
        .await;

        let resp = app
            .oneshot(
                Request::get(format!("/chat/history/{}", first.session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let history: HistoryResponse = body_json(resp).await;
        assert_eq!(history.session_id, first.session_id);
        assert_eq!(history.history.len(), last.message_count);
        assert_eq!(history.history[0].content, "one");
        assert_eq!(history.history[1].content, "echo: one");
        assert_eq!(history.history[2].content, "two");
        assert_eq!(history.history[3].content, "echo: two");
        for (i, msg) in history.history.iter().enumerate() {
            let expected = if i % 2 == 0 {
                parley_core::types::Role::User
            } else {
                parley_core::types::Role::Assistant
            };
            assert_eq!(msg.role, expected);
        }
    }

    #[tokio::test]
    async fn test_history_unknown_session_is_not_found() {
        let resp = make_app()
            .oneshot(
                Request::get("/chat/history/no-such-session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_history_fetch_is_idempotent() {
        let app = make_app();
        let chat: ChatResponse =
            body_json(app.clone().oneshot(chat_request("hi", None)).await.unwrap()).await;

        let url = format!("/chat/history/{}", chat.session_id);
        let first = app
            .clone()
            .oneshot(Request::get(url.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let second = app
            .oneshot(Request::get(url.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let first_bytes = axum::body::to_bytes(first.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let second_bytes = axum::body::to_bytes(second.into_body(), 1024 * 1024)
            .await
            .unwrap();
        assert_eq!(first_bytes, second_bytes);
    }

    // ---- /voice/chat ----

    #[tokio::test]
    async fn test_voice_chat_without_speech_provider_degrades_to_text() {
        let body = serde_json::json!({ "message": "hello" });
        let resp = make_app()
            .oneshot(
                Request::post("/voice/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["reply"], "echo: hello");
        assert_eq!(value["message_count"], 2);
        // The audio field is omitted entirely, not null.
        assert!(value.get("audio").is_none());
    }

    #[tokio::test]
    async fn test_voice_chat_shares_sessions_with_text_chat() {
        let app = make_app();
        let first: ChatResponse =
            body_json(app.clone().oneshot(chat_request("one", None)).await.unwrap()).await;

        let body =
            serde_json::json!({ "message": "two", "session_id": first.session_id });
        let resp: VoiceChatResponse = body_json(
            app.oneshot(
                Request::post("/voice/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap(),
        )
        .await;

        assert_eq!(resp.session_id, first.session_id);
        assert_eq!(resp.message_count, 4);
    }

    #[tokio::test]
    async fn test_voice_chat_rejects_empty_message() {
        let body = serde_json::json!({ "message": "" });
        let resp = make_app()
            .oneshot(
                Request::post("/voice/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // ---- /voice/stt ----

    #[tokio::test]
    async fn test_stt_without_speech_provider_reports_failure() {
        let resp = make_app()
            .oneshot(
                Request::post("/voice/stt")
                    .header("content-type", "audio/webm")
                    .body(Body::from(vec![0u8; 16]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let stt: SttResponse = body_json(resp).await;
        assert!(!stt.success);
        assert!(stt.text.is_empty());
    }

    #[tokio::test]
    async fn test_stt_rejects_empty_body() {
        let resp = make_app()
            .oneshot(
                Request::post("/voice/stt")
                    .header("content-type", "audio/webm")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // ---- /ui ----

    #[tokio::test]
    async fn test_ui_serves_embedded_frontend() {
        let resp = make_app()
            .oneshot(Request::get("/ui").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), 4 * 1024 * 1024)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn test_root_serves_frontend_too() {
        let resp = make_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
