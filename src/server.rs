//! HTTP chat server.
//!
//! Provides [`serve_http`], which loads the dataset bank, builds the
//! [`Responder`], and serves `POST /chat` and `GET /health` until ctrl-c.

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use mcai::config::McaiConfig;
use mcai::dataset::DatasetBank;
use mcai::responder::{ChatResponse, Responder};

#[derive(Clone)]
pub struct AppState {
    responder: Arc<Responder>,
    dataset_examples: usize,
}

impl AppState {
    pub fn new(responder: Responder, dataset_examples: usize) -> Self {
        Self {
            responder: Arc::new(responder),
            dataset_examples,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    conversation_history: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    dataset_examples: usize,
    cache_backend: &'static str,
}

/// Shared setup: load the dataset bank and build the responder.
pub fn setup_shared_state(config: &McaiConfig) -> Result<AppState> {
    let dataset_dir = config.resolved_dataset_dir();
    let bank = DatasetBank::load_dir(&dataset_dir)?;
    tracing::info!(dir = %dataset_dir.display(), examples = bank.len(), "dataset bank ready");

    let dataset_examples = bank.len();
    let responder = Responder::from_config(config, Arc::new(bank))?;

    Ok(AppState::new(responder, dataset_examples))
}

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
}

/// Malformed bodies get the clarification reply with 200, like an empty message.
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Json<ChatResponse> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::info!(status = %rejection.status(), error = %rejection.body_text(), "unreadable chat request");
            return Json(Responder::clarification());
        }
    };
    let reply = state
        .responder
        .respond(&req.message, &req.conversation_history)
        .await;
    Json(reply)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache_backend = state
        .responder
        .cache()
        .map(|c| c.backend())
        .unwrap_or("none");
    Json(HealthResponse {
        status: "ok",
        dataset_examples: state.dataset_examples,
        cache_backend,
    })
}

/// Start the chat server on `server.host:server.port`.
pub async fn serve_http(config: McaiConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %bind_addr, "starting MC AI chat server");

    let state = setup_shared_state(&config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "chat server listening at http://{bind_addr}/chat");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down chat server");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcai::knowledge::FallbackChain;
    use mcai::responder::handlers::CLARIFY_MESSAGE;
    use mcai::router::Router;

    async fn spawn_server() -> String {
        let responder = Responder::new(Router::default(), FallbackChain::new());
        let app = router(AppState::new(responder, 0));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn post_raw(
        base: &str,
        body: &'static str,
        content_type: Option<&str>,
    ) -> (u16, serde_json::Value) {
        let mut req = reqwest::Client::new().post(format!("{base}/chat")).body(body);
        if let Some(ct) = content_type {
            req = req.header("content-type", ct);
        }
        let resp = req.send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    #[tokio::test]
    async fn malformed_bodies_get_a_clarification_with_200() {
        let base = spawn_server().await;
        let cases: [(&str, Option<&str>); 4] = [
            (r#"{"message": 42}"#, Some("application/json")),
            ("not json", Some("application/json")),
            (r#"{"message":"hi","conversation_history":"oops"}"#, Some("application/json")),
            (r#"{"message":"hi"}"#, None),
        ];

        for (body, content_type) in cases {
            let (status, json) = post_raw(&base, body, content_type).await;
            assert_eq!(status, 200, "body {body:?}");
            assert_eq!(json["response"], CLARIFY_MESSAGE, "body {body:?}");
            assert_eq!(json["metadata"]["route"], "default", "body {body:?}");
        }
    }

    #[tokio::test]
    async fn well_formed_request_is_routed() {
        let base = spawn_server().await;

        let (status, json) = post_raw(
            &base,
            r#"{"message":"draw me a sunset"}"#,
            Some("application/json"),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(json["metadata"]["route"], "art");
        assert_eq!(json["metadata"]["handoff"], "art");
    }

    #[tokio::test]
    async fn health_reports_no_cache() {
        let base = spawn_server().await;

        let json: serde_json::Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["cache_backend"], "none");
    }
}
