use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use axum::extract::ws::{self, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, post};
use axum::{Json, Router};
use futures_util::StreamExt as _;
use log::{debug, info};
use oracle_model::CategoryId;
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use crate::oracle::message_bus::{MessageBus, UiCommand};
use crate::utils::ResultExt as _;

struct AppState {
    message_bus: MessageBus,
}

type AppStateArg = State<Arc<AppState>>;

#[derive(Serialize)]
struct EmptyResponse;

impl IntoResponse for EmptyResponse {
    fn into_response(self) -> Response {
        Json(EmptyResponse).into_response()
    }
}

async fn initialize_ui(State(state): AppStateArg) -> impl IntoResponse {
    debug!("initialize_ui");
    state.message_bus.send(UiCommand::InitializeUi.into());
    EmptyResponse
}

#[derive(Debug, Deserialize)]
struct SetQuestion {
    question: String,
}
async fn set_question(
    State(state): AppStateArg,
    Json(body): Json<SetQuestion>,
) -> impl IntoResponse {
    debug!("set_question({:?})", body);
    state
        .message_bus
        .send(UiCommand::SetQuestion(body.question).into());
    EmptyResponse
}

#[derive(Debug, Deserialize)]
struct SelectCategory {
    category: CategoryId,
}
async fn select_category(
    State(state): AppStateArg,
    Json(body): Json<SelectCategory>,
) -> impl IntoResponse {
    debug!("select_category({:?})", body);
    state
        .message_bus
        .send(UiCommand::SelectCategory(body.category).into());
    EmptyResponse
}

#[derive(Debug, Deserialize)]
struct Submit {
    question: String,
    category: CategoryId,
}
async fn submit(State(state): AppStateArg, Json(body): Json<Submit>) -> impl IntoResponse {
    debug!("submit({:?})", body);
    state.message_bus.send(
        UiCommand::Submit {
            question: body.question,
            category: body.category,
        }
        .into(),
    );
    EmptyResponse
}

async fn create_ui_event_stream(ws: WebSocketUpgrade, State(state): AppStateArg) -> Response {
    ws.on_upgrade(move |socket| ui_event_stream(socket, state.message_bus.clone()))
}

fn wrap_result<T: Serialize, E: Display>(
    r: std::result::Result<T, E>,
) -> std::result::Result<ws::Message, axum::Error> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    enum WrappedResult<T> {
        Success(T),
        Error(String),
    }
    let wrapped_result = match r {
        Ok(data) => WrappedResult::Success(data),
        Err(e) => WrappedResult::Error(e.to_string()),
    };
    let json_text = serde_json::to_string_pretty(&wrapped_result)
        .unwrap_or_else(|e| format!("{{ \"error\": \"JSON serialization failed: {e}\" }}"));
    Ok(ws::Message::text(json_text))
}

async fn ui_event_stream(socket: WebSocket, message_bus: MessageBus) {
    info!("New UI event stream started.");
    let stream = message_bus.subscribe().ui_update_stream().map(wrap_result);
    stream
        .forward(socket)
        .await
        .context("UI event stream closed")
        .print_err_info();
    info!("UI event stream finished.");
}

fn router(message_bus: MessageBus, static_serving_dir: PathBuf) -> Router {
    let shared_state = Arc::new(AppState { message_bus });
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .route("/ui_stream", any(create_ui_event_stream))
                .route("/initialize_ui", post(initialize_ui))
                .route("/set_question", post(set_question))
                .route("/select_category", post(select_category))
                .route("/submit", post(submit))
                .with_state(shared_state),
        )
        .fallback_service(ServeDir::new(static_serving_dir))
}

pub async fn serve(
    message_bus: MessageBus,
    serving_addr: String,
    static_serving_dir: PathBuf,
) -> Result<()> {
    let app = router(message_bus, static_serving_dir);
    let listener = tokio::net::TcpListener::bind(&serving_addr)
        .await
        .with_context(|| format!("Cannot bind {serving_addr}"))?;
    info!("Serving on http://{serving_addr}");
    axum::serve(listener, app).await.context("Api server failed")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::{StreamExt as _, TryStreamExt as _};
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use tokio::time::timeout;

    use super::*;
    use crate::oracle::message_bus::OracleInput;

    async fn spawn_server(message_bus: MessageBus) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(message_bus, PathBuf::from("ui/dist"));
        tokio::spawn(async move { axum::serve(listener, app).await });
        format!("http://{addr}/api/v1")
    }

    async fn post_json(url: String, body: &'static str) -> StatusCode {
        reqwest::Client::new()
            .post(url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn submit_route_sends_command_to_oracle() {
        let message_bus = MessageBus::new();
        let mut inputs = message_bus.subscribe().oracle_input_stream().boxed();
        let base = spawn_server(message_bus.clone()).await;

        let status = post_json(
            format!("{base}/submit"),
            r#"{"question": "Will I be rich?", "category": "wealth"}"#,
        )
        .await;
        assert!(status.is_success());

        match inputs.try_next().await {
            Ok(Some(OracleInput::UiCommand(UiCommand::Submit { question, category }))) => {
                assert_eq!(question, "Will I be rich?");
                assert_eq!(category, CategoryId::from("wealth"));
            }
            other => panic!("Expected submit command, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_submit_is_rejected() {
        let message_bus = MessageBus::new();
        let mut inputs = message_bus.subscribe().oracle_input_stream().boxed();
        let base = spawn_server(message_bus.clone()).await;

        let status = post_json(format!("{base}/submit"), r#"{"question": 42}"#).await;
        assert!(status.is_client_error());
        assert!(timeout(Duration::from_millis(200), inputs.try_next())
            .await
            .is_err());
    }

    #[test]
    fn ws_messages_wrap_success_and_error() {
        let ws::Message::Text(text) = wrap_result::<_, String>(Ok(json!({"isBusy": true}))).unwrap()
        else {
            panic!("Expected text message");
        };
        let value: Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(value, json!({"success": {"isBusy": true}}));

        let ws::Message::Text(text) = wrap_result::<Value, _>(Err("lagged")).unwrap() else {
            panic!("Expected text message");
        };
        let value: Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(value, json!({"error": "lagged"}));
    }

    #[test]
    fn submit_body_uses_plain_category_string() {
        let body: Submit =
            serde_json::from_value(json!({"question": "Will I be rich?", "category": "wealth"}))
                .unwrap();
        assert_eq!(body.question, "Will I be rich?");
        assert_eq!(body.category, CategoryId::from("wealth"));
    }
}
