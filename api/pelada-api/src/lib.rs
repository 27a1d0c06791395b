use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::info;
use pelada_app::{
    Application, ports::authentication::TokenValidationPort,
    workflow::{EventAccessError, teams::generate::GenerateTeamsError},
};

use crate::ws::WsService;

mod auth;
mod chat;
mod teams;
#[cfg(test)]
mod testing;
pub mod ws;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Application>,
    pub ws: Arc<WsService>,
    pub auth: Arc<dyn TokenValidationPort + Send + Sync + 'static>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/events/{event_id}/generate-teams",
            post(teams::generate_teams),
        )
        .route("/events/{event_id}/teams", get(teams::get_teams))
        .route("/events/{event_id}/chat/messages", get(chat::list_messages))
        .route("/ws/events/{event_id}/chat", get(ws::ws_handler))
        .with_state(state)
}

pub async fn run(
    state: AppState,
    host: &str,
    port: u16,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    info!("API server listening on {}:{}", host, port);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("API server shut down gracefully");
    Ok(())
}

#[derive(Debug)]
pub enum ServiceError {
    NotFound(String),
    Unauthorized(String),
    /// The request is valid but cannot be carried out; `reason` is a stable
    /// machine-readable code.
    NotPossible {
        message: String,
        reason: &'static str,
    },
    Internal(String),
    Forbidden(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServiceError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServiceError::NotPossible { message, reason } => {
                write!(f, "Not possible ({}): {}", reason, message)
            }
            ServiceError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ServiceError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ServiceError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, serde_json::json!({ "error": msg }))
            }
            ServiceError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, serde_json::json!({ "error": msg }))
            }
            ServiceError::NotPossible { message, reason } => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": message, "reason": reason }),
            ),
            ServiceError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Internal server error" }),
                )
            }
            ServiceError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, serde_json::json!({ "error": msg }))
            }
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<EventAccessError> for ServiceError {
    fn from(value: EventAccessError) -> Self {
        match value {
            EventAccessError::EventNotFound => ServiceError::NotFound(value.to_string()),
            EventAccessError::Forbidden => ServiceError::Forbidden(value.to_string()),
            EventAccessError::StorageError(e) => ServiceError::Internal(e),
        }
    }
}

impl From<GenerateTeamsError> for ServiceError {
    fn from(value: GenerateTeamsError) -> Self {
        match value {
            GenerateTeamsError::EventNotFound => ServiceError::NotFound(value.to_string()),
            GenerateTeamsError::Forbidden => ServiceError::Forbidden(value.to_string()),
            GenerateTeamsError::InsufficientPlayers { .. } => ServiceError::NotPossible {
                message: value.to_string(),
                reason: "InsufficientPlayers",
            },
            GenerateTeamsError::InsufficientGoalkeepers { .. } => ServiceError::NotPossible {
                message: value.to_string(),
                reason: "InsufficientGoalkeepers",
            },
            GenerateTeamsError::StorageError(e) => ServiceError::Internal(e),
        }
    }
}
