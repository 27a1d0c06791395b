use axum::{
    Json,
    extract::{Path, State},
};
use pelada_app::{
    domain::{EventId, chat::ChatMessage},
    workflow::chat::history::ChatHistoryUseCase,
};
use uuid::Uuid;

use crate::{AppState, ServiceError, auth::Auth};

#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct ChatMessageInfo {
    pub id: i64,
    pub event_id: String,
    pub user_id: String,
    pub username: String,
    pub text: String,
    pub created_at: String,
}

impl From<ChatMessage> for ChatMessageInfo {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id.0,
            event_id: message.event_id.to_string(),
            user_id: message.user_id.to_string(),
            username: message.username,
            text: message.text,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

pub async fn list_messages(
    Auth(user): Auth,
    State(app): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessageInfo>>, ServiceError> {
    let messages = app
        .app
        .chat_history_use_case
        .list_messages(user.user_id, EventId(event_id))
        .await?;
    Ok(Json(messages.into_iter().map(ChatMessageInfo::from).collect()))
}
