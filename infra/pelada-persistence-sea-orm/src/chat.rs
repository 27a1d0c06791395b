use pelada_app::domain::{
    ChatMessageId, EventId, RepoError, UserId,
    chat::{ChatMessage, ChatMessageRepository, NewChatMessage},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::{entity::chat_message, storage_error};

pub struct ChatMessageRepositoryImpl {
    db: DatabaseConnection,
}

impl ChatMessageRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_message(model: chat_message::Model) -> ChatMessage {
        ChatMessage {
            id: ChatMessageId(model.id),
            event_id: EventId(model.event_id),
            user_id: UserId(model.user_id),
            username: model.username,
            text: model.text,
            created_at: model.created_at,
        }
    }
}

#[async_trait::async_trait]
impl ChatMessageRepository for ChatMessageRepositoryImpl {
    async fn create_message(&self, message: NewChatMessage) -> Result<ChatMessage, RepoError> {
        let model = chat_message::ActiveModel {
            event_id: Set(message.event_id.0),
            user_id: Set(message.user_id.0),
            username: Set(message.username),
            text: Set(message.text),
            created_at: Set(message.created_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(storage_error)?;
        Ok(Self::model_to_message(model))
    }

    async fn list_messages(&self, event_id: EventId) -> Result<Vec<ChatMessage>, RepoError> {
        let models = chat_message::Entity::find()
            .filter(chat_message::Column::EventId.eq(event_id.0))
            .order_by_asc(chat_message::Column::CreatedAt)
            .order_by_asc(chat_message::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(models.into_iter().map(Self::model_to_message).collect())
    }
}
