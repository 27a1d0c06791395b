use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::chat::{
        ChatConnection, ChatMessage, ChatMessageRepository, ChatRoomService, MessageTextError,
        NewChatMessage, normalize_message_text,
    },
    ports::notification::{ListenerMessage, ListenerNotificationPort},
    services::room_gate::RoomMembershipGate,
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SendMessageError {
    #[error("Connection is not subscribed to a room")]
    NotSubscribed,
    #[error("Message too long (max {max} characters)")]
    TooLong { length: usize, max: usize },
    #[error("No longer a member of this event's group")]
    Forbidden,
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait::async_trait]
pub trait ChatMessageUseCase {
    /// Persists the message and broadcasts it to the room. Blank input is
    /// ignored (`Ok(None)`); rejected input is reported to the sender only.
    async fn send_message(
        &self,
        connection: &ChatConnection,
        raw_text: &str,
    ) -> Result<Option<ChatMessage>, SendMessageError>;
}

pub struct ChatMessageUseCaseImpl<
    G: RoomMembershipGate,
    C: ChatRoomService,
    R: ChatMessageRepository,
    L: ListenerNotificationPort,
> {
    room_gate: Arc<G>,
    chat_room_service: Arc<C>,
    message_repository: Arc<R>,
    listener_notification_port: Arc<L>,
}

impl<G: RoomMembershipGate, C: ChatRoomService, R: ChatMessageRepository, L: ListenerNotificationPort>
    ChatMessageUseCaseImpl<G, C, R, L>
{
    pub fn new(
        room_gate: Arc<G>,
        chat_room_service: Arc<C>,
        message_repository: Arc<R>,
        listener_notification_port: Arc<L>,
    ) -> Self {
        Self {
            room_gate,
            chat_room_service,
            message_repository,
            listener_notification_port,
        }
    }

    fn reject(&self, connection: &ChatConnection, error: SendMessageError) -> SendMessageError {
        self.listener_notification_port.notify_listener(
            connection.listener_id(),
            ListenerMessage::Error {
                detail: error.to_string(),
            },
        );
        error
    }
}

#[async_trait::async_trait]
impl<
    G: RoomMembershipGate + Send + Sync + 'static,
    C: ChatRoomService + Send + Sync + 'static,
    R: ChatMessageRepository + Send + Sync + 'static,
    L: ListenerNotificationPort + Send + Sync + 'static,
> ChatMessageUseCase for ChatMessageUseCaseImpl<G, C, R, L>
{
    async fn send_message(
        &self,
        connection: &ChatConnection,
        raw_text: &str,
    ) -> Result<Option<ChatMessage>, SendMessageError> {
        let Some(user) = connection.user().filter(|_| connection.is_subscribed()) else {
            return Err(SendMessageError::NotSubscribed);
        };
        let event_id = connection.event_id();

        let text = match normalize_message_text(raw_text) {
            Ok(text) => text,
            Err(MessageTextError::Empty) => return Ok(None),
            Err(MessageTextError::TooLong { length, max }) => {
                return Err(self.reject(connection, SendMessageError::TooLong { length, max }));
            }
        };

        if !self.room_gate.authorize(user.user_id, event_id).await {
            log::info!(
                "Dropping message of {} in event {}: no longer a member",
                user.user_id,
                event_id
            );
            return Err(self.reject(connection, SendMessageError::Forbidden));
        }

        let Some(room) = self.chat_room_service.get_room(event_id) else {
            return Err(SendMessageError::NotSubscribed);
        };

        // held across persist and broadcast
        let _sequence = room.lock_writes().await;

        let message = match self
            .message_repository
            .create_message(NewChatMessage {
                event_id,
                user_id: user.user_id,
                username: user.username.clone(),
                text,
                created_at: Utc::now(),
            })
            .await
        {
            Ok(message) => message,
            Err(e) => {
                log::error!("Failed to persist chat message in event {}: {}", event_id, e);
                return Err(self.reject(connection, SendMessageError::StorageError(e.to_string())));
            }
        };

        self.listener_notification_port.notify_listeners(
            &room.listeners(),
            ListenerMessage::ChatMessage {
                message: message.clone(),
            },
        );

        Ok(Some(message))
    }
}
