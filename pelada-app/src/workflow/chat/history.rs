use std::sync::Arc;

use crate::{
    domain::{
        EventId, UserId,
        chat::{ChatMessage, ChatMessageRepository},
    },
    ports::{event::EventRepository, membership::GroupMembershipRepository},
    workflow::{AccessLevel, EventAccessError, require_event_access},
};

#[async_trait::async_trait]
pub trait ChatHistoryUseCase {
    async fn list_messages(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<Vec<ChatMessage>, EventAccessError>;
}

pub struct ChatHistoryUseCaseImpl<
    E: EventRepository,
    M: GroupMembershipRepository,
    R: ChatMessageRepository,
> {
    event_repository: Arc<E>,
    membership_repository: Arc<M>,
    message_repository: Arc<R>,
}

impl<E: EventRepository, M: GroupMembershipRepository, R: ChatMessageRepository>
    ChatHistoryUseCaseImpl<E, M, R>
{
    pub fn new(
        event_repository: Arc<E>,
        membership_repository: Arc<M>,
        message_repository: Arc<R>,
    ) -> Self {
        Self {
            event_repository,
            membership_repository,
            message_repository,
        }
    }
}

#[async_trait::async_trait]
impl<
    E: EventRepository + Send + Sync + 'static,
    M: GroupMembershipRepository + Send + Sync + 'static,
    R: ChatMessageRepository + Send + Sync + 'static,
> ChatHistoryUseCase for ChatHistoryUseCaseImpl<E, M, R>
{
    async fn list_messages(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<Vec<ChatMessage>, EventAccessError> {
        require_event_access(
            self.event_repository.as_ref(),
            self.membership_repository.as_ref(),
            user_id,
            event_id,
            AccessLevel::Member,
        )
        .await?;
        self.message_repository
            .list_messages(event_id)
            .await
            .map_err(|e| EventAccessError::StorageError(e.to_string()))
    }
}
