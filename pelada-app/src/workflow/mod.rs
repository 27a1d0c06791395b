use crate::{
    domain::{EventId, RepoRetrieveError, UserId, event::EventRecord},
    ports::{event::EventRepository, membership::GroupMembershipRepository},
};

pub mod chat;
pub mod teams;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessLevel {
    Member,
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EventAccessError {
    #[error("Event not found")]
    EventNotFound,
    #[error("Insufficient permissions for this event")]
    Forbidden,
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Loads the event and checks the user's role in its group.
pub(crate) async fn require_event_access<E: EventRepository, M: GroupMembershipRepository>(
    event_repository: &E,
    membership_repository: &M,
    user_id: UserId,
    event_id: EventId,
    level: AccessLevel,
) -> Result<EventRecord, EventAccessError> {
    let event = match event_repository.get_event(event_id).await {
        Ok(event) => event,
        Err(RepoRetrieveError::NotFound) => return Err(EventAccessError::EventNotFound),
        Err(RepoRetrieveError::StorageError(e)) => return Err(EventAccessError::StorageError(e)),
    };
    let allowed = match level {
        AccessLevel::Member => membership_repository.is_member(event.group_id, user_id).await,
        AccessLevel::Admin => membership_repository.is_admin(event.group_id, user_id).await,
    }
    .map_err(|e| EventAccessError::StorageError(e.to_string()))?;
    if !allowed {
        return Err(EventAccessError::Forbidden);
    }
    Ok(event)
}
