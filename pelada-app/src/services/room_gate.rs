use std::sync::Arc;

use crate::{
    domain::{EventId, RepoRetrieveError, UserId},
    ports::{event::EventRepository, membership::GroupMembershipRepository},
};

#[async_trait::async_trait]
pub trait RoomMembershipGate {
    /// True iff the event exists and the user belongs to its group.
    async fn authorize(&self, user_id: UserId, event_id: EventId) -> bool;
}

pub struct RoomMembershipGateImpl<E: EventRepository, M: GroupMembershipRepository> {
    event_repository: Arc<E>,
    membership_repository: Arc<M>,
}

impl<E: EventRepository, M: GroupMembershipRepository> RoomMembershipGateImpl<E, M> {
    pub fn new(event_repository: Arc<E>, membership_repository: Arc<M>) -> Self {
        Self {
            event_repository,
            membership_repository,
        }
    }
}

#[async_trait::async_trait]
impl<
    E: EventRepository + Send + Sync + 'static,
    M: GroupMembershipRepository + Send + Sync + 'static,
> RoomMembershipGate for RoomMembershipGateImpl<E, M>
{
    async fn authorize(&self, user_id: UserId, event_id: EventId) -> bool {
        let event = match self.event_repository.get_event(event_id).await {
            Ok(event) => event,
            Err(RepoRetrieveError::NotFound) => return false,
            Err(e) => {
                log::error!("Failed to load event {} for room access: {}", event_id, e);
                return false;
            }
        };
        match self
            .membership_repository
            .is_member(event.group_id, user_id)
            .await
        {
            Ok(is_member) => is_member,
            Err(e) => {
                log::error!(
                    "Failed to check membership of {} in group {}: {}",
                    user_id,
                    event.group_id,
                    e
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{Fixture, alice, bob, carol};

    use super::*;

    #[tokio::test]
    async fn test_authorize() {
        let fixture = Fixture::new();
        let event = fixture.add_event(crate::domain::event::EventFormat::Futsal);
        fixture.add_member(event.group_id, alice().user_id, false);
        fixture.add_member(event.group_id, bob().user_id, true);

        let gate = RoomMembershipGateImpl::new(fixture.events.clone(), fixture.memberships.clone());

        assert!(gate.authorize(alice().user_id, event.id).await);
        assert!(gate.authorize(bob().user_id, event.id).await);
        assert!(!gate.authorize(carol().user_id, event.id).await);
        assert!(
            !gate
                .authorize(alice().user_id, EventId(uuid::Uuid::new_v4()))
                .await
        );
    }

    #[tokio::test]
    async fn test_storage_failure_denies() {
        let fixture = Fixture::new();
        let event = fixture.add_event(crate::domain::event::EventFormat::Futsal);
        fixture.add_member(event.group_id, alice().user_id, false);
        fixture.memberships.fail_next();

        let gate = RoomMembershipGateImpl::new(fixture.events.clone(), fixture.memberships.clone());
        assert!(!gate.authorize(alice().user_id, event.id).await);
        assert!(gate.authorize(alice().user_id, event.id).await);
    }
}
