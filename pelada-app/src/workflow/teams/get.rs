use std::sync::Arc;

use crate::{
    domain::{EventId, UserId, team::{Team, TeamRepository}},
    ports::{event::EventRepository, membership::GroupMembershipRepository},
    workflow::{AccessLevel, EventAccessError, require_event_access},
};

#[async_trait::async_trait]
pub trait GetTeamsUseCase {
    async fn get_teams(&self, user_id: UserId, event_id: EventId)
    -> Result<Vec<Team>, EventAccessError>;
}

pub struct GetTeamsUseCaseImpl<E: EventRepository, M: GroupMembershipRepository, T: TeamRepository>
{
    event_repository: Arc<E>,
    membership_repository: Arc<M>,
    team_repository: Arc<T>,
}

impl<E: EventRepository, M: GroupMembershipRepository, T: TeamRepository>
    GetTeamsUseCaseImpl<E, M, T>
{
    pub fn new(
        event_repository: Arc<E>,
        membership_repository: Arc<M>,
        team_repository: Arc<T>,
    ) -> Self {
        Self {
            event_repository,
            membership_repository,
            team_repository,
        }
    }
}

#[async_trait::async_trait]
impl<
    E: EventRepository + Send + Sync + 'static,
    M: GroupMembershipRepository + Send + Sync + 'static,
    T: TeamRepository + Send + Sync + 'static,
> GetTeamsUseCase for GetTeamsUseCaseImpl<E, M, T>
{
    async fn get_teams(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<Vec<Team>, EventAccessError> {
        require_event_access(
            self.event_repository.as_ref(),
            self.membership_repository.as_ref(),
            user_id,
            event_id,
            AccessLevel::Member,
        )
        .await?;
        self.team_repository
            .get_teams(event_id)
            .await
            .map_err(|e| EventAccessError::StorageError(e.to_string()))
    }
}
