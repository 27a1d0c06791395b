use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;

use crate::{
    domain::{
        EventId, RepoRetrieveError, UserId,
        balancing::{BalanceError, TeamBalancingService},
        team::{NewTeam, Team, TeamRepository},
    },
    ports::{event::EventRepository, membership::GroupMembershipRepository},
    services::roster_resolver::RosterResolverService,
    workflow::{AccessLevel, EventAccessError, require_event_access},
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GenerateTeamsError {
    #[error("Event not found")]
    EventNotFound,
    #[error("Only group admins can generate teams")]
    Forbidden,
    #[error("Not enough players: {available} confirmed, {required} required")]
    InsufficientPlayers { available: usize, required: usize },
    #[error("Not enough goalkeepers: {available} available, {required} required")]
    InsufficientGoalkeepers { available: usize, required: usize },
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<EventAccessError> for GenerateTeamsError {
    fn from(value: EventAccessError) -> Self {
        match value {
            EventAccessError::EventNotFound => GenerateTeamsError::EventNotFound,
            EventAccessError::Forbidden => GenerateTeamsError::Forbidden,
            EventAccessError::StorageError(e) => GenerateTeamsError::StorageError(e),
        }
    }
}

impl From<BalanceError> for GenerateTeamsError {
    fn from(value: BalanceError) -> Self {
        match value {
            BalanceError::InsufficientPlayers {
                available,
                required,
            } => GenerateTeamsError::InsufficientPlayers {
                available,
                required,
            },
            BalanceError::InsufficientGoalkeepers {
                available,
                required,
            } => GenerateTeamsError::InsufficientGoalkeepers {
                available,
                required,
            },
        }
    }
}

#[async_trait::async_trait]
pub trait GenerateTeamsUseCase {
    async fn generate_teams(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<Vec<Team>, GenerateTeamsError>;
}

pub struct GenerateTeamsUseCaseImpl<
    E: EventRepository,
    M: GroupMembershipRepository,
    R: RosterResolverService,
    B: TeamBalancingService,
    T: TeamRepository,
> {
    event_repository: Arc<E>,
    membership_repository: Arc<M>,
    roster_resolver: Arc<R>,
    balancing_service: Arc<B>,
    team_repository: Arc<T>,
    event_locks: DashMap<EventId, Arc<tokio::sync::Mutex<()>>>,
}

impl<
    E: EventRepository,
    M: GroupMembershipRepository,
    R: RosterResolverService,
    B: TeamBalancingService,
    T: TeamRepository,
> GenerateTeamsUseCaseImpl<E, M, R, B, T>
{
    pub fn new(
        event_repository: Arc<E>,
        membership_repository: Arc<M>,
        roster_resolver: Arc<R>,
        balancing_service: Arc<B>,
        team_repository: Arc<T>,
    ) -> Self {
        Self {
            event_repository,
            membership_repository,
            roster_resolver,
            balancing_service,
            team_repository,
            event_locks: DashMap::new(),
        }
    }

    fn event_lock(&self, event_id: EventId) -> Arc<tokio::sync::Mutex<()>> {
        self.event_locks.entry(event_id).or_default().clone()
    }

    fn release_event_lock(&self, event_id: EventId) {
        // only the map itself still references an idle lock
        self.event_locks
            .remove_if(&event_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl<
    E: EventRepository + Send + Sync + 'static,
    M: GroupMembershipRepository + Send + Sync + 'static,
    R: RosterResolverService + Send + Sync + 'static,
    B: TeamBalancingService + Send + Sync + 'static,
    T: TeamRepository + Send + Sync + 'static,
> GenerateTeamsUseCaseImpl<E, M, R, B, T>
{
    async fn generate_locked(&self, event_id: EventId) -> Result<Vec<Team>, GenerateTeamsError> {
        // reload under the lock so the format is current
        let event = self
            .event_repository
            .get_event(event_id)
            .await
            .map_err(|e| match e {
                RepoRetrieveError::NotFound => GenerateTeamsError::EventNotFound,
                RepoRetrieveError::StorageError(e) => GenerateTeamsError::StorageError(e),
            })?;

        let roster = self
            .roster_resolver
            .resolve(&event)
            .await
            .map_err(|e| GenerateTeamsError::StorageError(e.to_string()))?;

        let allocations = self.balancing_service.balance(&roster, event.format)?;
        let teams: Vec<NewTeam> = allocations.into_iter().map(NewTeam::from).collect();

        self.team_repository
            .replace_teams(event_id, teams, Utc::now())
            .await
            .map_err(|e| GenerateTeamsError::StorageError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl<
    E: EventRepository + Send + Sync + 'static,
    M: GroupMembershipRepository + Send + Sync + 'static,
    R: RosterResolverService + Send + Sync + 'static,
    B: TeamBalancingService + Send + Sync + 'static,
    T: TeamRepository + Send + Sync + 'static,
> GenerateTeamsUseCase for GenerateTeamsUseCaseImpl<E, M, R, B, T>
{
    async fn generate_teams(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<Vec<Team>, GenerateTeamsError> {
        require_event_access(
            self.event_repository.as_ref(),
            self.membership_repository.as_ref(),
            user_id,
            event_id,
            AccessLevel::Admin,
        )
        .await?;

        let result = {
            let lock = self.event_lock(event_id);
            let _guard = lock.lock().await;
            self.generate_locked(event_id).await
        };
        self.release_event_lock(event_id);

        match &result {
            Ok(teams) => log::info!(
                "Generated {} teams for event {} (requested by {})",
                teams.len(),
                event_id,
                user_id
            ),
            Err(e) => log::info!("Team generation for event {} failed: {}", event_id, e),
        }
        result
    }
}
