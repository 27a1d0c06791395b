use std::{collections::HashSet, sync::Arc};

use crate::{
    domain::{
        RepoError, UserId,
        event::EventRecord,
        player::{Player, Roster},
    },
    ports::{
        attendance::{AttendanceRepository, AttendanceStatus},
        profile::PlayerProfileRepository,
    },
};

#[async_trait::async_trait]
pub trait RosterResolverService {
    async fn resolve(&self, event: &EventRecord) -> Result<Roster, RepoError>;
}

pub struct RosterResolverServiceImpl<A: AttendanceRepository, P: PlayerProfileRepository> {
    attendance_repository: Arc<A>,
    profile_repository: Arc<P>,
}

impl<A: AttendanceRepository, P: PlayerProfileRepository> RosterResolverServiceImpl<A, P> {
    pub fn new(attendance_repository: Arc<A>, profile_repository: Arc<P>) -> Self {
        Self {
            attendance_repository,
            profile_repository,
        }
    }
}

#[async_trait::async_trait]
impl<
    A: AttendanceRepository + Send + Sync + 'static,
    P: PlayerProfileRepository + Send + Sync + 'static,
> RosterResolverService for RosterResolverServiceImpl<A, P>
{
    async fn resolve(&self, event: &EventRecord) -> Result<Roster, RepoError> {
        // a player is on the roster once, at their first confirmation
        let mut seen = HashSet::new();
        let user_ids: Vec<UserId> = self
            .attendance_repository
            .list_confirmed(event.id)
            .await?
            .into_iter()
            .filter(|record| record.status == AttendanceStatus::Go)
            .map(|record| record.user_id)
            .filter(|user_id| seen.insert(*user_id))
            .collect();

        if user_ids.is_empty() {
            return Ok(Roster::default());
        }

        let mut profiles = self
            .profile_repository
            .get_profiles(event.group_id, &user_ids)
            .await?;

        let players = user_ids
            .into_iter()
            .map(|user_id| match profiles.remove(&user_id) {
                Some(profile) => Player {
                    user_id,
                    profile_id: Some(profile.id),
                    rating: profile.rating,
                    position: profile.position,
                    can_be_goalkeeper: profile.can_be_goalkeeper,
                },
                None => Player::without_profile(user_id),
            })
            .collect();

        Ok(Roster::new(players))
    }
}
