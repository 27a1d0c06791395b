use chrono::{DateTime, Utc};

use crate::domain::{
    EventId, ProfileId, RepoError, TeamId, UserId,
    balancing::TeamAllocation,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Team {
    pub id: TeamId,
    pub event_id: EventId,
    pub name: String,
    pub total_rating: i32,
    pub created_at: DateTime<Utc>,
    pub members: Vec<TeamMember>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamMember {
    pub user_id: UserId,
    pub profile_id: Option<ProfileId>,
    pub is_goalkeeper: bool,
}

/// A team that has been allocated but not yet persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewTeam {
    pub name: String,
    pub total_rating: i32,
    pub members: Vec<TeamMember>,
}

impl From<TeamAllocation> for NewTeam {
    fn from(allocation: TeamAllocation) -> Self {
        Self {
            name: allocation.name,
            total_rating: allocation.total_rating,
            members: allocation
                .members
                .into_iter()
                .map(|m| TeamMember {
                    user_id: m.user_id,
                    profile_id: m.profile_id,
                    is_goalkeeper: m.is_goalkeeper,
                })
                .collect(),
        }
    }
}

#[async_trait::async_trait]
pub trait TeamRepository {
    /// Deletes every team of the event, inserts `teams` and stamps the event
    /// with `generated_at`, all or nothing.
    async fn replace_teams(
        &self,
        event_id: EventId,
        teams: Vec<NewTeam>,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<Team>, RepoError>;

    async fn get_teams(&self, event_id: EventId) -> Result<Vec<Team>, RepoError>;
}
