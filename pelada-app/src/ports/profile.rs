use std::collections::HashMap;

use crate::domain::{GroupId, ProfileId, RepoError, UserId, player::Position};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub rating: i32,
    pub position: Position,
    pub can_be_goalkeeper: bool,
}

#[async_trait::async_trait]
pub trait PlayerProfileRepository {
    async fn get_profile(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<Option<PlayerProfile>, RepoError>;

    /// Profiles of `user_ids` within the group; users without one are absent.
    async fn get_profiles(
        &self,
        group_id: GroupId,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, PlayerProfile>, RepoError>;
}
