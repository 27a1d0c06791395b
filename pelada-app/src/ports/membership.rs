use crate::domain::{GroupId, RepoError, UserId};

#[async_trait::async_trait]
pub trait GroupMembershipRepository {
    async fn is_member(&self, group_id: GroupId, user_id: UserId) -> Result<bool, RepoError>;
    async fn is_admin(&self, group_id: GroupId, user_id: UserId) -> Result<bool, RepoError>;
}
