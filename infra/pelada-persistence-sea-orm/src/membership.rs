use pelada_app::{
    domain::{GroupId, RepoError, UserId},
    ports::membership::GroupMembershipRepository,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::{entity::group_member, storage_error};

pub struct GroupMembershipRepositoryImpl {
    db: DatabaseConnection,
}

impl GroupMembershipRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_member(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<Option<group_member::Model>, RepoError> {
        group_member::Entity::find()
            .filter(group_member::Column::GroupId.eq(group_id.0))
            .filter(group_member::Column::UserId.eq(user_id.0))
            .one(&self.db)
            .await
            .map_err(storage_error)
    }
}

#[async_trait::async_trait]
impl GroupMembershipRepository for GroupMembershipRepositoryImpl {
    async fn is_member(&self, group_id: GroupId, user_id: UserId) -> Result<bool, RepoError> {
        Ok(self.find_member(group_id, user_id).await?.is_some())
    }

    async fn is_admin(&self, group_id: GroupId, user_id: UserId) -> Result<bool, RepoError> {
        Ok(self
            .find_member(group_id, user_id)
            .await?
            .is_some_and(|member| member.is_admin))
    }
}
