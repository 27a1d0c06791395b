use std::{collections::HashMap, str::FromStr};

use pelada_app::{
    domain::{GroupId, ProfileId, RepoError, UserId, player::Position},
    ports::profile::{PlayerProfile, PlayerProfileRepository},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::{entity::player_profile, storage_error};

pub struct PlayerProfileRepositoryImpl {
    db: DatabaseConnection,
}

impl PlayerProfileRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_profile(model: player_profile::Model) -> Result<PlayerProfile, RepoError> {
        Ok(PlayerProfile {
            id: ProfileId(model.id),
            user_id: UserId(model.user_id),
            rating: model.rating,
            position: Position::from_str(&model.position).map_err(RepoError::StorageError)?,
            can_be_goalkeeper: model.can_be_goalkeeper,
        })
    }
}

#[async_trait::async_trait]
impl PlayerProfileRepository for PlayerProfileRepositoryImpl {
    async fn get_profile(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<Option<PlayerProfile>, RepoError> {
        player_profile::Entity::find()
            .filter(player_profile::Column::GroupId.eq(group_id.0))
            .filter(player_profile::Column::UserId.eq(user_id.0))
            .one(&self.db)
            .await
            .map_err(storage_error)?
            .map(Self::model_to_profile)
            .transpose()
    }

    async fn get_profiles(
        &self,
        group_id: GroupId,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, PlayerProfile>, RepoError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = player_profile::Entity::find()
            .filter(player_profile::Column::GroupId.eq(group_id.0))
            .filter(player_profile::Column::UserId.is_in(user_ids.iter().map(|id| id.0)))
            .all(&self.db)
            .await
            .map_err(storage_error)?;
        models
            .into_iter()
            .map(|model| Self::model_to_profile(model).map(|profile| (profile.user_id, profile)))
            .collect()
    }
}
