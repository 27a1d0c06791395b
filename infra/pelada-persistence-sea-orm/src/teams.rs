use std::collections::HashMap;

use chrono::{DateTime, Utc};
use pelada_app::domain::{
    EventId, ProfileId, RepoError, TeamId, UserId,
    team::{NewTeam, Team, TeamMember, TeamRepository},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait,
};

use crate::{
    entity::{event, team, team_member},
    storage_error,
};

pub struct TeamRepositoryImpl {
    db: DatabaseConnection,
}

impl TeamRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn member_to_domain(model: team_member::Model) -> TeamMember {
        TeamMember {
            user_id: UserId(model.user_id),
            profile_id: model.profile_id.map(ProfileId),
            is_goalkeeper: model.is_goalkeeper,
        }
    }

    fn team_to_domain(model: team::Model, members: Vec<TeamMember>) -> Team {
        Team {
            id: TeamId(model.id),
            event_id: EventId(model.event_id),
            name: model.name,
            total_rating: model.total_rating,
            created_at: model.created_at,
            members,
        }
    }

    async fn delete_teams(c: &DatabaseTransaction, event_id: EventId) -> Result<(), RepoError> {
        let team_ids: Vec<i64> = team::Entity::find()
            .filter(team::Column::EventId.eq(event_id.0))
            .all(c)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(|model| model.id)
            .collect();
        if team_ids.is_empty() {
            return Ok(());
        }
        team_member::Entity::delete_many()
            .filter(team_member::Column::TeamId.is_in(team_ids))
            .exec(c)
            .await
            .map_err(storage_error)?;
        team::Entity::delete_many()
            .filter(team::Column::EventId.eq(event_id.0))
            .exec(c)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn insert_team(
        c: &DatabaseTransaction,
        event_id: EventId,
        new_team: NewTeam,
        created_at: DateTime<Utc>,
    ) -> Result<Team, RepoError> {
        let team_model = team::ActiveModel {
            event_id: Set(event_id.0),
            name: Set(new_team.name),
            total_rating: Set(new_team.total_rating),
            created_at: Set(created_at),
            ..Default::default()
        }
        .insert(c)
        .await
        .map_err(storage_error)?;

        for member in &new_team.members {
            team_member::ActiveModel {
                team_id: Set(team_model.id),
                user_id: Set(member.user_id.0),
                profile_id: Set(member.profile_id.map(|id| id.0)),
                is_goalkeeper: Set(member.is_goalkeeper),
                ..Default::default()
            }
            .insert(c)
            .await
            .map_err(storage_error)?;
        }

        Ok(Self::team_to_domain(team_model, new_team.members))
    }

    async fn stamp_event(
        c: &DatabaseTransaction,
        event_id: EventId,
        generated_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let Some(model) = event::Entity::find_by_id(event_id.0)
            .one(c)
            .await
            .map_err(storage_error)?
        else {
            return Err(RepoError::StorageError(format!(
                "Event {} disappeared while replacing its teams",
                event_id
            )));
        };
        let mut active: event::ActiveModel = model.into();
        active.teams_generated_at = Set(Some(generated_at));
        active.update(c).await.map_err(storage_error)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TeamRepository for TeamRepositoryImpl {
    async fn replace_teams(
        &self,
        event_id: EventId,
        teams: Vec<NewTeam>,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<Team>, RepoError> {
        let res = self
            .db
            .transaction::<_, Vec<Team>, RepoError>(|c| {
                Box::pin(async move {
                    Self::delete_teams(c, event_id).await?;
                    let mut stored = Vec::with_capacity(teams.len());
                    for new_team in teams {
                        stored.push(Self::insert_team(c, event_id, new_team, generated_at).await?);
                    }
                    Self::stamp_event(c, event_id, generated_at).await?;
                    Ok(stored)
                })
            })
            .await;
        res.map_err(|e| match e {
            TransactionError::Transaction(e) => e,
            TransactionError::Connection(e) => storage_error(e),
        })
    }

    async fn get_teams(&self, event_id: EventId) -> Result<Vec<Team>, RepoError> {
        let team_models = team::Entity::find()
            .filter(team::Column::EventId.eq(event_id.0))
            .order_by_asc(team::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage_error)?;
        if team_models.is_empty() {
            return Ok(Vec::new());
        }

        let mut members_by_team: HashMap<i64, Vec<TeamMember>> = HashMap::new();
        let member_models = team_member::Entity::find()
            .filter(team_member::Column::TeamId.is_in(team_models.iter().map(|t| t.id)))
            .order_by_asc(team_member::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage_error)?;
        for model in member_models {
            members_by_team
                .entry(model.team_id)
                .or_default()
                .push(Self::member_to_domain(model));
        }

        Ok(team_models
            .into_iter()
            .map(|model| {
                let members = members_by_team.remove(&model.id).unwrap_or_default();
                Self::team_to_domain(model, members)
            })
            .collect())
    }
}
