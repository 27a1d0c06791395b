use std::str::FromStr;

use pelada_app::{
    domain::{
        EventId, GroupId, RepoRetrieveError,
        event::{EventFormat, EventRecord},
    },
    ports::event::EventRepository,
};
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::entity::event;

/// Events are edited and deleted outside this service, so every lookup
/// reads the current row.
pub struct EventRepositoryImpl {
    db: DatabaseConnection,
}

impl EventRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_event(model: event::Model) -> Result<EventRecord, RepoRetrieveError> {
        let format =
            EventFormat::from_str(&model.format).map_err(RepoRetrieveError::StorageError)?;
        Ok(EventRecord {
            id: EventId(model.id),
            group_id: GroupId(model.group_id),
            title: model.title,
            format,
            teams_generated_at: model.teams_generated_at,
        })
    }
}

#[async_trait::async_trait]
impl EventRepository for EventRepositoryImpl {
    async fn get_event(&self, event_id: EventId) -> Result<EventRecord, RepoRetrieveError> {
        let model = event::Entity::find_by_id(event_id.0)
            .one(&self.db)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?
            .ok_or(RepoRetrieveError::NotFound)?;
        Self::model_to_event(model)
    }
}
