use std::str::FromStr;

use pelada_app::{
    domain::{EventId, RepoError, UserId},
    ports::attendance::{AttendanceRecord, AttendanceRepository, AttendanceStatus},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::{entity::attendance, storage_error};

pub struct AttendanceRepositoryImpl {
    db: DatabaseConnection,
}

impl AttendanceRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl AttendanceRepository for AttendanceRepositoryImpl {
    async fn list_confirmed(&self, event_id: EventId) -> Result<Vec<AttendanceRecord>, RepoError> {
        let models = attendance::Entity::find()
            .filter(attendance::Column::EventId.eq(event_id.0))
            .filter(attendance::Column::Status.eq(AttendanceStatus::Go.as_str()))
            .order_by_asc(attendance::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage_error)?;
        models
            .into_iter()
            .map(|model| {
                Ok(AttendanceRecord {
                    user_id: UserId(model.user_id),
                    status: AttendanceStatus::from_str(&model.status)
                        .map_err(RepoError::StorageError)?,
                })
            })
            .collect()
    }
}
