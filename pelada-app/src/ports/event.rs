use crate::domain::{EventId, RepoRetrieveError, event::EventRecord};

#[async_trait::async_trait]
pub trait EventRepository {
    async fn get_event(&self, event_id: EventId) -> Result<EventRecord, RepoRetrieveError>;
}
