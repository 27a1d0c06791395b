use std::sync::Arc;

use crate::{
    domain::chat::{ChatConnection, ChatRoomService, RejectReason},
    services::{
        connection_authenticator::ConnectionAuthenticator, room_gate::RoomMembershipGate,
    },
};

#[async_trait::async_trait]
pub trait ChatConnectUseCase {
    /// Drives the connection to `Subscribed` or `Rejected`. On success the
    /// connection's listener is in the event's room.
    async fn connect(
        &self,
        connection: &mut ChatConnection,
        raw_token: Option<&str>,
    ) -> Result<(), RejectReason>;

    /// Idempotent.
    fn disconnect(&self, connection: &mut ChatConnection);
}

pub struct ChatConnectUseCaseImpl<
    A: ConnectionAuthenticator,
    G: RoomMembershipGate,
    C: ChatRoomService,
> {
    authenticator: Arc<A>,
    room_gate: Arc<G>,
    chat_room_service: Arc<C>,
}

impl<A: ConnectionAuthenticator, G: RoomMembershipGate, C: ChatRoomService>
    ChatConnectUseCaseImpl<A, G, C>
{
    pub fn new(authenticator: Arc<A>, room_gate: Arc<G>, chat_room_service: Arc<C>) -> Self {
        Self {
            authenticator,
            room_gate,
            chat_room_service,
        }
    }
}

#[async_trait::async_trait]
impl<
    A: ConnectionAuthenticator + Send + Sync + 'static,
    G: RoomMembershipGate + Send + Sync + 'static,
    C: ChatRoomService + Send + Sync + 'static,
> ChatConnectUseCase for ChatConnectUseCaseImpl<A, G, C>
{
    async fn connect(
        &self,
        connection: &mut ChatConnection,
        raw_token: Option<&str>,
    ) -> Result<(), RejectReason> {
        let identity = self.authenticator.authenticate(raw_token).await;
        connection.authenticate(identity)?;

        let Some(user_id) = connection.user().map(|user| user.user_id) else {
            return Err(RejectReason::Unauthenticated);
        };
        let authorized = self
            .room_gate
            .authorize(user_id, connection.event_id())
            .await;
        connection.subscribe(authorized)?;

        self.chat_room_service
            .join_room(connection.event_id(), connection.listener_id());
        log::debug!(
            "Listener {} of user {} joined chat of event {}",
            connection.listener_id(),
            user_id,
            connection.event_id()
        );
        Ok(())
    }

    fn disconnect(&self, connection: &mut ChatConnection) {
        if connection.close() {
            self.chat_room_service
                .leave_room(connection.event_id(), connection.listener_id());
            log::debug!(
                "Listener {} left chat of event {}",
                connection.listener_id(),
                connection.event_id()
            );
        }
    }
}
