use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::{
    ChatMessageId, EventId, ListenerId, RepoError, UserId,
    identity::{Identity, UserIdentity},
};

pub const MAX_MESSAGE_LENGTH: usize = 1000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewChatMessage {
    pub event_id: EventId,
    pub user_id: UserId,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait ChatMessageRepository {
    async fn create_message(&self, message: NewChatMessage) -> Result<ChatMessage, RepoError>;
    /// Oldest first.
    async fn list_messages(&self, event_id: EventId) -> Result<Vec<ChatMessage>, RepoError>;
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MessageTextError {
    #[error("Message is empty")]
    Empty,
    #[error("Message too long ({length} characters, max {max})")]
    TooLong { length: usize, max: usize },
}

/// Trims the raw inbound text and enforces the length limit in characters.
pub fn normalize_message_text(raw: &str) -> Result<String, MessageTextError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(MessageTextError::Empty);
    }
    let length = text.chars().count();
    if length > MAX_MESSAGE_LENGTH {
        return Err(MessageTextError::TooLong {
            length,
            max: MAX_MESSAGE_LENGTH,
        });
    }
    Ok(text.to_string())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Not a member of this event's group")]
    Forbidden,
}

impl RejectReason {
    pub fn close_code(&self) -> u16 {
        match self {
            RejectReason::Unauthenticated => 4401,
            RejectReason::Forbidden => 4403,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Authenticated(UserIdentity),
    Subscribed(UserIdentity),
    Rejected(RejectReason),
    Closed,
}

/// Lifecycle of one chat connection to an event room.
#[derive(Debug)]
pub struct ChatConnection {
    listener_id: ListenerId,
    event_id: EventId,
    state: ConnectionState,
}

impl ChatConnection {
    pub fn new(listener_id: ListenerId, event_id: EventId) -> Self {
        Self {
            listener_id,
            event_id,
            state: ConnectionState::Connecting,
        }
    }

    pub fn listener_id(&self) -> ListenerId {
        self.listener_id
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        match &self.state {
            ConnectionState::Authenticated(user) | ConnectionState::Subscribed(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        matches!(self.state, ConnectionState::Subscribed(_))
    }

    pub fn authenticate(&mut self, identity: Identity) -> Result<(), RejectReason> {
        if self.state != ConnectionState::Connecting {
            return Err(RejectReason::Unauthenticated);
        }
        match identity {
            Identity::User(user) => {
                self.state = ConnectionState::Authenticated(user);
                Ok(())
            }
            Identity::Anonymous => {
                self.state = ConnectionState::Rejected(RejectReason::Unauthenticated);
                Err(RejectReason::Unauthenticated)
            }
        }
    }

    pub fn subscribe(&mut self, authorized: bool) -> Result<(), RejectReason> {
        let user = match &self.state {
            ConnectionState::Authenticated(user) => user.clone(),
            ConnectionState::Subscribed(_) => return Ok(()),
            ConnectionState::Rejected(reason) => return Err(*reason),
            _ => return Err(RejectReason::Unauthenticated),
        };
        if authorized {
            self.state = ConnectionState::Subscribed(user);
            Ok(())
        } else {
            self.state = ConnectionState::Rejected(RejectReason::Forbidden);
            Err(RejectReason::Forbidden)
        }
    }

    /// Returns whether the connection was subscribed and has to leave its room.
    pub fn close(&mut self) -> bool {
        let was_subscribed = self.is_subscribed();
        self.state = ConnectionState::Closed;
        was_subscribed
    }
}

#[derive(Default)]
pub struct ChatRoom {
    listeners: parking_lot::Mutex<HashSet<ListenerId>>,
    write_sequence: tokio::sync::Mutex<()>,
}

impl ChatRoom {
    /// Serializes persist-then-broadcast so every listener sees the room's
    /// messages in persistence order.
    pub async fn lock_writes(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.write_sequence.lock().await
    }

    pub fn listeners(&self) -> Vec<ListenerId> {
        self.listeners.lock().iter().copied().collect()
    }

    pub fn contains(&self, listener_id: ListenerId) -> bool {
        self.listeners.lock().contains(&listener_id)
    }

    fn insert(&self, listener_id: ListenerId) -> bool {
        self.listeners.lock().insert(listener_id)
    }

    fn remove(&self, listener_id: ListenerId) -> bool {
        self.listeners.lock().remove(&listener_id)
    }

    fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }
}

pub trait ChatRoomService {
    fn join_room(&self, event_id: EventId, listener_id: ListenerId);
    fn leave_room(&self, event_id: EventId, listener_id: ListenerId) -> bool;
    fn get_room(&self, event_id: EventId) -> Option<Arc<ChatRoom>>;
    fn get_listeners_in_room(&self, event_id: EventId) -> Vec<ListenerId>;
}

pub struct ChatRoomServiceImpl {
    rooms: DashMap<EventId, Arc<ChatRoom>>,
}

impl ChatRoomServiceImpl {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl ChatRoomService for ChatRoomServiceImpl {
    fn join_room(&self, event_id: EventId, listener_id: ListenerId) {
        // insert while holding the entry so a concurrent leave cannot drop the room
        let room = self.rooms.entry(event_id).or_default();
        room.insert(listener_id);
    }

    fn leave_room(&self, event_id: EventId, listener_id: ListenerId) -> bool {
        let removed = match self.rooms.get(&event_id) {
            Some(room) => room.remove(listener_id),
            None => false,
        };
        self.rooms.remove_if(&event_id, |_, room| room.is_empty());
        removed
    }

    fn get_room(&self, event_id: EventId) -> Option<Arc<ChatRoom>> {
        self.rooms.get(&event_id).map(|room| room.clone())
    }

    fn get_listeners_in_room(&self, event_id: EventId) -> Vec<ListenerId> {
        self.get_room(event_id)
            .map(|room| room.listeners())
            .unwrap_or_default()
    }
}
