use std::{
    collections::{HashMap, HashSet},
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use pelada_app::{
    build_application,
    domain::{
        ChatMessageId, EventId, GroupId, RepoError, RepoRetrieveError, UserId,
        chat::{ChatMessage, ChatMessageRepository, ChatRoomServiceImpl, NewChatMessage},
        event::{EventFormat, EventRecord},
        identity::UserIdentity,
        team::{NewTeam, Team, TeamRepository},
    },
    ports::{
        attendance::{AttendanceRecord, AttendanceRepository},
        authentication::{TokenError, TokenValidationPort},
        event::EventRepository,
        membership::GroupMembershipRepository,
        profile::{PlayerProfile, PlayerProfileRepository},
    },
    services::{
        connection_authenticator::ConnectionAuthenticatorImpl, room_gate::RoomMembershipGateImpl,
    },
    workflow::chat::{connect::ChatConnectUseCaseImpl, message::ChatMessageUseCaseImpl},
};

use crate::{AppState, router, ws::WsService};

pub fn user(n: u128) -> UserId {
    UserId(uuid::Uuid::from_u128(n))
}

/// `valid:<n>` is user `n`; `expired:<anything>` is expired.
pub struct MockTokenValidation;

#[async_trait::async_trait]
impl TokenValidationPort for MockTokenValidation {
    async fn validate(&self, token: &str) -> Result<UserIdentity, TokenError> {
        match token.split_once(':') {
            Some(("valid", n)) => {
                let n: u128 = n.parse().map_err(|_| TokenError::Malformed)?;
                Ok(UserIdentity {
                    user_id: user(n),
                    username: format!("player{}", n),
                })
            }
            Some(("expired", _)) => Err(TokenError::Expired),
            _ => Err(TokenError::Malformed),
        }
    }
}

/// One event whose group holds the given members.
pub struct MockEventGroup {
    event: EventRecord,
    members: HashSet<UserId>,
}

#[async_trait::async_trait]
impl EventRepository for MockEventGroup {
    async fn get_event(&self, event_id: EventId) -> Result<EventRecord, RepoRetrieveError> {
        if event_id == self.event.id {
            Ok(self.event.clone())
        } else {
            Err(RepoRetrieveError::NotFound)
        }
    }
}

#[async_trait::async_trait]
impl GroupMembershipRepository for MockEventGroup {
    async fn is_member(&self, group_id: GroupId, user_id: UserId) -> Result<bool, RepoError> {
        Ok(group_id == self.event.group_id && self.members.contains(&user_id))
    }

    async fn is_admin(&self, _group_id: GroupId, _user_id: UserId) -> Result<bool, RepoError> {
        Ok(false)
    }
}

#[derive(Default)]
pub struct EmptyRosterRepository;

#[async_trait::async_trait]
impl AttendanceRepository for EmptyRosterRepository {
    async fn list_confirmed(&self, _event_id: EventId) -> Result<Vec<AttendanceRecord>, RepoError> {
        Ok(Vec::new())
    }
}

#[async_trait::async_trait]
impl PlayerProfileRepository for EmptyRosterRepository {
    async fn get_profile(
        &self,
        _group_id: GroupId,
        _user_id: UserId,
    ) -> Result<Option<PlayerProfile>, RepoError> {
        Ok(None)
    }

    async fn get_profiles(
        &self,
        _group_id: GroupId,
        _user_ids: &[UserId],
    ) -> Result<HashMap<UserId, PlayerProfile>, RepoError> {
        Ok(HashMap::new())
    }
}

#[async_trait::async_trait]
impl TeamRepository for EmptyRosterRepository {
    async fn replace_teams(
        &self,
        _event_id: EventId,
        _teams: Vec<NewTeam>,
        _generated_at: DateTime<Utc>,
    ) -> Result<Vec<Team>, RepoError> {
        Ok(Vec::new())
    }

    async fn get_teams(&self, _event_id: EventId) -> Result<Vec<Team>, RepoError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct MockChatMessageRepository {
    messages: Mutex<Vec<ChatMessage>>,
}

impl MockChatMessageRepository {
    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ChatMessageRepository for MockChatMessageRepository {
    async fn create_message(&self, message: NewChatMessage) -> Result<ChatMessage, RepoError> {
        let mut messages = self.messages.lock().unwrap();
        let stored = ChatMessage {
            id: ChatMessageId(messages.len() as i64 + 1),
            event_id: message.event_id,
            user_id: message.user_id,
            username: message.username,
            text: message.text,
            created_at: message.created_at,
        };
        messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(&self, event_id: EventId) -> Result<Vec<ChatMessage>, RepoError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.event_id == event_id)
            .cloned()
            .collect())
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub event_id: EventId,
    pub rooms: Arc<ChatRoomServiceImpl>,
    pub ws: Arc<WsService>,
    pub messages: Arc<MockChatMessageRepository>,
}

impl TestServer {
    pub fn chat_url(&self, event_id: EventId, token: &str) -> String {
        format!(
            "ws://{}/ws/events/{}/chat?token={}",
            self.addr, event_id, token
        )
    }
}

/// Serves the router on an ephemeral port. Users 1 and 2 are members of the
/// event's group.
pub async fn spawn_server() -> TestServer {
    let event = EventRecord {
        id: EventId(uuid::Uuid::new_v4()),
        group_id: GroupId(uuid::Uuid::new_v4()),
        title: "Thursday futsal".to_string(),
        format: EventFormat::Futsal,
        teams_generated_at: None,
    };
    let event_id = event.id;
    let group = Arc::new(MockEventGroup {
        event,
        members: [user(1), user(2)].into_iter().collect(),
    });
    let roster = Arc::new(EmptyRosterRepository);
    let messages = Arc::new(MockChatMessageRepository::default());
    let tokens = Arc::new(MockTokenValidation);
    let ws = Arc::new(WsService::new());

    let mut app = build_application(
        ws.clone(),
        tokens.clone(),
        group.clone(),
        group.clone(),
        roster.clone(),
        roster.clone(),
        roster,
        messages.clone(),
    );

    // swap in chat use cases over a room service the tests can inspect
    let rooms = Arc::new(ChatRoomServiceImpl::new());
    let gate = Arc::new(RoomMembershipGateImpl::new(group.clone(), group));
    app.chat_connect_use_case = Box::new(ChatConnectUseCaseImpl::new(
        Arc::new(ConnectionAuthenticatorImpl::new(tokens.clone())),
        gate.clone(),
        rooms.clone(),
    ));
    app.chat_message_use_case = Box::new(ChatMessageUseCaseImpl::new(
        gate,
        rooms.clone(),
        messages.clone(),
        ws.clone(),
    ));

    let state = AppState {
        app: Arc::new(app),
        ws: ws.clone(),
        auth: tokens,
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });

    TestServer {
        addr,
        event_id,
        rooms,
        ws,
        messages,
    }
}
