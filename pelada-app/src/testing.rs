//! In-memory doubles of the ports shared by the unit tests.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::{
    domain::{
        ChatMessageId, EventId, GroupId, ListenerId, ProfileId, RepoError, RepoRetrieveError,
        TeamId, UserId,
        chat::{ChatMessage, ChatMessageRepository, NewChatMessage},
        event::{EventFormat, EventRecord},
        identity::UserIdentity,
        player::Position,
        team::{NewTeam, Team, TeamRepository},
    },
    ports::{
        attendance::{AttendanceRecord, AttendanceRepository, AttendanceStatus},
        authentication::{TokenError, TokenValidationPort},
        event::EventRepository,
        membership::GroupMembershipRepository,
        notification::{ListenerMessage, ListenerNotificationPort},
        profile::{PlayerProfile, PlayerProfileRepository},
    },
};

pub fn user(n: u128) -> UserId {
    UserId(uuid::Uuid::from_u128(n))
}

fn identity(n: u128, name: &str) -> UserIdentity {
    UserIdentity {
        user_id: user(n),
        username: name.to_string(),
    }
}

pub fn alice() -> UserIdentity {
    identity(1, "alice")
}

pub fn bob() -> UserIdentity {
    identity(2, "bob")
}

pub fn carol() -> UserIdentity {
    identity(3, "carol")
}

fn storage_failure() -> RepoError {
    RepoError::StorageError("injected failure".to_string())
}

/// Accepts `valid:<name>` for alice, bob and carol and rejects
/// `expired:<name>` as expired.
#[derive(Default)]
pub struct MockTokenValidation;

#[async_trait::async_trait]
impl TokenValidationPort for MockTokenValidation {
    async fn validate(&self, token: &str) -> Result<UserIdentity, TokenError> {
        match token.split_once(':') {
            Some(("valid", "alice")) => Ok(alice()),
            Some(("valid", "bob")) => Ok(bob()),
            Some(("valid", "carol")) => Ok(carol()),
            Some(("expired", _)) => Err(TokenError::Expired),
            Some(("valid", _)) => Err(TokenError::InvalidSignature),
            _ => Err(TokenError::Malformed),
        }
    }
}

#[derive(Default)]
pub struct MockEventRepository {
    events: Mutex<HashMap<EventId, EventRecord>>,
}

impl MockEventRepository {
    pub fn stored(&self, event_id: EventId) -> EventRecord {
        self.events.lock().get(&event_id).cloned().unwrap()
    }

    fn stamp(&self, event_id: EventId, at: DateTime<Utc>) {
        if let Some(event) = self.events.lock().get_mut(&event_id) {
            event.teams_generated_at = Some(at);
        }
    }
}

#[async_trait::async_trait]
impl EventRepository for MockEventRepository {
    async fn get_event(&self, event_id: EventId) -> Result<EventRecord, RepoRetrieveError> {
        self.events
            .lock()
            .get(&event_id)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }
}

#[derive(Default)]
pub struct MockMembershipRepository {
    members: Mutex<HashMap<(GroupId, UserId), bool>>,
    fail_next: AtomicBool,
}

impl MockMembershipRepository {
    pub fn remove_member(&self, group_id: GroupId, user_id: UserId) {
        self.members.lock().remove(&(group_id, user_id));
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn role(&self, group_id: GroupId, user_id: UserId) -> Result<Option<bool>, RepoError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(storage_failure());
        }
        Ok(self.members.lock().get(&(group_id, user_id)).copied())
    }
}

#[async_trait::async_trait]
impl GroupMembershipRepository for MockMembershipRepository {
    async fn is_member(&self, group_id: GroupId, user_id: UserId) -> Result<bool, RepoError> {
        Ok(self.role(group_id, user_id)?.is_some())
    }

    async fn is_admin(&self, group_id: GroupId, user_id: UserId) -> Result<bool, RepoError> {
        Ok(self.role(group_id, user_id)? == Some(true))
    }
}

#[derive(Default)]
pub struct MockProfileRepository {
    profiles: Mutex<HashMap<(GroupId, UserId), PlayerProfile>>,
    next_id: AtomicI64,
    fail_next: AtomicBool,
}

impl MockProfileRepository {
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(storage_failure());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PlayerProfileRepository for MockProfileRepository {
    async fn get_profile(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<Option<PlayerProfile>, RepoError> {
        self.check()?;
        Ok(self.profiles.lock().get(&(group_id, user_id)).cloned())
    }

    async fn get_profiles(
        &self,
        group_id: GroupId,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, PlayerProfile>, RepoError> {
        self.check()?;
        let profiles = self.profiles.lock();
        Ok(user_ids
            .iter()
            .filter_map(|user_id| {
                profiles
                    .get(&(group_id, *user_id))
                    .map(|p| (*user_id, p.clone()))
            })
            .collect())
    }
}

#[derive(Default)]
pub struct MockAttendanceRepository {
    records: Mutex<Vec<(EventId, AttendanceRecord)>>,
}

impl MockAttendanceRepository {
    fn upsert(&self, event_id: EventId, user_id: UserId, status: AttendanceStatus) {
        let mut records = self.records.lock();
        match records
            .iter_mut()
            .find(|(e, r)| *e == event_id && r.user_id == user_id)
        {
            Some((_, record)) => record.status = status,
            None => records.push((event_id, AttendanceRecord { user_id, status })),
        }
    }

    /// Appends a row without merging it into an existing one.
    pub fn push_record(&self, event_id: EventId, user_id: UserId, status: AttendanceStatus) {
        self.records
            .lock()
            .push((event_id, AttendanceRecord { user_id, status }));
    }
}

#[async_trait::async_trait]
impl AttendanceRepository for MockAttendanceRepository {
    async fn list_confirmed(&self, event_id: EventId) -> Result<Vec<AttendanceRecord>, RepoError> {
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|(e, r)| *e == event_id && r.status == AttendanceStatus::Go)
            .map(|(_, r)| r.clone())
            .collect())
    }
}

pub struct MockTeamRepository {
    events: Arc<MockEventRepository>,
    teams: Mutex<HashMap<EventId, Vec<Team>>>,
    next_id: AtomicI64,
    fail_next: AtomicBool,
    delay: Mutex<Option<Duration>>,
    active_replaces: AtomicUsize,
    max_concurrent_replaces: AtomicUsize,
}

impl MockTeamRepository {
    fn new(events: Arc<MockEventRepository>) -> Self {
        Self {
            events,
            teams: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            fail_next: AtomicBool::new(false),
            delay: Mutex::new(None),
            active_replaces: AtomicUsize::new(0),
            max_concurrent_replaces: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn max_concurrent_replaces(&self) -> usize {
        self.max_concurrent_replaces.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TeamRepository for MockTeamRepository {
    async fn replace_teams(
        &self,
        event_id: EventId,
        teams: Vec<NewTeam>,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<Team>, RepoError> {
        let active = self.active_replaces.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent_replaces
            .fetch_max(active, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.active_replaces.fetch_sub(1, Ordering::SeqCst);

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(storage_failure());
        }
        let stored: Vec<Team> = teams
            .into_iter()
            .map(|team| Team {
                id: TeamId(self.next_id.fetch_add(1, Ordering::SeqCst)),
                event_id,
                name: team.name,
                total_rating: team.total_rating,
                created_at: generated_at,
                members: team.members,
            })
            .collect();
        self.teams.lock().insert(event_id, stored.clone());
        self.events.stamp(event_id, generated_at);
        Ok(stored)
    }

    async fn get_teams(&self, event_id: EventId) -> Result<Vec<Team>, RepoError> {
        Ok(self
            .teams
            .lock()
            .get(&event_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MockChatMessageRepository {
    messages: Mutex<Vec<ChatMessage>>,
    next_id: AtomicI64,
    fail_next: AtomicBool,
    jitter: AtomicBool,
}

impl MockChatMessageRepository {
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Makes every write yield a varying number of times before committing.
    pub fn set_jitter(&self, jitter: bool) {
        self.jitter.store(jitter, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ChatMessageRepository for MockChatMessageRepository {
    async fn create_message(&self, message: NewChatMessage) -> Result<ChatMessage, RepoError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(storage_failure());
        }
        if self.jitter.load(Ordering::SeqCst) {
            let rounds = self.messages.lock().len() % 4;
            for _ in 0..rounds {
                tokio::task::yield_now().await;
            }
        }
        let stored = ChatMessage {
            id: ChatMessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            event_id: message.event_id,
            user_id: message.user_id,
            username: message.username,
            text: message.text,
            created_at: message.created_at,
        };
        self.messages.lock().push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(&self, event_id: EventId) -> Result<Vec<ChatMessage>, RepoError> {
        let mut messages: Vec<ChatMessage> = self
            .messages
            .lock()
            .iter()
            .filter(|m| m.event_id == event_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.created_at, m.id));
        Ok(messages)
    }
}

#[derive(Default)]
pub struct MockListenerNotification {
    sent: Mutex<Vec<(ListenerId, ListenerMessage)>>,
}

impl MockListenerNotification {
    pub fn messages_for(&self, listener: ListenerId) -> Vec<ChatMessage> {
        self.sent
            .lock()
            .iter()
            .filter_map(|(l, m)| match m {
                ListenerMessage::ChatMessage { message } if *l == listener => {
                    Some(message.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn errors_for(&self, listener: ListenerId) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|(l, m)| match m {
                ListenerMessage::Error { detail } if *l == listener => Some(detail.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

impl ListenerNotificationPort for MockListenerNotification {
    fn notify_listener(&self, listener: ListenerId, message: ListenerMessage) {
        self.sent.lock().push((listener, message));
    }

    fn notify_listeners(&self, listeners: &[ListenerId], message: ListenerMessage) {
        let mut sent = self.sent.lock();
        for listener in listeners {
            sent.push((*listener, message.clone()));
        }
    }
}

/// Wires the repository doubles together so team replacement stamps events.
pub struct Fixture {
    pub events: Arc<MockEventRepository>,
    pub memberships: Arc<MockMembershipRepository>,
    pub profiles: Arc<MockProfileRepository>,
    pub attendance: Arc<MockAttendanceRepository>,
    pub teams: Arc<MockTeamRepository>,
    pub messages: Arc<MockChatMessageRepository>,
}

impl Fixture {
    pub fn new() -> Self {
        let events = Arc::new(MockEventRepository::default());
        Self {
            teams: Arc::new(MockTeamRepository::new(events.clone())),
            events,
            memberships: Arc::new(MockMembershipRepository::default()),
            profiles: Arc::new(MockProfileRepository::default()),
            attendance: Arc::new(MockAttendanceRepository::default()),
            messages: Arc::new(MockChatMessageRepository::default()),
        }
    }

    /// Creates an event in a fresh group.
    pub fn add_event(&self, format: EventFormat) -> EventRecord {
        let event = EventRecord {
            id: EventId(uuid::Uuid::new_v4()),
            group_id: GroupId(uuid::Uuid::new_v4()),
            title: "Thursday game".to_string(),
            format,
            teams_generated_at: None,
        };
        self.events.events.lock().insert(event.id, event.clone());
        event
    }

    pub fn add_member(&self, group_id: GroupId, user_id: UserId, is_admin: bool) {
        self.memberships
            .members
            .lock()
            .insert((group_id, user_id), is_admin);
    }

    pub fn add_profile(
        &self,
        group_id: GroupId,
        user_id: UserId,
        rating: i32,
        position: Position,
        can_be_goalkeeper: bool,
    ) {
        let id = ProfileId(self.profiles.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.profiles.profiles.lock().insert(
            (group_id, user_id),
            PlayerProfile {
                id,
                user_id,
                rating,
                position,
                can_be_goalkeeper,
            },
        );
    }

    pub fn attend(&self, event_id: EventId, user_id: UserId, status: AttendanceStatus) {
        self.attendance.upsert(event_id, user_id, status);
    }
}
