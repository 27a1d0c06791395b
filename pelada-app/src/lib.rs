use std::sync::Arc;

use crate::{
    domain::{
        balancing::GreedyTeamBalancingService, chat::ChatMessageRepository,
        chat::ChatRoomServiceImpl, team::TeamRepository,
    },
    ports::{
        attendance::AttendanceRepository, authentication::TokenValidationPort,
        event::EventRepository, membership::GroupMembershipRepository,
        notification::ListenerNotificationPort, profile::PlayerProfileRepository,
    },
    services::{
        connection_authenticator::ConnectionAuthenticatorImpl, room_gate::RoomMembershipGateImpl,
        roster_resolver::RosterResolverServiceImpl,
    },
    workflow::{
        chat::{
            connect::{ChatConnectUseCase, ChatConnectUseCaseImpl},
            history::{ChatHistoryUseCase, ChatHistoryUseCaseImpl},
            message::{ChatMessageUseCase, ChatMessageUseCaseImpl},
        },
        teams::{
            generate::{GenerateTeamsUseCase, GenerateTeamsUseCaseImpl},
            get::{GetTeamsUseCase, GetTeamsUseCaseImpl},
        },
    },
};

pub mod domain;
pub mod ports;
pub mod services;
pub mod workflow;

#[cfg(test)]
mod testing;

pub struct Application {
    pub teams_generate_use_case: Box<dyn GenerateTeamsUseCase + Send + Sync + 'static>,
    pub teams_get_use_case: Box<dyn GetTeamsUseCase + Send + Sync + 'static>,

    pub chat_connect_use_case: Box<dyn ChatConnectUseCase + Send + Sync + 'static>,
    pub chat_message_use_case: Box<dyn ChatMessageUseCase + Send + Sync + 'static>,
    pub chat_history_use_case: Box<dyn ChatHistoryUseCase + Send + Sync + 'static>,
}

pub fn build_application<
    L: ListenerNotificationPort + Send + Sync + 'static,
    TV: TokenValidationPort + Send + Sync + 'static,
    E: EventRepository + Send + Sync + 'static,
    M: GroupMembershipRepository + Send + Sync + 'static,
    A: AttendanceRepository + Send + Sync + 'static,
    P: PlayerProfileRepository + Send + Sync + 'static,
    T: TeamRepository + Send + Sync + 'static,
    C: ChatMessageRepository + Send + Sync + 'static,
>(
    listener_notification_port: Arc<L>,
    token_validation_port: Arc<TV>,
    event_repository: Arc<E>,
    membership_repository: Arc<M>,
    attendance_repository: Arc<A>,
    profile_repository: Arc<P>,
    team_repository: Arc<T>,
    chat_message_repository: Arc<C>,
) -> Application {
    let chat_room_service = Arc::new(ChatRoomServiceImpl::new());
    let balancing_service = Arc::new(GreedyTeamBalancingService::new());

    let roster_resolver = Arc::new(RosterResolverServiceImpl::new(
        attendance_repository.clone(),
        profile_repository.clone(),
    ));
    let connection_authenticator =
        Arc::new(ConnectionAuthenticatorImpl::new(token_validation_port.clone()));
    let room_gate = Arc::new(RoomMembershipGateImpl::new(
        event_repository.clone(),
        membership_repository.clone(),
    ));

    Application {
        teams_generate_use_case: Box::new(GenerateTeamsUseCaseImpl::new(
            event_repository.clone(),
            membership_repository.clone(),
            roster_resolver.clone(),
            balancing_service.clone(),
            team_repository.clone(),
        )),
        teams_get_use_case: Box::new(GetTeamsUseCaseImpl::new(
            event_repository.clone(),
            membership_repository.clone(),
            team_repository.clone(),
        )),
        chat_connect_use_case: Box::new(ChatConnectUseCaseImpl::new(
            connection_authenticator.clone(),
            room_gate.clone(),
            chat_room_service.clone(),
        )),
        chat_message_use_case: Box::new(ChatMessageUseCaseImpl::new(
            room_gate.clone(),
            chat_room_service.clone(),
            chat_message_repository.clone(),
            listener_notification_port.clone(),
        )),
        chat_history_use_case: Box::new(ChatHistoryUseCaseImpl::new(
            event_repository.clone(),
            membership_repository.clone(),
            chat_message_repository.clone(),
        )),
    }
}
