pub mod attendance;
pub mod chat_message;
pub mod event;
pub mod group_member;
pub mod player_profile;
pub mod team;
pub mod team_member;
