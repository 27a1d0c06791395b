pub mod attendance;
pub mod authentication;
pub mod event;
pub mod membership;
pub mod notification;
pub mod profile;
