pub mod connection_authenticator;
pub mod room_gate;
pub mod roster_resolver;
