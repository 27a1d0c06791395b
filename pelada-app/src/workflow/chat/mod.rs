pub mod connect;
pub mod history;
pub mod message;
