use crate::domain::{ListenerId, chat::ChatMessage};

pub trait ListenerNotificationPort {
    fn notify_listener(&self, listener: ListenerId, message: ListenerMessage);
    fn notify_listeners(&self, listeners: &[ListenerId], message: ListenerMessage);
}

#[derive(Clone, Debug)]
pub enum ListenerMessage {
    ChatMessage { message: ChatMessage },
    Error { detail: String },
}
