use std::sync::Arc;

use axum::{
    extract::{
        Path, Query, State, WebSocketUpgrade,
        ws::{CloseFrame, Message, WebSocket},
    },
    response::Response,
};
use dashmap::DashMap;
use futures::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use pelada_app::{
    domain::{EventId, ListenerId, chat::ChatConnection},
    ports::notification::{ListenerMessage, ListenerNotificationPort},
    workflow::chat::{connect::ChatConnectUseCase, message::ChatMessageUseCase},
};
use tokio::select;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{AppState, chat::ChatMessageInfo};

#[derive(serde::Deserialize, Debug)]
pub struct ChatQuery {
    pub token: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<ChatQuery>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(app, socket, EventId(event_id), query.token))
}

async fn handle_socket(
    app: AppState,
    mut socket: WebSocket,
    event_id: EventId,
    token: Option<String>,
) {
    let listener_id = ListenerId::new();
    let cancellation_token = CancellationToken::new();
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    // registered before joining the room so no broadcast is missed
    app.ws.add_connection(
        listener_id,
        ConnectionEntry {
            cancellation_token: cancellation_token.clone(),
            sender: tx,
        },
    );

    let mut connection = ChatConnection::new(listener_id, event_id);
    if let Err(reason) = app
        .app
        .chat_connect_use_case
        .connect(&mut connection, token.as_deref())
        .await
    {
        app.ws.remove_connection(listener_id);
        log::info!(
            "Rejected chat connection {} to event {}: {}",
            listener_id,
            event_id,
            reason
        );
        let frame = CloseFrame {
            code: reason.close_code(),
            reason: reason.to_string().into(),
        };
        if let Err(e) = socket.send(Message::Close(Some(frame))).await {
            log::debug!("Failed to send close frame to {}: {}", listener_id, e);
        }
        return;
    }

    let (ws_sender, ws_receiver) = socket.split();
    let send_task = tokio::spawn(send_ws(ws_sender, rx, cancellation_token.clone()));

    receive_ws(&app, ws_receiver, cancellation_token.clone(), &connection).await;

    app.app.chat_connect_use_case.disconnect(&mut connection);
    app.ws.remove_connection(listener_id);
    if let Err(e) = send_task.await {
        log::error!("WebSocket send task failed: {}", e);
    }
    log::info!("Chat connection {} to event {} finished", listener_id, event_id);
}

async fn receive_ws(
    app: &AppState,
    mut ws_receiver: SplitStream<WebSocket>,
    cancellation_token: CancellationToken,
    connection: &ChatConnection,
) {
    while let Some(msg) = select! {
        _ = cancellation_token.cancelled() => None,
        msg = ws_receiver.next() => msg,
    } {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => {
                    let text = msg.text.unwrap_or_default();
                    if let Err(e) = app
                        .app
                        .chat_message_use_case
                        .send_message(connection, &text)
                        .await
                    {
                        log::debug!(
                            "Chat message from {} not delivered: {}",
                            connection.listener_id(),
                            e
                        );
                    }
                }
                Err(e) => {
                    log::debug!("Failed to parse chat frame: {}", e);
                    app.ws.notify_listener(
                        connection.listener_id(),
                        ListenerMessage::Error {
                            detail: "Invalid message format".to_string(),
                        },
                    );
                }
            },
            Ok(Message::Binary(_)) => {
                log::debug!("Ignoring binary frame from {}", connection.listener_id());
            }
            Ok(Message::Close(frame)) => {
                log::debug!("Chat connection closed by client: {:?}", frame);
                break;
            }
            Err(e) => {
                log::debug!("WS error: {}", e);
                break;
            }
            _ => {}
        }
    }
    cancellation_token.cancel();
}

async fn send_ws(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut channel: tokio::sync::mpsc::UnboundedReceiver<ServerMessage>,
    cancellation_token: CancellationToken,
) {
    while let Some(msg) = select! {
        _ = cancellation_token.cancelled() => None,
        msg = channel.recv() => msg,
    } {
        let text = match serde_json::to_string(&msg) {
            Ok(text) => text,
            Err(e) => {
                log::error!("Failed to serialize chat frame: {}", e);
                continue;
            }
        };
        if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
            log::debug!("Failed to send WS message: {}", e);
            break;
        }
    }
    cancellation_token.cancel();
}

struct ConnectionEntry {
    cancellation_token: CancellationToken,
    sender: tokio::sync::mpsc::UnboundedSender<ServerMessage>,
}

/// Outbound queues of every live chat socket.
pub struct WsService {
    connections: DashMap<ListenerId, ConnectionEntry>,
}

impl WsService {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    fn add_connection(&self, id: ListenerId, entry: ConnectionEntry) {
        self.connections.insert(id, entry);
    }

    fn remove_connection(&self, id: ListenerId) {
        if let Some((_, entry)) = self.connections.remove(&id) {
            entry.cancellation_token.cancel();
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl ListenerNotificationPort for WsService {
    fn notify_listener(&self, listener: ListenerId, message: ListenerMessage) {
        if let Some(entry) = self.connections.get(&listener) {
            let _ = entry.sender.send(ServerMessage::from(message));
        }
    }

    fn notify_listeners(&self, listeners: &[ListenerId], message: ListenerMessage) {
        let server_message = ServerMessage::from(message);
        for listener in listeners {
            if let Some(entry) = self.connections.get(listener) {
                let _ = entry.sender.send(server_message.clone());
            }
        }
    }
}

#[derive(serde::Deserialize, Debug)]
pub struct ClientMessage {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "chat.message")]
    ChatMessage(ChatMessageInfo),
    #[serde(rename = "error")]
    Error { detail: String },
}

impl From<ListenerMessage> for ServerMessage {
    fn from(message: ListenerMessage) -> Self {
        match message {
            ListenerMessage::ChatMessage { message } => {
                ServerMessage::ChatMessage(ChatMessageInfo::from(message))
            }
            ListenerMessage::Error { detail } => ServerMessage::Error { detail },
        }
    }
}
