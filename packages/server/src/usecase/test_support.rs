//! Fixtures shared by the use case tests.

use std::sync::Arc;

use atrium_shared::time::ManualClock;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

use crate::{
    config::ServerConfig,
    domain::{
        Connection, ConnectionId, DisplayName, Identity, MessageContent, MessageId,
        MessageSnapshot, PresenceTracker, Timestamp, TypingStateMachine, UserId,
    },
    infrastructure::{
        cache::InMemoryCacheTier,
        dto::websocket::ServerEvent,
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryConnectionRegistry, InMemoryMessageStore},
    },
};

use super::{
    BroadcastRouter, ConnectParticipantUseCase, DisconnectParticipantUseCase, EvictUserUseCase,
    GetPresenceUseCase, ManageMessagesUseCase, PrivateMessageUseCase, TypingUseCase,
};

pub const START_MILLIS: i64 = 1_700_000_000_000;

pub fn identity(user_id: i64, name: &str) -> Identity {
    Identity {
        user_id: UserId::new(user_id).unwrap(),
        display_name: DisplayName::new(name.to_string()).unwrap(),
        is_admin: false,
        is_active: true,
    }
}

pub fn admin(user_id: i64, name: &str) -> Identity {
    Identity {
        is_admin: true,
        ..identity(user_id, name)
    }
}

/// Connection with a deterministic handle
pub fn connection_of(identity: &Identity, handle: u128) -> Connection {
    Connection::new(
        ConnectionId::from_uuid(Uuid::from_u128(handle)),
        identity,
        Timestamp::new(START_MILLIS),
    )
}

pub fn message(id: i64, author: &Connection) -> MessageSnapshot {
    MessageSnapshot {
        id: MessageId::new(id),
        author_id: author.user_id,
        author_name: author.display_name.clone(),
        content: MessageContent::new(format!("message {}", id)).unwrap(),
        created_at: Timestamp::new(START_MILLIS),
        updated_at: Timestamp::new(START_MILLIS),
        edited: false,
    }
}

/// Fully wired core over the in-memory collaborators
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub store: Arc<InMemoryMessageStore>,
    pub cache: Arc<InMemoryCacheTier>,
    pub router: Arc<BroadcastRouter>,
    pub connect: Arc<ConnectParticipantUseCase>,
    pub disconnect: Arc<DisconnectParticipantUseCase>,
    pub typing: Arc<TypingUseCase>,
    pub private_message: Arc<PrivateMessageUseCase>,
    pub messages: Arc<ManageMessagesUseCase>,
    pub evict_user: Arc<EvictUserUseCase>,
    pub presence: Arc<GetPresenceUseCase>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let clock = Arc::new(ManualClock::new(START_MILLIS));
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let store = Arc::new(InMemoryMessageStore::new());
        let cache = Arc::new(InMemoryCacheTier::new());
        let tracker = Arc::new(Mutex::new(PresenceTracker::new()));
        let machine = Arc::new(Mutex::new(TypingStateMachine::new(
            config.typing_window_millis(),
        )));

        let router = Arc::new(BroadcastRouter::new(registry.clone(), pusher.clone()));
        let typing = Arc::new(TypingUseCase::new(machine, router.clone(), clock.clone()));
        let connect = Arc::new(ConnectParticipantUseCase::new(
            registry.clone(),
            pusher.clone(),
            tracker.clone(),
            router.clone(),
            clock.clone(),
        ));
        let disconnect = Arc::new(DisconnectParticipantUseCase::new(
            registry.clone(),
            pusher.clone(),
            tracker.clone(),
            router.clone(),
            typing.clone(),
            clock.clone(),
        ));
        let private_message = Arc::new(PrivateMessageUseCase::new(router.clone(), clock.clone()));
        let messages = Arc::new(ManageMessagesUseCase::new(
            store.clone(),
            cache.clone(),
            router.clone(),
            typing.clone(),
            clock.clone(),
            &config,
        ));
        let evict_user = Arc::new(EvictUserUseCase::new(registry.clone(), disconnect.clone()));
        let presence = Arc::new(GetPresenceUseCase::new(tracker));

        Self {
            clock,
            registry,
            pusher,
            store,
            cache,
            router,
            connect,
            disconnect,
            typing,
            private_message,
            messages,
            evict_user,
            presence,
        }
    }

    /// Admit a fresh connection and return it with its outbound receiver.
    pub async fn join(&self, identity: &Identity) -> (Connection, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection = self.connect.execute(identity, tx).await;
        (connection, rx)
    }
}

/// Drain every frame currently queued on a receiver.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        events.push(serde_json::from_str(&frame).unwrap());
    }
    events
}
