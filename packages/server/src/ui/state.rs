//! Shared application state and composition of the in-memory core.

use std::sync::Arc;

use atrium_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    config::ServerConfig,
    domain::{CacheTier, CredentialVerifier, PresenceTracker, TypingStateMachine},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryConnectionRegistry, InMemoryMessageStore},
    },
    usecase::{
        AuthenticateUseCase, BroadcastRouter, ConnectParticipantUseCase,
        DisconnectParticipantUseCase, EvictUserUseCase, GetPresenceUseCase, ManageMessagesUseCase,
        PrivateMessageUseCase, TypingUseCase,
    },
};

/// Shared application state
pub struct AppState {
    pub authenticate_usecase: Arc<AuthenticateUseCase>,
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub typing_usecase: Arc<TypingUseCase>,
    pub private_message_usecase: Arc<PrivateMessageUseCase>,
    pub manage_messages_usecase: Arc<ManageMessagesUseCase>,
    pub evict_user_usecase: Arc<EvictUserUseCase>,
    pub get_presence_usecase: Arc<GetPresenceUseCase>,
    /// Broadcast Router（単一接続への返信にも使う）
    pub broadcast_router: Arc<BroadcastRouter>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wire the core over the in-process registry, pusher and message store.
    ///
    /// Dependencies are created in order:
    /// 1. Registry, MessagePusher, MessageStore
    /// 2. Presence / typing state machines
    /// 3. Broadcast Router
    /// 4. UseCases
    pub fn in_memory(
        verifier: Arc<dyn CredentialVerifier>,
        cache: Arc<dyn CacheTier>,
        clock: Arc<dyn Clock>,
        config: &ServerConfig,
    ) -> Self {
        // 1. Collaborators
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let store = Arc::new(InMemoryMessageStore::new());

        // 2. State machines
        let presence = Arc::new(Mutex::new(PresenceTracker::new()));
        let typing_machine = Arc::new(Mutex::new(TypingStateMachine::new(
            config.typing_window_millis(),
        )));

        // 3. Broadcast Router
        let broadcast_router = Arc::new(BroadcastRouter::new(
            registry.clone(),
            message_pusher.clone(),
        ));

        // 4. UseCases
        let typing_usecase = Arc::new(TypingUseCase::new(
            typing_machine,
            broadcast_router.clone(),
            clock.clone(),
        ));
        let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
            registry.clone(),
            message_pusher.clone(),
            presence.clone(),
            broadcast_router.clone(),
            clock.clone(),
        ));
        let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
            registry.clone(),
            message_pusher,
            presence.clone(),
            broadcast_router.clone(),
            typing_usecase.clone(),
            clock.clone(),
        ));
        let private_message_usecase = Arc::new(PrivateMessageUseCase::new(
            broadcast_router.clone(),
            clock.clone(),
        ));
        let manage_messages_usecase = Arc::new(ManageMessagesUseCase::new(
            store,
            cache,
            broadcast_router.clone(),
            typing_usecase.clone(),
            clock.clone(),
            config,
        ));
        let evict_user_usecase = Arc::new(EvictUserUseCase::new(
            registry,
            disconnect_participant_usecase.clone(),
        ));

        Self {
            authenticate_usecase: Arc::new(AuthenticateUseCase::new(verifier)),
            connect_participant_usecase,
            disconnect_participant_usecase,
            typing_usecase,
            private_message_usecase,
            manage_messages_usecase,
            evict_user_usecase,
            get_presence_usecase: Arc::new(GetPresenceUseCase::new(presence)),
            broadcast_router,
            clock,
        }
    }
}
