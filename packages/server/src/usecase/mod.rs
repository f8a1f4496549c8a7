//! UseCase layer: orchestrates the domain state machines and collaborators.
//!
//! - `authenticate`: bearer token → active identity
//! - `connect_participant` / `disconnect_participant`: admission, eviction, presence
//! - `broadcast`: the Broadcast Router (`publish`)
//! - `typing`: typing-state transitions and the server-side sweeper
//! - `private_message`: `user:<id>` scoped delivery
//! - `manage_messages`: message commands and the recent-message cache
//! - `evict_user`: admin forced eviction
//! - `get_presence`: online roster query

pub mod authenticate;
pub mod broadcast;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod evict_user;
pub mod get_presence;
pub mod manage_messages;
pub mod private_message;
pub mod typing;

#[cfg(test)]
pub(crate) mod test_support;

pub use authenticate::AuthenticateUseCase;
pub use broadcast::BroadcastRouter;
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{EvictUserError, MessageCommandError, PrivateMessageError};
pub use evict_user::EvictUserUseCase;
pub use get_presence::GetPresenceUseCase;
pub use manage_messages::{ManageMessagesUseCase, RECENT_MESSAGES_CACHE_KEY};
pub use private_message::PrivateMessageUseCase;
pub use typing::TypingUseCase;
