//! Domain layer: value objects, entities, events, errors, collaborator traits
//! and the pure presence / typing state machines.

pub mod entity;
pub mod error;
pub mod event;
pub mod presence;
pub mod repository;
pub mod typing;
pub mod value_object;

pub use entity::{Connection, Identity, MessageSnapshot, PresenceEntry, TypingState};
pub use error::{
    AuthenticationError, CacheError, DeliveryError, RegistryConsistencyError, StoreError,
    ValueObjectError,
};
pub use event::{BroadcastEvent, EventPayload};
pub use presence::{PresenceStatus, PresenceTracker, PresenceTransition};
pub use repository::{
    AdmitOutcome, CacheTier, ConnectionRegistry, CredentialVerifier, EvictOutcome, MessagePusher,
    MessageStore, PusherChannel,
};
pub use typing::{TypingStateMachine, TypingTransition};
pub use value_object::{
    ConnectionId, DisplayName, MessageContent, MessageId, RoomKey, Timestamp, UserId,
};
