//! Broadcast events.
//!
//! A `BroadcastEvent` is constructed by whichever collaborator caused the change
//! (message command, presence transition, typing transition, private message),
//! handed to the router's `publish` and dropped right after fan-out.

use super::{
    entity::{Connection, MessageSnapshot, PresenceEntry, TypingState},
    value_object::{DisplayName, MessageContent, MessageId, RoomKey, Timestamp, UserId},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    MessageCreated(MessageSnapshot),
    MessageUpdated(MessageSnapshot),
    MessageDeleted(MessageSnapshot),
    PresenceChanged {
        user_id: UserId,
        display_name: DisplayName,
        online: bool,
    },
    TypingChanged {
        user_id: UserId,
        display_name: DisplayName,
        is_typing: bool,
    },
    PrivateMessage {
        from_user_id: UserId,
        from_display_name: DisplayName,
        to_user_id: UserId,
        body: MessageContent,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastEvent {
    pub payload: EventPayload,
    pub scope: RoomKey,
    pub created_at: Timestamp,
}

impl BroadcastEvent {
    pub fn message_created(message: MessageSnapshot, created_at: Timestamp) -> Self {
        Self {
            payload: EventPayload::MessageCreated(message),
            scope: RoomKey::All,
            created_at,
        }
    }

    pub fn message_updated(message: MessageSnapshot, created_at: Timestamp) -> Self {
        Self {
            payload: EventPayload::MessageUpdated(message),
            scope: RoomKey::All,
            created_at,
        }
    }

    pub fn message_deleted(message: MessageSnapshot, created_at: Timestamp) -> Self {
        Self {
            payload: EventPayload::MessageDeleted(message),
            scope: RoomKey::All,
            created_at,
        }
    }

    pub fn presence_changed(entry: &PresenceEntry, online: bool, created_at: Timestamp) -> Self {
        Self {
            payload: EventPayload::PresenceChanged {
                user_id: entry.user_id,
                display_name: entry.display_name.clone(),
                online,
            },
            scope: RoomKey::All,
            created_at,
        }
    }

    pub fn typing_changed(state: &TypingState, created_at: Timestamp) -> Self {
        Self {
            payload: EventPayload::TypingChanged {
                user_id: state.user_id,
                display_name: state.display_name.clone(),
                is_typing: state.is_typing,
            },
            scope: state.scope,
            created_at,
        }
    }

    /// Private message scoped to the target user's own room.
    pub fn private_message(
        from: &Connection,
        to_user_id: UserId,
        body: MessageContent,
        created_at: Timestamp,
    ) -> Self {
        Self {
            payload: EventPayload::PrivateMessage {
                from_user_id: from.user_id,
                from_display_name: from.display_name.clone(),
                to_user_id,
                body,
            },
            scope: RoomKey::User(to_user_id),
            created_at,
        }
    }

    /// Wire tag, used for logging
    pub fn kind(&self) -> &'static str {
        match &self.payload {
            EventPayload::MessageCreated(_) => "message-created",
            EventPayload::MessageUpdated(_) => "message-updated",
            EventPayload::MessageDeleted(_) => "message-deleted",
            EventPayload::PresenceChanged { online: true, .. } => "presence-online",
            EventPayload::PresenceChanged { online: false, .. } => "presence-offline",
            EventPayload::TypingChanged { .. } => "typing-changed",
            EventPayload::PrivateMessage { .. } => "private-message",
        }
    }

    pub fn message_id(&self) -> Option<MessageId> {
        match &self.payload {
            EventPayload::MessageCreated(message)
            | EventPayload::MessageUpdated(message)
            | EventPayload::MessageDeleted(message) => Some(message.id),
            _ => None,
        }
    }
}
