//! Conversion logic between DTOs and domain entities.

use crate::domain::{BroadcastEvent, EventPayload, Identity, MessageSnapshot, PresenceEntry};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<MessageSnapshot> for dto::MessageDto {
    fn from(model: MessageSnapshot) -> Self {
        Self {
            id: model.id.value(),
            author_id: model.author_id.value(),
            author_name: model.author_name.into_string(),
            content: model.content.into_string(),
            created_at: model.created_at.value(),
            updated_at: model.updated_at.value(),
            edited: model.edited,
        }
    }
}

impl From<&Identity> for dto::UserDto {
    fn from(model: &Identity) -> Self {
        Self {
            user_id: model.user_id.value(),
            display_name: model.display_name.as_str().to_string(),
            is_admin: model.is_admin,
        }
    }
}

impl From<PresenceEntry> for dto::PresenceDto {
    fn from(model: PresenceEntry) -> Self {
        Self {
            user_id: model.user_id.value(),
            display_name: model.display_name.into_string(),
            connection_count: model.connection_count,
            online_since: model.online_since.value(),
        }
    }
}

impl From<BroadcastEvent> for dto::ServerEvent {
    fn from(event: BroadcastEvent) -> Self {
        let at = event.created_at.value();
        match event.payload {
            EventPayload::MessageCreated(message) => Self::MessageCreated {
                message: message.into(),
            },
            EventPayload::MessageUpdated(message) => Self::MessageUpdated {
                message: message.into(),
            },
            EventPayload::MessageDeleted(message) => Self::MessageDeleted {
                message: message.into(),
            },
            EventPayload::PresenceChanged {
                user_id,
                display_name,
                online: true,
            } => Self::PresenceOnline {
                user_id: user_id.value(),
                display_name: display_name.into_string(),
                at,
            },
            EventPayload::PresenceChanged {
                user_id,
                display_name,
                online: false,
            } => Self::PresenceOffline {
                user_id: user_id.value(),
                display_name: display_name.into_string(),
                at,
            },
            EventPayload::TypingChanged {
                user_id,
                display_name,
                is_typing,
            } => Self::TypingChanged {
                user_id: user_id.value(),
                display_name: display_name.into_string(),
                is_typing,
                at,
            },
            EventPayload::PrivateMessage {
                from_user_id,
                from_display_name,
                to_user_id,
                body,
            } => Self::PrivateMessage {
                from_user_id: from_user_id.value(),
                from_display_name: from_display_name.into_string(),
                to_user_id: to_user_id.value(),
                body: body.into_string(),
                sent_at: at,
            },
        }
    }
}
