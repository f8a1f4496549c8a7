//! Domain entities of the real-time core.

use serde::{Deserialize, Serialize};

use super::value_object::{
    ConnectionId, DisplayName, MessageContent, MessageId, RoomKey, Timestamp, UserId,
};

/// Identity resolved from a bearer token by the credential verifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub is_admin: bool,
    pub is_active: bool,
}

/// One live, authenticated transport session.
///
/// Exists only between a successful handshake and transport teardown; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub admitted_at: Timestamp,
}

impl Connection {
    pub fn new(id: ConnectionId, identity: &Identity, admitted_at: Timestamp) -> Self {
        Self {
            id,
            user_id: identity.user_id,
            display_name: identity.display_name.clone(),
            admitted_at,
        }
    }

    /// Rooms a connection joins on admission
    pub fn rooms(&self) -> [RoomKey; 2] {
        [RoomKey::All, RoomKey::User(self.user_id)]
    }
}

/// One row per currently-online user; exists iff `connection_count > 0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub connection_count: usize,
    pub online_since: Timestamp,
}

/// Snapshot of a message as returned by the durable store after a write.
///
/// Serializable so that it can be kept in the shared cache tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSnapshot {
    pub id: MessageId,
    pub author_id: UserId,
    pub author_name: DisplayName,
    pub content: MessageContent,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub edited: bool,
}

/// Ephemeral typing flag of one (user, scope) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingState {
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub scope: RoomKey,
    pub is_typing: bool,
    pub last_set_at: Timestamp,
}

impl TypingState {
    /// A state older than the inactivity window must not be rendered as active.
    pub fn is_stale(&self, now: Timestamp, window_millis: i64) -> bool {
        self.last_set_at.millis_until(now) >= window_millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(user_id: i64, name: &str) -> Identity {
        Identity {
            user_id: UserId::new(user_id).unwrap(),
            display_name: DisplayName::new(name.to_string()).unwrap(),
            is_admin: false,
            is_active: true,
        }
    }

    #[test]
    fn test_connection_joins_global_and_own_user_room() {
        // テスト項目: 接続は "all" と自分の "user:<id>" ルームに所属する
        // given (前提条件):
        let connection = Connection::new(
            ConnectionId::generate(),
            &identity(3, "carol"),
            Timestamp::new(1_000),
        );

        // when (操作):
        let rooms = connection.rooms();

        // then (期待する結果):
        assert_eq!(rooms[0], RoomKey::All);
        assert_eq!(rooms[1], RoomKey::User(UserId::new(3).unwrap()));
        assert_eq!(connection.display_name.as_str(), "carol");
    }

    #[test]
    fn test_typing_state_staleness_boundary() {
        // テスト項目: 非アクティブ時間がウィンドウに達した TypingState は stale と判定される
        // given (前提条件):
        let state = TypingState {
            user_id: UserId::new(1).unwrap(),
            display_name: DisplayName::new("alice".to_string()).unwrap(),
            scope: RoomKey::All,
            is_typing: true,
            last_set_at: Timestamp::new(10_000),
        };

        // when (操作) / then (期待する結果):
        assert!(!state.is_stale(Timestamp::new(14_999), 5_000));
        assert!(state.is_stale(Timestamp::new(15_000), 5_000));
    }
}
