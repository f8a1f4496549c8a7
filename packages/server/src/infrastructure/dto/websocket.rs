//! WebSocket message DTOs.
//!
//! Every frame is a JSON object tagged by `"type"` (kebab-case) with camelCase
//! fields. Timestamps are Unix milliseconds (UTC).

use serde::{Deserialize, Serialize};

/// Message snapshot as seen on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub edited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub user_id: i64,
    pub display_name: String,
    pub is_admin: bool,
}

/// One row of the online roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceDto {
    pub user_id: i64,
    pub display_name: String,
    pub connection_count: usize,
    pub online_since: i64,
}

/// Signals accepted from an admitted connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientSignal {
    /// Informational only; the durable write goes through the HTTP API.
    SendMessage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_ref: Option<String>,
    },
    TypingStart,
    TypingStop,
    PrivateMessage { target_user_id: i64, body: String },
}

/// Events delivered to connections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    SessionReady {
        connection_id: String,
        user: UserDto,
        online: Vec<PresenceDto>,
    },
    Ack {
        client_ref: Option<String>,
        received_at: i64,
    },
    MessageCreated {
        message: MessageDto,
    },
    MessageUpdated {
        message: MessageDto,
    },
    MessageDeleted {
        message: MessageDto,
    },
    PresenceOnline {
        user_id: i64,
        display_name: String,
        at: i64,
    },
    PresenceOffline {
        user_id: i64,
        display_name: String,
        at: i64,
    },
    TypingChanged {
        user_id: i64,
        display_name: String,
        is_typing: bool,
        at: i64,
    },
    PrivateMessage {
        from_user_id: i64,
        from_display_name: String,
        to_user_id: i64,
        body: String,
        sent_at: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_signal_wire_format() {
        // テスト項目: クライアントからのシグナルが type タグ付きの JSON から読み取れる
        // given (前提条件):
        let typing = json!({"type": "typing-start"});
        let private = json!({"type": "private-message", "targetUserId": 7, "body": "hi"});
        let send = json!({"type": "send-message"});

        // when (操作):
        let typing: ClientSignal = serde_json::from_value(typing).unwrap();
        let private: ClientSignal = serde_json::from_value(private).unwrap();
        let send: ClientSignal = serde_json::from_value(send).unwrap();

        // then (期待する結果):
        assert_eq!(typing, ClientSignal::TypingStart);
        assert_eq!(
            private,
            ClientSignal::PrivateMessage {
                target_user_id: 7,
                body: "hi".to_string()
            }
        );
        assert_eq!(send, ClientSignal::SendMessage { client_ref: None });
    }

    #[test]
    fn test_server_event_wire_format() {
        // テスト項目: サーバーイベントが kebab-case のタグと camelCase のフィールドで出力される
        // given (前提条件):
        let event = ServerEvent::TypingChanged {
            user_id: 3,
            display_name: "carol".to_string(),
            is_typing: true,
            at: 1_700_000_000_000,
        };

        // when (操作):
        let value = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({
                "type": "typing-changed",
                "userId": 3,
                "displayName": "carol",
                "isTyping": true,
                "at": 1_700_000_000_000i64
            })
        );
    }

    #[test]
    fn test_unknown_signal_is_rejected() {
        // テスト項目: 未知の type はパースエラーになる
        // given (前提条件):
        let raw = r#"{"type":"drop-table"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientSignal>(raw);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
