//! Value objects
//!
//! 生成時にバリデーションを行い、不正な値が Domain 内に入り込まないようにします。

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum display name length (characters)
pub const DISPLAY_NAME_MAX_LEN: usize = 64;
/// Maximum message / private message body length (characters)
pub const MESSAGE_CONTENT_MAX_LEN: usize = 4000;

/// Authenticated user identifier (positive integer issued by the account store)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    pub fn new(value: i64) -> Result<Self, ValueObjectError> {
        if value <= 0 {
            return Err(ValueObjectError::InvalidUserId(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle of one live transport session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned message identifier; increases with creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(i64);

impl MessageId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name resolved by the credential verifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::DisplayNameEmpty);
        }
        let len = trimmed.chars().count();
        if len > DISPLAY_NAME_MAX_LEN {
            return Err(ValueObjectError::DisplayNameTooLong {
                len,
                max: DISPLAY_NAME_MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of a chat message or private message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::MessageContentEmpty);
        }
        let len = value.chars().count();
        if len > MESSAGE_CONTENT_MAX_LEN {
            return Err(ValueObjectError::MessageContentTooLong {
                len,
                max: MESSAGE_CONTENT_MAX_LEN,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix timestamp in milliseconds (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed from `self` until `later` (negative if `later` is earlier)
    pub fn millis_until(&self, later: Timestamp) -> i64 {
        later.0 - self.0
    }
}

/// Named subset of connections eligible for a broadcast scope.
///
/// Textual form is `all` or `user:<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoomKey {
    All,
    User(UserId),
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomKey::All => f.write_str("all"),
            RoomKey::User(user_id) => write!(f, "user:{}", user_id),
        }
    }
}

impl FromStr for RoomKey {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(RoomKey::All);
        }
        let raw = s
            .strip_prefix("user:")
            .ok_or_else(|| ValueObjectError::InvalidRoomKey(s.to_string()))?;
        let id = raw
            .parse::<i64>()
            .map_err(|_| ValueObjectError::InvalidRoomKey(s.to_string()))?;
        Ok(RoomKey::User(UserId::new(id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_rejects_non_positive_values() {
        // テスト項目: 0 以下の UserId は生成できない
        // given (前提条件):
        let zero = 0;
        let negative = -5;

        // when (操作):
        let zero_result = UserId::new(zero);
        let negative_result = UserId::new(negative);

        // then (期待する結果):
        assert_eq!(zero_result, Err(ValueObjectError::InvalidUserId(0)));
        assert_eq!(negative_result, Err(ValueObjectError::InvalidUserId(-5)));
        assert_eq!(UserId::new(42).unwrap().value(), 42);
    }

    #[test]
    fn test_display_name_is_trimmed() {
        // テスト項目: 表示名は前後の空白が除去される
        // given (前提条件):
        let raw = "  alice  ".to_string();

        // when (操作):
        let name = DisplayName::new(raw).unwrap();

        // then (期待する結果):
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_display_name_validation_errors() {
        // テスト項目: 空文字・長すぎる表示名はエラーになる
        // given (前提条件):
        let blank = "   ".to_string();
        let long = "a".repeat(DISPLAY_NAME_MAX_LEN + 1);

        // when (操作):
        let blank_result = DisplayName::new(blank);
        let long_result = DisplayName::new(long);

        // then (期待する結果):
        assert_eq!(blank_result, Err(ValueObjectError::DisplayNameEmpty));
        assert_eq!(
            long_result,
            Err(ValueObjectError::DisplayNameTooLong {
                len: DISPLAY_NAME_MAX_LEN + 1,
                max: DISPLAY_NAME_MAX_LEN
            })
        );
    }

    #[test]
    fn test_message_content_validation() {
        // テスト項目: 空白のみ・上限超過のメッセージは拒否される
        // given (前提条件):
        let ok = "rent roll updated".to_string();
        let blank = " \n ".to_string();
        let long = "x".repeat(MESSAGE_CONTENT_MAX_LEN + 1);

        // when (操作):
        let ok_result = MessageContent::new(ok);
        let blank_result = MessageContent::new(blank);
        let long_result = MessageContent::new(long);

        // then (期待する結果):
        assert_eq!(ok_result.unwrap().as_str(), "rent roll updated");
        assert_eq!(blank_result, Err(ValueObjectError::MessageContentEmpty));
        assert!(matches!(
            long_result,
            Err(ValueObjectError::MessageContentTooLong { .. })
        ));
    }

    #[test]
    fn test_room_key_text_form() {
        // テスト項目: RoomKey は "all" / "user:<id>" と相互変換できる
        // given (前提条件):
        let user_room = RoomKey::User(UserId::new(7).unwrap());

        // when (操作):
        let all_text = RoomKey::All.to_string();
        let user_text = user_room.to_string();

        // then (期待する結果):
        assert_eq!(all_text, "all");
        assert_eq!(user_text, "user:7");
        assert_eq!("all".parse::<RoomKey>().unwrap(), RoomKey::All);
        assert_eq!("user:7".parse::<RoomKey>().unwrap(), user_room);
    }

    #[test]
    fn test_room_key_rejects_malformed_text() {
        // テスト項目: 不正な RoomKey 文字列はエラーになる
        // given (前提条件):
        let inputs = ["", "everyone", "user:", "user:abc", "user:0"];

        // when (操作) / then (期待する結果):
        for input in inputs {
            assert!(input.parse::<RoomKey>().is_err(), "{input} should be rejected");
        }
    }

    #[test]
    fn test_connection_ids_are_unique() {
        // テスト項目: ConnectionId は生成のたびに異なる値になる
        // given (前提条件):
        let first = ConnectionId::generate();

        // when (操作):
        let second = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(first, second);
    }
}
