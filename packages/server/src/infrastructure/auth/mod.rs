//! Credential Verifier implementations.
//!
//! - `static_tokens`: tokens loaded from a JSON file (development, tests)
//! - `http`: remote verification endpoint
//! - `cached`: decorator keeping resolved identities in the shared cache tier

pub mod cached;
pub mod http;
pub mod static_tokens;

pub use cached::CachedCredentialVerifier;
pub use http::HttpCredentialVerifier;
pub use static_tokens::{StaticTokenVerifier, TokenFileError};

use serde::{Deserialize, Serialize};

use crate::domain::{AuthenticationError, DisplayName, Identity, UserId};

/// Identity record as exchanged with credential sources
/// (`{userId, username, isAdmin, isActive}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedUser {
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl TryFrom<VerifiedUser> for Identity {
    type Error = AuthenticationError;

    fn try_from(user: VerifiedUser) -> Result<Self, Self::Error> {
        let user_id = UserId::new(user.user_id)
            .map_err(|e| AuthenticationError::MalformedIdentity(e.to_string()))?;
        let display_name = DisplayName::new(user.username)
            .map_err(|e| AuthenticationError::MalformedIdentity(e.to_string()))?;
        Ok(Identity {
            user_id,
            display_name,
            is_admin: user.is_admin,
            is_active: user.is_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verified_user_defaults() {
        // テスト項目: isAdmin / isActive が省略された場合のデフォルト値
        // given (前提条件):
        let json = r#"{"userId": 5, "username": "erin"}"#;

        // when (操作):
        let user: VerifiedUser = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert!(!user.is_admin);
        assert!(user.is_active);
    }

    #[test]
    fn test_malformed_identity_is_rejected() {
        // テスト項目: 不正な userId / username は MalformedIdentity になる
        // given (前提条件):
        let bad_id = VerifiedUser {
            user_id: 0,
            username: "x".to_string(),
            is_admin: false,
            is_active: true,
        };
        let bad_name = VerifiedUser {
            user_id: 1,
            username: " ".to_string(),
            is_admin: false,
            is_active: true,
        };

        // when (操作):
        let bad_id_result = Identity::try_from(bad_id);
        let bad_name_result = Identity::try_from(bad_name);

        // then (期待する結果):
        assert!(matches!(bad_id_result, Err(AuthenticationError::MalformedIdentity(_))));
        assert!(matches!(bad_name_result, Err(AuthenticationError::MalformedIdentity(_))));
    }
}
