//! UseCase: 接続時の認証
//!
//! 認証は Connection Registry のロックを一切保持せずに行われます。
//! 非アクティブなユーザーは検証失敗と同じ扱いです。

use std::sync::Arc;

use crate::domain::{AuthenticationError, CredentialVerifier, Identity};

/// 接続認証のユースケース
pub struct AuthenticateUseCase {
    /// CredentialVerifier（bearer token の検証）
    verifier: Arc<dyn CredentialVerifier>,
}

impl AuthenticateUseCase {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// bearer token を検証し、アクティブなユーザーの Identity を返す
    ///
    /// # Returns
    ///
    /// * `Ok(Identity)` - 認証成功
    /// * `Err(AuthenticationError)` - token なし・無効・非アクティブ・検証先の障害
    pub async fn execute(&self, token: Option<&str>) -> Result<Identity, AuthenticationError> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthenticationError::MissingToken)?;

        let identity = self.verifier.verify(token).await?;
        if !identity.is_active {
            return Err(AuthenticationError::InactiveUser(identity.user_id));
        }
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::repository::MockCredentialVerifier, usecase::test_support::identity};

    #[tokio::test]
    async fn test_authenticate_success() {
        // テスト項目: 有効な token でアクティブなユーザーの Identity が返る
        // given (前提条件):
        let mut verifier = MockCredentialVerifier::new();
        verifier
            .expect_verify()
            .withf(|token| token == "alice-token")
            .returning(|_| Ok(identity(1, "alice")));
        let usecase = AuthenticateUseCase::new(Arc::new(verifier));

        // when (操作):
        let result = usecase.execute(Some("alice-token")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(identity(1, "alice")));
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected_without_verification() {
        // テスト項目: token が無い（空白のみを含む）場合は検証先を呼ばずに拒否される
        // given (前提条件):
        let mut verifier = MockCredentialVerifier::new();
        verifier.expect_verify().times(0);
        let usecase = AuthenticateUseCase::new(Arc::new(verifier));

        // when (操作):
        let none = usecase.execute(None).await;
        let blank = usecase.execute(Some("   ")).await;

        // then (期待する結果):
        assert_eq!(none, Err(AuthenticationError::MissingToken));
        assert_eq!(blank, Err(AuthenticationError::MissingToken));
    }

    #[tokio::test]
    async fn test_inactive_user_is_treated_as_failure() {
        // テスト項目: 非アクティブなユーザーは認証失敗として扱われる
        // given (前提条件):
        let mut verifier = MockCredentialVerifier::new();
        verifier.expect_verify().returning(|_| {
            Ok(Identity {
                is_active: false,
                ..identity(4, "dave")
            })
        });
        let usecase = AuthenticateUseCase::new(Arc::new(verifier));

        // when (操作):
        let result = usecase.execute(Some("dave-token")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(AuthenticationError::InactiveUser(id)) if id.value() == 4));
    }

    #[tokio::test]
    async fn test_verifier_error_is_propagated() {
        // テスト項目: 検証先のエラーはそのまま返る
        // given (前提条件):
        let mut verifier = MockCredentialVerifier::new();
        verifier
            .expect_verify()
            .returning(|_| Err(AuthenticationError::InvalidToken));
        let usecase = AuthenticateUseCase::new(Arc::new(verifier));

        // when (操作):
        let result = usecase.execute(Some("revoked")).await;

        // then (期待する結果):
        assert_eq!(result, Err(AuthenticationError::InvalidToken));
    }
}
