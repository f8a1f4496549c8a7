//! UseCase: 強制切断（管理者のみ）
//!
//! ユーザーの全てのライブ接続を通常の切断処理で削除します。送信チャンネルが
//! 解除されるため各接続のトランスポートも閉じられ、presence-offline は
//! 通常の経路で発行されます。
//!
//! トークン自体は失効させません。キャッシュ済みのセッション（`session-ttl-secs`
//! の間有効）と資格情報検証器が同じトークンを受け入れる限り、ユーザーは再接続
//! できます。アクセスを止めるには検証器側でトークンを無効化してください。

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, EvictOutcome, Identity, RoomKey, UserId};

use super::{disconnect_participant::DisconnectParticipantUseCase, error::EvictUserError};

pub struct EvictUserUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    disconnect: Arc<DisconnectParticipantUseCase>,
}

impl EvictUserUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        disconnect: Arc<DisconnectParticipantUseCase>,
    ) -> Self {
        Self {
            registry,
            disconnect,
        }
    }

    /// 切断した接続数を返す（接続が無ければ 0）
    pub async fn execute(&self, actor: &Identity, user_id: i64) -> Result<usize, EvictUserError> {
        if !actor.is_admin {
            return Err(EvictUserError::Forbidden);
        }
        let user_id = UserId::new(user_id)?;

        let mut evicted = 0;
        for connection in self.registry.room_members(&RoomKey::User(user_id)).await {
            if let EvictOutcome::Evicted { .. } = self.disconnect.execute(&connection.id).await {
                evicted += 1;
            }
        }

        tracing::info!(
            "User {} force-evicted by {} ({} connections)",
            user_id,
            actor.user_id,
            evicted
        );
        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::PresenceStatus,
        infrastructure::dto::websocket::ServerEvent,
        usecase::test_support::{Harness, admin, drain, identity},
    };

    #[tokio::test]
    async fn test_admin_evicts_every_connection_of_user() {
        // テスト項目: 管理者は対象ユーザーの全接続を切断でき、presence-offline が 1 回発行される
        // given (前提条件):
        let harness = Harness::new();
        let root = admin(9, "root");
        let (_root_conn, mut root_rx) = harness.join(&root).await;
        let (_phone, mut phone_rx) = harness.join(&identity(1, "alice")).await;
        let (_laptop, mut laptop_rx) = harness.join(&identity(1, "alice")).await;
        drain(&mut root_rx);

        // when (操作):
        let evicted = harness.evict_user.execute(&root, 1).await;

        // then (期待する結果):
        assert_eq!(evicted, Ok(2));
        assert_eq!(
            harness.presence.status(UserId::new(1).unwrap()).await,
            PresenceStatus::Offline
        );
        let offline = drain(&mut root_rx)
            .into_iter()
            .filter(|event| matches!(event, ServerEvent::PresenceOffline { user_id: 1, .. }))
            .count();
        assert_eq!(offline, 1);
        drain(&mut phone_rx);
        drain(&mut laptop_rx);
        assert_eq!(phone_rx.recv().await, None);
        assert_eq!(laptop_rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_evict() {
        // テスト項目: 管理者以外の強制切断は Forbidden で、接続は残る
        // given (前提条件):
        let harness = Harness::new();
        let bob = identity(2, "bob");
        let _alice = harness.join(&identity(1, "alice")).await;

        // when (操作):
        let result = harness.evict_user.execute(&bob, 1).await;

        // then (期待する結果):
        assert_eq!(result, Err(EvictUserError::Forbidden));
        assert_eq!(harness.registry.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_evicting_offline_user_is_noop() {
        // テスト項目: 接続の無いユーザーの強制切断は 0 件
        // given (前提条件):
        let harness = Harness::new();

        // when (操作):
        let result = harness.evict_user.execute(&admin(9, "root"), 5).await;

        // then (期待する結果):
        assert_eq!(result, Ok(0));
    }
}
