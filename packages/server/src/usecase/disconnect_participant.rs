//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 接続の削除、送信チャンネルの解除、presence-offline の発行
//!
//! ### なぜこのテストが必要か
//! - N 本の接続を持つユーザーは N 本目の切断でのみ offline になることを保証
//! - 切断処理が冪等である（二重の切断が no-op になる）ことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：唯一の接続の切断
//! - エッジケース：複数接続のうち 1 本の切断、同じ接続の二重切断
//! - 入力中のまま最後の接続が切れた場合の typing 解除

use std::sync::Arc;

use atrium_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    BroadcastEvent, ConnectionId, ConnectionRegistry, EvictOutcome, MessagePusher,
    PresenceTracker, PresenceTransition, RegistryConsistencyError, Timestamp,
};

use super::{broadcast::BroadcastRouter, typing::TypingUseCase};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    presence: Arc<Mutex<PresenceTracker>>,
    router: Arc<BroadcastRouter>,
    typing: Arc<TypingUseCase>,
    clock: Arc<dyn Clock>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        presence: Arc<Mutex<PresenceTracker>>,
        router: Arc<BroadcastRouter>,
        typing: Arc<TypingUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            presence,
            router,
            typing,
            clock,
        }
    }

    /// 接続を切断する
    ///
    /// トランスポートのクローズと強制切断が競合しうるため、未登録の接続に対しては
    /// 何もせず `EvictOutcome::NotRegistered` を返します。送信チャンネルの解除により
    /// 接続の送信ループが終了し、トランスポートが閉じられます。
    pub async fn execute(&self, connection_id: &ConnectionId) -> EvictOutcome {
        let mut presence = self.presence.lock().await;

        let outcome = self.registry.evict(connection_id).await;
        self.message_pusher.unregister_client(connection_id).await;

        let (connection, last_for_user) = match &outcome {
            EvictOutcome::NotRegistered => {
                tracing::debug!("Connection {} already evicted", connection_id);
                return outcome;
            }
            EvictOutcome::Evicted {
                connection,
                last_for_user,
            } => (connection, *last_for_user),
        };
        tracing::info!(
            "Connection {} of user {} evicted",
            connection.id,
            connection.user_id
        );

        let transition = match presence.connection_evicted(connection) {
            Ok(transition) => transition,
            Err(e) => {
                tracing::warn!("Absorbed on evict: {}", e);
                return outcome;
            }
        };

        let went_offline = matches!(transition, Some(PresenceTransition::WentOffline(_)));
        if went_offline != last_for_user {
            let inconsistency = RegistryConsistencyError::PresenceMismatch {
                user_id: connection.user_id,
                registry_last: last_for_user,
                presence_last: went_offline,
            };
            tracing::warn!("Absorbed on evict: {}", inconsistency);
        }

        if let Some(PresenceTransition::WentOffline(entry)) = transition {
            self.typing.clear_user(entry.user_id).await;

            tracing::info!("User {} ({}) is offline", entry.user_id, entry.display_name);
            let now = Timestamp::new(self.clock.now_millis());
            self.router
                .publish(BroadcastEvent::presence_changed(&entry, false, now))
                .await;
        }

        outcome
    }
}
