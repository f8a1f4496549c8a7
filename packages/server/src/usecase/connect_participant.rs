//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() / admit()
//! - 接続の登録、プレゼンスの参照カウント、presence-online の発行、session-ready の送信
//!
//! ### なぜこのテストが必要か
//! - 同じ接続ハンドルの二重登録でレジストリのエントリが 1 つに保たれることを保証
//! - 2 本目以降の接続では presence-online が発行されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：初回接続（presence-online が全接続に届く）
//! - エッジケース：同一ユーザーの 2 本目の接続、同一ハンドルの二重 admit

use std::sync::Arc;

use atrium_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    domain::{
        AdmitOutcome, BroadcastEvent, Connection, ConnectionId, ConnectionRegistry, Identity,
        MessagePusher, PresenceTracker, PresenceTransition, PusherChannel, RegistryConsistencyError,
        Timestamp,
    },
    infrastructure::dto::websocket::{PresenceDto, ServerEvent, UserDto},
};

use super::broadcast::BroadcastRouter;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// ConnectionRegistry（接続とルーム所属）
    registry: Arc<dyn ConnectionRegistry>,
    /// MessagePusher（送信チャンネルの登録）
    message_pusher: Arc<dyn MessagePusher>,
    /// PresenceTracker（参照カウント。admit / evict と publish を直列化するロックを兼ねる）
    presence: Arc<Mutex<PresenceTracker>>,
    router: Arc<BroadcastRouter>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        presence: Arc<Mutex<PresenceTracker>>,
        router: Arc<BroadcastRouter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            presence,
            router,
            clock,
        }
    }

    /// 認証済みの Identity に対して新しい接続を作成し、登録する
    ///
    /// # Arguments
    ///
    /// * `identity` - 認証済みのユーザー
    /// * `sender` - 接続への送信チャンネル
    ///
    /// # Returns
    ///
    /// 登録された Connection
    pub async fn execute(&self, identity: &Identity, sender: PusherChannel) -> Connection {
        let connection = Connection::new(
            ConnectionId::generate(),
            identity,
            Timestamp::new(self.clock.now_millis()),
        );
        self.admit(identity, connection.clone(), sender).await;
        connection
    }

    /// 接続を登録する（同じハンドルの二重呼び出しは no-op）
    ///
    /// 新しく登録された接続には session-ready を送信し、ユーザーの最初の接続であれば
    /// presence-online を `all` に発行します。session-ready は presence-online より先に
    /// 送信チャンネルに積まれます。
    pub async fn admit(
        &self,
        identity: &Identity,
        connection: Connection,
        sender: PusherChannel,
    ) -> AdmitOutcome {
        let mut presence = self.presence.lock().await;

        // admissions are serialized by the presence lock, so this check cannot race
        if self.registry.get(&connection.id).await.is_some() {
            tracing::debug!("Connection {} already admitted, ignoring", connection.id);
            return AdmitOutcome::AlreadyAdmitted;
        }

        // channel before registry entry: any publish that resolves this connection can deliver
        self.message_pusher.register_client(connection.id, sender).await;
        let outcome = self.registry.admit(connection.clone()).await;
        let first_for_user = match outcome {
            AdmitOutcome::AlreadyAdmitted => {
                tracing::warn!("Connection {} appeared in the registry mid-admit", connection.id);
                return outcome;
            }
            AdmitOutcome::Admitted { first_for_user } => first_for_user,
        };

        let transition = presence.connection_admitted(&connection);
        let came_online = matches!(transition, Some(PresenceTransition::CameOnline(_)));
        if came_online != first_for_user {
            let inconsistency = RegistryConsistencyError::PresenceMismatch {
                user_id: connection.user_id,
                registry_last: first_for_user,
                presence_last: came_online,
            };
            tracing::warn!("Absorbed on admit: {}", inconsistency);
        }

        let greeting = ServerEvent::SessionReady {
            connection_id: connection.id.to_string(),
            user: UserDto::from(identity),
            online: presence
                .online_users()
                .into_iter()
                .map(PresenceDto::from)
                .collect(),
        };
        if let Err(e) = self.router.reply(&connection.id, &greeting).await {
            tracing::warn!("Failed to send session-ready to {}: {}", connection.id, e);
        }

        if let Some(PresenceTransition::CameOnline(entry)) = transition {
            tracing::info!("User {} ({}) is online", entry.user_id, entry.display_name);
            self.router
                .publish(BroadcastEvent::presence_changed(&entry, true, connection.admitted_at))
                .await;
        }

        tracing::info!(
            "Connection {} admitted for user {}",
            connection.id,
            connection.user_id
        );
        outcome
    }
}
