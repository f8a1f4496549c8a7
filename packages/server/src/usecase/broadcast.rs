//! Broadcast Router
//!
//! `publish` resolves the event scope to a connection snapshot and hands the
//! serialized frame to each connection's outbound channel. A target that
//! cannot receive (half-closed transport, evicted between resolution and
//! delivery) is logged and skipped; the caller never learns which targets failed.
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - BroadcastRouter::publish() / reply()
//!
//! ### なぜこのテストが必要か
//! - 1 つの接続への配送失敗が他の接続への配送を妨げないことを保証
//! - `user:<id>` スコープが対象ユーザーの接続だけに届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：all スコープへの配送
//! - 異常系：3 接続のうち 1 接続が配送失敗
//! - エッジケース：オフラインユーザーへのプライベート配送（配送 0 件・エラーなし）

use std::sync::Arc;

use crate::{
    domain::{BroadcastEvent, ConnectionId, ConnectionRegistry, DeliveryError, MessagePusher},
    infrastructure::dto::websocket::ServerEvent,
};

pub struct BroadcastRouter {
    /// ConnectionRegistry（ルーム所属の解決）
    registry: Arc<dyn ConnectionRegistry>,
    /// MessagePusher（接続ごとの送信チャンネル）
    message_pusher: Arc<dyn MessagePusher>,
}

impl BroadcastRouter {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// Fan an event out to every live connection of its scope.
    ///
    /// Returns once every target has been handed the frame (channels are
    /// unbounded, so no target can stall the others).
    pub async fn publish(&self, event: BroadcastEvent) {
        let kind = event.kind();
        let scope = event.scope;

        let payload = match serde_json::to_string(&ServerEvent::from(event)) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize {} event: {}", kind, e);
                return;
            }
        };

        // snapshot: the registry lock is released before any delivery
        let targets = self.registry.room_members(&scope).await;
        if targets.is_empty() {
            tracing::debug!("No live connection in '{}', dropping {}", scope, kind);
            return;
        }

        let mut delivered = 0usize;
        for target in &targets {
            match self.message_pusher.push_to(&target.id, &payload).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!("Delivery of {} to user {} failed: {}", kind, target.user_id, e),
            }
        }

        tracing::debug!(
            "Published {} to '{}' ({}/{} delivered)",
            kind,
            scope,
            delivered,
            targets.len()
        );
    }

    /// Send an event to a single connection (greeting, ack, error notice).
    pub async fn reply(&self, connection_id: &ConnectionId, event: &ServerEvent) -> Result<(), DeliveryError> {
        let payload = serde_json::to_string(event).map_err(|e| {
            tracing::error!("Failed to serialize reply: {}", e);
            DeliveryError::ChannelClosed(*connection_id)
        })?;
        self.message_pusher.push_to(connection_id, &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            Connection, MessageContent, RoomKey, Timestamp, UserId,
            repository::MockMessagePusher,
        },
        infrastructure::repository::InMemoryConnectionRegistry,
        usecase::test_support::{connection_of, identity, message},
    };

    #[tokio::test]
    async fn test_delivery_failure_is_isolated_per_target() {
        // テスト項目: 3 接続のうち 1 接続で配送が失敗しても、残り 2 接続には同じ publish で届く
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let alice = connection_of(&identity(1, "alice"), 1);
        let bob = connection_of(&identity(2, "bob"), 2);
        let carol = connection_of(&identity(3, "carol"), 3);
        for connection in [&alice, &bob, &carol] {
            registry.admit(connection.clone()).await;
        }

        let (alice_id, bob_id, carol_id) = (alice.id, bob.id, carol.id);
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(move |id, _| *id == alice_id)
            .times(1)
            .returning(|_, _| Ok(()));
        pusher
            .expect_push_to()
            .withf(move |id, _| *id == bob_id)
            .times(1)
            .returning(move |_, _| Err(DeliveryError::ChannelClosed(bob_id)));
        pusher
            .expect_push_to()
            .withf(move |id, _| *id == carol_id)
            .times(1)
            .returning(|_, _| Ok(()));
        let router = BroadcastRouter::new(registry, Arc::new(pusher));

        // when (操作):
        let event = BroadcastEvent::message_created(message(1, &alice), Timestamp::new(10));
        assert_eq!(event.scope, RoomKey::All);
        router.publish(event).await;

        // then (期待する結果): expectations (times(1) each) are verified on drop
    }

    #[tokio::test]
    async fn test_private_scope_reaches_only_target_user() {
        // テスト項目: user:<id> スコープのイベントは対象ユーザーの全接続にだけ届く
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let alice = connection_of(&identity(1, "alice"), 1);
        let bob_phone = connection_of(&identity(2, "bob"), 2);
        let bob_laptop = connection_of(&identity(2, "bob"), 3);
        for connection in [&alice, &bob_phone, &bob_laptop] {
            registry.admit(connection.clone()).await;
        }

        let alice_id = alice.id;
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(move |id, _| *id != alice_id)
            .times(2)
            .returning(|_, _| Ok(()));
        let router = BroadcastRouter::new(registry, Arc::new(pusher));

        // when (操作):
        let event = BroadcastEvent::private_message(
            &alice,
            UserId::new(2).unwrap(),
            MessageContent::new("lease renewal".to_string()).unwrap(),
            Timestamp::new(10),
        );
        router.publish(event).await;

        // then (期待する結果): bob の 2 接続だけに配送される（times(2)）
    }

    #[tokio::test]
    async fn test_private_message_to_offline_user_is_dropped() {
        // テスト項目: ライブ接続のないユーザー宛てのプライベートメッセージは配送 0 件でエラーにならない
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let alice = connection_of(&identity(1, "alice"), 1);
        registry.admit(alice.clone()).await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_push_to().times(0);
        let router = BroadcastRouter::new(registry, Arc::new(pusher));

        // when (操作):
        let event = BroadcastEvent::private_message(
            &alice,
            UserId::new(99).unwrap(),
            MessageContent::new("anyone there?".to_string()).unwrap(),
            Timestamp::new(10),
        );
        router.publish(event).await;

        // then (期待する結果): push_to は一度も呼ばれない
    }

    #[tokio::test]
    async fn test_reply_targets_single_connection() {
        // テスト項目: reply は指定した接続だけに送信される
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let alice: Connection = connection_of(&identity(1, "alice"), 1);
        let alice_id = alice.id;
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(move |id, content| *id == alice_id && content.contains("\"type\":\"ack\""))
            .times(1)
            .returning(|_, _| Ok(()));
        let router = BroadcastRouter::new(registry, Arc::new(pusher));

        // when (操作):
        let result = router
            .reply(
                &alice_id,
                &ServerEvent::Ack {
                    client_ref: Some("r-1".to_string()),
                    received_at: 5,
                },
            )
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
