//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - 1 接続へのフレーム送信（push_to）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、送信に使用します。
//! 実際のソケットへの書き込みは接続ごとの pusher loop が行うため、ここでの送信は
//! キューへの追加だけでブロックしません。遅いクライアントが他の接続への配送を
//! 止めることはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, DeliveryError, MessagePusher, PusherChannel};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.register_client(connection_id, tx).await;
/// pusher.push_to(&connection_id, "{\"type\":\"ack\"}").await?;
/// ```
#[derive(Debug, Default)]
pub struct WebSocketMessagePusher {
    /// Key: ConnectionId / Value: 送信チャンネル
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) -> bool {
        let mut clients = self.clients.lock().await;
        let removed = clients.remove(connection_id).is_some();
        if removed {
            tracing::debug!("Connection '{}' unregistered from MessagePusher", connection_id);
        }
        removed
    }

    async fn push_to(&self, connection_id: &ConnectionId, content: &str) -> Result<(), DeliveryError> {
        let sender = {
            let clients = self.clients.lock().await;
            clients
                .get(connection_id)
                .cloned()
                .ok_or(DeliveryError::ConnectionNotFound(*connection_id))?
        };

        sender
            .send(content.to_string())
            .map_err(|_| DeliveryError::ChannelClosed(*connection_id))?;
        tracing::trace!("Pushed frame to connection '{}'", connection_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to: 特定の接続への送信
    // - 未登録・切断済みの接続への送信エラー
    // - unregister でチャンネルが drop されること
    // ========================================

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 登録済みの接続にフレームを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        pusher.register_client(connection_id, tx).await;

        // when (操作):
        let result = pusher.push_to(&connection_id, "Hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_unknown_connection() {
        // テスト項目: 未登録の接続への送信は ConnectionNotFound になる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let connection_id = ConnectionId::generate();

        // when (操作):
        let result = pusher.push_to(&connection_id, "Hello").await;

        // then (期待する結果):
        assert_eq!(result, Err(DeliveryError::ConnectionNotFound(connection_id)));
    }

    #[tokio::test]
    async fn test_push_to_closed_channel() {
        // テスト項目: 受信側が閉じた（half-closed）接続への送信は ChannelClosed になる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        pusher.register_client(connection_id, tx).await;
        drop(rx);

        // when (操作):
        let result = pusher.push_to(&connection_id, "Hello").await;

        // then (期待する結果):
        assert_eq!(result, Err(DeliveryError::ChannelClosed(connection_id)));
    }

    #[tokio::test]
    async fn test_unregister_drops_sender() {
        // テスト項目: unregister すると送信チャンネルが drop され、受信側が終了を検知する
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        pusher.register_client(connection_id, tx).await;

        // when (操作):
        let first = pusher.unregister_client(&connection_id).await;
        let second = pusher.unregister_client(&connection_id).await;

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(rx.recv().await, None);
    }
}
