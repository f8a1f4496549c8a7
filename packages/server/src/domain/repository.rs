//! Collaborator traits
//!
//! Domain 層・UseCase 層が必要とする外部とのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! - `ConnectionRegistry`: 接続とルーム所属の管理
//! - `MessagePusher`: 接続ごとの送信チャンネルへの配送
//! - `CredentialVerifier`: bearer token の検証
//! - `MessageStore`: メッセージの永続化（system of record）
//! - `CacheTier`: TTL 付きの共有キャッシュ

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;

use super::{
    entity::{Connection, Identity, MessageSnapshot},
    error::{AuthenticationError, CacheError, DeliveryError, StoreError},
    value_object::{ConnectionId, DisplayName, MessageContent, MessageId, RoomKey, Timestamp, UserId},
};

/// Outbound channel of one connection (serialized JSON frames)
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Result of `ConnectionRegistry::admit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitOutcome {
    /// Newly registered. `first_for_user` is true when the user had no other live connection.
    Admitted { first_for_user: bool },
    /// The handle was already registered; nothing changed.
    AlreadyAdmitted,
}

/// Result of `ConnectionRegistry::evict`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvictOutcome {
    Evicted {
        connection: Connection,
        last_for_user: bool,
    },
    /// Already gone (transport close raced another eviction trigger).
    NotRegistered,
}

/// Connection Registry
///
/// 全ての接続を "all" ルームと "user:<id>" ルームに登録します。
/// `room_members` はスナップショット（コピー）を返すため、呼び出し側は
/// ロックを保持せずに配送を行えます。
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 接続を登録する（同じハンドルの二重登録は無視される）
    async fn admit(&self, connection: Connection) -> AdmitOutcome;

    /// 接続を全てのルームから削除する（未登録なら no-op）
    async fn evict(&self, connection_id: &ConnectionId) -> EvictOutcome;

    /// ルームに所属する接続のスナップショット
    async fn room_members(&self, room: &RoomKey) -> Vec<Connection>;

    /// 登録済みの接続を取得
    async fn get(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// 接続数
    async fn connection_count(&self) -> usize;
}

/// MessagePusher
///
/// 接続ごとの送信チャンネルを管理し、シリアライズ済みのフレームを配送します。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 送信チャンネルを登録解除（チャンネルが drop されトランスポートが閉じる）
    async fn unregister_client(&self, connection_id: &ConnectionId) -> bool;

    /// 1 つの接続へ送信
    async fn push_to(&self, connection_id: &ConnectionId, content: &str) -> Result<(), DeliveryError>;
}

/// Credential Verifier
///
/// bearer token をユーザー識別情報に解決します。`is_active` の判定は呼び出し側で行います。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthenticationError>;
}

/// Durable Message Store
///
/// 書き込み系の操作は永続化が完了した時点のスナップショットを返します。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create(
        &self,
        author_id: UserId,
        author_name: DisplayName,
        content: MessageContent,
        at: Timestamp,
    ) -> Result<MessageSnapshot, StoreError>;

    async fn update(
        &self,
        id: MessageId,
        content: MessageContent,
        at: Timestamp,
    ) -> Result<MessageSnapshot, StoreError>;

    async fn delete(&self, id: MessageId) -> Result<MessageSnapshot, StoreError>;

    async fn get(&self, id: MessageId) -> Result<Option<MessageSnapshot>, StoreError>;

    /// 最新 `limit` 件を作成順（昇順）で返す
    async fn recent(&self, limit: usize) -> Result<Vec<MessageSnapshot>, StoreError>;
}

/// Shared Cache Tier
///
/// 外部の並行安全なキーバリューストアとして扱います。失敗は致命的ではありません。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CacheTier: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn del(&self, key: &str) -> Result<(), CacheError>;
}
