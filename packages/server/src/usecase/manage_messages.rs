//! UseCase: メッセージコマンド（作成・編集・削除・最新一覧）
//!
//! 書き込みは「永続化 → 最新一覧キャッシュの無効化 → publish」の順で行い、
//! この 3 段階を 1 つのロックで直列化します。これにより同じメッセージ ID の
//! created / updated / deleted は書き込み順に publish されます。
//!
//! 読み出しは共有キャッシュの read-through で、キャッシュのミスや障害は
//! メッセージストアへのフォールバックで吸収します。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ManageMessagesUseCase の create / update / delete / recent
//!
//! ### なぜこのテストが必要か
//! - 永続化の後にだけイベントが発行されることを保証
//! - キャッシュ障害がメッセージの読み出しを妨げないことを確認
//! - 作成者・管理者以外は編集・削除できないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：作成 → 編集 → 削除のイベント順序
//! - 異常系：ストア障害（イベントは発行されない）、キャッシュ障害、権限なし
//! - エッジケース：存在しない ID の編集

use std::{sync::Arc, time::Duration};

use atrium_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    config::ServerConfig,
    domain::{
        BroadcastEvent, CacheTier, Identity, MessageContent, MessageId, MessageSnapshot,
        MessageStore, Timestamp,
    },
};

use super::{broadcast::BroadcastRouter, error::MessageCommandError, typing::TypingUseCase};

/// Cache key of the recent-message list
pub const RECENT_MESSAGES_CACHE_KEY: &str = "messages:recent";

pub struct ManageMessagesUseCase {
    /// MessageStore（system of record）
    store: Arc<dyn MessageStore>,
    /// CacheTier（最新一覧の read-through キャッシュ）
    cache: Arc<dyn CacheTier>,
    router: Arc<BroadcastRouter>,
    typing: Arc<TypingUseCase>,
    clock: Arc<dyn Clock>,
    recent_limit: usize,
    recent_ttl: Duration,
    /// 書き込み（と キャッシュの再充填）の直列化
    write_lock: Mutex<()>,
}

impl ManageMessagesUseCase {
    pub fn new(
        store: Arc<dyn MessageStore>,
        cache: Arc<dyn CacheTier>,
        router: Arc<BroadcastRouter>,
        typing: Arc<TypingUseCase>,
        clock: Arc<dyn Clock>,
        config: &ServerConfig,
    ) -> Self {
        Self {
            store,
            cache,
            router,
            typing,
            clock,
            recent_limit: config.recent_limit,
            recent_ttl: config.recent_cache_ttl,
            write_lock: Mutex::new(()),
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// メッセージを作成し、message-created を発行する
    ///
    /// 作成者の入力中状態は新しいメッセージで置き換えられるため解除します。
    pub async fn create(
        &self,
        author: &Identity,
        content: String,
    ) -> Result<MessageSnapshot, MessageCommandError> {
        let content = MessageContent::new(content)?;

        let snapshot = {
            let _guard = self.write_lock.lock().await;
            let now = self.now();
            let snapshot = self
                .store
                .create(author.user_id, author.display_name.clone(), content, now)
                .await?;
            self.invalidate_recent().await;
            self.router
                .publish(BroadcastEvent::message_created(snapshot.clone(), now))
                .await;
            snapshot
        };
        tracing::info!("Message {} created by user {}", snapshot.id, author.user_id);

        self.typing.clear_user(author.user_id).await;
        Ok(snapshot)
    }

    /// メッセージを編集し、message-updated を発行する（作成者または管理者のみ）
    pub async fn update(
        &self,
        actor: &Identity,
        id: MessageId,
        content: String,
    ) -> Result<MessageSnapshot, MessageCommandError> {
        let content = MessageContent::new(content)?;

        let _guard = self.write_lock.lock().await;
        self.authorize(actor, id).await?;
        let now = self.now();
        let snapshot = self.store.update(id, content, now).await?;
        self.invalidate_recent().await;
        self.router
            .publish(BroadcastEvent::message_updated(snapshot.clone(), now))
            .await;

        tracing::info!("Message {} updated by user {}", id, actor.user_id);
        Ok(snapshot)
    }

    /// メッセージを削除し、message-deleted を発行する（作成者または管理者のみ）
    pub async fn delete(
        &self,
        actor: &Identity,
        id: MessageId,
    ) -> Result<MessageSnapshot, MessageCommandError> {
        let _guard = self.write_lock.lock().await;
        self.authorize(actor, id).await?;
        let now = self.now();
        let snapshot = self.store.delete(id).await?;
        self.invalidate_recent().await;
        self.router
            .publish(BroadcastEvent::message_deleted(snapshot.clone(), now))
            .await;

        tracing::info!("Message {} deleted by user {}", id, actor.user_id);
        Ok(snapshot)
    }

    /// 最新 `limit` 件を作成順で返す（`limit` は設定の上限で切り詰める）
    pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<MessageSnapshot>, MessageCommandError> {
        let limit = limit.unwrap_or(self.recent_limit).clamp(1, self.recent_limit);

        if let Some(cached) = self.cached_recent().await {
            return Ok(tail(cached, limit));
        }

        // refill under the write lock so a concurrent write cannot be shadowed by a stale fill
        let messages = {
            let _guard = self.write_lock.lock().await;
            let messages = self.store.recent(self.recent_limit).await?;
            match serde_json::to_string(&messages) {
                Ok(blob) => {
                    if let Err(e) = self
                        .cache
                        .set(RECENT_MESSAGES_CACHE_KEY, blob, self.recent_ttl)
                        .await
                    {
                        tracing::warn!("Failed to fill recent-message cache: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Failed to encode recent messages: {}", e),
            }
            messages
        };
        Ok(tail(messages, limit))
    }

    async fn authorize(&self, actor: &Identity, id: MessageId) -> Result<(), MessageCommandError> {
        let existing = self
            .store
            .get(id)
            .await?
            .ok_or(MessageCommandError::NotFound(id))?;
        if existing.author_id != actor.user_id && !actor.is_admin {
            return Err(MessageCommandError::Forbidden(id));
        }
        Ok(())
    }

    async fn cached_recent(&self) -> Option<Vec<MessageSnapshot>> {
        match self.cache.get(RECENT_MESSAGES_CACHE_KEY).await {
            Ok(Some(blob)) => match serde_json::from_str(&blob) {
                Ok(messages) => Some(messages),
                Err(e) => {
                    tracing::warn!("Discarding undecodable recent-message cache: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Recent-message cache unavailable, reading store: {}", e);
                None
            }
        }
    }

    async fn invalidate_recent(&self) {
        if let Err(e) = self.cache.del(RECENT_MESSAGES_CACHE_KEY).await {
            tracing::warn!("Failed to invalidate recent-message cache: {}", e);
        }
    }
}

fn tail(mut messages: Vec<MessageSnapshot>, limit: usize) -> Vec<MessageSnapshot> {
    if messages.len() > limit {
        messages.drain(..messages.len() - limit);
    }
    messages
}
