//! InMemory Message Store 実装
//!
//! MessageStore trait の実装。BTreeMap を永続層の代わりに使用します。
//! MessageId は作成順に単調増加で採番されます。

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    DisplayName, MessageContent, MessageId, MessageSnapshot, MessageStore, StoreError, Timestamp,
    UserId,
};

#[derive(Debug, Default)]
struct StoreState {
    next_id: i64,
    messages: BTreeMap<MessageId, MessageSnapshot>,
}

/// インメモリ Message Store 実装
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    state: Mutex<StoreState>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create(
        &self,
        author_id: UserId,
        author_name: DisplayName,
        content: MessageContent,
        at: Timestamp,
    ) -> Result<MessageSnapshot, StoreError> {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let message = MessageSnapshot {
            id: MessageId::new(state.next_id),
            author_id,
            author_name,
            content,
            created_at: at,
            updated_at: at,
            edited: false,
        };
        state.messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn update(
        &self,
        id: MessageId,
        content: MessageContent,
        at: Timestamp,
    ) -> Result<MessageSnapshot, StoreError> {
        let mut state = self.state.lock().await;
        let message = state.messages.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        message.content = content;
        message.updated_at = at.max(message.created_at);
        message.edited = true;
        Ok(message.clone())
    }

    async fn delete(&self, id: MessageId) -> Result<MessageSnapshot, StoreError> {
        let mut state = self.state.lock().await;
        state.messages.remove(&id).ok_or(StoreError::NotFound(id))
    }

    async fn get(&self, id: MessageId) -> Result<Option<MessageSnapshot>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.messages.get(&id).cloned())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<MessageSnapshot>, StoreError> {
        let state = self.state.lock().await;
        let mut recent: Vec<MessageSnapshot> =
            state.messages.values().rev().take(limit).cloned().collect();
        recent.reverse();
        Ok(recent)
    }
}
