//! UseCase: オンライン一覧の取得

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{PresenceEntry, PresenceStatus, PresenceTracker, UserId};

pub struct GetPresenceUseCase {
    presence: Arc<Mutex<PresenceTracker>>,
}

impl GetPresenceUseCase {
    pub fn new(presence: Arc<Mutex<PresenceTracker>>) -> Self {
        Self { presence }
    }

    /// オンラインのユーザー一覧（ユーザー ID 順）
    pub async fn execute(&self) -> Vec<PresenceEntry> {
        self.presence.lock().await.online_users()
    }

    pub async fn status(&self, user_id: UserId) -> PresenceStatus {
        self.presence.lock().await.status(&user_id)
    }

    pub async fn connection_count(&self, user_id: UserId) -> usize {
        self.presence.lock().await.connection_count(&user_id)
    }
}
