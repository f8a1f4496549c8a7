//! UseCase: 入力中（typing）状態
//!
//! 各遷移は直ちに scope `all` の typing-changed として発行されます。
//! サーバー側の期限切れ（`sweep`）は追加の安全策で、クライアント側の
//! 非アクティブ判定は引き続き必要です。

use std::sync::Arc;

use atrium_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    BroadcastEvent, Connection, RoomKey, Timestamp, TypingStateMachine, TypingTransition, UserId,
};

use super::broadcast::BroadcastRouter;

/// 入力中状態のユースケース
pub struct TypingUseCase {
    machine: Arc<Mutex<TypingStateMachine>>,
    router: Arc<BroadcastRouter>,
    clock: Arc<dyn Clock>,
}

impl TypingUseCase {
    pub fn new(
        machine: Arc<Mutex<TypingStateMachine>>,
        router: Arc<BroadcastRouter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            machine,
            router,
            clock,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// typing-start: 繰り返しの start も新しい時刻で typing-changed{true} を発行する
    pub async fn start(&self, connection: &Connection) {
        let now = self.now();
        let mut machine = self.machine.lock().await;
        let transition = machine.start(
            connection.user_id,
            connection.display_name.clone(),
            RoomKey::All,
            now,
        );
        if let TypingTransition::Refreshed(state) = &transition {
            tracing::trace!("Typing refreshed for user {}", state.user_id);
        }
        self.emit(&transition, now).await;
    }

    /// typing-stop: 入力中でなければ何も発行しない
    pub async fn stop(&self, connection: &Connection) {
        let now = self.now();
        let mut machine = self.machine.lock().await;
        if let Some(transition) = machine.stop(connection.user_id, RoomKey::All, now) {
            self.emit(&transition, now).await;
        }
    }

    /// ユーザーの全ての入力中状態を解除（新しいメッセージ、最後の接続の切断）
    pub async fn clear_user(&self, user_id: UserId) {
        let now = self.now();
        let mut machine = self.machine.lock().await;
        for transition in machine.clear_user(user_id, now) {
            self.emit(&transition, now).await;
        }
    }

    /// 非アクティブ期間を過ぎた入力中状態を解除し、解除した数を返す
    pub async fn sweep(&self) -> usize {
        let now = self.now();
        let mut machine = self.machine.lock().await;
        let expired = machine.expire_stale(now);
        for transition in &expired {
            tracing::debug!("Typing of user {} expired", transition.state().user_id);
            self.emit(transition, now).await;
        }
        expired.len()
    }

    pub async fn is_typing(&self, user_id: UserId) -> bool {
        let now = self.now();
        self.machine
            .lock()
            .await
            .is_typing(user_id, RoomKey::All, now)
    }

    async fn emit(&self, transition: &TypingTransition, now: Timestamp) {
        self.router
            .publish(BroadcastEvent::typing_changed(transition.state(), now))
            .await;
    }
}
