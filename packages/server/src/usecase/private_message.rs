//! UseCase: プライベートメッセージ
//!
//! 宛先ユーザーの `user:<id>` ルームにだけ配送します。宛先にライブ接続が
//! なければ黙って破棄されます（保存して後で配送することはしません）。

use std::sync::Arc;

use atrium_shared::time::Clock;

use crate::domain::{BroadcastEvent, Connection, MessageContent, Timestamp, UserId};

use super::{broadcast::BroadcastRouter, error::PrivateMessageError};

pub struct PrivateMessageUseCase {
    router: Arc<BroadcastRouter>,
    clock: Arc<dyn Clock>,
}

impl PrivateMessageUseCase {
    pub fn new(router: Arc<BroadcastRouter>, clock: Arc<dyn Clock>) -> Self {
        Self { router, clock }
    }

    /// # Errors
    ///
    /// 宛先のユーザー ID または本文が不正な場合のみ。配送の成否は返しません。
    pub async fn execute(
        &self,
        from: &Connection,
        target_user_id: i64,
        body: String,
    ) -> Result<(), PrivateMessageError> {
        let to = UserId::new(target_user_id)?;
        let body = MessageContent::new(body)?;
        let now = Timestamp::new(self.clock.now_millis());

        tracing::debug!("Private message from user {} to user {}", from.user_id, to);
        self.router
            .publish(BroadcastEvent::private_message(from, to, body, now))
            .await;
        Ok(())
    }
}
