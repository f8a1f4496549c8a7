//! Local materialized list of messages.

use std::collections::{BTreeMap, HashSet};

use atrium_server::infrastructure::dto::websocket::MessageDto;

/// Messages unique by id, ordered by the server-assigned id (creation order).
///
/// Deleted ids are remembered so a late `message-created` replay or a history
/// page fetched before the delete cannot bring them back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMessageView {
    messages: BTreeMap<i64, MessageDto>,
    tombstones: HashSet<i64>,
}

impl ClientMessageView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new message. Returns `false` when the id is already present or deleted.
    pub fn apply_created(&mut self, message: MessageDto) -> bool {
        if self.tombstones.contains(&message.id) || self.messages.contains_key(&message.id) {
            return false;
        }
        self.messages.insert(message.id, message);
        true
    }

    /// Replace a known message. Unknown ids and stale snapshots are ignored.
    pub fn apply_updated(&mut self, message: MessageDto) -> bool {
        match self.messages.get_mut(&message.id) {
            Some(local) if message.updated_at >= local.updated_at => {
                if *local == message {
                    return false;
                }
                *local = message;
                true
            }
            _ => false,
        }
    }

    /// Remove a message and tombstone its id. Returns `false` if it was not present.
    pub fn apply_deleted(&mut self, id: i64) -> bool {
        self.tombstones.insert(id);
        self.messages.remove(&id).is_some()
    }

    /// Merge a history page fetched over HTTP. Applying the same page twice is a no-op.
    pub fn merge_history(&mut self, history: Vec<MessageDto>) -> usize {
        let mut changed = 0;
        for message in history {
            if self.tombstones.contains(&message.id) {
                continue;
            }
            let applied = if self.messages.contains_key(&message.id) {
                self.apply_updated(message)
            } else {
                self.apply_created(message)
            };
            if applied {
                changed += 1;
            }
        }
        changed
    }

    pub fn get(&self, id: i64) -> Option<&MessageDto> {
        self.messages.get(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.messages.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageDto> {
        self.messages.values()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: i64, content: &str, updated_at: i64) -> MessageDto {
        MessageDto {
            id,
            author_id: 1,
            author_name: "alice".to_string(),
            content: content.to_string(),
            created_at: 1_000 + id,
            updated_at,
            edited: updated_at != 1_000 + id,
        }
    }

    #[test]
    fn test_apply_created_twice_is_idempotent() {
        // テスト項目: 同じ message-created を 2 回適用しても 1 回適用した結果と同じになる
        // given (前提条件):
        let mut once = ClientMessageView::new();
        once.apply_created(message(1, "hello", 1_001));
        let mut twice = once.clone();

        // when (操作):
        let applied = twice.apply_created(message(1, "hello", 1_001));

        // then (期待する結果):
        assert!(!applied);
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_created_updated_deleted_leaves_message_absent() {
        // テスト項目: created → updated → deleted の順で適用すると最終的にメッセージは存在しない
        // given (前提条件):
        let mut view = ClientMessageView::new();

        // when (操作):
        view.apply_created(message(1, "draft", 1_001));
        view.apply_updated(message(1, "final", 2_000));
        view.apply_deleted(1);

        // then (期待する結果):
        assert!(!view.contains(1));
        assert!(view.is_empty());
    }

    #[test]
    fn test_update_and_delete_for_unknown_id_are_noops() {
        // テスト項目: 未知の id に対する updated / deleted は何も変更しない
        // given (前提条件):
        let mut view = ClientMessageView::new();
        view.apply_created(message(1, "hello", 1_001));

        // when (操作):
        let updated = view.apply_updated(message(2, "ghost", 3_000));
        let deleted = view.apply_deleted(3);

        // then (期待する結果):
        assert!(!updated);
        assert!(!deleted);
        assert_eq!(view.len(), 1);
        assert_eq!(view.get(1).unwrap().content, "hello");
    }

    #[test]
    fn test_update_before_create_is_not_applied() {
        // テスト項目: created より先に届いた updated は適用されず、後の created が採用される
        // given (前提条件):
        let mut view = ClientMessageView::new();

        // when (操作):
        view.apply_updated(message(1, "edited", 2_000));
        view.apply_created(message(1, "original", 1_001));

        // then (期待する結果):
        assert_eq!(view.get(1).unwrap().content, "original");
    }

    #[test]
    fn test_stale_update_is_ignored() {
        // テスト項目: ローカルより古い updated は無視される
        // given (前提条件):
        let mut view = ClientMessageView::new();
        view.apply_created(message(1, "v1", 1_001));
        view.apply_updated(message(1, "v3", 3_000));

        // when (操作):
        let applied = view.apply_updated(message(1, "v2", 2_000));

        // then (期待する結果):
        assert!(!applied);
        assert_eq!(view.get(1).unwrap().content, "v3");
    }

    #[test]
    fn test_deleted_message_is_not_resurrected() {
        // テスト項目: 削除済みの id は created の再送や履歴のマージで復活しない
        // given (前提条件):
        let mut view = ClientMessageView::new();
        view.apply_created(message(1, "hello", 1_001));
        view.apply_deleted(1);

        // when (操作):
        let replayed = view.apply_created(message(1, "hello", 1_001));
        let merged = view.merge_history(vec![message(1, "hello", 1_001)]);

        // then (期待する結果):
        assert!(!replayed);
        assert_eq!(merged, 0);
        assert!(view.is_empty());
    }

    #[test]
    fn test_merge_history_is_idempotent_and_ordered() {
        // テスト項目: 履歴のマージは冪等で、id 順に並ぶ
        // given (前提条件):
        let mut view = ClientMessageView::new();
        view.apply_created(message(2, "second", 1_002));
        let page = vec![message(1, "first", 1_001), message(2, "second", 1_002), message(3, "third", 1_003)];

        // when (操作):
        let first = view.merge_history(page.clone());
        let snapshot = view.clone();
        let second = view.merge_history(page);

        // then (期待する結果):
        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(view, snapshot);
        let ids: Vec<i64> = view.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_merge_history_takes_newer_edit() {
        // テスト項目: 履歴に含まれる新しい編集はローカルのコピーを置き換える
        // given (前提条件):
        let mut view = ClientMessageView::new();
        view.apply_created(message(1, "before", 1_001));

        // when (操作):
        let changed = view.merge_history(vec![message(1, "after", 5_000)]);

        // then (期待する結果):
        assert_eq!(changed, 1);
        assert_eq!(view.get(1).unwrap().content, "after");
        assert!(view.get(1).unwrap().edited);
    }
}
