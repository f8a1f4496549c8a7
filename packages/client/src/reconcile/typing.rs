//! Active-typing set with a local inactivity cutoff.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TypingEntry {
    display_name: String,
    since: i64,
}

/// Users other than ourselves who are typing.
///
/// An entry older than `window_millis` is not reported as active even if the
/// matching `typing-changed{false}` never arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingIndicators {
    window_millis: i64,
    entries: BTreeMap<i64, TypingEntry>,
}

impl TypingIndicators {
    pub fn new(window_millis: i64) -> Self {
        Self {
            window_millis,
            entries: BTreeMap::new(),
        }
    }

    /// Apply a `typing-changed` event. Returns `true` if the set changed.
    pub fn apply(&mut self, user_id: i64, display_name: &str, is_typing: bool, at: i64) -> bool {
        if !is_typing {
            return self.entries.remove(&user_id).is_some();
        }
        match self.entries.get_mut(&user_id) {
            Some(entry) if entry.since >= at => false,
            Some(entry) => {
                entry.since = at;
                false
            }
            None => {
                self.entries.insert(
                    user_id,
                    TypingEntry {
                        display_name: display_name.to_string(),
                        since: at,
                    },
                );
                true
            }
        }
    }

    pub fn clear_user(&mut self, user_id: i64) -> bool {
        self.entries.remove(&user_id).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Users still inside the inactivity window at `now`.
    pub fn active(&self, now: i64) -> Vec<(i64, String)> {
        self.entries
            .iter()
            .filter(|(_, entry)| now - entry.since < self.window_millis)
            .map(|(user_id, entry)| (*user_id, entry.display_name.clone()))
            .collect()
    }

    pub fn is_typing(&self, user_id: i64, now: i64) -> bool {
        self.entries
            .get(&user_id)
            .is_some_and(|entry| now - entry.since < self.window_millis)
    }
}
