//! Locally derived presence roster.

use std::collections::BTreeMap;

use atrium_server::infrastructure::dto::websocket::PresenceDto;

/// Users currently known to be online, keyed by user id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceRoster {
    online: BTreeMap<i64, String>,
}

impl PresenceRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the roster with the snapshot delivered by `session-ready`.
    pub fn seed(&mut self, online: &[PresenceDto]) {
        self.online = online
            .iter()
            .map(|entry| (entry.user_id, entry.display_name.clone()))
            .collect();
    }

    pub fn set_online(&mut self, user_id: i64, display_name: &str) -> bool {
        self.online
            .insert(user_id, display_name.to_string())
            .is_none()
    }

    pub fn set_offline(&mut self, user_id: i64) -> bool {
        self.online.remove(&user_id).is_some()
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.online.contains_key(&user_id)
    }

    pub fn display_name(&self, user_id: i64) -> Option<&str> {
        self.online.get(&user_id).map(String::as_str)
    }

    pub fn users(&self) -> impl Iterator<Item = (i64, &str)> {
        self.online.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn clear(&mut self) {
        self.online.clear();
    }

    pub fn len(&self) -> usize {
        self.online.len()
    }

    pub fn is_empty(&self) -> bool {
        self.online.is_empty()
    }
}
