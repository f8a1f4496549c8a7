//! Presence Tracker
//!
//! Per-user state machine driven by registry transitions:
//! `OFFLINE -> ONLINE` on the first admitted connection, `ONLINE -> OFFLINE`
//! only when the reference count drops back to zero.
//!
//! Pure logic without I/O; the usecase layer owns the lock around it.

use std::collections::HashMap;

use super::{
    entity::{Connection, PresenceEntry},
    error::RegistryConsistencyError,
    value_object::{Timestamp, UserId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceStatus {
    Online,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceTransition {
    CameOnline(PresenceEntry),
    WentOffline(PresenceEntry),
}

#[derive(Debug, Default)]
pub struct PresenceTracker {
    entries: HashMap<UserId, PresenceEntry>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a newly admitted connection.
    ///
    /// Returns `CameOnline` only for the user's first live connection.
    pub fn connection_admitted(&mut self, connection: &Connection) -> Option<PresenceTransition> {
        match self.entries.get_mut(&connection.user_id) {
            Some(entry) => {
                entry.connection_count += 1;
                None
            }
            None => {
                let entry = PresenceEntry {
                    user_id: connection.user_id,
                    display_name: connection.display_name.clone(),
                    connection_count: 1,
                    online_since: connection.admitted_at,
                };
                self.entries.insert(connection.user_id, entry.clone());
                Some(PresenceTransition::CameOnline(entry))
            }
        }
    }

    /// Release one connection of a user.
    ///
    /// Returns `WentOffline` exactly when the last connection goes away.
    pub fn connection_evicted(
        &mut self,
        connection: &Connection,
    ) -> Result<Option<PresenceTransition>, RegistryConsistencyError> {
        let entry = self
            .entries
            .get_mut(&connection.user_id)
            .ok_or(RegistryConsistencyError::MissingPresence(connection.user_id))?;

        entry.connection_count = entry.connection_count.saturating_sub(1);
        if entry.connection_count > 0 {
            return Ok(None);
        }

        // invariant: an entry exists iff count > 0
        let entry = self
            .entries
            .remove(&connection.user_id)
            .ok_or(RegistryConsistencyError::MissingPresence(connection.user_id))?;
        Ok(Some(PresenceTransition::WentOffline(entry)))
    }

    pub fn status(&self, user_id: &UserId) -> PresenceStatus {
        if self.entries.contains_key(user_id) {
            PresenceStatus::Online
        } else {
            PresenceStatus::Offline
        }
    }

    pub fn connection_count(&self, user_id: &UserId) -> usize {
        self.entries
            .get(user_id)
            .map(|entry| entry.connection_count)
            .unwrap_or(0)
    }

    /// Online roster sorted by user id
    pub fn online_users(&self) -> Vec<PresenceEntry> {
        let mut users: Vec<PresenceEntry> = self.entries.values().cloned().collect();
        users.sort_by_key(|entry| entry.user_id);
        users
    }

    /// Earliest time the user has been continuously online, if online
    pub fn online_since(&self, user_id: &UserId) -> Option<Timestamp> {
        self.entries.get(user_id).map(|entry| entry.online_since)
    }
}
