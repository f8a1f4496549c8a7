//! Typing-State Machine
//!
//! Per (user, scope): `IDLE -> TYPING` on typing-start, `TYPING -> IDLE` on
//! typing-stop. Idle pairs are not stored. A state older than the inactivity
//! window is treated as idle by `is_typing` and can be swept with
//! `expire_stale`; clients apply the same cutoff on their side.

use std::collections::HashMap;

use super::{
    entity::TypingState,
    value_object::{DisplayName, RoomKey, Timestamp, UserId},
};

/// Default inactivity window (milliseconds)
pub const DEFAULT_TYPING_WINDOW_MILLIS: i64 = 6_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypingTransition {
    /// IDLE -> TYPING
    Started(TypingState),
    /// TYPING -> TYPING with a fresh timestamp (repeated start signal)
    Refreshed(TypingState),
    /// TYPING -> IDLE
    Stopped(TypingState),
}

impl TypingTransition {
    pub fn state(&self) -> &TypingState {
        match self {
            TypingTransition::Started(state)
            | TypingTransition::Refreshed(state)
            | TypingTransition::Stopped(state) => state,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TypingKey {
    user_id: UserId,
    scope: RoomKey,
}

#[derive(Debug)]
pub struct TypingStateMachine {
    window_millis: i64,
    states: HashMap<TypingKey, TypingState>,
}

impl Default for TypingStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_WINDOW_MILLIS)
    }
}

impl TypingStateMachine {
    pub fn new(window_millis: i64) -> Self {
        Self {
            window_millis,
            states: HashMap::new(),
        }
    }

    pub fn window_millis(&self) -> i64 {
        self.window_millis
    }

    pub fn start(
        &mut self,
        user_id: UserId,
        display_name: DisplayName,
        scope: RoomKey,
        now: Timestamp,
    ) -> TypingTransition {
        let key = TypingKey { user_id, scope };
        let was_active = self
            .states
            .get(&key)
            .is_some_and(|state| !state.is_stale(now, self.window_millis));

        let state = TypingState {
            user_id,
            display_name,
            scope,
            is_typing: true,
            last_set_at: now,
        };
        self.states.insert(key, state.clone());

        if was_active {
            TypingTransition::Refreshed(state)
        } else {
            TypingTransition::Started(state)
        }
    }

    /// Explicit stop. `None` when the pair was already idle.
    pub fn stop(&mut self, user_id: UserId, scope: RoomKey, now: Timestamp) -> Option<TypingTransition> {
        self.states
            .remove(&TypingKey { user_id, scope })
            .map(|state| Self::stopped(state, now))
    }

    /// Clear every scope of a user (new message from them, or their last connection closed).
    pub fn clear_user(&mut self, user_id: UserId, now: Timestamp) -> Vec<TypingTransition> {
        let keys: Vec<TypingKey> = self
            .states
            .keys()
            .filter(|key| key.user_id == user_id)
            .copied()
            .collect();
        keys.into_iter()
            .filter_map(|key| self.states.remove(&key))
            .map(|state| Self::stopped(state, now))
            .collect()
    }

    /// Remove states that outlived the inactivity window.
    pub fn expire_stale(&mut self, now: Timestamp) -> Vec<TypingTransition> {
        let window = self.window_millis;
        let stale: Vec<TypingKey> = self
            .states
            .iter()
            .filter(|(_, state)| state.is_stale(now, window))
            .map(|(key, _)| *key)
            .collect();
        let mut expired: Vec<TypingTransition> = stale
            .into_iter()
            .filter_map(|key| self.states.remove(&key))
            .map(|state| Self::stopped(state, now))
            .collect();
        expired.sort_by_key(|transition| transition.state().user_id);
        expired
    }

    pub fn is_typing(&self, user_id: UserId, scope: RoomKey, now: Timestamp) -> bool {
        self.states
            .get(&TypingKey { user_id, scope })
            .is_some_and(|state| !state.is_stale(now, self.window_millis))
    }

    /// Non-stale typing states, sorted by user id
    pub fn active(&self, now: Timestamp) -> Vec<TypingState> {
        let mut active: Vec<TypingState> = self
            .states
            .values()
            .filter(|state| !state.is_stale(now, self.window_millis))
            .cloned()
            .collect();
        active.sort_by_key(|state| state.user_id);
        active
    }

    fn stopped(mut state: TypingState, now: Timestamp) -> TypingTransition {
        state.is_typing = false;
        state.last_set_at = now;
        TypingTransition::Stopped(state)
    }
}
