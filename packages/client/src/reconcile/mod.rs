//! Client reconciliation layer.
//!
//! Folds server events into a local message view, presence roster and typing
//! set. Every event is applied idempotently, so duplicates and replays after a
//! reconnect leave the state unchanged.

mod message_view;
mod roster;
mod typing;

pub use message_view::ClientMessageView;
pub use roster::PresenceRoster;
pub use typing::TypingIndicators;

use atrium_server::infrastructure::dto::websocket::{MessageDto, ServerEvent, UserDto};

/// Everything the terminal client knows about the shared room.
#[derive(Debug, Clone)]
pub struct ClientState {
    me: Option<UserDto>,
    connection_id: Option<String>,
    messages: ClientMessageView,
    roster: PresenceRoster,
    typing: TypingIndicators,
}

impl ClientState {
    pub fn new(typing_window_millis: i64) -> Self {
        Self {
            me: None,
            connection_id: None,
            messages: ClientMessageView::new(),
            roster: PresenceRoster::new(),
            typing: TypingIndicators::new(typing_window_millis),
        }
    }

    /// Drop everything that cannot be trusted across a transport gap.
    ///
    /// Presence and typing are deltas with no replay, so they are rebuilt from
    /// the next `session-ready`. Message history is kept.
    pub fn begin_reconnect(&mut self) {
        self.connection_id = None;
        self.roster.clear();
        self.typing.clear();
    }

    /// Apply one server event. Returns `true` if local state changed.
    pub fn apply(&mut self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::SessionReady {
                connection_id,
                user,
                online,
            } => {
                self.me = Some(user.clone());
                self.connection_id = Some(connection_id.clone());
                self.roster.seed(online);
                true
            }
            ServerEvent::MessageCreated { message } => {
                let typing_cleared = self.typing.clear_user(message.author_id);
                self.messages.apply_created(message.clone()) || typing_cleared
            }
            ServerEvent::MessageUpdated { message } => self.messages.apply_updated(message.clone()),
            ServerEvent::MessageDeleted { message } => self.messages.apply_deleted(message.id),
            ServerEvent::PresenceOnline {
                user_id,
                display_name,
                ..
            } => self.roster.set_online(*user_id, display_name),
            ServerEvent::PresenceOffline { user_id, .. } => {
                let typing_cleared = self.typing.clear_user(*user_id);
                self.roster.set_offline(*user_id) || typing_cleared
            }
            ServerEvent::TypingChanged {
                user_id,
                display_name,
                is_typing,
                at,
            } => {
                if self.is_me(*user_id) {
                    return false;
                }
                self.typing.apply(*user_id, display_name, *is_typing, *at)
            }
            ServerEvent::Ack { .. } | ServerEvent::PrivateMessage { .. } => false,
        }
    }

    /// Merge a history page fetched over HTTP.
    pub fn merge_history(&mut self, history: Vec<MessageDto>) -> usize {
        self.messages.merge_history(history)
    }

    pub fn is_me(&self, user_id: i64) -> bool {
        self.me.as_ref().is_some_and(|me| me.user_id == user_id)
    }

    pub fn me(&self) -> Option<&UserDto> {
        self.me.as_ref()
    }

    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }

    pub fn messages(&self) -> &ClientMessageView {
        &self.messages
    }

    pub fn roster(&self) -> &PresenceRoster {
        &self.roster
    }

    /// Other users typing at `now`, after the local inactivity cutoff.
    pub fn active_typing(&self, now: i64) -> Vec<(i64, String)> {
        self.typing.active(now)
    }
}
