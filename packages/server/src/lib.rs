//! Real-time presence and message broadcast core for the Atrium back office.
//!
//! Accepts authenticated WebSocket connections, tracks who is online, fans out
//! chat events to the right connections and keeps the recent-message cache
//! consistent with the message store.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
