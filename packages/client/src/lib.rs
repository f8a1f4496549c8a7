//! Terminal client for the Atrium real-time core.
//!
//! Keeps a reconciled local view of messages, presence and typing state, and
//! resynchronizes it after every reconnect.

mod api;
mod command;
mod domain;
mod formatter;
mod runner;
mod session;
mod ui;

pub mod error;
pub mod reconcile;

pub use api::ApiClient;
pub use runner::{ClientOptions, run_client};
