//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{
    create_message, delete_message, evict_user_connections, get_presence, health_check,
    list_messages, update_message,
};
pub use websocket::websocket_handler;
