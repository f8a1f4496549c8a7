//! Data Transfer Objects (DTOs) for the real-time core.
//!
//! DTOs are organized by protocol:
//! - `websocket`: inbound client signals and outbound server events
//! - `http`: HTTP API request / response bodies

pub mod conversion;
pub mod http;
pub mod websocket;
