//! Infrastructure layer: concrete implementations of the domain collaborator traits
//! and the wire DTOs.

pub mod auth;
pub mod cache;
pub mod dto;
pub mod message_pusher;
pub mod repository;
