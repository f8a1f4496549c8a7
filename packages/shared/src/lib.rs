//! Utilities shared by the Atrium server and client.

pub mod logger;
pub mod time;
