//! Shared Cache Tier implementations.

pub mod inmemory;

pub use inmemory::InMemoryCacheTier;
