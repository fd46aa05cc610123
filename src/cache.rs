//! Key set caching and refresh coordination.

pub mod coordinator;
pub mod entry;
pub mod store;
