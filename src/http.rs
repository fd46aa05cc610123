//! HTTP helpers for key set retrieval.

pub mod client;
pub mod transport;
