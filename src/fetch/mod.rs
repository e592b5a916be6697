//! Remote dataset retrieval.

pub mod client;

// Re-export main types
pub use client::FetchClient;
