//! # mirrorfs-remote
//!
//! HTTP client for the remote flat-key object store: bearer authentication,
//! retry with exponential backoff and `Retry-After` handling, cursor-based
//! full listings, and idempotent delete.

mod client;
mod error;
mod retry;

pub use client::RemoteClient;
pub use error::{codes, RemoteApiError};
