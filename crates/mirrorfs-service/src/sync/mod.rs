//! Reconciliation between the remote store and the mirror.

mod service;

pub use service::{SyncOutcome, SyncService};
