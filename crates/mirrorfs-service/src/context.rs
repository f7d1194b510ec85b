//! Request context carrying the acting identity.
//!
//! Authorization happens before the core is reached; every mutating
//! operation trusts that the caller already passed the gate and only needs
//! to know *who* is acting, for lazily created rows and audit logs.

use serde::{Deserialize, Serialize};

/// Context for the current request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting identity, as established by the caller's auth layer.
    pub actor: String,
}

impl RequestContext {
    /// Create a context for a named actor.
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
        }
    }

    /// Context for internally triggered work (scheduled syncs, CLI).
    pub fn system() -> Self {
        Self::new("system")
    }
}
