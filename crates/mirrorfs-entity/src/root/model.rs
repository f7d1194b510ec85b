//! Root entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A top-level namespace, analogous to a drive or bucket name.
///
/// Roots are created lazily whenever any asset or folder references them and
/// destroyed only when the last referencing row is removed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Root {
    /// Surrogate identifier.
    pub id: Uuid,
    /// Unique human identifier (the first display-path segment).
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Who caused the root to come into existence.
    pub created_by: String,
    /// When the root row was created.
    pub created_at: DateTime<Utc>,
}
