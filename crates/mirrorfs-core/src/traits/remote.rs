//! Remote object store trait and its wire types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::result::AppResult;

/// An object as reported by the remote store's list endpoint.
///
/// Listing alone carries no richer metadata than what the remote store
/// chooses to expose; absent fields stay `None` and the mirror must never
/// let them clobber previously known values.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RemoteObject {
    /// Flat key of the object.
    pub key: String,
    /// Size in bytes, if reported.
    pub size_bytes: Option<i64>,
    /// MIME type, if reported.
    pub mime_type: Option<String>,
    /// Pixel width for images, if reported.
    pub width: Option<i32>,
    /// Pixel height for images, if reported.
    pub height: Option<i32>,
    /// When the object was uploaded, if reported.
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// A granted upload intent for a new object key.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UploadIntent {
    /// The key the intent was granted for.
    pub key: String,
    /// URL the caller uploads the object body to.
    pub upload_url: String,
}

/// Trait for the remote flat-key object store.
///
/// The concrete client lives in `mirrorfs-remote`; the trait is defined here
/// so services receive it as an explicit injected dependency (constructed
/// once at process start, passed by reference, no hidden statics) and tests
/// can substitute in-process fakes.
#[async_trait]
pub trait RemoteStore: Send + Sync + std::fmt::Debug + 'static {
    /// List every object, optionally scoped to a key prefix, following the
    /// continuation cursor until exhausted or `max` objects accumulated.
    async fn list_all(&self, prefix: Option<&str>, max: usize) -> AppResult<Vec<RemoteObject>>;

    /// Delete an object by key. Remote "not found" is success; the returned
    /// bool reports whether the object actually existed.
    async fn delete_by_key(&self, key: &str) -> AppResult<bool>;

    /// Ask the remote store for an upload intent for `key`. A duplicate key
    /// surfaces as a conflict error.
    async fn create_upload_intent(&self, key: &str) -> AppResult<UploadIntent>;
}
