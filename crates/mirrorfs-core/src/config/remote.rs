//! Remote object store API configuration.

use serde::{Deserialize, Serialize};

/// Settings for the remote object store HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteStoreConfig {
    /// Base URL of the remote store API.
    pub base_url: String,
    /// Bearer token used for authentication.
    pub api_token: String,
    /// Maximum number of attempts per logical request (first try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for exponential backoff, in milliseconds.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Page size requested from the list endpoint.
    #[serde(default = "default_list_page_size")]
    pub list_page_size: usize,
    /// Safety cap on the number of objects accumulated by a full listing.
    #[serde(default = "default_list_max")]
    pub list_max: usize,
}

fn default_max_attempts() -> u32 {
    4
}

fn default_retry_base_ms() -> u64 {
    400
}

fn default_timeout() -> u64 {
    30
}

fn default_list_page_size() -> usize {
    1000
}

fn default_list_max() -> usize {
    10_000
}
