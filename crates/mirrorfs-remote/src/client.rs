//! The remote store HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use mirrorfs_core::config::RemoteStoreConfig;
use mirrorfs_core::error::{AppError, ErrorKind};
use mirrorfs_core::result::AppResult;
use mirrorfs_core::traits::remote::{RemoteObject, RemoteStore, UploadIntent};

use crate::error::{codes, RemoteApiError};
use crate::retry;

/// Response header carrying the correlation id.
const CORRELATION_HEADER: &str = "x-request-id";

/// Characters of the response body kept in failure logs.
const BODY_PREVIEW_CHARS: usize = 200;

/// Authenticated client for the remote object store API.
///
/// Every response body carries `success: bool`; anything else (non-2xx,
/// unparsable bodies, `success != true`) is a failure. Transient statuses
/// are retried with exponential backoff before a structured
/// [`RemoteApiError`] is surfaced.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    config: RemoteStoreConfig,
}

impl RemoteClient {
    /// Create a new client from configuration.
    pub fn new(config: RemoteStoreConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;
        Ok(Self { http, config })
    }

    /// Issue an authenticated request, retrying transient failures, and
    /// return the parsed JSON body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> AppResult<Value> {
        self.execute(method, path, query, body)
            .await
            .map_err(AppError::from)
    }

    /// Retry loop around one logical request. Retries are sequential; the
    /// backoff sleep blocks only this request.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, RemoteApiError> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let max_attempts = self.config.max_attempts.max(1);
        let base = Duration::from_millis(self.config.retry_base_ms);

        let mut attempt = 1u32;
        loop {
            let mut request = self
                .http
                .request(method.clone(), url.as_str())
                .bearer_auth(&self.config.api_token);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(json) = body {
                request = request.json(json);
            }

            let error = match request.send().await {
                Ok(response) => match self.read_response(response).await {
                    Ok(json) => return Ok(json),
                    Err(err) => err,
                },
                Err(err) => RemoteApiError {
                    status: 0,
                    code: codes::TRANSPORT.to_string(),
                    message: format!("Request to {url} failed: {err}"),
                    correlation_id: None,
                    retry_after_seconds: None,
                },
            };

            let retryable = error.status == 0 || retry::is_retryable_status(error.status);
            if !retryable || attempt >= max_attempts {
                return Err(error);
            }

            let delay = match (error.status, error.retry_after_seconds) {
                (429, Some(seconds)) => Duration::from_secs(seconds),
                _ => retry::backoff_delay(attempt, base),
            };
            debug!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                status = error.status,
                "Retrying remote store request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Interpret one HTTP response. Anything other than a parsable body with
    /// `success: true` is an error.
    async fn read_response(&self, response: reqwest::Response) -> Result<Value, RemoteApiError> {
        let status = response.status().as_u16();
        let correlation_id = response
            .headers()
            .get(CORRELATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let retry_after_seconds = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| retry::parse_retry_after(v, Utc::now()));

        let text = response.text().await.unwrap_or_default();
        let json: Option<Value> = serde_json::from_str(&text).ok();

        let json = match json {
            Some(parsed) if parsed.get("success").and_then(Value::as_bool) == Some(true) => {
                return Ok(parsed);
            }
            other => other,
        };

        let (code, message) = match &json {
            Some(parsed) => {
                let first = parsed.get("errors").and_then(|e| e.get(0));
                (
                    first
                        .and_then(|e| e.get("code"))
                        .and_then(Value::as_str)
                        .unwrap_or(codes::UNKNOWN)
                        .to_string(),
                    first
                        .and_then(|e| e.get("message"))
                        .and_then(Value::as_str)
                        .unwrap_or("remote store reported failure")
                        .to_string(),
                )
            }
            None => (
                codes::UNKNOWN.to_string(),
                "response body was not valid JSON".to_string(),
            ),
        };

        warn!(
            status,
            code = %code,
            correlation_id = correlation_id.as_deref().unwrap_or("-"),
            token = %mask_token(&self.config.api_token),
            body_preview = %preview(&text),
            "Remote store request failed"
        );

        Err(RemoteApiError {
            status,
            code,
            message,
            correlation_id,
            retry_after_seconds,
        })
    }
}

#[async_trait]
impl RemoteStore for RemoteClient {
    async fn list_all(&self, prefix: Option<&str>, max: usize) -> AppResult<Vec<RemoteObject>> {
        let mut objects: Vec<RemoteObject> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let remaining = max.saturating_sub(objects.len());
            if remaining == 0 {
                break;
            }
            let limit = self.config.list_page_size.min(remaining).max(1);

            let mut query: Vec<(&str, String)> = vec![("limit", limit.to_string())];
            if let Some(p) = prefix {
                query.push(("prefix", p.to_string()));
            }
            if let Some(c) = &cursor {
                query.push(("cursor", c.clone()));
            }

            let json = self.request(Method::GET, "objects", &query, None).await?;
            let page: ListPage =
                serde_json::from_value(json.get("result").cloned().unwrap_or_default())?;

            objects.extend(page.objects.into_iter().map(RemoteObject::from));

            match (page.truncated, page.cursor) {
                (true, Some(next)) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        objects.truncate(max);
        Ok(objects)
    }

    async fn delete_by_key(&self, key: &str) -> AppResult<bool> {
        let query = [("key", key.to_string())];
        match self.execute(Method::DELETE, "objects", &query, None).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => {
                debug!(key, "Remote object already absent");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn create_upload_intent(&self, key: &str) -> AppResult<UploadIntent> {
        let body = serde_json::json!({ "key": key });
        match self.execute(Method::POST, "uploads", &[], Some(&body)).await {
            Ok(json) => {
                let result: UploadIntentDto =
                    serde_json::from_value(json.get("result").cloned().unwrap_or_default())?;
                Ok(UploadIntent {
                    key: result.key,
                    upload_url: result.upload_url,
                })
            }
            Err(err) if err.is_duplicate_key() => Err(AppError::conflict(format!(
                "An object with key '{key}' already exists"
            ))),
            Err(err) => Err(err.into()),
        }
    }
}

/// One object as returned by the list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectDto {
    key: String,
    #[serde(default)]
    size: Option<i64>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    width: Option<i32>,
    #[serde(default)]
    height: Option<i32>,
    #[serde(default)]
    uploaded_at: Option<DateTime<Utc>>,
}

impl From<ObjectDto> for RemoteObject {
    fn from(dto: ObjectDto) -> Self {
        Self {
            key: dto.key,
            size_bytes: dto.size,
            mime_type: dto.mime_type,
            width: dto.width,
            height: dto.height,
            uploaded_at: dto.uploaded_at,
        }
    }
}

/// One page of the list endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    objects: Vec<ObjectDto>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    truncated: bool,
}

/// Result payload of the upload-intent endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadIntentDto {
    key: String,
    upload_url: String,
}

/// Mask a bearer token for safe logging.
fn mask_token(token: &str) -> String {
    if token.len() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", &token[..4])
    }
}

/// Truncate a response body for log output.
fn preview(body: &str) -> String {
    if body.chars().count() <= BODY_PREVIEW_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abcdef123456"), "abcd****");
        assert_eq!(mask_token("ab"), "****");
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(500);
        let short = preview(&long);
        assert!(short.chars().count() <= BODY_PREVIEW_CHARS + 1);
        assert!(short.ends_with('…'));
        assert_eq!(preview("{}"), "{}");
    }

    #[test]
    fn test_list_page_parses_partial_payload() {
        let page: ListPage = serde_json::from_value(serde_json::json!({
            "objects": [{"key": "photos/a.jpg", "size": 10}],
            "truncated": false
        }))
        .unwrap();
        assert_eq!(page.objects.len(), 1);
        assert_eq!(page.objects[0].size, Some(10));
        assert!(page.objects[0].mime_type.is_none());
        assert!(page.cursor.is_none());
    }
}
