//! Retry-loop behavior against a scripted in-process HTTP server.

use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use mirrorfs_core::config::RemoteStoreConfig;
use mirrorfs_core::error::ErrorKind;
use mirrorfs_core::traits::remote::RemoteStore;
use mirrorfs_remote::RemoteClient;

/// Serialize one canned HTTP/1.1 response.
fn http_response(status: u16, extra_headers: &[(&str, &str)], body: &str) -> String {
    let mut headers = String::new();
    for (name, value) in extra_headers {
        headers.push_str(&format!("{name}: {value}\r\n"));
    }
    format!(
        "HTTP/1.1 {status} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{headers}\r\n{body}",
        body.len()
    )
}

const OK_EMPTY_LIST: &str =
    r#"{"success":true,"result":{"objects":[],"cursor":null,"truncated":false}}"#;
const ERR_OVERLOADED: &str =
    r#"{"success":false,"errors":[{"code":"overloaded","message":"try later"}]}"#;
const ERR_NOT_FOUND: &str =
    r#"{"success":false,"errors":[{"code":"object_not_found","message":"no such key"}]}"#;
const ERR_KEY_EXISTS: &str =
    r#"{"success":false,"errors":[{"code":"key_exists","message":"duplicate"}]}"#;
const ERR_BAD_REQUEST: &str =
    r#"{"success":false,"errors":[{"code":"invalid_prefix","message":"bad input"}]}"#;

/// Accept one connection per scripted response, serve them in order, and
/// return how many requests were actually received.
async fn spawn_scripted_server(responses: Vec<String>) -> (String, JoinHandle<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let mut served = 0usize;
        for response in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        request.extend_from_slice(&buf[..n]);
                        if request.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                }
            }
            socket.write_all(response.as_bytes()).await.expect("write");
            let _ = socket.shutdown().await;
            served += 1;
        }
        served
    });

    (format!("http://{addr}"), handle)
}

fn test_config(base_url: String) -> RemoteStoreConfig {
    RemoteStoreConfig {
        base_url,
        api_token: "test-token".to_string(),
        max_attempts: 4,
        retry_base_ms: 5,
        timeout_seconds: 5,
        list_page_size: 1000,
        list_max: 10_000,
    }
}

#[tokio::test]
async fn test_retries_transient_statuses_until_success() {
    let script = vec![
        http_response(503, &[], ERR_OVERLOADED),
        http_response(503, &[], ERR_OVERLOADED),
        http_response(503, &[], ERR_OVERLOADED),
        http_response(200, &[], OK_EMPTY_LIST),
    ];
    let (base_url, server) = spawn_scripted_server(script).await;
    let client = RemoteClient::new(test_config(base_url)).unwrap();

    let started = Instant::now();
    let objects = client.list_all(None, 100).await.expect("should succeed");
    let elapsed = started.elapsed();

    assert!(objects.is_empty());
    assert_eq!(server.await.unwrap(), 4);
    // Three backoff sleeps of 5, 10, and 20 ms (plus jitter below 150 ms each).
    assert!(elapsed >= Duration::from_millis(35), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn test_exhaustion_surfaces_structured_error() {
    let script = vec![
        http_response(503, &[], ERR_OVERLOADED),
        http_response(503, &[], ERR_OVERLOADED),
        http_response(503, &[], ERR_OVERLOADED),
        http_response(503, &[], ERR_OVERLOADED),
    ];
    let (base_url, server) = spawn_scripted_server(script).await;
    let client = RemoteClient::new(test_config(base_url)).unwrap();

    let err = client.list_all(None, 100).await.expect_err("should exhaust");
    assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    assert!(err.message.contains("503"), "message: {}", err.message);
    assert!(err.message.contains("overloaded"), "message: {}", err.message);
    assert_eq!(server.await.unwrap(), 4);
}

#[tokio::test]
async fn test_terminal_status_fails_without_retry() {
    let script = vec![http_response(400, &[], ERR_BAD_REQUEST)];
    let (base_url, server) = spawn_scripted_server(script).await;
    let client = RemoteClient::new(test_config(base_url)).unwrap();

    let err = client.list_all(None, 100).await.expect_err("terminal");
    assert_eq!(err.kind, ErrorKind::RemoteStore);
    assert_eq!(server.await.unwrap(), 1);
}

#[tokio::test]
async fn test_rate_limit_honors_retry_after_header() {
    let script = vec![
        http_response(429, &[("Retry-After", "1")], ERR_OVERLOADED),
        http_response(200, &[], OK_EMPTY_LIST),
    ];
    let (base_url, server) = spawn_scripted_server(script).await;
    let client = RemoteClient::new(test_config(base_url)).unwrap();

    let started = Instant::now();
    client.list_all(None, 100).await.expect("should succeed");

    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(server.await.unwrap(), 2);
}

#[tokio::test]
async fn test_delete_treats_not_found_as_success() {
    let script = vec![
        http_response(404, &[], ERR_NOT_FOUND),
        http_response(404, &[], ERR_NOT_FOUND),
    ];
    let (base_url, server) = spawn_scripted_server(script).await;
    let client = RemoteClient::new(test_config(base_url)).unwrap();

    assert!(!client.delete_by_key("photos/gone.jpg").await.unwrap());
    assert!(!client.delete_by_key("photos/gone.jpg").await.unwrap());
    assert_eq!(server.await.unwrap(), 2);
}

#[tokio::test]
async fn test_upload_intent_duplicate_key_is_conflict() {
    let script = vec![http_response(409, &[], ERR_KEY_EXISTS)];
    let (base_url, server) = spawn_scripted_server(script).await;
    let client = RemoteClient::new(test_config(base_url)).unwrap();

    let err = client
        .create_upload_intent("photos/taken.jpg")
        .await
        .expect_err("duplicate");
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(server.await.unwrap(), 1);
}

#[tokio::test]
async fn test_list_follows_continuation_cursor() {
    let page_one = r#"{"success":true,"result":{"objects":[{"key":"photos/a.jpg","size":5}],"cursor":"tok-1","truncated":true}}"#;
    let page_two = r#"{"success":true,"result":{"objects":[{"key":"photos/b.jpg","size":7}],"cursor":null,"truncated":false}}"#;
    let script = vec![
        http_response(200, &[], page_one),
        http_response(200, &[], page_two),
    ];
    let (base_url, server) = spawn_scripted_server(script).await;
    let client = RemoteClient::new(test_config(base_url)).unwrap();

    let objects = client.list_all(Some("photos"), 100).await.unwrap();
    let keys: Vec<_> = objects.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, vec!["photos/a.jpg", "photos/b.jpg"]);
    assert_eq!(server.await.unwrap(), 2);
}
