// ABOUTME: Tests HttpRequester against a throwaway local HTTP server
// ABOUTME: Verifies headers, status classification and retry hints over a real socket

use std::time::Duration;

use discord_message_deleter::headers::build_headers;
use discord_message_deleter::remote::{
    HttpRequester, RateLimitOutcome, RateLimitPolicy, RequestSpec, Requester,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const POLICY: RateLimitPolicy = RateLimitPolicy {
    default_wait: Duration::from_millis(3000),
    min_wait: Duration::from_millis(1500),
};

/// Serves one canned response and returns the raw request it received.
async fn serve_once(response: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{}", addr), handle)
}

fn response(status_line: &str, extra_headers: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\n{}content-length: {}\r\nconnection: close\r\n\r\n{}",
        status_line,
        extra_headers,
        body.len(),
        body
    )
}

fn requester() -> HttpRequester {
    // Bypass any proxy configured in the environment; the server is local.
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .default_headers(build_headers("Bot secret").unwrap())
        .build()
        .unwrap();
    HttpRequester::from_client(client, POLICY)
}

#[tokio::test]
async fn test_rate_limit_header_wins_over_body() {
    let (base, server) = serve_once(response(
        "429 Too Many Requests",
        "retry-after: 2\r\ncontent-type: application/json\r\n",
        r#"{"retry_after": 10.5, "global": false}"#,
    ))
    .await;

    let outcome = requester()
        .execute(&RequestSpec::delete(format!("{}/channels/9/messages/5", base)))
        .await;

    assert_eq!(
        outcome,
        RateLimitOutcome::RateLimited {
            wait: Duration::from_millis(2000)
        }
    );

    let request = server.await.unwrap();
    assert!(request.starts_with("DELETE /channels/9/messages/5 HTTP/1.1"));
    assert!(request.to_lowercase().contains("authorization: bot secret"));
}

#[tokio::test]
async fn test_no_content_is_ok() {
    let (base, server) =
        serve_once("HTTP/1.1 204 No Content\r\nconnection: close\r\n\r\n".to_string()).await;

    let outcome = requester()
        .execute(&RequestSpec::delete(format!("{}/x", base)))
        .await;

    assert_eq!(
        outcome,
        RateLimitOutcome::Ok {
            status: 204,
            body: None
        }
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_search_page_body_is_parsed() {
    let (base, server) = serve_once(response(
        "200 OK",
        "content-type: application/json\r\n",
        r#"{"messages": [], "total_results": 0}"#,
    ))
    .await;

    let outcome = requester()
        .execute(&RequestSpec::get(format!("{}/search", base)))
        .await;

    assert_eq!(
        outcome,
        RateLimitOutcome::Ok {
            status: 200,
            body: Some(serde_json::json!({"messages": [], "total_results": 0}))
        }
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_unauthorized_is_fatal() {
    let (base, server) = serve_once(response(
        "401 Unauthorized",
        "",
        r#"{"message": "401: Unauthorized"}"#,
    ))
    .await;

    let outcome = requester()
        .execute(&RequestSpec::delete(format!("{}/x", base)))
        .await;

    assert_eq!(outcome, RateLimitOutcome::Fatal { status: 401 });
    server.await.unwrap();
}

#[tokio::test]
async fn test_truncated_body_keeps_not_found_status() {
    // Announces 100 bytes but sends 10 before closing.
    let (base, server) = serve_once(
        "HTTP/1.1 404 Not Found\r\ncontent-length: 100\r\n\r\n{\"message\"".to_string(),
    )
    .await;

    let outcome = requester()
        .execute(&RequestSpec::delete(format!("{}/channels/9/messages/5", base)))
        .await;

    match outcome {
        RateLimitOutcome::Error { status, body } => {
            assert_eq!(status, Some(404));
            assert!(body.starts_with("unreadable response body"));
        }
        other => panic!("expected a 404 error, got {:?}", other),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_has_no_status() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let outcome = requester()
        .execute(&RequestSpec::get(format!("http://{}/x", addr)))
        .await;

    assert!(matches!(outcome, RateLimitOutcome::Error { status: None, .. }));
}
