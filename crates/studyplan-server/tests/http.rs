//! HTTP round trips against a served router on an ephemeral port

use pretty_assertions::assert_eq;
use std::net::SocketAddr;
use studyplan_server::{router, AppState};
use studyplan_solver::StudyPlanner;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn serve() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let app = router(AppState::new(StudyPlanner::new()));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    address
}

/// Send one request and return (status code, body)
async fn send(address: SocketAddr, method: &str, path: &str, body: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(address).await.unwrap();
    let request = format!(
        "{method} {path} HTTP/1.1\r\n\
         Host: localhost\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
    (status, body.to_string())
}

#[tokio::test]
async fn health() {
    let address = serve().await;
    let (status, body) = send(address, "GET", "/health", "").await;
    assert_eq!(status, 200);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn optimize_two_competing_tasks() {
    let address = serve().await;
    let (status, body) = send(
        address,
        "POST",
        "/optimize",
        r#"{
            "horizon": 2016,
            "tasks": [
                {"id": "A", "duration": 50, "deadline": 300},
                {"id": "B", "duration": 50, "deadline": 300}
            ]
        }"#,
    )
    .await;
    assert_eq!(status, 200);

    let entries: serde_json::Value = serde_json::from_str(&body).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    let range = |i: usize| {
        (
            entries[i]["start"].as_i64().unwrap(),
            entries[i]["end"].as_i64().unwrap(),
        )
    };
    let (a, b) = (range(0), range(1));
    assert!(a.1 <= b.0 || b.1 <= a.0);
    assert!(a.1 <= 300 && b.1 <= 300);
}

#[tokio::test]
async fn optimize_impossible_deadline_is_empty_list() {
    let address = serve().await;
    let (status, body) = send(
        address,
        "POST",
        "/optimize",
        r#"{"tasks": [{"id": "X", "duration": 50, "deadline": 10}]}"#,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn optimize_detailed_includes_status() {
    let address = serve().await;
    let (status, body) = send(
        address,
        "POST",
        "/optimize/detailed",
        r#"{"tasks": [{"id": "H", "duration": 12}], "preference_time": "MORNING"}"#,
    )
    .await;
    assert_eq!(status, 200);

    let outcome: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(outcome["status"], "optimal");
    assert_eq!(outcome["objective"], -10);
    assert_eq!(outcome["entries"][0]["id"], "H");
}

#[tokio::test]
async fn malformed_body_is_client_error() {
    let address = serve().await;
    let (status, _) = send(address, "POST", "/optimize", r#"{"tasks": [{"id": "a"}]}"#).await;
    assert!((400..500).contains(&status), "got {status}");
}

#[tokio::test]
async fn invalid_request_is_422() {
    let address = serve().await;
    let (status, body) = send(
        address,
        "POST",
        "/optimize",
        r#"{"blocked_days": [9], "tasks": []}"#,
    )
    .await;
    assert_eq!(status, 422);

    let error: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "Blocked day 9 is outside 0-6");
}
