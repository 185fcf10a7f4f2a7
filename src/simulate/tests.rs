use super::*;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use std::io::Write;
use std::sync::{Arc, Mutex};

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_lines_trims_and_limits() {
    let file = write_temp("  Great value \n\nBroke in a week\nWould buy again\n");

    let all = load_lines(file.path(), None).unwrap();
    assert_eq!(all, vec!["Great value", "Broke in a week", "Would buy again"]);

    let two = load_lines(file.path(), Some(2)).unwrap();
    assert_eq!(two.len(), 2);
}

#[test]
fn test_load_csv_filters_product() {
    let file = write_temp(
        "marketplace,product_id,review_body\n\
         US,B002LHA74O,\"Works great, no complaints\"\n\
         US,B000000000,Other product\n\
         US,B002LHA74O,\n\
         US,B002LHA74O,Stopped working\n",
    );

    let reviews = load_csv(file.path(), "B002LHA74O").unwrap();
    assert_eq!(reviews, vec!["Works great, no complaints", "Stopped working"]);
}

#[test]
fn test_load_csv_missing_column() {
    let file = write_temp("product_id,text\nB1,hello\n");
    let err = load_csv(file.path(), "B1").unwrap_err();
    assert!(matches!(err, SimulationError::MissingColumn(col) if col == "review_body"));
}

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>,
}

async fn capture_server() -> (String, Captured) {
    let captured = Captured::default();
    let sink = captured.clone();

    let app = Router::new().route(
        "/review",
        post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
            let sink = sink.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let reject = body["Review"] == "reject me";
                sink.requests.lock().unwrap().push((auth, body));
                if reject {
                    axum::http::StatusCode::BAD_REQUEST
                } else {
                    axum::http::StatusCode::OK
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/review", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (url, captured)
}

#[tokio::test]
async fn test_replay_posts_write_actions_with_token() {
    let (url, captured) = capture_server().await;
    let simulator = Simulator::new(url, "token-123");
    let reviews = vec!["Great value".to_string(), "reject me".to_string()];

    let report = simulator.replay(&reviews, 2, Duration::from_millis(1)).await;
    assert_eq!(
        report,
        SimulationReport {
            sent: 4,
            succeeded: 2,
            failed: 2
        }
    );

    let requests = captured.requests.lock().unwrap();
    assert_eq!(requests.len(), 4);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer token-123"));
    assert_eq!(
        body,
        &serde_json::json!({"Action": "write", "ProductId": "id-001", "Review": "Great value"})
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_counts_failures() {
    let simulator = Simulator::new("http://127.0.0.1:9/review", "t").product_id("p-2");
    let report = simulator
        .replay(&["hello".to_string()], 1, Duration::ZERO)
        .await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 0);
}
