//! API integration tests against a locally running schedule server.
//!
//! Start the server first (`aukera --port 9119`), then run with:
//! `cargo test -- --ignored`

use aukera::client::ScheduleClient;

const BASE_URL: &str = "http://localhost:9119";

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_status() {
    let response = reqwest::get(format!("{BASE_URL}/status"))
        .await
        .expect("failed to send request");
    assert!(response.status().is_success());
    assert_eq!(response.text().await.expect("failed to read body"), "OK");
}

#[tokio::test]
#[ignore]
async fn test_schedule_is_json_array() {
    let response = reqwest::get(format!("{BASE_URL}/schedule"))
        .await
        .expect("failed to send request");
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_unknown_path_is_404() {
    let response = reqwest::get(format!("{BASE_URL}/missing"))
        .await
        .expect("failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_client_round_trip() {
    let client = ScheduleClient::new(9119);
    assert!(client.available().await, "service not running on 9119");
    let schedules = client.label(&[]).await.expect("schedule query failed");
    for schedule in schedules {
        assert!(schedule.opens <= schedule.closes);
    }
}
