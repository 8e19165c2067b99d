//! HTTP surface of the schedule server.

pub mod health;
pub mod schedule;

use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::AppState;

/// Deadline for a single request, covering the activation-search budget with
/// headroom.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Builds the application router with all routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(health::status))
        .route("/schedule", get(schedule::all_labels))
        .route("/schedule/:label", get(schedule::by_label))
        .route("/active_hours", get(schedule::active_hours))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::services::{DiskReader, OsActiveHours, SchedulerService};

    fn make_state(conf_dir: PathBuf) -> AppState {
        AppState {
            scheduler: Arc::new(SchedulerService::new(
                conf_dir,
                Arc::new(DiskReader),
                Arc::new(OsActiveHours),
            )),
        }
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn window_config() -> &'static str {
        r#"{"Windows": [{"Name": "os patching", "Format": 1,
            "Schedule": "* 0 */1 * * *", "Duration": "1h", "Labels": ["os"]}]}"#
    }

    #[tokio::test]
    async fn status_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(make_state(dir.path().to_path_buf()));
        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");
    }

    #[tokio::test]
    async fn schedule_endpoint_returns_configured_labels() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("os.json"), window_config()).unwrap();
        let app = router(make_state(dir.path().to_path_buf()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/schedule")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        let schedules = body.as_array().unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0]["Name"], "os");
    }

    #[tokio::test]
    async fn schedule_label_endpoint_filters() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("os.json"), window_config()).unwrap();
        let app = router(make_state(dir.path().to_path_buf()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/schedule/os")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn schedule_unknown_label_is_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("os.json"), window_config()).unwrap();
        let app = router(make_state(dir.path().to_path_buf()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/schedule/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn loader_failure_yields_500_with_message() {
        let app = router(make_state(PathBuf::from("made/this/path/up")));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/schedule")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("does not exist"));
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(make_state(dir.path().to_path_buf()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn active_hours_unsupported_yields_500() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(make_state(dir.path().to_path_buf()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/active_hours")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("active hours"));
    }
}
