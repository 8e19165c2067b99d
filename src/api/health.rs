//! Liveness endpoint.

/// `GET /status`: plain-text liveness probe.
pub async fn status() -> &'static str {
    "OK"
}
