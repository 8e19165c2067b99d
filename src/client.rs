//! Client library for services querying the local schedule server.

use reqwest::Client;

use crate::error::{AppError, AppResult};
use crate::models::{Schedule, WindowDoc};

const URL_BASE: &str = "http://localhost";

/// HTTP client bound to a local schedule server port.
#[derive(Debug, Clone)]
pub struct ScheduleClient {
    base: String,
    http: Client,
}

impl ScheduleClient {
    pub fn new(port: u16) -> Self {
        Self {
            base: format!("{URL_BASE}:{port}"),
            http: Client::new(),
        }
    }

    /// Whether the service is available and responding locally.
    pub async fn available(&self) -> bool {
        match self.http.get(format!("{}/status", self.base)).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Fetches the window schedule for the given label names, or for every
    /// configured label when `names` is empty.
    pub async fn label(&self, names: &[&str]) -> AppResult<Vec<Schedule>> {
        if !self.available().await {
            return Err(AppError::ServiceUnavailable);
        }
        let mut schedules = Vec::new();
        for url in self.schedule_urls(names) {
            let response = self.http.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(AppError::UnexpectedStatus {
                    url,
                    status: status.as_u16(),
                });
            }
            let batch: Vec<Schedule> = response.json().await?;
            schedules.extend(batch);
        }
        Ok(schedules)
    }

    /// Fetches the built-in active-hours maintenance window. This window is
    /// open during the hours the user or machine admin expects interactive
    /// activity. Returns the raw window document as served.
    pub async fn active_hours(&self) -> AppResult<WindowDoc> {
        if !self.available().await {
            return Err(AppError::ServiceUnavailable);
        }
        let url = format!("{}/active_hours", self.base);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UnexpectedStatus {
                url,
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    fn schedule_urls(&self, names: &[&str]) -> Vec<String> {
        if names.is_empty() {
            return vec![format!("{}/schedule", self.base)];
        }
        names
            .iter()
            .map(|name| format!("{}/schedule/{name}", self.base))
            .collect()
    }
}
