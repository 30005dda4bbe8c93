//! Grafana HTTP API client.
//!
//! Two calls are needed for provisioning:
//!
//! - `GET /api/dashboards/uid/{uid}`: fetch a board; HTTP 404 means the
//!   board does not exist yet.
//! - `POST /api/dashboards/db`: upsert a board, never forcing overwrite.
//!
//! See: <https://grafana.com/docs/grafana/latest/developers/http_api/dashboard/>

use std::time::Duration;

use md5::{Digest, Md5};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::Board;
use crate::{MetricsError, Result};

/// Status value Grafana reports for a successful upsert.
const SUCCESS_STATUS: &str = "success";

/// Stable board identifier derived from its title.
///
/// Lowercase hex MD5 of the title; used as both the lookup key and the
/// URL slug, so the same title always resolves to the same board.
///
/// ```rust
/// # use dynmetrics::dashboard::dashboard_uid;
/// assert_eq!(dashboard_uid("Shop").len(), 32);
/// assert_eq!(dashboard_uid("Shop"), dashboard_uid("Shop"));
/// ```
pub fn dashboard_uid(title: &str) -> String {
    hex::encode(Md5::digest(title.as_bytes()))
}

/// Client for the Grafana dashboard API.
#[derive(Clone)]
pub struct GrafanaClient {
    http: Client,
    base_url: String,
    auth_key: Option<String>,
}

#[derive(Deserialize)]
struct DashboardEnvelope {
    dashboard: Board,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    dashboard: &'a Board,
    overwrite: bool,
}

/// Body of an upsert response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
}

impl GrafanaClient {
    /// Create a client for the API at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        auth_key: Option<String>,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| {
                MetricsError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_key,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Fetch a board by uid. Returns `None` when the board does not exist.
    pub async fn get_dashboard_by_uid(&self, uid: &str) -> Result<Option<Board>> {
        let url = format!("{}/api/dashboards/uid/{uid}", self.base_url);
        let response = self.authorize(self.http.get(&url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(%uid, "dashboard not found");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(MetricsError::Transport(format!(
                "dashboard fetch returned HTTP {}",
                response.status()
            )));
        }

        let envelope: DashboardEnvelope = response.json().await.map_err(|e| {
            MetricsError::Transport(format!("failed to decode dashboard {uid}: {e}"))
        })?;
        Ok(Some(envelope.dashboard))
    }

    /// Upsert a board without forcing overwrite.
    ///
    /// Any response other than a 2xx carrying status `success` is an
    /// [`MetricsError::UpsertStatus`]; this includes version conflicts with
    /// concurrent external edits.
    pub async fn set_dashboard(&self, board: &Board) -> Result<UpsertResponse> {
        let url = format!("{}/api/dashboards/db", self.base_url);
        let response = self
            .authorize(self.http.post(&url))
            .json(&UpsertRequest {
                dashboard: board,
                overwrite: false,
            })
            .send()
            .await?;

        let http_status = response.status();
        let body = response.text().await?;
        let parsed = match serde_json::from_str::<UpsertResponse>(&body) {
            Ok(parsed) => parsed,
            Err(e) => UpsertResponse {
                message: Some(format!("undecodable upsert response: {e}")),
                ..Default::default()
            },
        };

        if !http_status.is_success() {
            return Err(MetricsError::UpsertStatus {
                status: parsed
                    .status
                    .unwrap_or_else(|| format!("HTTP {}", http_status.as_u16())),
                message: parsed.message,
            });
        }

        match parsed.status.as_deref() {
            Some(SUCCESS_STATUS) => Ok(parsed),
            other => Err(MetricsError::UpsertStatus {
                status: other.unwrap_or("missing").to_string(),
                message: parsed.message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_is_md5_hex_of_title() {
        // md5("") is well known
        assert_eq!(dashboard_uid(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn different_titles_get_different_uids() {
        assert_ne!(dashboard_uid("Shop"), dashboard_uid("Ops"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = GrafanaClient::new(
            "http://grafana.local/",
            None,
            Duration::from_secs(1),
            false,
        )
        .unwrap();
        assert_eq!(client.base_url, "http://grafana.local");
    }
}
