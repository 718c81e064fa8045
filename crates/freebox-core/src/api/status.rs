//! `GET /api/status`: liveness plus the optional upload concurrency hint.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::coordinator::ConcurrencyHint;

use super::http;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    /// Upload window the server asks clients to use. Absent on older servers.
    #[serde(default)]
    pub recommended_concurrent_uploads: Option<usize>,
}

impl ServerStatus {
    pub fn is_online(&self) -> bool {
        self.status.eq_ignore_ascii_case("online")
    }
}

/// Fetch the server status, giving up after `timeout`.
pub fn fetch_status(server: &Url, timeout: Duration) -> Result<ServerStatus> {
    let url = server.join("api/status").context("building status URL")?;
    http::get_json(&url, timeout)
}

/// Concurrency hint backed by the status endpoint. One bounded request per batch.
#[derive(Debug, Clone)]
pub struct StatusHint {
    server: Url,
    timeout: Duration,
}

impl StatusHint {
    pub fn new(server: Url, timeout: Duration) -> Self {
        Self { server, timeout }
    }
}

impl ConcurrencyHint for StatusHint {
    fn recommended_concurrency(&mut self) -> Result<Option<usize>> {
        Ok(fetch_status(&self.server, self.timeout)?.recommended_concurrent_uploads)
    }
}
