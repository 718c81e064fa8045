//! File listing, deletion and download.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use super::http::{self, Method, API_TIMEOUT};

/// A stored file as returned by `GET /api/files`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    /// Original (display) file name.
    pub filename: String,
    pub size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Unix timestamp (seconds, fractional).
    #[serde(default)]
    pub created_at: f64,
    #[serde(default)]
    pub download_count: u64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// One page of the server's file list.
pub fn list_files(server: &Url, limit: u32, offset: u32) -> Result<Vec<FileRecord>> {
    let mut url = server.join("api/files").context("building files URL")?;
    url.query_pairs_mut()
        .append_pair("limit", &limit.to_string())
        .append_pair("offset", &offset.to_string());
    http::get_json(&url, API_TIMEOUT)
}

/// Delete a stored file by id. The server's `error` text is surfaced when present.
pub fn delete_file(server: &Url, id: i64) -> Result<()> {
    let url = server
        .join(&format!("api/files/{id}"))
        .context("building delete URL")?;
    let response = http::request(Method::Delete, &url, API_TIMEOUT)?;
    check_delete(response.code, &response.body)
        .with_context(|| format!("failed to delete file {id}"))
}

fn check_delete(code: u32, body: &[u8]) -> Result<()> {
    match serde_json::from_slice::<DeleteResponse>(body) {
        Ok(r) if r.success && (200..300).contains(&code) => Ok(()),
        Ok(r) => anyhow::bail!(r.error.unwrap_or_else(|| format!("HTTP {code}"))),
        Err(_) => anyhow::bail!("HTTP {code}"),
    }
}

/// Download a stored file into `dest`. Returns bytes written.
pub fn download_file(server: &Url, id: i64, dest: &Path) -> Result<u64> {
    let url = server
        .join(&format!("api/download/{id}"))
        .context("building download URL")?;
    http::download_to(&url, dest)
}
