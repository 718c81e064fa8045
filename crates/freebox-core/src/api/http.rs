//! Blocking curl helpers shared by the REST calls.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default bound for REST calls other than the status probe.
pub(crate) const API_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    Get,
    Delete,
}

/// Status code and body of a finished request.
pub(crate) struct Response {
    pub code: u32,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).context("unexpected response from server")
    }
}

fn easy_for(url: &Url, timeout: Duration) -> Result<curl::easy::Easy> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url.as_str()).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.connect_timeout(CONNECT_TIMEOUT.min(timeout))?;
    easy.timeout(timeout)?;
    Ok(easy)
}

/// Perform `method` on `url` and buffer the body. Transport failures are errors;
/// HTTP status is left to the caller.
pub(crate) fn request(method: Method, url: &Url, timeout: Duration) -> Result<Response> {
    let mut easy = easy_for(url, timeout)?;
    if method == Method::Delete {
        easy.custom_request("DELETE")?;
    }
    perform(easy, url)
}

/// POST `body` as JSON to `url` and buffer the response.
pub(crate) fn post_json<B: Serialize>(url: &Url, body: &B, timeout: Duration) -> Result<Response> {
    let payload = serde_json::to_vec(body).context("encoding request body")?;
    let mut easy = easy_for(url, timeout)?;
    let mut headers = curl::easy::List::new();
    headers.append("Content-Type: application/json")?;
    headers.append("Expect:")?;
    easy.http_headers(headers)?;
    easy.post(true)?;
    easy.post_fields_copy(&payload)?;
    perform(easy, url)
}

fn perform(mut easy: curl::easy::Easy, url: &Url) -> Result<Response> {
    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer
            .perform()
            .with_context(|| format!("request to {} failed", url))?;
    }

    let code = easy.response_code().context("no response code")?;
    Ok(Response { code, body })
}

/// GET `url` and decode a 2xx JSON body.
pub(crate) fn get_json<T: DeserializeOwned>(url: &Url, timeout: Duration) -> Result<T> {
    let response = request(Method::Get, url, timeout)?;
    if !response.is_success() {
        anyhow::bail!("GET {} returned HTTP {}", url, response.code);
    }
    response.json()
}

/// GET `url` streaming the body into `dest`. Returns bytes written.
///
/// The body lands in a temporary file next to `dest` that replaces it only
/// after a 2xx response; on any error `dest` is left as it was.
pub(crate) fn download_to(url: &Url, dest: &Path) -> Result<u64> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("cannot create temporary file in {}", dir.display()))?;
    let mut easy = easy_for(url, Duration::from_secs(3600))?;
    let mut written = 0u64;
    let mut write_error: Option<std::io::Error> = None;
    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_error = Some(e);
                Ok(0)
            }
        })?;
        transfer.perform()
    };
    if let Some(e) = write_error {
        return Err(e).with_context(|| format!("writing {}", dest.display()));
    }
    performed.with_context(|| format!("request to {} failed", url))?;

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }
    file.flush()
        .with_context(|| format!("writing {}", dest.display()))?;
    file.persist(dest)
        .map_err(|e| e.error)
        .with_context(|| format!("cannot replace {}", dest.display()))?;
    Ok(written)
}
