//! Classify a finished upload from its HTTP status and JSON body.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    file: Option<UploadedRecord>,
}

#[derive(Debug, Deserialize)]
struct UploadedRecord {
    id: i64,
}

/// Server id of the stored file on success, or the failure reason.
/// Anything other than HTTP 200 with `{"success": true, ...}` is a failure.
pub(super) fn upload_result(code: u32, body: &[u8]) -> Result<Option<i64>, String> {
    let parsed = serde_json::from_slice::<UploadResponse>(body);
    if code != 200 {
        return Err(match parsed.ok().and_then(|r| r.error) {
            Some(error) => format!("Server returned status {}: {}", code, error),
            None => format!("Server returned status {}", code),
        });
    }
    let response = parsed.map_err(|_| "Failed to parse server response".to_string())?;
    if !response.success {
        return Err(response.error.unwrap_or_else(|| "Unknown error".to_string()));
    }
    Ok(response.file.map(|f| f.id))
}
