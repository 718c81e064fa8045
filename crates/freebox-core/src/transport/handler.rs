//! Easy2 Handler for one upload in the curl multi transport.
//! Buffers the JSON response and tracks upload byte progress.

/// Responses beyond this size are truncated; the upload endpoint only returns a small JSON object.
const MAX_RESPONSE_BYTES: usize = 1 << 20;

/// Handler state for one upload transfer. Implements curl's Handler for Easy2.
pub struct UploadHandler {
    pub(super) index: usize,
    pub(super) body: Vec<u8>,
    uploaded: u64,
    upload_total: u64,
    /// Last (uploaded, total) pair handed out by `take_progress`.
    reported: (u64, u64),
}

impl UploadHandler {
    pub(super) fn new(index: usize) -> Self {
        Self {
            index,
            body: Vec::new(),
            uploaded: 0,
            upload_total: 0,
            reported: (0, 0),
        }
    }

    /// Current (uploaded, total) if it changed since the last call.
    pub(super) fn take_progress(&mut self) -> Option<(u64, u64)> {
        let now = (self.uploaded, self.upload_total);
        if now == self.reported {
            return None;
        }
        self.reported = now;
        Some(now)
    }
}

impl curl::easy::Handler for UploadHandler {
    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        let room = MAX_RESPONSE_BYTES.saturating_sub(self.body.len());
        self.body.extend_from_slice(&data[..data.len().min(room)]);
        Ok(data.len())
    }

    fn progress(&mut self, _dltotal: f64, _dlnow: f64, ultotal: f64, ulnow: f64) -> bool {
        self.upload_total = ultotal.max(0.0) as u64;
        self.uploaded = ulnow.max(0.0) as u64;
        true
    }
}
