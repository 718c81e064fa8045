//! Curl multi transport: single-threaded event loop, one Easy2 handle per upload.
//!
//! `submit` adds a multipart POST to `<server>/api/upload` and returns at
//! once; `poll` performs, waits, and turns handle state into
//! [`TransportEvent`]s for the coordinator.

mod error;
mod handler;
mod request;
mod response;

pub use error::TransportError;

use curl::multi::{Easy2Handle, Multi};
use std::time::Duration;
use url::Url;

use crate::batch::UploadTask;
use crate::config::TransferConfig;
use crate::coordinator::{Transport, TransportEvent};

use handler::UploadHandler;

pub struct CurlTransport {
    multi: Multi,
    upload_url: Url,
    transfer: TransferConfig,
    active: Vec<Easy2Handle<UploadHandler>>,
}

impl CurlTransport {
    pub fn new(server: &Url, transfer: TransferConfig) -> Result<Self, TransportError> {
        Ok(Self {
            multi: Multi::new(),
            upload_url: server.join("api/upload")?,
            transfer,
            active: Vec::new(),
        })
    }

    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    /// Transfers currently on the multi handle.
    pub fn active(&self) -> usize {
        self.active.len()
    }

    fn progress_events(&mut self, events: &mut Vec<TransportEvent>) {
        for handle in self.active.iter_mut() {
            let handler = handle.get_mut();
            if let Some((loaded, total)) = handler.take_progress() {
                events.push(TransportEvent::Progress {
                    index: handler.index,
                    loaded,
                    total,
                });
            }
        }
    }
}

impl Transport for CurlTransport {
    fn submit(&mut self, task: &UploadTask) -> Result<(), TransportError> {
        let handle =
            request::add_upload_to_multi(&self.multi, &self.upload_url, task, self.transfer)?;
        self.active.push(handle);
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> Result<Vec<TransportEvent>, TransportError> {
        let mut events = Vec::new();
        if self.active.is_empty() {
            return Ok(events);
        }

        let running = self.multi.perform()?;
        self.progress_events(&mut events);

        let mut completed: Vec<(usize, Result<(), curl::Error>)> = Vec::new();
        let active = &self.active;
        self.multi.messages(|msg| {
            for (i, handle) in active.iter().enumerate() {
                if let Some(result) = msg.result_for2(handle) {
                    completed.push((i, result));
                    break;
                }
            }
        });
        completed.sort_by(|a, b| b.0.cmp(&a.0));
        let mut terminal = Vec::with_capacity(completed.len());
        for (i, result) in completed {
            let handle = self.active.remove(i);
            let mut easy = self.multi.remove2(handle)?;
            let code = easy.response_code().unwrap_or(0);
            let handler = easy.get_mut();
            let index = handler.index;
            let outcome = match result {
                Err(e) => Err(format!("Network error: {}", e)),
                Ok(()) => response::upload_result(code, &handler.body),
            };
            terminal.push(match outcome {
                Ok(file_id) => TransportEvent::Succeeded { index, file_id },
                Err(reason) => TransportEvent::Failed { index, reason },
            });
        }
        // Report terminals in submission order so the coordinator's scan matches it.
        terminal.sort_by_key(TransportEvent::index);
        events.extend(terminal);

        if running > 0 {
            self.multi.wait(&mut [], timeout)?;
        }
        Ok(events)
    }

    fn abort(&mut self, index: usize) {
        let Some(pos) = self
            .active
            .iter()
            .position(|handle| handle.get_ref().index == index)
        else {
            return;
        };
        let handle = self.active.remove(pos);
        if let Err(e) = self.multi.remove2(handle) {
            tracing::warn!("could not detach upload {}: {}", index, e);
        }
    }
}
