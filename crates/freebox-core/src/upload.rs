//! Blocking batch driver: wires the status hint, curl transport and
//! coordinator together and pumps transport events until the batch drains.

use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

use crate::api::StatusHint;
use crate::batch::Batch;
use crate::config::FreeboxConfig;
use crate::coordinator::{
    BatchProgress, BatchReport, ConcurrencyBudget, ConcurrencyHint, ErrorReporter,
    NotificationSink, Transport, UploadCoordinator,
};
use crate::transport::CurlTransport;

/// How long one `poll` may block waiting for socket activity.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Upload `batch` to `server` and block until every task is Done or Failed.
///
/// Per-file failures go to `reporter` and into the returned report; they do
/// not make this function fail. Async callers should use `spawn_blocking`.
pub fn run_batch(
    cfg: &FreeboxConfig,
    server: &Url,
    batch: Batch,
    reporter: Box<dyn ErrorReporter + Send>,
    sink: Box<dyn NotificationSink + Send>,
    progress_tx: Option<tokio::sync::watch::Sender<BatchProgress>>,
) -> Result<BatchReport> {
    let transport =
        CurlTransport::new(server, cfg.transfer()).context("setting up upload transport")?;
    let mut hint = StatusHint::new(server.clone(), cfg.status_timeout());
    let mut coordinator = UploadCoordinator::new(
        transport,
        ConcurrencyBudget::new(cfg.default_concurrent_uploads),
        reporter,
        sink,
    );
    if let Some(tx) = progress_tx {
        coordinator = coordinator.with_progress(tx);
    }
    run_with(&mut coordinator, batch, &mut hint)
}

/// Start `batch` on `coordinator` and drive it to completion.
pub fn run_with<T: Transport>(
    coordinator: &mut UploadCoordinator<T>,
    batch: Batch,
    hint: &mut dyn ConcurrencyHint,
) -> Result<BatchReport> {
    coordinator.start_batch(batch, hint)?;
    drive(coordinator)
}

/// Pump `coordinator`'s transport until the running batch finishes.
///
/// A poll error aborts every transfer still in flight and fails its task
/// with that error; the freed slots admit the rest, so the batch always
/// drains.
pub fn drive<T: Transport>(coordinator: &mut UploadCoordinator<T>) -> Result<BatchReport> {
    while coordinator.is_running() {
        match coordinator.transport_mut().poll(POLL_INTERVAL) {
            Ok(events) => {
                for event in events {
                    coordinator.handle_event(event);
                }
            }
            Err(e) => {
                tracing::error!("upload transport error: {}", e);
                coordinator.abort_in_flight(&format!("Network error: {}", e));
            }
        }
    }
    coordinator
        .take_report()
        .context("upload batch ended without a report")
}
