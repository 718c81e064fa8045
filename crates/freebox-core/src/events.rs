//! Publish/subscribe registry for client-side notifications.
//!
//! Components register callbacks per [`EventKind`]; `emit` runs them in
//! registration order on the emitting thread. The upload pipeline reaches
//! the bus through [`BusNotifier`], its notification sink.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::api::{ChatMessage, ServerStats};
use crate::coordinator::NotificationSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    FilesChanged,
    FileDownloaded,
    StatsUpdated,
    ChatMessage,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// The set of stored files changed (upload batch finished, file deleted).
    FilesChanged,
    /// A stored file was fetched to local disk.
    FileDownloaded { id: i64, path: PathBuf, bytes: u64 },
    StatsUpdated(ServerStats),
    /// A chat message was received or sent.
    ChatMessage(ChatMessage),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::FilesChanged => EventKind::FilesChanged,
            Event::FileDownloaded { .. } => EventKind::FileDownloaded,
            Event::StatsUpdated(_) => EventKind::StatsUpdated,
            Event::ChatMessage(_) => EventKind::ChatMessage,
        }
    }
}

type Callback = Box<dyn Fn(&Event) + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<HashMap<EventKind, Vec<Callback>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for events of `kind`.
    pub fn on<F>(&self, kind: EventKind, callback: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push(Box::new(callback));
    }

    /// Deliver `event` to its subscribers. Returns how many callbacks ran.
    pub fn emit(&self, event: &Event) -> usize {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(callbacks) = subscribers.get(&event.kind()) else {
            tracing::debug!(kind = ?event.kind(), "event with no subscribers");
            return 0;
        };
        for callback in callbacks {
            callback(event);
        }
        callbacks.len()
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

/// Notification sink that publishes [`Event::FilesChanged`] on a shared bus.
#[derive(Clone)]
pub struct BusNotifier {
    bus: Arc<EventBus>,
}

impl BusNotifier {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

impl NotificationSink for BusNotifier {
    fn files_changed(&mut self) {
        self.bus.emit(&Event::FilesChanged);
    }
}
