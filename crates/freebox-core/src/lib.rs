pub mod api;
pub mod batch;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod format;
pub mod logging;
pub mod transport;
pub mod upload;
