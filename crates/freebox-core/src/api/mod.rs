//! Blocking client for the FreeBox REST API.
//!
//! Uses the curl crate (libcurl) Easy interface; call from `spawn_blocking`
//! when used from async code. Endpoints are joined onto the server base URL,
//! so a base with a path prefix (`http://host/freebox/`) works.

mod chat;
mod files;
mod http;
mod stats;
mod status;

pub use chat::{
    fetch_messages, list_rooms, post_message, ChatMessage, ChatRoom, ANONYMOUS, DEFAULT_ROOM,
};
pub use files::{delete_file, download_file, list_files, FileRecord};
pub use stats::{fetch_stats, MostDownloaded, ServerStats};
pub use status::{fetch_status, ServerStatus, StatusHint};
