//! Chat over plain REST: recent messages, posting, room list.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use super::http::{self, API_TIMEOUT};

/// Room used when none is given.
pub const DEFAULT_ROOM: &str = "main";
/// Name the server records when a message has no username.
pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub username: String,
    pub message: String,
    pub room: String,
    /// Unix timestamp (seconds, fractional).
    #[serde(default)]
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
struct NewMessage<'a> {
    username: &'a str,
    message: &'a str,
    room: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<ChatMessage>,
}

/// Up to `limit` recent messages of `room`, newest first.
pub fn fetch_messages(server: &Url, room: &str, limit: u32) -> Result<Vec<ChatMessage>> {
    let mut url = server
        .join("api/chat/messages")
        .context("building chat URL")?;
    url.query_pairs_mut()
        .append_pair("room", room)
        .append_pair("limit", &limit.to_string());
    http::get_json(&url, API_TIMEOUT)
}

/// Post `message` to `room` and return it as the server stored it.
/// `username` falls back to [`ANONYMOUS`].
pub fn post_message(
    server: &Url,
    username: Option<&str>,
    message: &str,
    room: &str,
) -> Result<ChatMessage> {
    let url = server
        .join("api/chat/messages")
        .context("building chat URL")?;
    let body = NewMessage {
        username: sender_name(username),
        message,
        room,
    };
    let response = http::post_json(&url, &body, API_TIMEOUT)?;
    check_post(response.code, &response.body).context("failed to send chat message")
}

pub fn list_rooms(server: &Url) -> Result<Vec<ChatRoom>> {
    let url = server.join("api/chat/rooms").context("building rooms URL")?;
    http::get_json(&url, API_TIMEOUT)
}

fn sender_name(username: Option<&str>) -> &str {
    username.filter(|u| !u.trim().is_empty()).unwrap_or(ANONYMOUS)
}

fn check_post(code: u32, body: &[u8]) -> Result<ChatMessage> {
    match serde_json::from_slice::<PostResponse>(body) {
        Ok(r) if r.success && (200..300).contains(&code) => r
            .message
            .context("server accepted the message but did not echo it"),
        Ok(r) => anyhow::bail!(r.error.unwrap_or_else(|| format!("HTTP {code}"))),
        Err(_) => anyhow::bail!("HTTP {code}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_message_list() {
        let body = r#"[
            {"id": 9, "username": "ana", "message": "hi", "room": "main", "timestamp": 1700000100.25},
            {"id": 8, "username": "Anonymous", "message": "first", "room": "main", "timestamp": 1700000000.0}
        ]"#;
        let messages: Vec<ChatMessage> = serde_json::from_str(body).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, 9);
        assert_eq!(messages[0].timestamp, 1700000100.25);
        assert_eq!(messages[1].username, "Anonymous");
    }

    #[test]
    fn parse_rooms() {
        let body = r#"[{"id": "main", "name": "Main Room", "description": "The main FreeBox chat room"}]"#;
        let rooms: Vec<ChatRoom> = serde_json::from_str(body).unwrap();
        assert_eq!(rooms[0].id, DEFAULT_ROOM);
        assert_eq!(rooms[0].name, "Main Room");
    }

    #[test]
    fn post_success_returns_stored_message() {
        let body = br#"{"success": true, "message":
            {"id": 3, "username": "bo", "message": "yo", "room": "main", "timestamp": 1.5}}"#;
        let msg = check_post(200, body).unwrap();
        assert_eq!(msg.id, 3);
        assert_eq!(msg.message, "yo");
    }

    #[test]
    fn post_failures_surface_server_error() {
        let err = check_post(400, br#"{"success": false, "error": "Message cannot be empty"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Message cannot be empty");
        let err = check_post(500, b"Internal Server Error").unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500");
        assert!(check_post(200, br#"{"success": true}"#).is_err());
    }

    #[test]
    fn blank_username_is_sent_as_anonymous() {
        assert_eq!(sender_name(None), ANONYMOUS);
        assert_eq!(sender_name(Some("  ")), ANONYMOUS);
        assert_eq!(sender_name(Some("ana")), "ana");
        let body = NewMessage {
            username: sender_name(None),
            message: "x",
            room: DEFAULT_ROOM,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["username"], "Anonymous");
        assert_eq!(json["room"], "main");
    }
}
