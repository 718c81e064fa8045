//! Minimal HTTP/1.1 stand-in for the FreeBox API, for integration tests.
//!
//! Serves status, upload (multipart), file list, delete, download, stats
//! and chat from memory. One thread per connection; every response closes the
//! connection. Tracks how many uploads are being handled at once.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// `recommended_concurrent_uploads` in the status response.
    pub recommended: Option<usize>,
    /// Delay before answering `/api/status`.
    pub status_delay: Duration,
    /// Time each upload is held open before the response.
    pub upload_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: i64,
    pub original: String,
    pub custom_filename: Option<String>,
    pub description: Option<String>,
    pub data: Vec<u8>,
}

impl StoredFile {
    pub fn display_name(&self) -> &str {
        self.custom_filename.as_deref().unwrap_or(&self.original)
    }
}

#[derive(Default)]
struct State {
    files: Mutex<Vec<StoredFile>>,
    next_id: AtomicI64,
    messages: Mutex<Vec<Value>>,
    next_message_id: AtomicI64,
    active_uploads: AtomicUsize,
    max_active_uploads: AtomicUsize,
}

pub struct UploadServer {
    pub base: String,
    state: Arc<State>,
}

impl UploadServer {
    pub fn files(&self) -> Vec<StoredFile> {
        self.state.files.lock().unwrap().clone()
    }

    /// Chat messages in the order they were posted.
    pub fn messages(&self) -> Vec<Value> {
        self.state.messages.lock().unwrap().clone()
    }

    /// Highest number of uploads handled concurrently so far.
    pub fn max_active_uploads(&self) -> usize {
        self.state.max_active_uploads.load(Ordering::SeqCst)
    }
}

/// Starts the server on a background thread. Runs until the process exits.
pub fn start(opts: ServerOptions) -> UploadServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(State {
        next_id: AtomicI64::new(1),
        next_message_id: AtomicI64::new(1),
        ..State::default()
    });
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            let opts = opts.clone();
            thread::spawn(move || handle(stream, &state, &opts));
        }
    });
    UploadServer {
        base: format!("http://127.0.0.1:{}/", port),
        state,
    }
}

/// A base URL nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

struct Request {
    method: String,
    path: String,
    headers: String,
    body: Vec<u8>,
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Some(Request {
        method,
        path,
        headers: head,
        body,
    })
}

fn handle(mut stream: TcpStream, state: &State, opts: &ServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };
    let (path, query) = match req.path.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (req.path.clone(), String::new()),
    };

    let (code, body): (u16, Vec<u8>) = match (req.method.as_str(), path.as_str()) {
        ("GET", "/api/status") => {
            thread::sleep(opts.status_delay);
            let mut status = json!({"status": "online", "name": "FreeBox", "mode": "test"});
            if let Some(n) = opts.recommended {
                status["recommended_concurrent_uploads"] = json!(n);
            }
            (200, status.to_string().into_bytes())
        }
        ("POST", "/api/upload") => upload(&req, state, opts),
        ("GET", "/api/files") => {
            let files = state.files.lock().unwrap();
            let list: Vec<Value> = files.iter().map(record).collect();
            (200, Value::Array(list).to_string().into_bytes())
        }
        ("GET", "/api/stats") => {
            let files = state.files.lock().unwrap();
            let stored: usize = files.iter().map(|f| f.data.len()).sum();
            let stats = json!({
                "uptime_seconds": 42, "visitors_count": 1, "files_count": files.len(),
                "messages_count": 0, "total_storage": stored, "total_downloads": 0,
                "total_files_uploaded": files.len(), "most_downloaded": null
            });
            (200, stats.to_string().into_bytes())
        }
        ("DELETE", p) if p.starts_with("/api/files/") => {
            let id: i64 = p["/api/files/".len()..].parse().unwrap_or(-1);
            let mut files = state.files.lock().unwrap();
            match files.iter().position(|f| f.id == id) {
                Some(pos) => {
                    files.remove(pos);
                    (200, json!({"success": true}).to_string().into_bytes())
                }
                None => (
                    404,
                    json!({"success": false, "error": "File not found"})
                        .to_string()
                        .into_bytes(),
                ),
            }
        }
        ("GET", "/api/chat/messages") => {
            let room = query_param(&query, "room").unwrap_or_else(|| "main".into());
            let limit: usize = query_param(&query, "limit")
                .and_then(|l| l.parse().ok())
                .unwrap_or(50);
            let messages = state.messages.lock().unwrap();
            let recent: Vec<Value> = messages
                .iter()
                .rev()
                .filter(|m| m["room"] == room.as_str())
                .take(limit)
                .cloned()
                .collect();
            (200, Value::Array(recent).to_string().into_bytes())
        }
        ("POST", "/api/chat/messages") => post_message(&req, state),
        ("GET", "/api/chat/rooms") => {
            let rooms = json!([{
                "id": "main", "name": "Main Room", "description": "The main FreeBox chat room"
            }]);
            (200, rooms.to_string().into_bytes())
        }
        ("GET", p) if p.starts_with("/api/download/") => {
            let id: i64 = p["/api/download/".len()..].parse().unwrap_or(-1);
            let files = state.files.lock().unwrap();
            match files.iter().find(|f| f.id == id) {
                Some(f) => (200, f.data.clone()),
                None => (404, b"not found".to_vec()),
            }
        }
        _ => (404, b"not found".to_vec()),
    };
    respond(&mut stream, code, &body);
}

fn upload(req: &Request, state: &State, opts: &ServerOptions) -> (u16, Vec<u8>) {
    let now = state.active_uploads.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_active_uploads.fetch_max(now, Ordering::SeqCst);
    thread::sleep(opts.upload_delay);
    let result = store(req, state);
    state.active_uploads.fetch_sub(1, Ordering::SeqCst);
    result
}

fn store(req: &Request, state: &State) -> (u16, Vec<u8>) {
    if !req.headers.to_ascii_lowercase().contains("multipart/form-data") {
        return failure(400, "No file part");
    }
    let Some((original, data)) = file_part(&req.body) else {
        return failure(400, "No file part");
    };
    if original.contains("reject") {
        return failure(500, "Disk full");
    }
    let text = |name: &str| {
        field(&req.body, name)
            .map(|v| String::from_utf8_lossy(&v).trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let file = StoredFile {
        id: state.next_id.fetch_add(1, Ordering::SeqCst),
        original,
        custom_filename: text("custom_filename"),
        description: text("description"),
        data,
    };
    let body = json!({"success": true, "file": record(&file)}).to_string();
    state.files.lock().unwrap().push(file);
    (200, body.into_bytes())
}

fn post_message(req: &Request, state: &State) -> (u16, Vec<u8>) {
    let Ok(data) = serde_json::from_slice::<Value>(&req.body) else {
        return failure(400, "No data provided");
    };
    let text = data["message"].as_str().unwrap_or("");
    if text.trim().is_empty() {
        return failure(400, "Message cannot be empty");
    }
    let id = state.next_message_id.fetch_add(1, Ordering::SeqCst);
    let message = json!({
        "id": id,
        "username": data["username"].as_str().unwrap_or("Anonymous"),
        "message": text,
        "room": data["room"].as_str().unwrap_or("main"),
        "timestamp": 1_700_000_000.0 + id as f64,
    });
    state.messages.lock().unwrap().push(message.clone());
    (
        200,
        json!({"success": true, "message": message}).to_string().into_bytes(),
    )
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

fn record(f: &StoredFile) -> Value {
    json!({
        "id": f.id,
        "filename": f.display_name(),
        "size": f.data.len(),
        "mime_type": null,
        "created_at": 1_700_000_000.0,
        "download_count": 0,
        "description": f.description,
    })
}

fn failure(code: u16, error: &str) -> (u16, Vec<u8>) {
    (
        code,
        json!({"success": false, "error": error}).to_string().into_bytes(),
    )
}

fn respond(stream: &mut TcpStream, code: u16, body: &[u8]) {
    let reason = match code {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "Internal Server Error",
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        code,
        reason,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

/// Data of the multipart part named `name`.
fn field(body: &[u8], name: &str) -> Option<Vec<u8>> {
    let marker = format!("name=\"{}\"", name);
    let start = find(body, marker.as_bytes())?;
    part_data(body, start)
}

/// Filename and data of the `file` part.
fn file_part(body: &[u8]) -> Option<(String, Vec<u8>)> {
    let start = find(body, b"name=\"file\"")?;
    let rest = &body[start..];
    let fname_at = find(rest, b"filename=\"")? + "filename=\"".len();
    let fname_len = find(&rest[fname_at..], b"\"")?;
    let filename = String::from_utf8_lossy(&rest[fname_at..fname_at + fname_len]).into_owned();
    Some((filename, part_data(body, start)?))
}

fn part_data(body: &[u8], header_at: usize) -> Option<Vec<u8>> {
    let rest = &body[header_at..];
    let data_at = find(rest, b"\r\n\r\n")? + 4;
    let data = &rest[data_at..];
    let end = find(data, b"\r\n--")?;
    Some(data[..end].to_vec())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
