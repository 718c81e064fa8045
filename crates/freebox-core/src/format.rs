//! Human-readable formatting for sizes, uptimes, progress and chat lines.

use crate::api::ChatMessage;
use crate::batch::file_extension;
use crate::coordinator::BatchProgress;

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg", ".ico"];
const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".webm", ".ogg", ".mov", ".avi", ".wmv", ".mkv", ".flv", ".m4v", ".3gp",
];
const TEXT_EXTENSIONS: &[&str] = &[
    ".txt", ".md", ".js", ".html", ".css", ".json", ".xml", ".csv", ".py", ".c", ".cpp", ".h",
    ".java", ".php", ".rb", ".pl", ".sh", ".log", ".ini", ".cfg", ".conf", ".yml", ".yaml",
    ".toml", ".jsx", ".ts", ".tsx", ".vue", ".sql", ".gitignore", ".env", ".bat",
];

/// `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`: base 1024, at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// `1d 2h 3m 4s`; leading zero units are dropped, seconds always shown.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = secs % 86_400 / 3600;
    let minutes = secs % 3600 / 60;
    let seconds = secs % 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days}d "));
    }
    if days > 0 || hours > 0 {
        out.push_str(&format!("{hours}h "));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m "));
    }
    out.push_str(&format!("{seconds}s"));
    out
}

/// One-line progress summary: `42%  3 of 5 files  (photo.jpg)`.
pub fn format_progress(p: &BatchProgress) -> String {
    let pct = p.percent.round().min(100.0) as u32;
    let mut line = format!("{}%  {} of {} files", pct, p.completed(), p.total);
    if p.failed > 0 {
        line.push_str(&format!(", {} failed", p.failed));
    }
    if let Some(ref name) = p.current {
        line.push_str(&format!("  ({})", name));
    }
    line
}

/// `[14:05] ana: hello`; the clock is UTC.
pub fn format_chat_line(m: &ChatMessage) -> String {
    let secs = m.timestamp.max(0.0) as u64 % 86_400;
    format!(
        "[{:02}:{:02}] {}: {}",
        secs / 3600,
        secs % 3600 / 60,
        m.username,
        m.message
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Video,
    Text,
    Other,
}

impl FileKind {
    pub fn label(self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Video => "video",
            FileKind::Text => "text",
            FileKind::Other => "file",
        }
    }
}

/// Classify a file by extension (case-insensitive).
pub fn file_kind(name: &str) -> FileKind {
    let Some(ext) = file_extension(name) else {
        return FileKind::Other;
    };
    let ext = ext.to_ascii_lowercase();
    let ext = ext.as_str();
    if IMAGE_EXTENSIONS.contains(&ext) {
        FileKind::Image
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        FileKind::Video
    } else if TEXT_EXTENSIONS.contains(&ext) {
        FileKind::Text
    } else {
        FileKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
        assert_eq!(format_file_size(5 * 1024u64.pow(4)), "5 TB");
        assert_eq!(format_file_size(2048 * 1024u64.pow(4)), "2048 TB");
    }

    #[test]
    fn uptimes() {
        assert_eq!(format_uptime(0), "0s");
        assert_eq!(format_uptime(59), "59s");
        assert_eq!(format_uptime(61), "1m 1s");
        assert_eq!(format_uptime(3600), "1h 0m 0s");
        assert_eq!(format_uptime(93_784), "1d 2h 3m 4s");
    }

    #[test]
    fn progress_line() {
        let p = BatchProgress {
            percent: 41.6,
            total: 5,
            pending: 1,
            in_flight: 2,
            done: 1,
            failed: 1,
            current: Some("photo.jpg".into()),
            finished: false,
        };
        assert_eq!(format_progress(&p), "42%  2 of 5 files, 1 failed  (photo.jpg)");
    }

    #[test]
    fn chat_line() {
        let m = ChatMessage {
            id: 1,
            username: "ana".into(),
            message: "hello".into(),
            room: "main".into(),
            // 2023-11-14 22:13:20 UTC
            timestamp: 1_700_000_000.9,
        };
        assert_eq!(format_chat_line(&m), "[22:13] ana: hello");
    }

    #[test]
    fn file_kinds() {
        assert_eq!(file_kind("cat.JPG"), FileKind::Image);
        assert_eq!(file_kind("clip.mkv"), FileKind::Video);
        assert_eq!(file_kind("notes.toml"), FileKind::Text);
        assert_eq!(file_kind("archive.zip"), FileKind::Other);
        assert_eq!(file_kind("README"), FileKind::Other);
        assert_eq!(FileKind::Image.label(), "image");
    }
}
