use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Concurrency used when the server gives no hint.
pub const DEFAULT_CONCURRENT_UPLOADS: usize = 3;

/// Per-transfer curl limits (optional section in config.toml).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Seconds allowed for the TCP/TLS connect.
    pub connect_timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/s for `low_speed_time_secs`.
    pub low_speed_limit: u32,
    pub low_speed_time_secs: u64,
    /// Hard cap on a single upload, so a stuck transfer eventually fails.
    pub max_transfer_secs: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit: 1024,
            low_speed_time_secs: 60,
            max_transfer_secs: 3600,
        }
    }
}

impl TransferConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn low_speed_time(&self) -> Duration {
        Duration::from_secs(self.low_speed_time_secs)
    }

    pub fn max_transfer(&self) -> Duration {
        Duration::from_secs(self.max_transfer_secs)
    }
}

/// Global configuration loaded from `~/.config/freebox/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeboxConfig {
    /// Base URL of the FreeBox server (the CLI `--server` flag overrides it).
    pub server_url: String,
    /// Upload window used when `/api/status` gives no `recommended_concurrent_uploads`.
    #[serde(default = "default_concurrent_uploads")]
    pub default_concurrent_uploads: usize,
    /// Upper bound on the status query made before each batch.
    #[serde(default = "default_status_timeout_secs")]
    pub status_timeout_secs: u64,
    /// Page size for `freebox list` when `--limit` is not given.
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
    /// Optional transfer limits; if missing, built-in defaults are used.
    #[serde(default)]
    pub transfer: Option<TransferConfig>,
}

fn default_concurrent_uploads() -> usize {
    DEFAULT_CONCURRENT_UPLOADS
}

fn default_status_timeout_secs() -> u64 {
    3
}

fn default_list_limit() -> u32 {
    100
}

impl Default for FreeboxConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000/".to_string(),
            default_concurrent_uploads: default_concurrent_uploads(),
            status_timeout_secs: default_status_timeout_secs(),
            list_limit: default_list_limit(),
            transfer: None,
        }
    }
}

impl FreeboxConfig {
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs.max(1))
    }

    pub fn transfer(&self) -> TransferConfig {
        self.transfer.unwrap_or_default()
    }

    /// Parsed server URL. A missing trailing slash is added so endpoint joins keep the path prefix.
    pub fn server(&self) -> Result<Url> {
        parse_server_url(&self.server_url)
    }
}

/// Parse a server base URL, normalizing it to end in `/`.
pub fn parse_server_url(raw: &str) -> Result<Url> {
    let mut s = raw.trim().to_string();
    if !s.ends_with('/') {
        s.push('/');
    }
    let url = Url::parse(&s).with_context(|| format!("invalid server URL: {raw}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => anyhow::bail!("unsupported scheme {other:?} in server URL {raw}"),
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("freebox")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FreeboxConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FreeboxConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: FreeboxConfig =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = FreeboxConfig::default();
        assert_eq!(cfg.default_concurrent_uploads, 3);
        assert_eq!(cfg.status_timeout_secs, 3);
        assert_eq!(cfg.list_limit, 100);
        assert!(cfg.transfer.is_none());
        assert_eq!(cfg.transfer().connect_timeout_secs, 30);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = FreeboxConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: FreeboxConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.server_url, cfg.server_url);
        assert_eq!(parsed.default_concurrent_uploads, cfg.default_concurrent_uploads);
        assert_eq!(parsed.status_timeout_secs, cfg.status_timeout_secs);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            server_url = "http://10.0.0.1:8080"
            default_concurrent_uploads = 5
            status_timeout_secs = 1

            [transfer]
            connect_timeout_secs = 5
            low_speed_limit = 10
            low_speed_time_secs = 20
            max_transfer_secs = 600
        "#;
        let cfg: FreeboxConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.default_concurrent_uploads, 5);
        assert_eq!(cfg.list_limit, 100, "list_limit falls back to default");
        let transfer = cfg.transfer();
        assert_eq!(transfer.connect_timeout(), Duration::from_secs(5));
        assert_eq!(transfer.low_speed_limit, 10);
        assert_eq!(transfer.max_transfer(), Duration::from_secs(600));
        assert_eq!(cfg.server().unwrap().as_str(), "http://10.0.0.1:8080/");
    }

    #[test]
    fn config_toml_only_server_url() {
        let cfg: FreeboxConfig = toml::from_str(r#"server_url = "http://box.local:5000""#).unwrap();
        assert_eq!(cfg.default_concurrent_uploads, DEFAULT_CONCURRENT_UPLOADS);
        assert_eq!(cfg.status_timeout_secs, 3);
        assert_eq!(cfg.list_limit, 100);
        assert!(cfg.transfer.is_none());
    }

    #[test]
    fn status_timeout_never_zero() {
        let cfg = FreeboxConfig {
            status_timeout_secs: 0,
            ..FreeboxConfig::default()
        };
        assert_eq!(cfg.status_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn server_url_keeps_path_prefix() {
        let url = parse_server_url("http://box.local/freebox").unwrap();
        assert_eq!(url.join("api/upload").unwrap().as_str(), "http://box.local/freebox/api/upload");
    }

    #[test]
    fn server_url_rejects_other_schemes() {
        assert!(parse_server_url("ftp://box.local/").is_err());
        assert!(parse_server_url("not a url").is_err());
    }
}
