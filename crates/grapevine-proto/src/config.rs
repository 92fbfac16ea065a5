use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// API root of the gateway.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// How long a command result stays on screen.
    #[serde(default = "default_message_duration_ms")]
    pub message_duration_ms: u64,
    /// Re-read `/status` this often.  0 = only at startup.
    #[serde(default)]
    pub status_poll_secs: u64,
    /// Per-request timeout.  0 = none.
    #[serde(default)]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Fixed daemon socket address.  Unset = probe the daemon port range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daemon_addr: Option<String>,
}

impl RemoteConfig {
    pub fn message_duration(&self) -> Duration {
        Duration::from_millis(self.message_duration_ms)
    }

    pub fn status_poll_interval(&self) -> Option<Duration> {
        (self.status_poll_secs > 0).then(|| Duration::from_secs(self.status_poll_secs))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            message_duration_ms: default_message_duration_ms(),
            status_poll_secs: 0,
            request_timeout_ms: 0,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            daemon_addr: None,
        }
    }
}

fn default_base_url() -> String {
    format!("http://{}:{}/api", default_bind_address(), default_port())
}

fn default_message_duration_ms() -> u64 {
    1800
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Read `path`, writing the defaults there first if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.remote.base_url, "http://127.0.0.1:8080/api");
        assert_eq!(config.remote.message_duration(), Duration::from_millis(1800));
        assert_eq!(config.remote.status_poll_interval(), None);
        assert_eq!(config.remote.request_timeout(), None);
        assert_eq!(config.gateway.port, 8080);
        assert!(config.gateway.daemon_addr.is_none());
    }

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.gateway.bind_address, "127.0.0.1");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[remote]\nstatus_poll_secs = 5\n\n[gateway]\ndaemon_addr = \"127.0.0.1:6995\"\n",
        )
        .unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.remote.status_poll_interval(), Some(Duration::from_secs(5)));
        assert_eq!(config.remote.message_duration_ms, 1800);
        assert_eq!(config.gateway.daemon_addr.as_deref(), Some("127.0.0.1:6995"));
        assert_eq!(config.gateway.port, 8080);
    }
}
