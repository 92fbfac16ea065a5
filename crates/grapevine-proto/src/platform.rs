use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Ports the daemon tries to bind, in order.  The gateway probes the same
/// range when no address is configured.
pub const DAEMON_PORT_RANGE: RangeInclusive<u16> = 6990..=7000;

const DAEMON_TCP_HOST: &str = "127.0.0.1";

/// Environment variable that pins the daemon address for the gateway.
pub const DAEMON_ADDR_ENV: &str = "GRAPEVINED_ADDR";

pub fn daemon_address(port: u16) -> String {
    format!("{}:{}", DAEMON_TCP_HOST, port)
}

/// Address used when neither configuration nor discovery produced one.
pub fn fallback_daemon_address() -> String {
    daemon_address(*DAEMON_PORT_RANGE.start())
}

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/grapevine/ (XDG standard)
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join("grapevine")
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("grapevine")
    }
}

pub fn config_dir() -> PathBuf {
    // On Windows, check for portable config.toml in executable directory first
    #[cfg(windows)]
    {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let portable_config = exe_dir.join("config.toml");
                if portable_config.exists() {
                    return exe_dir.to_path_buf();
                }
            }
        }
    }

    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("grapevine")
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("grapevine")
    }
}

pub fn temp_dir() -> PathBuf {
    std::env::temp_dir()
}
