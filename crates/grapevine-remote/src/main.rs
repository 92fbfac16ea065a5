mod action;
mod app;
mod app_state;
mod component;
mod components;
mod focus;
mod keymap;
mod sync;
mod theme;
mod widgets;

use clap::Parser;
use grapevine_proto::{client::DaemonClient, config::Config, platform};

/// Terminal remote for the Grapevine music daemon
#[derive(Parser, Debug)]
#[command(name = "grapevine", version, about)]
struct Args {
    /// API root of the gateway (overrides the config file)
    #[arg(long)]
    base_url: Option<String>,

    /// Re-read daemon status every N seconds; 0 reads it only at startup
    #[arg(long)]
    poll: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data_dir = platform::data_dir();
    let log_dir = if std::fs::create_dir_all(&data_dir).is_ok() {
        data_dir
    } else {
        platform::temp_dir()
    };
    let log_path = log_dir.join("remote.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals (hyper_util, reqwest).
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("grapevine log: {}", log_path.display());

    // ── Load config ──────────────────────────────────────────────────────────
    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("config unreadable, using defaults: {:#}", e);
        Config::default()
    });
    if let Some(base_url) = args.base_url {
        config.remote.base_url = base_url;
    }
    if let Some(poll) = args.poll {
        config.remote.status_poll_secs = poll;
    }

    tracing::info!("grapevine remote starting…");

    let client = DaemonClient::new(&config.remote.base_url, config.remote.request_timeout())?;
    app::App::new(client, &config.remote).run().await
}
