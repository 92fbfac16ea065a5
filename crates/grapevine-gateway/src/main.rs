use clap::Parser;
use grapevine_gateway::{daemon, http};
use grapevine_proto::config::Config;
use tracing::info;

/// HTTP gateway between Grapevine remotes and the daemon socket
#[derive(Parser, Debug)]
#[command(name = "grapevine-gateway", version, about)]
struct Args {
    /// Address to bind the HTTP server on
    #[arg(long)]
    bind: Option<String>,

    /// Port for the HTTP server
    #[arg(long)]
    port: Option<u16>,

    /// Daemon socket address, e.g. 127.0.0.1:6990 (skips discovery)
    #[arg(long)]
    daemon: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,grapevine_gateway=debug")),
        )
        .init();

    let config = Config::load()?;
    info!("Config loaded from: {:?}", Config::config_path());

    let gateway = config.gateway;
    let bind = args.bind.unwrap_or(gateway.bind_address);
    let port = args.port.unwrap_or(gateway.port);
    let daemon_addr = daemon::resolve_address(args.daemon, gateway.daemon_addr).await;

    http::start_server(&bind, port, daemon::DaemonSocket::new(daemon_addr)).await
}
