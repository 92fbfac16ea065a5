use anyhow::Context;
use axum::{
    extract::State,
    http::Method,
    response::Json,
    routing::{get, post, MethodRouter},
    Router,
};
use grapevine_proto::protocol::{ApiResponse, ControlIntent, DaemonCommand, DaemonPath, PathBody};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::daemon::DaemonSocket;

#[derive(Clone)]
struct HttpState {
    daemon: DaemonSocket,
}

/// Commands that carry no body.
const PLAIN: [ControlIntent; 7] = [
    ControlIntent::SkipNext,
    ControlIntent::ClearQueue,
    ControlIntent::Pause,
    ControlIntent::Play,
    ControlIntent::Shutdown,
    ControlIntent::ToggleLoopSong,
    ControlIntent::ToggleLoopQueue,
];

pub fn router(daemon: DaemonSocket) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    let mut api = Router::new()
        .route("/ping", get(ping))
        .route("/status", get(status))
        .route("/queue", post(add_song))
        .route("/playlist", post(add_playlist));
    for intent in PLAIN {
        api = api.route(intent.endpoint(), relay(intent.daemon_command()));
    }

    Router::new()
        .nest("/api", api)
        .with_state(HttpState { daemon })
        .layer(cors)
}

/// Bind and serve until the server stops.  A bind failure is returned to the
/// caller.
pub async fn start_server(
    bind_address: &str,
    port: u16,
    daemon: DaemonSocket,
) -> anyhow::Result<()> {
    let addr = format!("{}:{}", bind_address, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind HTTP gateway to {}", addr))?;

    info!("HTTP gateway listening on http://{}", addr);

    axum::serve(listener, router(daemon)).await.map_err(|e| {
        error!("HTTP gateway error: {}", e);
        anyhow::Error::from(e)
    })
}

/// POST route relaying one fixed command.
fn relay(cmd: DaemonCommand) -> MethodRouter<HttpState> {
    post(move |State(state): State<HttpState>| {
        let cmd = cmd.clone();
        async move {
            info!("HTTP API: {:?}", cmd.command);
            Json(state.daemon.send(&cmd).await)
        }
    })
}

async fn ping(State(state): State<HttpState>) -> Json<ApiResponse> {
    Json(ApiResponse::ok_with(
        serde_json::json!({ "daemon": state.daemon.addr() }),
    ))
}

async fn status(State(state): State<HttpState>) -> Json<ApiResponse> {
    Json(state.daemon.send(&DaemonCommand::status()).await)
}

async fn add_song(State(state): State<HttpState>, Json(body): Json<PathBody>) -> Json<ApiResponse> {
    enqueue(&state, body, ControlIntent::EnqueueSong).await
}

async fn add_playlist(
    State(state): State<HttpState>,
    Json(body): Json<PathBody>,
) -> Json<ApiResponse> {
    enqueue(&state, body, ControlIntent::EnqueuePlaylist).await
}

async fn enqueue(
    state: &HttpState,
    body: PathBody,
    intent: fn(DaemonPath) -> ControlIntent,
) -> Json<ApiResponse> {
    let Some(path) = DaemonPath::new(body.path) else {
        return Json(ApiResponse::err("path must not be empty"));
    };
    let cmd = intent(path).daemon_command();
    info!("HTTP API: {:?} {:?}", cmd.command, cmd.payload);
    Json(state.daemon.send(&cmd).await)
}
