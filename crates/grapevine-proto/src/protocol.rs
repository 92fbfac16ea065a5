use serde::{Deserialize, Serialize};

/// Message shown for every accepted command.
pub const SUCCESS_MARKER: &str = "OK";

/// Message used when the daemon rejects a command without saying why.
const DEFAULT_REJECTION: &str = "ERR";

/// A song or playlist path handed to the daemon.  Never empty; the daemon is
/// authoritative for everything else about the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonPath(String);

impl DaemonPath {
    /// Returns `None` for an empty string.
    pub fn new(path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        if path.is_empty() {
            None
        } else {
            Some(Self(path))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything the remote can ask the daemon to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlIntent {
    Play,
    Pause,
    SkipNext,
    ClearQueue,
    ToggleLoopSong,
    ToggleLoopQueue,
    Shutdown,
    EnqueueSong(DaemonPath),
    EnqueuePlaylist(DaemonPath),
}

impl ControlIntent {
    /// HTTP path of the endpoint, relative to the API base.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Play => "/resume",
            Self::Pause => "/pause",
            Self::SkipNext => "/skip",
            Self::ClearQueue => "/clear",
            Self::ToggleLoopSong => "/loop/song",
            Self::ToggleLoopQueue => "/loop/queue",
            Self::Shutdown => "/shutdown",
            Self::EnqueueSong(_) => "/queue",
            Self::EnqueuePlaylist(_) => "/playlist",
        }
    }

    /// JSON body sent with the request, if any.
    pub fn body(&self) -> Option<PathBody> {
        match self {
            Self::EnqueueSong(path) | Self::EnqueuePlaylist(path) => Some(PathBody {
                path: path.as_str().to_string(),
            }),
            _ => None,
        }
    }

    /// The command the gateway relays to the daemon socket for this intent.
    pub fn daemon_command(&self) -> DaemonCommand {
        let (command, payload) = match self {
            Self::Play => (CommandKind::Resume, None),
            Self::Pause => (CommandKind::Pause, None),
            Self::SkipNext => (CommandKind::Skip, None),
            Self::ClearQueue => (CommandKind::Clear, None),
            Self::ToggleLoopSong => (CommandKind::LoopSong, None),
            Self::ToggleLoopQueue => (CommandKind::LoopQueue, None),
            Self::Shutdown => (CommandKind::Shutdown, None),
            Self::EnqueueSong(path) => (CommandKind::AddQueue, Some(path.as_str().to_string())),
            Self::EnqueuePlaylist(path) => {
                (CommandKind::AddPlaylist, Some(path.as_str().to_string()))
            }
        };
        DaemonCommand { command, payload }
    }

    /// Short label for logs and the help line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::SkipNext => "skip",
            Self::ClearQueue => "clear",
            Self::ToggleLoopSong => "loop song",
            Self::ToggleLoopQueue => "loop queue",
            Self::Shutdown => "shutdown",
            Self::EnqueueSong(_) => "add song",
            Self::EnqueuePlaylist(_) => "add playlist",
        }
    }
}

/// Body of `/queue` and `/playlist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathBody {
    pub path: String,
}

/// Normalized result of dispatching one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    Failure(String),
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Text to show the user for this outcome.
    pub fn message(&self) -> &str {
        match self {
            Self::Success => SUCCESS_MARKER,
            Self::Failure(msg) => msg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ERR")]
    Err,
}

/// Response envelope shared by every endpoint.
///
/// The daemon writes its field names in upper case and the gateway relays
/// them untouched, so both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(alias = "STATUS")]
    pub status: ApiStatus,
    #[serde(alias = "ERRMSG", default, skip_serializing_if = "Option::is_none")]
    pub errmsg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            status: ApiStatus::Ok,
            errmsg: None,
            data: None,
        }
    }

    pub fn ok_with(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            ..Self::ok()
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Err,
            errmsg: Some(message.into()),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ApiStatus::Ok
    }

    /// The rejection text, falling back to a bare marker when the daemon
    /// sent none.
    pub fn rejection(&self) -> &str {
        self.errmsg.as_deref().unwrap_or(DEFAULT_REJECTION)
    }
}

/// The `data` payload of `/status`.  Each field is optional; a missing or
/// non-boolean field means "unknown" and leaves local belief untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_song: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_queue: Option<bool>,
}

impl StatusSnapshot {
    pub fn from_data(data: Option<&serde_json::Value>) -> Self {
        let field = |name: &str| data.and_then(|d| d.get(name)).and_then(|v| v.as_bool());
        Self {
            playing: field("playing"),
            loop_song: field("loop_song"),
            loop_queue: field("loop_queue"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.playing.is_none() && self.loop_song.is_none() && self.loop_queue.is_none()
    }
}

// ── Daemon socket wire format ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    Skip,
    Clear,
    Pause,
    Resume,
    Shutdown,
    AddQueue,
    LoopSong,
    LoopQueue,
    AddPlaylist,
    /// Not every daemon build knows this one; those close the connection
    /// without a reply.
    Status,
}

/// One command written to the daemon's TCP socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonCommand {
    pub command: CommandKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl DaemonCommand {
    pub fn status() -> Self {
        Self {
            command: CommandKind::Status,
            payload: None,
        }
    }
}
