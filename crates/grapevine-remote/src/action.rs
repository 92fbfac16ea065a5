//! Action enum: everything an input source can ask the app to do.

use grapevine_proto::protocol::ControlIntent;

/// Focusable panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    Controls,
    PathInput,
}

/// Which enqueue endpoint the path field feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTarget {
    Song,
    Playlist,
}

/// Keyboard and pointer handlers both produce Actions; the App applies them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Daemon ───────────────────────────────────────────────────────────────
    Issue(ControlIntent),
    /// Enqueue whatever the path field holds; nothing happens while it is empty.
    SubmitPath(PathTarget),

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPane(Pane),

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleHelp,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}
