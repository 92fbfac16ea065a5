//! AppState: read-only data handed to components each frame.
//!
//! Components never see the `Synchronizer` itself; the App copies what they
//! need here after every message.

use crate::sync::{BeliefField, PlaybackBelief, Synchronizer};

/// What the startup ping found out about the daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DaemonLink {
    #[default]
    Probing,
    Linked(String),
    Unreachable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PendingFields {
    playing: bool,
    loop_song: bool,
    loop_queue: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub belief: PlaybackBelief,
    pending: PendingFields,
    pub daemon: DaemonLink,
    /// The path field holds something an enqueue button can send.
    pub path_ready: bool,
}

impl AppState {
    /// Re-copy belief and in-flight flags from the synchronizer.
    pub fn observe(&mut self, sync: &Synchronizer) {
        self.belief = sync.belief();
        self.pending = PendingFields {
            playing: sync.is_pending(BeliefField::Playing),
            loop_song: sync.is_pending(BeliefField::LoopSong),
            loop_queue: sync.is_pending(BeliefField::LoopQueue),
        };
    }

    pub fn is_pending(&self, field: BeliefField) -> bool {
        match field {
            BeliefField::Playing => self.pending.playing,
            BeliefField::LoopSong => self.pending.loop_song,
            BeliefField::LoopQueue => self.pending.loop_queue,
        }
    }

    pub fn any_pending(&self) -> bool {
        self.pending != PendingFields::default()
    }
}
