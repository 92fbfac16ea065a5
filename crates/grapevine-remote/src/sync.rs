//! Control-state synchronizer: the only writer of `PlaybackBelief`.
//!
//! Every state-affecting intent flips its field locally before the request
//! goes out, so the UI reacts with zero latency.  The request outcome then
//! either confirms the guess or rolls it back.
//!
//! # Per-field states
//! ```text
//!  Idle                    nothing in flight for this field
//!  Pending { seq, prior }  optimistic value shown, request in flight
//! ```
//!
//! Fields are tracked independently; a pending pause never blocks a loop
//! toggle.  Same-field intents are not deduplicated.  Each dispatch takes a
//! fresh sequence number and only the outcome carrying the field's latest
//! number may touch the belief: the last *dispatched* intent wins, older
//! outcomes are stale.  A status snapshot overwrites the fields it reports
//! and retires whatever was in flight for them.

use grapevine_proto::protocol::{CommandOutcome, ControlIntent, StatusSnapshot};
use tracing::debug;

/// The client's local picture of daemon transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackBelief {
    pub playing: bool,
    pub loop_song: bool,
    pub loop_queue: bool,
}

impl Default for PlaybackBelief {
    fn default() -> Self {
        Self {
            playing: true,
            loop_song: false,
            loop_queue: false,
        }
    }
}

impl PlaybackBelief {
    fn get(&self, field: BeliefField) -> bool {
        match field {
            BeliefField::Playing => self.playing,
            BeliefField::LoopSong => self.loop_song,
            BeliefField::LoopQueue => self.loop_queue,
        }
    }

    fn set(&mut self, field: BeliefField, value: bool) {
        match field {
            BeliefField::Playing => self.playing = value,
            BeliefField::LoopSong => self.loop_song = value,
            BeliefField::LoopQueue => self.loop_queue = value,
        }
    }
}

/// The intent that flips `playing`: pause while playing, resume otherwise.
pub fn play_pause(playing: bool) -> ControlIntent {
    if playing {
        ControlIntent::Pause
    } else {
        ControlIntent::Play
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeliefField {
    Playing,
    LoopSong,
    LoopQueue,
}

impl BeliefField {
    const ALL: [BeliefField; 3] = [Self::Playing, Self::LoopSong, Self::LoopQueue];

    /// The field an intent mutates, if any.
    pub fn of(intent: &ControlIntent) -> Option<Self> {
        match intent {
            ControlIntent::Play | ControlIntent::Pause => Some(Self::Playing),
            ControlIntent::ToggleLoopSong => Some(Self::LoopSong),
            ControlIntent::ToggleLoopQueue => Some(Self::LoopQueue),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Playing => 0,
            Self::LoopSong => 1,
            Self::LoopQueue => 2,
        }
    }
}

/// Receipt for one optimistic transition; handed back with the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    field: BeliefField,
    seq: u64,
}

impl Ticket {
    pub fn field(&self) -> BeliefField {
        self.field
    }
}

/// What `resolve` did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Intent had no belief field.
    Stateless,
    /// Latest dispatch succeeded; optimistic value kept.
    Confirmed,
    /// Latest dispatch failed; field restored.
    RolledBack,
    /// A newer dispatch or a snapshot superseded this one.
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    seq: u64,
    prior: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct FieldTrack {
    /// Sequence number of the newest dispatch or snapshot for this field.
    latest: u64,
    pending: Option<Pending>,
}

#[derive(Debug, Default)]
pub struct Synchronizer {
    belief: PlaybackBelief,
    tracks: [FieldTrack; 3],
    next_seq: u64,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only copy of the current belief.
    pub fn belief(&self) -> PlaybackBelief {
        self.belief
    }

    pub fn is_pending(&self, field: BeliefField) -> bool {
        self.tracks[field.index()].pending.is_some()
    }

    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Apply the optimistic transition for `intent`.  Returns the ticket to
    /// pass to `resolve`, or `None` for intents that touch no field.
    pub fn begin(&mut self, intent: &ControlIntent) -> Option<Ticket> {
        let field = BeliefField::of(intent)?;
        let prior = self.belief.get(field);
        let next = match intent {
            ControlIntent::Play => true,
            ControlIntent::Pause => false,
            _ => !prior,
        };
        let seq = self.bump();
        self.belief.set(field, next);
        self.tracks[field.index()] = FieldTrack {
            latest: seq,
            pending: Some(Pending { seq, prior }),
        };
        debug!("{:?}: {} -> {} (seq {})", field, prior, next, seq);
        Some(Ticket { field, seq })
    }

    /// Reconcile the outcome of a dispatch started with `begin`.
    pub fn resolve(&mut self, ticket: Option<Ticket>, outcome: &CommandOutcome) -> Resolution {
        let Some(ticket) = ticket else {
            return Resolution::Stateless;
        };
        let track = &mut self.tracks[ticket.field.index()];
        let pending = match track.pending {
            Some(p) if p.seq == ticket.seq && track.latest == ticket.seq => p,
            _ => {
                debug!("{:?}: dropping stale outcome (seq {})", ticket.field, ticket.seq);
                return Resolution::Stale;
            }
        };
        track.pending = None;
        match outcome {
            CommandOutcome::Success => Resolution::Confirmed,
            CommandOutcome::Failure(_) => {
                self.belief.set(ticket.field, pending.prior);
                debug!("{:?}: rolled back to {}", ticket.field, pending.prior);
                Resolution::RolledBack
            }
        }
    }

    /// Overwrite every field the daemon reported.  Returns `true` if the
    /// visible belief changed.
    pub fn apply_snapshot(&mut self, snapshot: &StatusSnapshot) -> bool {
        let before = self.belief;
        for field in BeliefField::ALL {
            let reported = match field {
                BeliefField::Playing => snapshot.playing,
                BeliefField::LoopSong => snapshot.loop_song,
                BeliefField::LoopQueue => snapshot.loop_queue,
            };
            if let Some(value) = reported {
                let seq = self.bump();
                self.belief.set(field, value);
                self.tracks[field.index()] = FieldTrack {
                    latest: seq,
                    pending: None,
                };
            }
        }
        self.belief != before
    }
}
