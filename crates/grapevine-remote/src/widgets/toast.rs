//! Transient command feedback: one message at a time.
//!
//! Every outcome replaces the visible message and restarts its timer.  The
//! clear is a deferred task tagged with the generation it belongs to; showing
//! a new message aborts the old task, and an expiry for any generation other
//! than the current one is ignored.

use std::time::Duration;

use grapevine_proto::protocol::CommandOutcome;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use tokio::task::JoinHandle;

use crate::theme::{C_TOAST_ERROR, C_TOAST_SUCCESS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug)]
struct Message {
    text: String,
    severity: Severity,
}

pub struct MessageSlot {
    current: Option<Message>,
    generation: u64,
    duration: Duration,
    pending_clear: Option<JoinHandle<()>>,
}

impl MessageSlot {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: None,
            generation: 0,
            duration,
            pending_clear: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Replace the visible message with the text for `outcome`.  Returns the
    /// generation the deferred clear must carry.
    pub fn show(&mut self, outcome: &CommandOutcome) -> u64 {
        let severity = if outcome.is_success() {
            Severity::Success
        } else {
            Severity::Error
        };
        self.generation += 1;
        self.current = Some(Message {
            text: outcome.message().to_string(),
            severity,
        });
        self.generation
    }

    /// Install the deferred clear for the current generation, cancelling the
    /// previous one.
    pub fn arm(&mut self, clear: JoinHandle<()>) {
        if let Some(old) = self.pending_clear.replace(clear) {
            old.abort();
        }
    }

    /// Deferred clear fired.  Returns `true` if the message was removed.
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.current.is_none() {
            return false;
        }
        self.current = None;
        self.pending_clear = None;
        true
    }

    pub fn text(&self) -> Option<&str> {
        self.current.as_ref().map(|m| m.text.as_str())
    }

    /// Render the message in the top-right corner of `area`.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let Some(msg) = &self.current else {
            return;
        };
        let max_width = (area.width / 2).clamp(30, 60).min(area.width);
        // Daemon error text is unbounded; size in usize before narrowing.
        let w = (msg.text.chars().count() + 4).min(max_width as usize) as u16;
        let x = area.x + area.width.saturating_sub(w + 1);
        let toast_area = Rect {
            x,
            y: area.y,
            width: w,
            height: 1,
        };

        let (color, icon) = match msg.severity {
            Severity::Success => (C_TOAST_SUCCESS, "✓"),
            Severity::Error => (C_TOAST_ERROR, "✗"),
        };

        frame.render_widget(Clear, toast_area);
        let paragraph = Paragraph::new(Line::from(vec![Span::styled(
            format!(" {} {} ", icon, &msg.text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )]));
        frame.render_widget(paragraph, toast_area);
    }
}
