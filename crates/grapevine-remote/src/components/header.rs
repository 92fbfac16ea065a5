//! Header component: 1-row top bar.
//!
//! Left: app title and the believed transport state.  Fields with a request
//! in flight are dimmed.  Right: which daemon the gateway talks to.
//!
//! Not focusable.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    app_state::{AppState, DaemonLink},
    component::Component,
    sync::BeliefField,
    theme::{
        style_muted, style_secondary, C_ACCENT, C_BADGE_ERR, C_BADGE_LIVE, C_BADGE_PENDING,
        C_PAUSED, C_PLAYING,
    },
};

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }
}

fn indicator(state: &AppState, field: BeliefField, text: String, color: Color) -> Span<'static> {
    let style = if state.is_pending(field) {
        style_muted()
    } else {
        Style::default().fg(color)
    };
    Span::styled(text, style)
}

fn loop_text(name: &str, on: bool) -> String {
    format!("{} {}", if on { "●" } else { "○" }, name)
}

fn link_span(link: &DaemonLink) -> Span<'_> {
    let (text, color) = match link {
        DaemonLink::Probing => ("…", C_BADGE_PENDING),
        DaemonLink::Linked(addr) => (addr.as_str(), C_BADGE_LIVE),
        DaemonLink::Unreachable => ("unreachable", C_BADGE_ERR),
    };
    Span::styled(text, Style::default().fg(color))
}

impl Component for Header {
    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let belief = state.belief;
        let (play_text, play_color) = if belief.playing {
            ("▶ playing", C_PLAYING)
        } else {
            ("⏸ paused", C_PAUSED)
        };
        let loop_color = |on: bool| if on { C_PLAYING } else { C_PAUSED };

        let left = Line::from(vec![
            Span::styled(
                " Grapevine ",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            indicator(state, BeliefField::Playing, play_text.to_string(), play_color),
            Span::styled("  ", style_secondary()),
            indicator(
                state,
                BeliefField::LoopSong,
                loop_text("loop song", belief.loop_song),
                loop_color(belief.loop_song),
            ),
            Span::styled("  ", style_secondary()),
            indicator(
                state,
                BeliefField::LoopQueue,
                loop_text("loop queue", belief.loop_queue),
                loop_color(belief.loop_queue),
            ),
        ]);

        let right = Line::from(vec![
            Span::styled("daemon ", style_secondary()),
            link_span(&state.daemon),
            Span::raw(" "),
        ])
        .right_aligned();

        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(right.width() as u16)])
            .split(area);
        frame.render_widget(Paragraph::new(left), halves[0]);
        frame.render_widget(Paragraph::new(right), halves[1]);
    }
}
