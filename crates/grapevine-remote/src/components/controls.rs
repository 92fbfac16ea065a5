//! ControlPanel: a row of clickable buttons.
//!
//! Two instances exist: the transport row inside the "Controls" pane, and the
//! enqueue pair drawn bare next to the path field.  Both remember where each
//! button landed on the last draw so clicks can be hit-tested.

use grapevine_proto::protocol::ControlIntent;
use ratatui::crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Position, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, PathTarget},
    app_state::AppState,
    component::Component,
    sync::play_pause,
    theme::{style_button, style_button_active, style_button_disabled, C_BADGE_PENDING},
    widgets::pane_chrome::{pane_chrome, Badge},
};

const GAP: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlButton {
    PlayPause,
    Skip,
    Clear,
    LoopSong,
    LoopQueue,
    Shutdown,
    AddSong,
    AddPlaylist,
}

const TRANSPORT: [ControlButton; 6] = [
    ControlButton::PlayPause,
    ControlButton::Skip,
    ControlButton::Clear,
    ControlButton::LoopSong,
    ControlButton::LoopQueue,
    ControlButton::Shutdown,
];

const ENQUEUE: [ControlButton; 2] = [ControlButton::AddSong, ControlButton::AddPlaylist];

impl ControlButton {
    pub fn label(self, state: &AppState) -> &'static str {
        match self {
            Self::PlayPause if state.belief.playing => "Pause",
            Self::PlayPause => "Play",
            Self::Skip => "Skip",
            Self::Clear => "Clear",
            Self::LoopSong => "Loop song",
            Self::LoopQueue => "Loop queue",
            Self::Shutdown => "Shutdown",
            Self::AddSong => "Add song",
            Self::AddPlaylist => "Add playlist",
        }
    }

    /// What pressing the button does.  `None` for a disabled button.
    pub fn action(self, state: &AppState) -> Option<Action> {
        let intent = match self {
            Self::PlayPause => play_pause(state.belief.playing),
            Self::Skip => ControlIntent::SkipNext,
            Self::Clear => ControlIntent::ClearQueue,
            Self::LoopSong => ControlIntent::ToggleLoopSong,
            Self::LoopQueue => ControlIntent::ToggleLoopQueue,
            Self::Shutdown => ControlIntent::Shutdown,
            Self::AddSong | Self::AddPlaylist if !state.path_ready => return None,
            Self::AddSong => return Some(Action::SubmitPath(PathTarget::Song)),
            Self::AddPlaylist => return Some(Action::SubmitPath(PathTarget::Playlist)),
        };
        Some(Action::Issue(intent))
    }

    fn style(self, state: &AppState) -> Style {
        match self {
            Self::LoopSong if state.belief.loop_song => style_button_active(),
            Self::LoopQueue if state.belief.loop_queue => style_button_active(),
            Self::AddSong | Self::AddPlaylist if !state.path_ready => style_button_disabled(),
            _ => style_button(),
        }
    }

    fn width(self, state: &AppState) -> u16 {
        self.label(state).chars().count() as u16 + 2
    }
}

/// Lay buttons out left to right.  Buttons past the right edge get a
/// zero-width rect and are neither drawn nor clickable.
fn layout(area: Rect, widths: &[u16]) -> Vec<Rect> {
    let right = area.x + area.width;
    let mut x = area.x;
    widths
        .iter()
        .map(|&w| {
            let width = w.min(right.saturating_sub(x));
            let rect = Rect {
                x,
                y: area.y,
                width,
                height: area.height.min(1),
            };
            x = (x + width + GAP).min(right);
            rect
        })
        .collect()
}

pub struct ControlPanel {
    title: Option<&'static str>,
    buttons: &'static [ControlButton],
    areas: Vec<(ControlButton, Rect)>,
}

impl ControlPanel {
    pub fn transport() -> Self {
        Self {
            title: Some("Controls"),
            buttons: &TRANSPORT,
            areas: Vec::new(),
        }
    }

    pub fn enqueue() -> Self {
        Self {
            title: None,
            buttons: &ENQUEUE,
            areas: Vec::new(),
        }
    }

    /// Columns needed to show every button on one row.
    pub fn width(&self, state: &AppState) -> u16 {
        let buttons: u16 = self.buttons.iter().map(|b| b.width(state)).sum();
        buttons + GAP * (self.buttons.len() as u16).saturating_sub(1)
    }

    pub fn button_at(&self, col: u16, row: u16) -> Option<ControlButton> {
        self.areas
            .iter()
            .find(|(_, r)| r.contains(Position::new(col, row)))
            .map(|(b, _)| *b)
    }

    pub fn button_area(&self, button: ControlButton) -> Option<Rect> {
        self.areas.iter().find(|(b, _)| *b == button).map(|(_, r)| *r)
    }
}

impl Component for ControlPanel {
    fn handle_mouse(&mut self, event: MouseEvent, state: &AppState) -> Vec<Action> {
        if !matches!(event.kind, MouseEventKind::Down(MouseButton::Left)) {
            return vec![];
        }
        self.button_at(event.column, event.row)
            .and_then(|b| b.action(state))
            .into_iter()
            .collect()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let inner = match self.title {
            Some(title) => {
                let badge = state.any_pending().then_some(Badge {
                    text: "SYNC",
                    color: C_BADGE_PENDING,
                });
                let block = pane_chrome(title, focused, badge);
                let inner = block.inner(area);
                frame.render_widget(block, area);
                inner
            }
            None => area,
        };

        let widths: Vec<u16> = self.buttons.iter().map(|b| b.width(state)).collect();
        self.areas.clear();
        for (&button, rect) in self.buttons.iter().zip(layout(inner, &widths)) {
            if rect.width == 0 || rect.height == 0 {
                continue;
            }
            let text = format!(" {} ", button.label(state));
            frame.render_widget(Paragraph::new(text).style(button.style(state)), rect);
            self.areas.push((button, rect));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, crossterm::event::KeyModifiers, Terminal};

    fn click(col: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: col,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn drawn(panel: &mut ControlPanel, state: &AppState, width: u16) {
        let mut terminal = Terminal::new(TestBackend::new(width, 3)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                panel.draw(f, area, true, state)
            })
            .unwrap();
    }

    #[test]
    fn test_layout_truncates_at_edge() {
        let rects = layout(Rect::new(0, 0, 10, 1), &[4, 4, 4]);
        assert_eq!(rects[0], Rect::new(0, 0, 4, 1));
        assert_eq!(rects[1], Rect::new(5, 0, 4, 1));
        assert_eq!(rects[2].width, 0);
    }

    #[test]
    fn test_play_pause_follows_belief() {
        let mut state = AppState::default();
        assert_eq!(ControlButton::PlayPause.label(&state), "Pause");
        assert!(matches!(
            ControlButton::PlayPause.action(&state),
            Some(Action::Issue(ControlIntent::Pause))
        ));
        state.belief.playing = false;
        assert_eq!(ControlButton::PlayPause.label(&state), "Play");
        assert!(matches!(
            ControlButton::PlayPause.action(&state),
            Some(Action::Issue(ControlIntent::Play))
        ));
    }

    #[test]
    fn test_enqueue_buttons_disabled_without_path() {
        let mut state = AppState::default();
        assert!(ControlButton::AddSong.action(&state).is_none());
        assert!(ControlButton::AddPlaylist.action(&state).is_none());
        state.path_ready = true;
        assert!(matches!(
            ControlButton::AddPlaylist.action(&state),
            Some(Action::SubmitPath(PathTarget::Playlist))
        ));
    }

    #[test]
    fn test_click_hits_drawn_button() {
        let state = AppState::default();
        let mut panel = ControlPanel::transport();
        drawn(&mut panel, &state, 80);

        let skip = panel.button_area(ControlButton::Skip).unwrap();
        let actions = panel.handle_mouse(click(skip.x, skip.y), &state);
        assert!(matches!(
            actions.as_slice(),
            [Action::Issue(ControlIntent::SkipNext)]
        ));

        // Border row is not a button.
        assert!(panel.handle_mouse(click(skip.x, 0), &state).is_empty());
    }

    #[test]
    fn test_enqueue_width_fits_both_buttons() {
        let state = AppState::default();
        let mut panel = ControlPanel::enqueue();
        let width = panel.width(&state);
        drawn(&mut panel, &state, width);
        assert!(panel.button_area(ControlButton::AddSong).is_some());
        assert_eq!(
            panel.button_area(ControlButton::AddPlaylist).map(|r| r.x + r.width),
            Some(width)
        );
    }
}
