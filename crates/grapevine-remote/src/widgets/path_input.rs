//! PathInput: wraps tui-input for the song/playlist path field.

use grapevine_proto::protocol::{ControlIntent, DaemonPath};
use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_INPUT_BG, C_INPUT_FG, C_MUTED};

pub enum PathAction {
    Submit(ControlIntent),
    Leave,
    None,
}

pub struct PathInput {
    input: Input,
    placeholder: String,
}

impl PathInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            placeholder: placeholder.into(),
        }
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    /// `None` while the field is empty.
    pub fn song(&self) -> Option<ControlIntent> {
        DaemonPath::new(self.text()).map(ControlIntent::EnqueueSong)
    }

    /// `None` while the field is empty.
    pub fn playlist(&self) -> Option<ControlIntent> {
        DaemonPath::new(self.text()).map(ControlIntent::EnqueuePlaylist)
    }

    /// Handle a key while the field has focus.
    ///
    /// Enter adds a song, Ctrl-P a playlist; both do nothing on an empty
    /// field.  The text is kept after submitting.
    pub fn handle_key(&mut self, key: KeyEvent) -> PathAction {
        match key.code {
            KeyCode::Esc => PathAction::Leave,
            KeyCode::Enter => self.song().map_or(PathAction::None, PathAction::Submit),
            KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.playlist().map_or(PathAction::None, PathAction::Submit)
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                PathAction::None
            }
        }
    }

    /// Render the input line into `area`.
    ///
    /// `visual_scroll` and `visual_cursor` are display columns, not byte
    /// offsets, so the text is scrolled by the paragraph rather than sliced.
    pub fn draw(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let scroll = self.input.visual_scroll(area.width.saturating_sub(1) as usize);
        let value = self.input.value();
        let paragraph = if value.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(C_MUTED),
            )))
        } else {
            Paragraph::new(Line::from(Span::styled(value, Style::default().fg(C_INPUT_FG))))
                .scroll((0, u16::try_from(scroll).unwrap_or(u16::MAX)))
        };
        frame.render_widget(paragraph.style(Style::default().bg(C_INPUT_BG)), area);

        if focused && area.width > 0 {
            let offset = self
                .input
                .visual_cursor()
                .saturating_sub(scroll)
                .min(area.width as usize - 1) as u16;
            frame.set_cursor_position((area.x + offset, area.y));
        }
    }
}

impl Default for PathInput {
    fn default() -> Self {
        Self::new("Absolute path to song or .m3u")
    }
}
