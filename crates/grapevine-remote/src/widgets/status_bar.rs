//! Status bar: bottom line with input mode and key hints.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{style_default, style_muted, C_INPUT_FG, C_PLAYING};

/// Which keys the hint line describes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    /// Shortcuts live.
    Control,
    /// Path field has focus; shortcuts off.
    Path,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Control => "CONTROL",
            Self::Path => "PATH",
        }
    }

    fn keys(self) -> &'static str {
        match self {
            Self::Control => {
                " Space play/pause  → skip  l loop song  q loop queue  a or / path  Tab focus  ? hide keys  Ctrl-C quit"
            }
            Self::Path => " type a path  Enter add song  Ctrl-P add playlist  Esc/Tab leave  Ctrl-C quit",
        }
    }
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, show_keys: bool) {
    let color = match mode {
        InputMode::Control => C_PLAYING,
        InputMode::Path => C_INPUT_FG,
    };
    let mut spans = vec![Span::styled(
        format!(" {} ", mode.label()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if show_keys || mode == InputMode::Path {
        spans.push(Span::styled(mode.keys(), style_muted()));
    } else {
        spans.push(Span::styled(" ? keys", style_default()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
