//! Keyboard multiplexer: turns key presses into the same `ControlIntent`s the
//! buttons produce.
//!
//! Space and Right are matched on key code; `l` and `q` case-insensitively.
//! While the path field has focus no shortcut fires, so typing a path never
//! pauses playback.

use grapevine_proto::protocol::ControlIntent;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{Action, Pane};
use crate::sync::play_pause;

/// What the multiplexer needs to know about the rest of the app.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext {
    /// The focused element accepts free text.
    pub text_focused: bool,
    /// Current belief, used only to pick the space-bar direction.
    pub playing: bool,
}

/// Map a key to a transport intent.  At most one intent per event.
pub fn shortcut(key: &KeyEvent, ctx: KeyContext) -> Option<ControlIntent> {
    if ctx.text_focused {
        return None;
    }
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    match key.code {
        KeyCode::Char(' ') => Some(play_pause(ctx.playing)),
        KeyCode::Right => Some(ControlIntent::SkipNext),
        KeyCode::Char(c) if c.eq_ignore_ascii_case(&'l') => Some(ControlIntent::ToggleLoopSong),
        KeyCode::Char(c) if c.eq_ignore_ascii_case(&'q') => Some(ControlIntent::ToggleLoopQueue),
        _ => None,
    }
}

/// Keys that drive the UI itself rather than the daemon.  Only consulted when
/// `shortcut` produced nothing.
pub fn ui_key(key: &KeyEvent, ctx: KeyContext) -> Option<Action> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Tab | KeyCode::BackTab => Some(Action::FocusNext),
        _ if ctx.text_focused => None,
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('a') | KeyCode::Char('/') => Some(Action::FocusPane(Pane::PathInput)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn idle(playing: bool) -> KeyContext {
        KeyContext {
            text_focused: false,
            playing,
        }
    }

    #[test]
    fn test_space_direction_follows_belief() {
        assert_eq!(
            shortcut(&key(KeyCode::Char(' ')), idle(true)),
            Some(ControlIntent::Pause)
        );
        assert_eq!(
            shortcut(&key(KeyCode::Char(' ')), idle(false)),
            Some(ControlIntent::Play)
        );
    }

    #[test]
    fn test_bindings() {
        assert_eq!(
            shortcut(&key(KeyCode::Right), idle(true)),
            Some(ControlIntent::SkipNext)
        );
        for c in ['l', 'L'] {
            assert_eq!(
                shortcut(&key(KeyCode::Char(c)), idle(true)),
                Some(ControlIntent::ToggleLoopSong)
            );
        }
        let shifted_q = KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert_eq!(
            shortcut(&shifted_q, idle(true)),
            Some(ControlIntent::ToggleLoopQueue)
        );
        assert_eq!(shortcut(&key(KeyCode::Left), idle(true)), None);
        assert_eq!(shortcut(&key(KeyCode::Char('x')), idle(true)), None);
    }

    #[test]
    fn test_text_focus_suppresses_every_shortcut() {
        let ctx = KeyContext {
            text_focused: true,
            playing: true,
        };
        for code in [
            KeyCode::Char(' '),
            KeyCode::Right,
            KeyCode::Char('l'),
            KeyCode::Char('L'),
            KeyCode::Char('q'),
            KeyCode::Char('Q'),
        ] {
            assert_eq!(shortcut(&key(code), ctx), None, "{:?}", code);
        }
    }

    #[test]
    fn test_control_chords_are_not_shortcuts() {
        let ctrl_l = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert_eq!(shortcut(&ctrl_l, idle(true)), None);
    }

    #[test]
    fn test_ui_keys() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let typing = KeyContext {
            text_focused: true,
            playing: true,
        };
        assert!(matches!(ui_key(&ctrl_c, typing), Some(Action::Quit)));
        assert!(matches!(
            ui_key(&key(KeyCode::Tab), typing),
            Some(Action::FocusNext)
        ));
        assert!(ui_key(&key(KeyCode::Char('?')), typing).is_none());
        assert!(matches!(
            ui_key(&key(KeyCode::Char('?')), idle(true)),
            Some(Action::ToggleHelp)
        ));
        assert!(matches!(
            ui_key(&key(KeyCode::Char('a')), idle(true)),
            Some(Action::FocusPane(Pane::PathInput))
        ));
    }

    #[test]
    fn test_repeat_events_still_map() {
        let held = KeyEvent {
            code: KeyCode::Right,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Repeat,
            state: KeyEventState::NONE,
        };
        assert_eq!(shortcut(&held, idle(true)), Some(ControlIntent::SkipNext));
    }
}
