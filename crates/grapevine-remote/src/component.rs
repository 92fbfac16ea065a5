//! Component trait: the interface every drawn panel implements.
//!
//! Components render from `AppState` and answer input with `Vec<Action>`;
//! they never touch the synchronizer or the network.

use ratatui::crossterm::event::MouseEvent;
use ratatui::{layout::Rect, Frame};

use crate::action::Action;
use crate::app_state::AppState;

pub trait Component {
    /// Handle a mouse event.  Hit-testing uses the rects from the last draw.
    fn handle_mouse(&mut self, _event: MouseEvent, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    /// Render the component into `area`.
    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState);
}
