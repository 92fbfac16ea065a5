//! FocusRing: manages keyboard focus cycling between panes.

use crate::action::Pane;

pub struct FocusRing {
    items: Vec<Pane>,
    current: usize,
}

impl FocusRing {
    pub fn new(items: Vec<Pane>) -> Self {
        Self { items, current: 0 }
    }

    pub fn current(&self) -> Option<Pane> {
        self.items.get(self.current).copied()
    }

    pub fn next(&mut self) -> Option<Pane> {
        if self.items.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.items.len();
        self.current()
    }

    pub fn set(&mut self, id: Pane) {
        if let Some(pos) = self.items.iter().position(|&x| x == id) {
            self.current = pos;
        }
    }

    pub fn is_focused(&self, id: Pane) -> bool {
        self.current() == Some(id)
    }
}

impl Default for FocusRing {
    fn default() -> Self {
        Self::new(vec![Pane::Controls, Pane::PathInput])
    }
}
