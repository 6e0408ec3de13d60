#[cfg(test)]
#[path = "scroll_test.rs"]
mod tests;

use ratatui::widgets::ScrollbarState;

use crate::domain::models::ScrollMove;

const PAGE_LINES: u16 = 10;

/// Vertical position in the conversation view, measured in rendered lines.
#[derive(Default)]
pub struct Scroll {
    list_length: u16,
    viewport_length: u16,
    pub position: u16,
    pub scrollbar_state: ScrollbarState,
}

impl Scroll {
    fn max_position(&self) -> u16 {
        return self.list_length.saturating_sub(self.viewport_length);
    }

    fn up(&mut self) {
        self.position = self.position.saturating_sub(1);
        self.scrollbar_state.prev();
    }

    fn up_page(&mut self) {
        for _ in 0..PAGE_LINES {
            self.up();
        }
    }

    fn down(&mut self) {
        self.position = self.position.saturating_add(1).min(self.max_position());
        self.scrollbar_state.next();
    }

    fn down_page(&mut self) {
        for _ in 0..PAGE_LINES {
            self.down();
        }
    }

    pub fn apply(&mut self, movement: ScrollMove) {
        match movement {
            ScrollMove::LineUp => self.up(),
            ScrollMove::LineDown => self.down(),
            ScrollMove::PageUp => self.up_page(),
            ScrollMove::PageDown => self.down_page(),
        }
    }

    pub fn last(&mut self) {
        self.position = self.max_position();
        self.scrollbar_state.last();
    }

    pub fn set_state(&mut self, list_length: u16, viewport_length: u16) {
        self.list_length = list_length;
        self.viewport_length = viewport_length;
        self.position = self.position.min(self.max_position());
        self.scrollbar_state = self
            .scrollbar_state
            .content_length(list_length)
            .viewport_content_length(viewport_length);
    }
}
