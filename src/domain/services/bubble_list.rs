#[cfg(test)]
#[path = "bubble_list_test.rs"]
mod tests;

use std::collections::HashMap;

use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use syntect::highlighting::Theme;

use crate::domain::models::Bubble;
use crate::domain::models::BubbleAlignment;
use crate::domain::models::Message;
use crate::domain::models::Role;

fn alignment(message: &Message) -> BubbleAlignment {
    if message.role() == Role::User {
        return BubbleAlignment::Right;
    }
    return BubbleAlignment::Left;
}

/// Rendered lines for the whole conversation. Messages never change once
/// appended, so each one is drawn once per window width and cached by
/// index. The in-progress streamed reply is redrawn on every update.
pub struct BubbleList {
    cache: HashMap<usize, Vec<Line<'static>>>,
    pending: Vec<Line<'static>>,
    line_width: usize,
    lines_len: usize,
    theme: Theme,
}

impl BubbleList {
    pub fn new(theme: Theme) -> BubbleList {
        return BubbleList {
            cache: HashMap::new(),
            pending: vec![],
            line_width: 0,
            lines_len: 0,
            theme,
        };
    }

    pub fn set_messages(&mut self, messages: &[Message], pending: &str, line_width: usize) {
        if self.line_width != line_width {
            self.cache.clear();
            self.line_width = line_width;
        }

        for (idx, message) in messages.iter().enumerate() {
            if self.cache.contains_key(&idx) {
                continue;
            }

            let lines = Bubble::new(message, alignment(message), line_width).as_lines(&self.theme);
            self.cache.insert(idx, lines);
        }

        self.pending = vec![];
        if !pending.is_empty() {
            let message = Message::new(Role::Assistant, pending);
            self.pending = Bubble::new(&message, BubbleAlignment::Left, line_width)
                .as_lines(&self.theme);
        }

        self.lines_len = self.cache.values().map(|lines| return lines.len()).sum::<usize>()
            + self.pending.len();
    }

    pub fn len(&self) -> usize {
        return self.lines_len;
    }

    pub fn is_empty(&self) -> bool {
        return self.lines_len == 0;
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, scroll: u16) {
        let mut indexes: Vec<usize> = self.cache.keys().cloned().collect();
        indexes.sort();

        let mut lines: Vec<Line<'static>> = vec![];
        for idx in indexes {
            if let Some(cached) = self.cache.get(&idx) {
                lines.extend(cached.iter().cloned());
            }
        }
        lines.extend(self.pending.iter().cloned());

        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default())
                .scroll((scroll, 0)),
            rect,
        );
    }
}
