#[cfg(test)]
#[path = "composer_test.rs"]
mod tests;

use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;
use ratatui::widgets::Widget;
use tui_textarea::Input;
use tui_textarea::TextArea;

/// Input box for the next message.
pub struct Composer<'a> {
    textarea: TextArea<'a>,
}

impl<'a> Default for Composer<'a> {
    fn default() -> Composer<'a> {
        let mut textarea = TextArea::default();
        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title("Message (Enter sends, /quit leaves)")
                .padding(Padding::new(1, 1, 0, 0)),
        );

        return Composer { textarea };
    }
}

impl<'a> Composer<'a> {
    pub fn input(&mut self, input: Input) {
        self.textarea.input(input);
    }

    /// Pasted text keeps its line breaks.
    pub fn paste(&mut self, text: &str) {
        for (idx, line) in text.lines().enumerate() {
            if idx > 0 {
                self.textarea.insert_newline();
            }
            self.textarea.insert_str(line);
        }
    }

    pub fn text(&self) -> String {
        return self.textarea.lines().join("\n");
    }

    pub fn clear(&mut self) {
        *self = Composer::default();
    }

    pub fn widget<'b>(&'b self) -> impl Widget + 'b {
        return self.textarea.widget();
    }
}
