#[cfg(test)]
#[path = "sending_test.rs"]
mod tests;

use ratatui::prelude::Alignment;
use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Replaces the compose box while a delivery is outstanding.
pub struct SendingIndicator {
    transport: String,
    frame: usize,
}

impl SendingIndicator {
    pub fn new(transport: &str) -> SendingIndicator {
        return SendingIndicator {
            transport: transport.to_string(),
            frame: 0,
        };
    }

    pub fn advance(&mut self) {
        self.frame = (self.frame + 1) % SPINNER.len();
    }

    pub fn text(&self) -> String {
        return format!("{} Sending via {}", SPINNER[self.frame], self.transport);
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect) {
        frame.render_widget(
            Paragraph::new(self.text())
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .title("Waiting for the agent"),
                )
                .alignment(Alignment::Center),
            rect,
        );
    }
}
