#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc;

use super::BubbleList;
use super::ChatSession;
use super::Scroll;
use super::Themes;
use crate::domain::models::Action;
use crate::domain::models::ApiStatus;
use crate::domain::models::Message;
use crate::domain::models::SlashCommand;

pub struct AppState {
    pub api_status: ApiStatus,
    pub bubble_list: BubbleList,
    pub last_known_height: u16,
    pub last_known_width: u16,
    pub scroll: Scroll,
    pub session: ChatSession,
}

impl AppState {
    pub fn new(theme_name: &str, theme_file: &str) -> Result<AppState> {
        let theme = Themes::get(theme_name, theme_file)?;

        return Ok(AppState {
            api_status: ApiStatus::Checking,
            bubble_list: BubbleList::new(theme),
            last_known_height: 0,
            last_known_width: 0,
            scroll: Scroll::default(),
            session: ChatSession::default(),
        });
    }

    /// Returns true when the UI loop should exit.
    pub fn handle_slash_commands(&mut self, input: &str) -> bool {
        if let Some(command) = SlashCommand::parse(input) {
            return command.is_quit();
        }

        return false;
    }

    /// Starts a turn from the text box contents and hands it to the
    /// delivery worker. Returns false when the input was refused.
    pub fn submit(&mut self, input: &str, tx: &mpsc::UnboundedSender<Action>) -> Result<bool> {
        let request = match self.session.begin(input) {
            Some(request) => request,
            None => return Ok(false),
        };

        tx.send(Action::DeliveryRequest(request))?;
        self.sync_dependants();
        self.scroll.last();

        return Ok(true);
    }

    pub fn handle_chunk(&mut self, chunk: &str) {
        self.session.push_chunk(chunk);
        self.sync_dependants();
    }

    pub fn handle_reply(&mut self, message: Message) {
        if self.session.complete(message) {
            self.sync_dependants();
            self.scroll.last();
        }
    }

    /// Drops the outstanding turn. Returns true if there was one.
    pub fn abort(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<bool> {
        if !self.session.is_loading() {
            return Ok(false);
        }

        tx.send(Action::DeliveryAbort())?;
        self.session.cancel();
        self.sync_dependants();

        return Ok(true);
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    fn sync_dependants(&mut self) {
        self.bubble_list.set_messages(
            self.session.conversation().messages(),
            self.session.pending(),
            self.last_known_width.into(),
        );

        self.scroll
            .set_state(self.bubble_list.len() as u16, self.last_known_height);

        if self.session.is_loading() {
            self.scroll.last();
        }
    }
}
