#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseEventKind;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time;

use crate::domain::models::Event;
use crate::domain::models::ScrollMove;

// Keeps the sending spinner moving while no other event arrives.
const REDRAW_INTERVAL: time::Duration = time::Duration::from_millis(250);

fn key_to_event(key: KeyEvent) -> Option<Event> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let event = match (key.code, ctrl) {
        (KeyCode::Char('c'), true) => Event::Quit(),
        (KeyCode::Enter, _) => Event::Submit(),
        (KeyCode::Up, _) => Event::Scroll(ScrollMove::LineUp),
        (KeyCode::Down, _) => Event::Scroll(ScrollMove::LineDown),
        (KeyCode::PageUp, _) | (KeyCode::Char('u'), true) => Event::Scroll(ScrollMove::PageUp),
        (KeyCode::PageDown, _) | (KeyCode::Char('d'), true) => {
            Event::Scroll(ScrollMove::PageDown)
        }
        _ => Event::Compose(key.into()),
    };

    return Some(event);
}

/// Maps a terminal event onto the chat loop's vocabulary. Events the chat
/// has no use for map to `None`.
pub fn terminal_event(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) => return key_to_event(key),
        CrosstermEvent::Paste(text) => return Some(Event::Paste(text)),
        CrosstermEvent::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => return Some(Event::Scroll(ScrollMove::LineUp)),
            MouseEventKind::ScrollDown => return Some(Event::Scroll(ScrollMove::LineDown)),
            _ => return None,
        },
        _ => return None,
    }
}

/// Merges terminal input, delivery worker events and redraw ticks into one
/// stream for the chat loop.
pub struct EventsService {
    terminal: EventStream,
    worker: mpsc::UnboundedReceiver<Event>,
}

impl EventsService {
    pub fn new(worker: mpsc::UnboundedReceiver<Event>) -> EventsService {
        return EventsService {
            terminal: EventStream::new(),
            worker,
        };
    }

    pub async fn next(&mut self) -> Result<Event> {
        loop {
            let evt = tokio::select! {
                event = self.worker.recv() => match event {
                    Some(event) => Some(event),
                    None => bail!("Delivery worker stopped"),
                },
                event = self.terminal.next() => match event {
                    Some(Ok(event)) => terminal_event(event),
                    Some(Err(err)) => {
                        tracing::warn!(error = ?err, "Failed to read terminal event");
                        None
                    }
                    None => bail!("Terminal input closed"),
                },
                _ = time::sleep(REDRAW_INTERVAL) => Some(Event::Redraw())
            };

            if let Some(event) = evt {
                return Ok(event);
            }
        }
    }
}
