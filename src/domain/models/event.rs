use tui_textarea::Input;

use super::ApiStatus;
use super::Message;

/// How far a scroll request moves the conversation view.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScrollMove {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
}

/// Everything the chat loop reacts to. Delivery events come from the
/// background worker, the rest from the terminal.
pub enum Event {
    ApiStatus(ApiStatus),
    DeliveryChunk(String),
    DeliveryComplete(Message),
    Compose(Input),
    Paste(String),
    Scroll(ScrollMove),
    Submit(),
    Quit(),
    Redraw(),
}
