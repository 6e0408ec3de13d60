mod action;
mod api_status;
mod bubble;
mod composer;
mod conversation;
mod error;
mod event;
mod message;
mod request;
mod role;
mod sending;
mod slash_commands;
mod trace;
mod transport;

pub use action::*;
pub use api_status::*;
pub use bubble::*;
pub use composer::*;
pub use conversation::*;
pub use error::*;
pub use event::*;
pub use message::*;
pub use request::*;
pub use role::*;
pub use sending::*;
pub use slash_commands::*;
pub use trace::*;
pub use transport::*;
