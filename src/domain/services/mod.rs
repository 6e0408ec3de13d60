pub mod actions;
mod app_state;
mod bubble_list;
mod chat_session;
mod delivery;
mod endpoint_tester;
pub mod events;
mod probe;
mod scroll;
mod themes;
mod tracer;

pub use app_state::*;
pub use bubble_list::*;
pub use chat_session::*;
pub use delivery::*;
pub use endpoint_tester::*;
pub use probe::*;
pub use scroll::*;
pub use themes::*;
pub use tracer::*;
