mod action;
mod agent;
mod audio;
mod backend;
mod event;
mod loading;
mod message;
mod renderer;
mod session;
mod slash_commands;
mod status;
mod view;

pub use action::*;
pub use agent::*;
pub use audio::*;
pub use backend::*;
pub use event::*;
pub use loading::*;
pub use message::*;
pub use renderer::*;
pub use session::*;
pub use slash_commands::*;
pub use status::*;
pub use view::*;
