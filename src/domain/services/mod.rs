pub mod actions;
mod app_state;
mod chat;
mod commands;
mod context;
mod conversation;
pub mod events;
mod export;
#[cfg(test)]
pub mod fakes;
mod generation_lock;
mod message_assembler;
mod recording;
mod scroll;
mod stream_decoder;
mod voice;

pub use app_state::*;
pub use chat::*;
pub use commands::*;
pub use context::*;
pub use conversation::*;
pub use export::*;
pub use generation_lock::*;
pub use message_assembler::*;
pub use recording::*;
pub use scroll::*;
pub use stream_decoder::*;
pub use voice::*;
