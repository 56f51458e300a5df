mod chat_relay;
mod chat_rooms;
mod chat_service;
mod ws_handler;

pub use chat_relay::*;
pub use chat_rooms::*;
pub use chat_service::*;
pub use ws_handler::*;
