pub mod chat;
pub mod config;
pub mod relay;
pub mod signaling;

pub use chat::*;
pub use config::*;
pub use relay::*;
pub use signaling::*;
