mod relay;
mod relay_command;
mod relay_output;
mod room_registry;

pub use relay::*;
pub use relay_command::*;
pub use relay_output::*;
pub use room_registry::*;
