mod mesh_connection;
mod transport_config;
mod transport_event;

pub use mesh_connection::*;
pub use transport_config::*;
pub use transport_event::*;
