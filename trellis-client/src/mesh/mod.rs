mod media_sync;
mod mesh;
mod mesh_command;
mod mesh_snapshot;
mod relay_link;

pub use media_sync::*;
pub use mesh::*;
pub use mesh_command::*;
pub use mesh_snapshot::*;
pub use relay_link::*;
