pub mod media;
pub mod mesh;
pub mod transport;

pub use media::*;
pub use mesh::*;
pub use transport::*;
