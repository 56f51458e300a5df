mod device;
mod source;
mod stream;

pub use device::*;
pub use source::*;
pub use stream::*;
