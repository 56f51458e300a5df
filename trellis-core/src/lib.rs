pub mod bimap;
pub mod model;

pub use bimap::BiMap;
