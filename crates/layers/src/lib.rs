pub mod asset;
pub mod layer;

pub use asset::*;
pub use layer::*;
