pub mod engine;
pub mod tileset;
pub mod world;

pub use engine::*;
pub use tileset::*;
pub use world::*;
