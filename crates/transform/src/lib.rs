//! Height/scale placement of 3D-tiles datasets.
//!
//! - [`compose`]: pure matrix composition around a fixed pivot.
//! - [`pivot`]: per-tileset side-table of pivots and base transforms.
//! - [`live`]: the reactive loop that keeps tilesets in sync with their
//!   layers' committed values, with bounded retries.
//! - [`preview`]: the port the slider UI uses for unsaved live previews.

pub mod compose;
pub mod config;
pub mod key;
pub mod live;
pub mod pivot;
pub mod preview;
pub mod stats;

pub use compose::*;
pub use config::*;
pub use key::*;
pub use live::*;
pub use pivot::*;
pub use preview::*;
pub use stats::*;
