use foundation::math::{Mat4, Vec3};
use layers::LayerId;
use thiserror::Error;

use crate::tileset::{MatrixTarget, TilesetHandle};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("unknown tileset {0}")]
    UnknownHandle(TilesetHandle),
    #[error("{0} has been destroyed")]
    Destroyed(TilesetHandle),
    #[error("{0} has no root tile yet")]
    NotReady(TilesetHandle),
    #[error("{handle} rejected matrix: {reason}")]
    Rejected {
        handle: TilesetHandle,
        reason: String,
    },
}

/// The slice of the rendering engine the placement logic talks to.
///
/// Implementations own the tilesets; callers only hold handles. Every
/// mutation may fail if the tileset was torn down in the meantime.
pub trait TilesetEngine {
    /// Registry lookup: the tileset currently loaded for `layer`.
    fn tileset_for_layer(&self, layer: &LayerId) -> Option<TilesetHandle>;

    fn is_destroyed(&self, tileset: TilesetHandle) -> bool;

    /// Center of the tileset's bounding sphere, once the engine knows it.
    fn bounding_sphere_center(&self, tileset: TilesetHandle) -> Option<Vec3>;

    /// The root tile's transform, once the root tile exists.
    fn root_transform(&self, tileset: TilesetHandle) -> Option<Mat4>;

    fn matrix_target(&self, tileset: TilesetHandle) -> MatrixTarget;

    fn set_model_matrix(&mut self, tileset: TilesetHandle, m: Mat4) -> Result<(), EngineError>;

    fn set_root_transform(&mut self, tileset: TilesetHandle, m: Mat4) -> Result<(), EngineError>;

    /// Ask for a redraw on the next frame.
    fn request_render(&mut self);
}
