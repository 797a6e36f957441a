use std::collections::BTreeMap;

use foundation::bounds::BoundingSphere;
use foundation::handles::Handle;
use foundation::math::{Mat4, Vec3};
use layers::LayerId;
use tracing::debug;

use crate::engine::{EngineError, TilesetEngine};
use crate::tileset::{MatrixTarget, TilesetHandle};

#[derive(Debug, Clone)]
struct TilesetState {
    layer: LayerId,
    target: MatrixTarget,
    /// World-space sphere as loaded, before any model matrix.
    bounding_sphere: Option<BoundingSphere>,
    root: Option<Mat4>,
    model: Mat4,
    destroyed: bool,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    state: Option<TilesetState>,
}

/// In-memory tileset engine.
///
/// Stands in for the real renderer in headless hosts and tests. It models
/// exactly what the placement logic observes: asynchronous readiness, the
/// per-layer registry, destroy races and render requests.
#[derive(Debug, Default)]
pub struct SceneWorld {
    slots: Vec<Slot>,
    by_layer: BTreeMap<LayerId, TilesetHandle>,
    render_requests: u64,
    matrix_writes: u64,
    reject_reason: Option<String>,
}

impl SceneWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts loading a tileset for `layer`. Geometry arrives later through
    /// [`SceneWorld::set_bounding_sphere`] / [`SceneWorld::set_root`].
    ///
    /// Any tileset already loaded for the layer is unloaded first.
    pub fn load_tileset(&mut self, layer: LayerId, target: MatrixTarget) -> TilesetHandle {
        if self.by_layer.contains_key(&layer) {
            self.unload_layer(&layer);
        }

        let state = TilesetState {
            layer: layer.clone(),
            target,
            bounding_sphere: None,
            root: None,
            model: Mat4::IDENTITY,
            destroyed: false,
        };

        let handle = match self.slots.iter().position(|s| s.state.is_none()) {
            Some(idx) => {
                let slot = &mut self.slots[idx];
                slot.generation = slot.generation.wrapping_add(1);
                slot.state = Some(state);
                TilesetHandle(Handle::new(idx as u32, slot.generation))
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    state: Some(state),
                });
                TilesetHandle(Handle::new(self.slots.len() as u32 - 1, 0))
            }
        };

        debug!("loading {handle} for layer {layer}");
        self.by_layer.insert(layer, handle);
        handle
    }

    pub fn set_bounding_sphere(
        &mut self,
        tileset: TilesetHandle,
        sphere: BoundingSphere,
    ) -> Result<(), EngineError> {
        self.live_mut(tileset)?.bounding_sphere = Some(sphere);
        Ok(())
    }

    /// Loader-side root placement (as read from the tileset JSON).
    pub fn set_root(&mut self, tileset: TilesetHandle, root: Mat4) -> Result<(), EngineError> {
        self.live_mut(tileset)?.root = Some(root);
        Ok(())
    }

    /// Engine-internal teardown. The registry keeps pointing at the dead
    /// handle until the layer is unloaded, as a real engine does mid-frame.
    pub fn destroy_tileset(&mut self, tileset: TilesetHandle) -> bool {
        match self.state_mut(tileset) {
            Some(state) if !state.destroyed => {
                state.destroyed = true;
                debug!("destroyed {tileset}");
                true
            }
            _ => false,
        }
    }

    /// Removes the layer's tileset and frees its slot for reuse.
    pub fn unload_layer(&mut self, layer: &LayerId) -> Option<TilesetHandle> {
        let handle = self.by_layer.remove(layer)?;
        if let Some(slot) = self.slot_mut(handle) {
            slot.state = None;
        }
        debug!("unloaded {handle} for layer {layer}");
        Some(handle)
    }

    pub fn model_matrix(&self, tileset: TilesetHandle) -> Option<Mat4> {
        self.state(tileset).map(|s| s.model)
    }

    pub fn current_root(&self, tileset: TilesetHandle) -> Option<Mat4> {
        self.state(tileset).and_then(|s| s.root)
    }

    pub fn layer_of(&self, tileset: TilesetHandle) -> Option<&LayerId> {
        self.state(tileset).map(|s| &s.layer)
    }

    pub fn render_requests(&self) -> u64 {
        self.render_requests
    }

    pub fn matrix_writes(&self) -> u64 {
        self.matrix_writes
    }

    /// Makes every matrix write fail with [`EngineError::Rejected`] until
    /// cleared with `None`.
    pub fn reject_matrices(&mut self, reason: Option<&str>) {
        self.reject_reason = reason.map(str::to_string);
    }

    fn slot_mut(&mut self, tileset: TilesetHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(tileset.index() as usize)
            .filter(|s| s.generation == tileset.generation())
    }

    fn state(&self, tileset: TilesetHandle) -> Option<&TilesetState> {
        self.slots
            .get(tileset.index() as usize)
            .filter(|s| s.generation == tileset.generation())
            .and_then(|s| s.state.as_ref())
    }

    fn state_mut(&mut self, tileset: TilesetHandle) -> Option<&mut TilesetState> {
        self.slot_mut(tileset).and_then(|s| s.state.as_mut())
    }

    fn live_mut(&mut self, tileset: TilesetHandle) -> Result<&mut TilesetState, EngineError> {
        match self.state_mut(tileset) {
            None => Err(EngineError::UnknownHandle(tileset)),
            Some(state) if state.destroyed => Err(EngineError::Destroyed(tileset)),
            Some(state) => Ok(state),
        }
    }

    fn check_writable(&self, tileset: TilesetHandle, m: &Mat4) -> Result<(), EngineError> {
        if let Some(reason) = &self.reject_reason {
            return Err(EngineError::Rejected {
                handle: tileset,
                reason: reason.clone(),
            });
        }
        if !m.is_finite() {
            return Err(EngineError::Rejected {
                handle: tileset,
                reason: "non-finite matrix".to_string(),
            });
        }
        Ok(())
    }
}

impl TilesetEngine for SceneWorld {
    fn tileset_for_layer(&self, layer: &LayerId) -> Option<TilesetHandle> {
        self.by_layer.get(layer).copied()
    }

    fn is_destroyed(&self, tileset: TilesetHandle) -> bool {
        self.state(tileset).is_none_or(|s| s.destroyed)
    }

    fn bounding_sphere_center(&self, tileset: TilesetHandle) -> Option<Vec3> {
        let state = self.state(tileset).filter(|s| !s.destroyed)?;
        let sphere = state.bounding_sphere?;
        Some(sphere.transformed(&state.model).center)
    }

    fn root_transform(&self, tileset: TilesetHandle) -> Option<Mat4> {
        self.state(tileset).filter(|s| !s.destroyed)?.root
    }

    fn matrix_target(&self, tileset: TilesetHandle) -> MatrixTarget {
        self.state(tileset).map(|s| s.target).unwrap_or_default()
    }

    fn set_model_matrix(&mut self, tileset: TilesetHandle, m: Mat4) -> Result<(), EngineError> {
        self.check_writable(tileset, &m)?;
        self.live_mut(tileset)?.model = m;
        self.matrix_writes += 1;
        Ok(())
    }

    fn set_root_transform(&mut self, tileset: TilesetHandle, m: Mat4) -> Result<(), EngineError> {
        self.check_writable(tileset, &m)?;
        let state = self.live_mut(tileset)?;
        if state.root.is_none() {
            return Err(EngineError::NotReady(tileset));
        }
        state.root = Some(m);
        self.matrix_writes += 1;
        Ok(())
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }
}
