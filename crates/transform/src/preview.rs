use std::cell::RefCell;
use std::rc::{Rc, Weak};

use layers::{AssetLayer, LayerId};
use scene::{TilesetEngine, TilesetHandle};

use crate::config::TransformConfig;
use crate::live::{AttemptOutcome, LiveTransformLoop, PreviewOutcome, SyncOutcome};

/// What the slider UI is handed to push unsaved values into the scene.
///
/// The UI and the scene live in different parts of the view tree; this is
/// the only way the UI reaches the scene, and it never persists anything.
pub trait TransformPreviewPort {
    fn apply(&self, layer: &LayerId, height_offset: f64, scale: f64) -> PreviewOutcome;

    /// Reverts the layer to its committed values.
    fn clear(&self, layer: &LayerId) -> PreviewOutcome;
}

/// The scene-owning side: an engine plus the loop that keeps it placed.
#[derive(Debug)]
pub struct TransformScene<E> {
    engine: E,
    live: LiveTransformLoop,
}

impl<E: TilesetEngine> TransformScene<E> {
    pub fn new(engine: E, config: TransformConfig) -> Self {
        Self {
            engine,
            live: LiveTransformLoop::new(config),
        }
    }

    /// Wraps the scene for sharing with [`PreviewPort`]s.
    pub fn mount(engine: E, config: TransformConfig) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(engine, config)))
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn live(&self) -> &LiveTransformLoop {
        &self.live
    }

    pub fn live_mut(&mut self) -> &mut LiveTransformLoop {
        &mut self.live
    }

    pub fn sync(&mut self, layers: &[AssetLayer]) -> SyncOutcome {
        self.live.sync(&mut self.engine, layers)
    }

    pub fn advance(&mut self, ms: u64) -> usize {
        self.live.advance(&mut self.engine, ms)
    }

    pub fn on_tileset_loaded(&mut self, layer: &LayerId) -> Option<AttemptOutcome> {
        self.live.on_tileset_loaded(&mut self.engine, layer)
    }

    pub fn on_tileset_destroyed(&mut self, tileset: TilesetHandle) {
        self.live.on_tileset_destroyed(tileset);
    }

    pub fn preview(&mut self, layer: &LayerId, height_offset: f64, scale: f64) -> PreviewOutcome {
        self.live.preview(&mut self.engine, layer, height_offset, scale)
    }

    pub fn clear_preview(&mut self, layer: &LayerId) -> PreviewOutcome {
        self.live.clear_preview(&mut self.engine, layer)
    }

    /// Unmount: cancels outstanding work and returns the engine.
    pub fn unmount(mut self) -> E {
        self.live.teardown();
        self.engine
    }
}

/// Weak handle onto a mounted [`TransformScene`].
///
/// Holding a port never keeps the scene alive. Once the scene is dropped or
/// the port is detached, every call is a no-op reporting
/// [`PreviewOutcome::Detached`].
#[derive(Debug)]
pub struct PreviewPort<E> {
    scene: RefCell<Weak<RefCell<TransformScene<E>>>>,
}

impl<E> PreviewPort<E> {
    pub fn attach(scene: &Rc<RefCell<TransformScene<E>>>) -> Self {
        Self {
            scene: RefCell::new(Rc::downgrade(scene)),
        }
    }

    pub fn detached() -> Self {
        Self {
            scene: RefCell::new(Weak::new()),
        }
    }

    pub fn detach(&self) {
        *self.scene.borrow_mut() = Weak::new();
    }

    pub fn is_attached(&self) -> bool {
        self.scene.borrow().strong_count() > 0
    }

    fn with_scene(
        &self,
        f: impl FnOnce(&mut TransformScene<E>) -> PreviewOutcome,
    ) -> PreviewOutcome {
        let Some(scene) = self.scene.borrow().upgrade() else {
            return PreviewOutcome::Detached;
        };
        let Ok(mut scene) = scene.try_borrow_mut() else {
            return PreviewOutcome::Busy;
        };
        f(&mut scene)
    }
}

impl<E: TilesetEngine> TransformPreviewPort for PreviewPort<E> {
    fn apply(&self, layer: &LayerId, height_offset: f64, scale: f64) -> PreviewOutcome {
        self.with_scene(|scene| scene.preview(layer, height_offset, scale))
    }

    fn clear(&self, layer: &LayerId) -> PreviewOutcome {
        self.with_scene(|scene| scene.clear_preview(layer))
    }
}
