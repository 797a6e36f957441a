use std::collections::BTreeMap;

use foundation::math::{Mat4, Vec3};
use scene::{MatrixTarget, TilesetEngine, TilesetHandle};
use tracing::trace;

#[derive(Debug, Clone, Default)]
struct PivotEntry {
    pivot: Option<Vec3>,
    base: Option<Mat4>,
    /// Root placement before the first write, for root-transform tilesets.
    original_root: Option<Mat4>,
}

/// Per-tileset side-table of placement state.
///
/// Keyed by handle identity, not layer id: a reload of the same layer gets
/// a new handle and therefore a freshly derived pivot. The engine's own
/// tileset objects are never mutated to hold this state.
#[derive(Debug, Default)]
pub struct PivotCache {
    entries: BTreeMap<TilesetHandle, PivotEntry>,
}

impl PivotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the tileset's pivot, deriving and caching it on first use.
    ///
    /// Derivation prefers the bounding-sphere center, then the root
    /// transform's translation. `None` means the tileset is not structurally
    /// ready yet. Once cached the pivot is never recomputed for this handle,
    /// even if the bounding sphere later moves.
    pub fn get_or_establish<E: TilesetEngine + ?Sized>(
        &mut self,
        engine: &E,
        tileset: TilesetHandle,
    ) -> Option<Vec3> {
        if let Some(pivot) = self.cached_pivot(tileset) {
            return Some(pivot);
        }

        let pivot = engine
            .bounding_sphere_center(tileset)
            .filter(|c| c.is_finite())
            .or_else(|| {
                engine
                    .root_transform(tileset)
                    .map(|root| root.translation())
                    .filter(|t| t.is_finite())
            })?;

        trace!("pivot for {tileset} established at {pivot:?}");
        self.entries.entry(tileset).or_default().pivot = Some(pivot);
        Some(pivot)
    }

    pub fn cached_pivot(&self, tileset: TilesetHandle) -> Option<Vec3> {
        self.entries.get(&tileset).and_then(|e| e.pivot)
    }

    /// Records a correction (e.g. a ground clamp) that every composed
    /// transform for this tileset is applied on top of.
    pub fn set_base_transform(&mut self, tileset: TilesetHandle, base: Mat4) {
        self.entries.entry(tileset).or_default().base = Some(base);
    }

    pub fn clear_base_transform(&mut self, tileset: TilesetHandle) -> Option<Mat4> {
        self.entries.get_mut(&tileset).and_then(|e| e.base.take())
    }

    pub fn base_transform(&self, tileset: TilesetHandle) -> Option<Mat4> {
        self.entries.get(&tileset).and_then(|e| e.base)
    }

    /// The root placement the tileset had before this cache first wrote to
    /// it. Captured once; later root writes never replace it.
    pub fn original_root<E: TilesetEngine + ?Sized>(
        &mut self,
        engine: &E,
        tileset: TilesetHandle,
    ) -> Option<Mat4> {
        if engine.matrix_target(tileset) != MatrixTarget::RootTransform {
            return None;
        }
        let entry = self.entries.entry(tileset).or_default();
        if entry.original_root.is_none() {
            entry.original_root = engine.root_transform(tileset);
        }
        entry.original_root
    }

    pub fn forget(&mut self, tileset: TilesetHandle) -> bool {
        self.entries.remove(&tileset).is_some()
    }

    /// Drops entries whose tileset has been destroyed. Returns how many were
    /// removed.
    pub fn retain_live<E: TilesetEngine + ?Sized>(&mut self, engine: &E) -> usize {
        let before = self.entries.len();
        self.entries.retain(|tileset, _| !engine.is_destroyed(*tileset));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
