//! Keeps loaded tilesets in sync with their layers' committed transforms.
//!
//! Everything here is single-threaded and driven by the host: `sync` when
//! persisted layer state changes, `advance` from the frame callback. The
//! only deferred work is the bounded retry for tilesets whose geometry has
//! not arrived yet. A new key cancels every pending retry before anything
//! is written, so a retry computed from superseded values can never land
//! after a newer write.

use foundation::math::{Mat4, Vec3};
use foundation::time::TimeMs;
use layers::{AssetLayer, LayerId, TileTransform, tile_transforms};
use runtime::{TimerQueue, VirtualClock};
use scene::{EngineError, MatrixTarget, TilesetEngine, TilesetHandle};
use tracing::{debug, trace};

use crate::compose::compose_transform_with;
use crate::config::TransformConfig;
use crate::key::TransformKey;
use crate::pivot::PivotCache;
use crate::stats::ApplyStats;

/// Result of one application attempt for one layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Applied,
    /// No tileset registered for the layer yet.
    Missing,
    Destroyed,
    RetryScheduled { attempt: u32 },
    GaveUp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub applied: usize,
    pub missing: usize,
    pub destroyed: usize,
    pub retrying: usize,
    pub gave_up: usize,
    pub cancelled_retries: usize,
}

impl SyncReport {
    fn record(&mut self, outcome: AttemptOutcome) {
        match outcome {
            AttemptOutcome::Applied => self.applied += 1,
            AttemptOutcome::Missing => self.missing += 1,
            AttemptOutcome::Destroyed => self.destroyed += 1,
            AttemptOutcome::RetryScheduled { .. } => self.retrying += 1,
            AttemptOutcome::GaveUp => self.gave_up += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Key unchanged; nothing was touched.
    Unchanged,
    Ran(SyncReport),
}

/// Result of a live-preview write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    Applied,
    Missing,
    Destroyed,
    /// No pivot cached yet; there is nothing on screen to preview against.
    NotReady,
    /// The engine refused the matrix.
    Failed,
    /// The scene has been unmounted.
    Detached,
    /// The scene is mid-update; the next slider event will land.
    Busy,
}

#[derive(Debug, Clone)]
struct Retry {
    request: TileTransform,
    attempt: u32,
}

#[derive(Debug, Default)]
pub struct LiveTransformLoop {
    config: TransformConfig,
    pivots: PivotCache,
    clock: VirtualClock,
    retries: TimerQueue<Retry>,
    key: Option<TransformKey>,
    committed: Vec<TileTransform>,
    stats: ApplyStats,
}

impl LiveTransformLoop {
    pub fn new(config: TransformConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn stats(&self) -> ApplyStats {
        self.stats
    }

    pub fn now(&self) -> TimeMs {
        self.clock.now()
    }

    pub fn pending_retries(&self) -> usize {
        self.retries.len()
    }

    pub fn key(&self) -> Option<&TransformKey> {
        self.key.as_ref()
    }

    pub fn pivots(&self) -> &PivotCache {
        &self.pivots
    }

    pub fn cached_pivot(&self, tileset: TilesetHandle) -> Option<Vec3> {
        self.pivots.cached_pivot(tileset)
    }

    /// Registers a ground-clamp style correction for a tileset. It takes
    /// effect on the next write to that tileset.
    pub fn record_base_transform(&mut self, tileset: TilesetHandle, base: Mat4) {
        self.pivots.set_base_transform(tileset, base);
    }

    /// Reconciles tilesets with the committed state of `layers`.
    ///
    /// Re-runs only when the `(id, heightOffset, scale)` key of the visible
    /// tile layers changed. A re-run cancels every retry of the previous run
    /// before anything is written.
    pub fn sync<E: TilesetEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        layers: &[AssetLayer],
    ) -> SyncOutcome {
        let requests = tile_transforms(layers);
        let key = TransformKey::from_requests(&requests);
        if self.key.as_ref() == Some(&key) {
            return SyncOutcome::Unchanged;
        }

        let mut report = SyncReport {
            cancelled_retries: self.retries.cancel_all(),
            ..SyncReport::default()
        };
        self.drop_stale(report.cancelled_retries);
        if report.cancelled_retries > 0 {
            debug!(
                "transform key changed; cancelled {} pending retries",
                report.cancelled_retries
            );
        }

        let dropped = self.pivots.retain_live(&*engine);
        if dropped > 0 {
            trace!("dropped {dropped} pivots of destroyed tilesets");
        }

        trace!("applying transform key {key}");
        self.key = Some(key);
        self.committed = requests.clone();

        for request in requests {
            let outcome = self.attempt(engine, request, 0);
            report.record(outcome);
        }
        SyncOutcome::Ran(report)
    }

    /// Advances the virtual clock by `ms`, firing due retries in order.
    /// Returns how many retries ran.
    pub fn advance<E: TilesetEngine + ?Sized>(&mut self, engine: &mut E, ms: u64) -> usize {
        let target = self.clock.now().after(ms);
        let mut fired = 0;

        while let Some(due) = self.retries.next_due().filter(|due| *due <= target) {
            self.clock.advance_to(due);
            let Some((_, _, retry)) = self.retries.pop_due(due) else {
                break;
            };
            fired += 1;
            self.attempt(engine, retry.request, retry.attempt);
        }

        self.clock.advance_to(target);
        fired
    }

    /// Loader notification: the layer's tileset was (re)registered. Applies
    /// the committed values right away instead of waiting for a key change.
    pub fn on_tileset_loaded<E: TilesetEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        layer: &LayerId,
    ) -> Option<AttemptOutcome> {
        let request = self
            .committed
            .iter()
            .find(|r| &r.layer_id == layer)
            .cloned()?;
        let cancelled = self.retries.cancel_where(|r| &r.request.layer_id == layer);
        self.drop_stale(cancelled);
        Some(self.attempt(engine, request, 0))
    }

    /// Engine notification that a tileset is gone.
    pub fn on_tileset_destroyed(&mut self, tileset: TilesetHandle) {
        self.pivots.forget(tileset);
    }

    /// Writes a transient `(height_offset, scale)` without touching the
    /// committed state. Uses the cached pivot only: no derivation, no retry.
    pub fn preview<E: TilesetEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        layer: &LayerId,
        height_offset: f64,
        scale: f64,
    ) -> PreviewOutcome {
        let Some(tileset) = engine.tileset_for_layer(layer) else {
            return PreviewOutcome::Missing;
        };
        if engine.is_destroyed(tileset) {
            return PreviewOutcome::Destroyed;
        }
        let Some(pivot) = self.pivots.cached_pivot(tileset) else {
            return PreviewOutcome::NotReady;
        };

        match self.write(engine, tileset, pivot, height_offset, scale) {
            Ok(()) => {
                self.stats.previews += 1;
                // A pending retry of committed values would overwrite the preview.
                let cancelled = self.retries.cancel_where(|r| &r.request.layer_id == layer);
                self.drop_stale(cancelled);
                PreviewOutcome::Applied
            }
            Err(err) => {
                debug!("preview for layer {layer} failed: {err}");
                PreviewOutcome::Failed
            }
        }
    }

    /// Drops a preview by re-writing the layer's committed values.
    pub fn clear_preview<E: TilesetEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        layer: &LayerId,
    ) -> PreviewOutcome {
        let Some(request) = self.committed.iter().find(|r| &r.layer_id == layer).cloned() else {
            return PreviewOutcome::Missing;
        };
        self.preview(engine, layer, request.height_offset, request.scale)
    }

    /// Cancels all pending work and forgets every tileset. The loop can be
    /// reused afterwards; the next `sync` runs unconditionally.
    pub fn teardown(&mut self) {
        let cancelled = self.retries.cancel_all();
        self.drop_stale(cancelled);
        if cancelled > 0 {
            debug!("teardown cancelled {cancelled} pending retries");
        }
        self.key = None;
        self.committed.clear();
        self.pivots.clear();
    }

    fn drop_stale(&mut self, cancelled: usize) {
        self.stats.stale_retries_dropped += cancelled as u64;
    }

    fn attempt<E: TilesetEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        request: TileTransform,
        attempt: u32,
    ) -> AttemptOutcome {
        let Some(tileset) = engine.tileset_for_layer(&request.layer_id) else {
            trace!("layer {} has no tileset yet", request.layer_id);
            self.stats.skipped_missing += 1;
            return AttemptOutcome::Missing;
        };

        if engine.is_destroyed(tileset) {
            trace!("skipping destroyed {tileset}");
            self.pivots.forget(tileset);
            self.stats.skipped_destroyed += 1;
            return AttemptOutcome::Destroyed;
        }

        let Some(pivot) = self.pivots.get_or_establish(&*engine, tileset) else {
            return self.schedule_retry(request, attempt);
        };

        match self.write(engine, tileset, pivot, request.height_offset, request.scale) {
            Ok(()) => {
                self.stats.applied += 1;
                trace!(
                    "applied h={} s={} to {tileset} (layer {})",
                    request.height_offset, request.scale, request.layer_id
                );
                AttemptOutcome::Applied
            }
            Err(err) => {
                self.stats.engine_failures += 1;
                debug!("applying transform to {tileset} failed: {err}");
                self.schedule_retry(request, attempt)
            }
        }
    }

    fn schedule_retry(&mut self, request: TileTransform, attempt: u32) -> AttemptOutcome {
        let policy = self.config.retry;
        let next = attempt + 1;
        if next > policy.max_attempts {
            self.stats.retries_exhausted += 1;
            debug!(
                "giving up on layer {} after {} attempts",
                request.layer_id,
                attempt + 1
            );
            return AttemptOutcome::GaveUp;
        }

        let delay = policy.delay_for(next);
        self.retries.schedule(
            self.clock.now(),
            delay,
            Retry {
                request,
                attempt: next,
            },
        );
        self.stats.retries_scheduled += 1;
        AttemptOutcome::RetryScheduled { attempt: next }
    }

    fn write<E: TilesetEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        tileset: TilesetHandle,
        pivot: Vec3,
        height_offset: f64,
        scale: f64,
    ) -> Result<(), EngineError> {
        let base = self.pivots.base_transform(tileset);
        let composed = compose_transform_with(
            &self.config.thresholds,
            pivot,
            height_offset,
            scale,
            base.as_ref(),
        );

        match engine.matrix_target(tileset) {
            MatrixTarget::ModelMatrix => engine.set_model_matrix(tileset, composed)?,
            MatrixTarget::RootTransform => {
                let root = self
                    .pivots
                    .original_root(&*engine, tileset)
                    .ok_or(EngineError::NotReady(tileset))?;
                engine.set_root_transform(tileset, composed * root)?;
            }
        }
        engine.request_render();
        Ok(())
    }
}
