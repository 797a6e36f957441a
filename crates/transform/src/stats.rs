/// Running counters for the transform loop.
///
/// Every failure mode of the loop is absorbed rather than reported upward;
/// these counters are where it stays observable.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub applied: u64,
    pub previews: u64,
    pub skipped_missing: u64,
    pub skipped_destroyed: u64,
    pub retries_scheduled: u64,
    pub retries_exhausted: u64,
    pub engine_failures: u64,
    /// Retries cancelled before firing: superseded by a new key, a
    /// reload, a preview, or teardown.
    pub stale_retries_dropped: u64,
}
