/// Millisecond timestamp on a virtual clock.
///
/// Nothing in the workspace reads wall-clock time; hosts advance the clock
/// explicitly, which keeps retry timing replayable in tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeMs(pub u64);

impl TimeMs {
    pub const ZERO: Self = TimeMs(0);

    pub fn after(self, delay_ms: u64) -> Self {
        TimeMs(self.0.saturating_add(delay_ms))
    }

    pub fn since(self, earlier: TimeMs) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}
