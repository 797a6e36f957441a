use foundation::time::TimeMs;

/// Deterministic millisecond clock.
///
/// This is the only timebase the transform loop sees. Hosts advance it from
/// their own frame callback; tests advance it by hand.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct VirtualClock {
    now: TimeMs,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now: TimeMs) -> Self {
        Self { now }
    }

    pub fn now(&self) -> TimeMs {
        self.now
    }

    pub fn advance(&mut self, ms: u64) -> TimeMs {
        self.now = self.now.after(ms);
        self.now
    }

    /// Moves the clock forward to `t`. Never moves it backwards.
    pub fn advance_to(&mut self, t: TimeMs) -> TimeMs {
        if t > self.now {
            self.now = t;
        }
        self.now
    }
}
