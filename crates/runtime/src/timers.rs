//! Deterministic cancellable timers.
//!
//! Key properties:
//! - Total ordering on `(due, id)`: timers due at the same instant fire in
//!   scheduling order.
//! - A cancelled timer never fires, and cancelling does not perturb the
//!   order of the remaining timers.
//! - Time only moves when the caller passes a later `now`.

use foundation::time::TimeMs;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Key {
    due: TimeMs,
    id: TimerId,
}

#[derive(Debug)]
struct Entry<T> {
    key: Key,
    payload: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn schedule(&mut self, now: TimeMs, delay_ms: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry {
            key: Key {
                due: now.after(delay_ms),
                id,
            },
            payload,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key.id != id);
        self.entries.len() != before
    }

    /// Cancels every pending timer and returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    /// Cancels every timer whose payload matches `pred`.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(&e.payload));
        before - self.entries.len()
    }

    pub fn next_due(&self) -> Option<TimeMs> {
        self.entries.iter().map(|e| e.key.due).min()
    }

    /// Pops the earliest timer that is due at `now`, if any.
    pub fn pop_due(&mut self, now: TimeMs) -> Option<(TimerId, TimeMs, T)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.key.due <= now)
            .min_by_key(|(_, e)| e.key)
            .map(|(idx, _)| idx)?;

        let entry = self.entries.swap_remove(idx);
        Some((entry.key.id, entry.key.due, entry.payload))
    }
}
