//! Deterministic float ordering.
//!
//! Slider values arrive as raw `f64` and end up inside ordered keys, so they
//! need a total order that treats `-0.0`/`0.0` and all NaNs consistently.

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

/// Canonicalize a floating-point value for deterministic ordering.
///
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

/// A float wrapper with a deterministic total ordering, usable in keys.
#[derive(Debug, Copy, Clone, Default)]
pub struct StableF64(pub f64);

impl StableF64 {
    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for StableF64 {
    fn eq(&self, other: &Self) -> bool {
        stable_total_cmp_f64(self.0, other.0) == Ordering::Equal
    }
}

impl Eq for StableF64 {}

impl PartialOrd for StableF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StableF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        stable_total_cmp_f64(self.0, other.0)
    }
}

impl Hash for StableF64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        canonical_f64(self.0).to_bits().hash(state);
    }
}
