//! Arc length search
//!
//! The Lissajous primitives cannot be inverted for `zeta` in closed form.
//! Instead the search steps a candidate `zeta` forward in fixed increments,
//! accumulating the arc length `|dP/dzeta| * dzeta` of each increment, until
//! the accumulated length reaches the target point's arc length `s`.
//!
//! The search keeps its cursor between calls and only ever moves forward, so
//! it relies on `s` being non-decreasing while a primitive is flown. If `s`
//! falls back the cursor simply holds. A cap on the number of steps taken in
//! one call bounds the time spent, at the cost of `zeta` lagging `s` until
//! later calls catch up.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Forward-only search for the curve parameter at a given arc length.
#[derive(Debug, Clone)]
pub struct ArcLengthSearch {
    /// Parameter increment of each step.
    step: f64,

    /// Maximum number of steps taken in one call.
    max_steps: u32,

    /// Number of steps taken since the last reset.
    index: u64,

    /// Arc length accumulated over those steps.
    ///
    /// Units: meters
    length_m: f64,
}

/// Result of one call to the search.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SearchResult {
    pub zeta: f64,

    /// Number of steps taken in this call.
    pub steps: u32,

    /// True if the step cap was reached before the arc length was.
    pub capped: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArcLengthSearch {
    pub fn new(step: f64, max_steps: u32) -> Self {
        Self {
            step,
            max_steps,
            index: 0,
            length_m: 0.0,
        }
    }

    /// Move the cursor back to the start of the curve.
    pub fn reset(&mut self) {
        self.index = 0;
        self.length_m = 0.0;
    }

    /// Current parameter value.
    pub fn zeta(&self) -> f64 {
        self.index as f64 * self.step
    }

    /// Advance the search until the accumulated arc length reaches `s_m`,
    /// using `speed` to give `|dP/dzeta|` at a parameter value.
    pub fn advance<F>(&mut self, s_m: f64, speed: F) -> SearchResult
    where
        F: Fn(f64) -> f64
    {
        let mut steps = 0;

        while self.length_m < s_m && steps < self.max_steps {
            self.length_m += speed(self.zeta()) * self.step;
            self.index += 1;
            steps += 1;
        }

        SearchResult {
            zeta: self.zeta(),
            steps,
            capped: self.length_m < s_m,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
