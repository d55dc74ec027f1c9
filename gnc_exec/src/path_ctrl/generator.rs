//! Path generator
//!
//! Places the target point on the current primitive from the arc length
//! travelled, and chooses the next primitive from the flight plan as the
//! waypoints advance.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};
use nalgebra::Vector2;
use serde::Serialize;

use super::{ArcLengthSearch, FlightPlan, PathPoint, Primitive, PrimitiveKind, SearchResult};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A waypoint change below this parameter value redefines the current line
/// immediately instead of waiting for the line to complete.
const REDEFINE_ZETA_MAX: f64 = 0.1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Waypoints in the path frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathWaypoints {
    /// Units: meters
    pub prev_m: Vector2<f64>,

    /// Units: meters
    pub next_m: Vector2<f64>,

    pub index: u16,
}

/// Generates the target point along the flight plan.
#[derive(Debug, Clone)]
pub struct PathGenerator {
    plan: FlightPlan,

    /// Waypoint index at which the plan's curve is flown
    curve_wp_index: u16,

    /// Units: meters
    radius_m: f64,

    /// Start of the first line of the orbit plans, in the path frame
    entry_point_m: Option<Vector2<f64>>,

    primitive: Primitive,

    search: ArcLengthSearch,

    /// Arc length along the current primitive
    ///
    /// Units: meters
    s_m: f64,

    zeta: f64,

    /// Waypoint index seen on the previous update
    wp_index: Option<u16>,

    latch: SwitchLatch,
}

/// Output of one generator update.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GeneratorOutput {
    pub point: PathPoint,

    pub kind: PrimitiveKind,

    pub zeta: f64,

    /// Units: 1/second
    pub zeta_rate: f64,

    /// Units: meters
    pub s_m: f64,

    pub latch: SwitchLatch,

    /// True if a new primitive was committed on this update.
    pub committed: bool,

    /// Result of the arc length search, for primitives which need it.
    pub search: Option<SearchResult>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// State of the deferred path switch.
///
/// At most one switch is ever outstanding. Waypoint changes while `Armed`
/// are absorbed by the switch already waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwitchLatch {
    Idle,

    /// A waypoint change has been seen and the switch will be committed when
    /// the current primitive completes.
    Armed,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FlightPlan {
    /// The primitive to fly towards waypoint `wp_index`.
    ///
    /// `committed` is true when the primitive follows the completion of
    /// another, and false when a line is being defined or redefined before
    /// the current one has been flown. Curves and orbits are only ever
    /// entered on a commit.
    pub fn primitive_for(&self, wp_index: u16, curve_wp_index: u16, committed: bool)
        -> PrimitiveKind
    {
        match self {
            FlightPlan::LineSequence => PrimitiveKind::Line,
            FlightPlan::LineThenOrbitRight if committed => PrimitiveKind::OrbitRight,
            FlightPlan::LineThenOrbitLeft if committed => PrimitiveKind::OrbitLeft,
            FlightPlan::LineThenOrbitRight | FlightPlan::LineThenOrbitLeft => {
                PrimitiveKind::Line
            },
            FlightPlan::LineFigureEight if committed && wp_index == curve_wp_index => {
                PrimitiveKind::FigureEight
            },
            FlightPlan::LineDecorative if committed && wp_index == curve_wp_index => {
                PrimitiveKind::Decorative
            },
            FlightPlan::LineFigureEight | FlightPlan::LineDecorative => PrimitiveKind::Line,
        }
    }

    fn uses_entry_point(&self) -> bool {
        matches!(self, FlightPlan::LineThenOrbitRight | FlightPlan::LineThenOrbitLeft)
    }
}

impl PathGenerator {
    /// Create a generator. The first update defines the first primitive.
    pub fn new(
        plan: FlightPlan,
        curve_wp_index: u16,
        radius_m: f64,
        entry_point_m: Option<Vector2<f64>>,
        search: ArcLengthSearch
    ) -> Self {
        Self {
            plan,
            curve_wp_index,
            radius_m,
            entry_point_m,
            primitive: Primitive::new(
                PrimitiveKind::Line,
                Vector2::zeros(),
                Vector2::zeros(),
                radius_m
            ),
            search,
            s_m: 0.0,
            zeta: 0.0,
            wp_index: None,
            latch: SwitchLatch::Idle,
        }
    }

    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    /// Move the target point along the path.
    pub fn advance_arc_length(&mut self, ds_m: f64) {
        self.s_m += ds_m;
    }

    /// Update the path from the waypoints and place the target point on it.
    ///
    /// `dt_s` is used only for the parameter rate, which is zero if the time
    /// has not advanced.
    pub fn update(&mut self, wps: &PathWaypoints, dt_s: f64) -> GeneratorOutput {
        let mut zeta_prev = self.zeta;
        let mut committed = false;

        let index_changed = self.wp_index != Some(wps.index);
        self.wp_index = Some(wps.index);

        // ---- SWITCH LOGIC ----

        let terminal = self.primitive.kind.terminal_zeta();

        if index_changed {
            if self.primitive.kind == PrimitiveKind::Line && self.zeta < REDEFINE_ZETA_MAX {
                // The redefined line replaces any switch armed on the old one
                self.latch = SwitchLatch::Idle;
                if self.define(wps, false) {
                    zeta_prev = 0.0;
                }
            }
            else if terminal.is_some() && self.latch == SwitchLatch::Idle {
                self.latch = SwitchLatch::Armed;
                debug!(
                    "PathCtrl: switch armed at waypoint {} (zeta = {:.3})",
                    wps.index, self.zeta
                );
            }
        }

        if let (SwitchLatch::Armed, Some(t)) = (self.latch, terminal) {
            if self.zeta >= t {
                self.latch = SwitchLatch::Idle;
                self.s_m = 0.0;
                zeta_prev = 0.0;
                self.define(wps, true);
                committed = true;
            }
        }

        // ---- TARGET POINT ----

        let prim = self.primitive;
        let mut search = None;

        self.zeta = match prim.closed_form_zeta(self.s_m) {
            Some(z) => z,
            None => {
                let r = self.search.advance(self.s_m, |z| prim.speed(z));
                search = Some(r);
                r.zeta
            }
        };

        let zeta_rate = if dt_s > 0.0 {
            (self.zeta - zeta_prev) / dt_s
        }
        else {
            0.0
        };

        GeneratorOutput {
            point: prim.point(self.zeta, zeta_rate),
            kind: prim.kind,
            zeta: self.zeta,
            zeta_rate,
            s_m: self.s_m,
            latch: self.latch,
            committed,
            search,
        }
    }

    /// Define the primitive towards the current waypoints, returning true if
    /// the kind of primitive changed.
    fn define(&mut self, wps: &PathWaypoints, committed: bool) -> bool {
        let kind = self.plan.primitive_for(wps.index, self.curve_wp_index, committed);

        let p0 = match self.entry_point_m {
            Some(e) if !committed && self.plan.uses_entry_point() => e,
            _ => wps.prev_m,
        };

        let p1 = match kind {
            PrimitiveKind::Decorative => wps.next_m - Vector2::new(self.radius_m, self.radius_m),
            _ => wps.next_m,
        };

        let changed = kind != self.primitive.kind;
        self.primitive = Primitive::new(kind, p0, p1, self.radius_m);
        self.search.reset();

        if changed {
            self.s_m = 0.0;
        }

        if committed || changed {
            info!(
                "PathCtrl: switch to {:?} towards waypoint {} at [{:.1}, {:.1}]",
                kind, wps.index, p1[0], p1[1]
            );
        }
        else {
            debug!("PathCtrl: line redefined towards waypoint {}", wps.index);
        }

        changed
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn generator(plan: FlightPlan) -> PathGenerator {
        PathGenerator::new(plan, 3, 20.0, None, ArcLengthSearch::new(1e-3, 100_000))
    }

    fn wps(index: u16) -> PathWaypoints {
        // Waypoints 100 m apart along x
        PathWaypoints {
            prev_m: Vector2::new(100.0 * (index as f64 - 1.0), 0.0),
            next_m: Vector2::new(100.0 * index as f64, 0.0),
            index,
        }
    }

    #[test]
    fn test_first_update_defines_line() {
        let mut gen = generator(FlightPlan::LineSequence);
        let out = gen.update(&wps(1), 0.1);

        assert_eq!(out.kind, PrimitiveKind::Line);
        assert_eq!(out.zeta, 0.0);
        assert_abs_diff_eq!(out.point.pos_m, Vector2::new(0.0, 0.0), epsilon = 1e-12);
        assert_eq!(gen.primitive().p1, Vector2::new(100.0, 0.0));
        assert_eq!(out.latch, SwitchLatch::Idle);
    }

    #[test]
    fn test_early_change_redefines_line() {
        let mut gen = generator(FlightPlan::LineSequence);
        gen.update(&wps(1), 0.1);
        gen.advance_arc_length(5.0);
        gen.update(&wps(1), 0.1);

        // zeta = 0.05, so a new waypoint redefines the line straight away
        let out = gen.update(&wps(2), 0.1);
        assert_eq!(out.latch, SwitchLatch::Idle);
        assert!(!out.committed);
        assert_eq!(gen.primitive().p0, Vector2::new(100.0, 0.0));
        assert_eq!(gen.primitive().p1, Vector2::new(200.0, 0.0));
    }

    #[test]
    fn test_switch_waits_for_terminal() {
        let mut gen = generator(FlightPlan::LineSequence);
        gen.update(&wps(1), 0.1);
        gen.advance_arc_length(50.0);
        gen.update(&wps(1), 0.1);

        // Waypoint 1 reached at zeta = 0.5, switch armed but not committed
        let out = gen.update(&wps(2), 0.1);
        assert_eq!(out.latch, SwitchLatch::Armed);
        assert_eq!(gen.primitive().p1, Vector2::new(100.0, 0.0));

        // Further waypoint changes do not queue another switch
        for i in 0..40 {
            gen.advance_arc_length(1.0);
            let out = gen.update(&wps(3 + i % 2), 0.1);
            assert!(!out.committed);
            assert_eq!(out.latch, SwitchLatch::Armed);
            assert!(out.zeta < 1.0);
        }

        // Complete the line
        gen.advance_arc_length(10.0);
        let out = gen.update(&wps(4), 0.1);
        assert!(!out.committed);
        assert!(out.zeta >= 1.0);

        let out = gen.update(&wps(4), 0.1);
        assert!(out.committed);
        assert_eq!(out.latch, SwitchLatch::Idle);
        assert_eq!(out.s_m, 0.0);
        assert_eq!(out.zeta, 0.0);
        assert_eq!(gen.primitive().p0, Vector2::new(300.0, 0.0));
        assert_eq!(gen.primitive().p1, Vector2::new(400.0, 0.0));

        // Only one switch was queued
        let out = gen.update(&wps(4), 0.1);
        assert!(!out.committed);
        assert_eq!(out.latch, SwitchLatch::Idle);
    }

    #[test]
    fn test_orbit_plan() {
        let entry = Vector2::new(-50.0, 10.0);
        let mut gen = PathGenerator::new(
            FlightPlan::LineThenOrbitLeft,
            3,
            20.0,
            Some(entry),
            ArcLengthSearch::new(1e-3, 1000)
        );

        let out = gen.update(&wps(1), 0.1);
        assert_eq!(out.kind, PrimitiveKind::Line);
        assert_eq!(gen.primitive().p0, entry);

        gen.advance_arc_length(60.0);
        gen.update(&wps(1), 0.1);
        let out = gen.update(&wps(2), 0.1);
        assert_eq!(out.latch, SwitchLatch::Armed);
        gen.advance_arc_length(200.0);
        gen.update(&wps(2), 0.1);
        let out = gen.update(&wps(2), 0.1);
        assert!(out.committed);
        assert_eq!(out.kind, PrimitiveKind::OrbitLeft);
        assert_eq!(gen.primitive().p1, Vector2::new(200.0, 0.0));

        // Orbits are never left
        gen.advance_arc_length(1000.0);
        for i in 3..10 {
            let out = gen.update(&wps(i), 0.1);
            assert_eq!(out.kind, PrimitiveKind::OrbitLeft);
            assert_eq!(out.latch, SwitchLatch::Idle);
        }
    }

    #[test]
    fn test_figure_eight_plan() {
        let mut gen = generator(FlightPlan::LineFigureEight);
        gen.update(&wps(2), 0.1);
        gen.advance_arc_length(50.0);
        gen.update(&wps(2), 0.1);

        // Arriving at waypoint 2 arms the switch, committed to the
        // figure-eight about waypoint 3 at the end of the line
        gen.update(&wps(3), 0.1);
        gen.advance_arc_length(60.0);
        gen.update(&wps(3), 0.1);
        let out = gen.update(&wps(3), 0.1);
        assert!(out.committed);
        assert_eq!(out.kind, PrimitiveKind::FigureEight);

        // The curve is flown until zeta reaches 4 pi even after the
        // waypoint changes
        gen.advance_arc_length(10.0);
        let out = gen.update(&wps(4), 0.1);
        assert_eq!(out.latch, SwitchLatch::Armed);
        assert!(out.search.is_some());

        let mut prev_zeta = out.zeta;
        let mut committed = false;
        for _ in 0..2000 {
            gen.advance_arc_length(2.0);
            let out = gen.update(&wps(4), 0.1);
            if out.committed {
                assert!(prev_zeta >= 4.0 * PI);
                assert_eq!(out.kind, PrimitiveKind::Line);
                committed = true;
                break;
            }
            assert!(out.zeta >= prev_zeta);
            prev_zeta = out.zeta;
        }
        assert!(committed);
    }

    #[test]
    fn test_early_change_at_curve_index() {
        let mut gen = generator(FlightPlan::LineFigureEight);
        gen.update(&wps(2), 0.1);
        gen.advance_arc_length(1.0);
        gen.update(&wps(2), 0.1);

        // The curve waypoint is reached at zeta = 0.01: the line is
        // redefined and the curve waits for a completed line
        let out = gen.update(&wps(3), 0.1);
        assert_eq!(out.kind, PrimitiveKind::Line);
        assert!(!out.committed);
        assert_eq!(out.latch, SwitchLatch::Idle);
        assert_eq!(gen.primitive().p1, Vector2::new(300.0, 0.0));
    }

    #[test]
    fn test_redefine_clears_armed_switch() {
        let mut gen = generator(FlightPlan::LineSequence);
        gen.update(&wps(1), 0.1);
        gen.advance_arc_length(50.0);
        gen.update(&wps(1), 0.1);
        let out = gen.update(&wps(2), 0.1);
        assert_eq!(out.latch, SwitchLatch::Armed);

        // The target falls back below the redefinition threshold
        gen.advance_arc_length(-45.0);
        let out = gen.update(&wps(2), 0.1);
        assert_abs_diff_eq!(out.zeta, 0.05, epsilon = 1e-12);

        let out = gen.update(&wps(3), 0.1);
        assert_eq!(out.latch, SwitchLatch::Idle);
        assert_eq!(gen.primitive().p0, Vector2::new(200.0, 0.0));
        assert_eq!(gen.primitive().p1, Vector2::new(300.0, 0.0));

        // Completing the redefined line does not restart it
        gen.advance_arc_length(100.0);
        let out = gen.update(&wps(3), 0.1);
        assert!(!out.committed);
        assert!(out.zeta >= 1.0);
        assert_eq!(gen.primitive().p0, Vector2::new(200.0, 0.0));
        assert_eq!(out.s_m, 105.0);
    }

    #[test]
    fn test_decorative_shift() {
        let mut gen = generator(FlightPlan::LineDecorative);

        // Starting at the curve index still flies a line first
        let out = gen.update(&wps(3), 0.1);
        assert_eq!(out.kind, PrimitiveKind::Line);

        // The curve is committed at the end of the line before it, with its
        // centre shifted by (-r, -r)
        let mut gen = generator(FlightPlan::LineDecorative);
        gen.update(&wps(2), 0.1);
        gen.advance_arc_length(50.0);
        gen.update(&wps(2), 0.1);
        gen.update(&wps(3), 0.1);
        gen.advance_arc_length(60.0);
        gen.update(&wps(3), 0.1);
        let out = gen.update(&wps(3), 0.1);
        assert!(out.committed);
        assert_eq!(out.kind, PrimitiveKind::Decorative);
        assert_eq!(gen.primitive().p1, Vector2::new(280.0, -20.0));
        assert_eq!(out.zeta, 0.0);
    }

    #[test]
    fn test_zero_dt_rate() {
        let mut gen = generator(FlightPlan::LineSequence);
        gen.update(&wps(1), 0.1);
        gen.advance_arc_length(5.0);

        let out = gen.update(&wps(1), 0.0);
        assert_eq!(out.zeta_rate, 0.0);

        gen.advance_arc_length(5.0);
        let out = gen.update(&wps(1), 0.5);
        assert_abs_diff_eq!(out.zeta_rate, 0.1, epsilon = 1e-12);
    }
}
