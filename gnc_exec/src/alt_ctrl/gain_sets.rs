//! LMI gain sets for the fuzzy altitude controller
//!
//! Each set holds one state feedback row per rule, acting on
//! `[altitude error, climb rate, pitch error, pitch rate]`, and the design
//! bounds of the three scheduling variables. Rules are enumerated with the
//! first scheduling variable outermost and the low set first.

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of rules in the fuzzy altitude controller.
pub const NUM_LMI_RULES: usize = 8;

/// Number of states fed back by each rule.
pub const NUM_LMI_STATES: usize = 4;

/// Number of scheduling variables.
pub const NUM_SCHED_VARS: usize = 3;

const BOUNDS_A: [SchedBounds; NUM_SCHED_VARS] = [
    SchedBounds { max: -0.19956, min: -0.80692 },
    SchedBounds { max: 13.9932, min: 10.2479 },
    SchedBounds { max: 0.31838, min: 0.073926 },
];

const BOUNDS_B: [SchedBounds; NUM_SCHED_VARS] = [
    SchedBounds { max: -0.19956, min: -0.80692 },
    SchedBounds { max: 13.2529, min: 11.1097 },
    SchedBounds { max: 0.25977, min: 0.13707 },
];

static LMI_SET_1: LmiGainSet = LmiGainSet {
    gains: [
        [0.24887, 3.8117, -0.014127, 0.24208],
        [0.2156, 3.5863, -0.036707, 0.20848],
        [0.20803, 4.1414, -0.0020214, 0.21848],
        [0.17783, 3.8637, -0.026582, 0.17963],
        [0.16185, 4.549, 0.015949, 0.164],
        [0.15125, 3.97, -0.019482, 0.15579],
        [0.10078, 4.7296, 0.047139, 0.19323],
        [0.1166, 4.0331, -0.0075814, 0.13821],
    ],
    bounds: BOUNDS_A,
};

static LMI_SET_2: LmiGainSet = LmiGainSet {
    gains: [
        [0.99609, 4.3079, 0.085038, 0.29888],
        [0.82427, 4.8389, 0.056465, 0.26573],
        [0.93049, 5.3483, 0.087198, 0.29675],
        [0.7685, 5.1532, 0.056999, 0.25737],
        [0.78918, 6.2386, 0.089284, 0.26875],
        [0.63431, 5.6553, 0.054239, 0.22551],
        [0.60786, 6.5665, 0.10033, 0.24711],
        [0.54911, 5.8333, 0.05316, 0.21386],
    ],
    bounds: BOUNDS_A,
};

static LMI_SET_3: LmiGainSet = LmiGainSet {
    gains: [
        [1.1101, 2.7506, 0.062397, 0.22145],
        [1.1221, 3.1775, 0.057379, 0.22023],
        [1.1661, 3.7206, 0.065712, 0.23362],
        [1.1288, 3.8152, 0.058197, 0.22173],
        [0.92763, 4.9578, 0.057638, 0.19507],
        [0.88139, 4.6416, 0.049835, 0.1845],
        [0.78222, 4.9678, 0.056559, 0.1849],
        [0.79436, 4.6206, 0.047368, 0.17421],
    ],
    bounds: BOUNDS_B,
};

static LMI_SET_DEFAULT: LmiGainSet = LmiGainSet {
    gains: [
        [0.39106, 2.2661, -0.25992, 0.16117],
        [0.35661, 2.1644, -0.29158, 0.15248],
        [0.31853, 2.5284, -0.1838, 0.16855],
        [0.27446, 2.4481, -0.20659, 0.14603],
        [0.27142, 2.8615, -0.080487, 0.077737],
        [0.26178, 2.6207, -0.20091, 0.10142],
        [0.23188, 2.9284, -0.065439, 0.18728],
        [0.19221, 2.7164, -0.11955, 0.13071],
    ],
    bounds: BOUNDS_B,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Design bounds of a scheduling variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedBounds {
    pub max: f64,
    pub min: f64,
}

/// A complete gain set for the fuzzy altitude controller.
#[derive(Debug, PartialEq)]
pub struct LmiGainSet {
    /// Feedback gains of each rule.
    pub gains: [[f64; NUM_LMI_STATES]; NUM_LMI_RULES],

    /// Bounds of each scheduling variable.
    pub bounds: [SchedBounds; NUM_SCHED_VARS],
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the gain set with the given index. Indices other than 1, 2 or 3 give
/// the default set.
pub fn lmi_gain_set(index: u8) -> &'static LmiGainSet {
    match index {
        1 => &LMI_SET_1,
        2 => &LMI_SET_2,
        3 => &LMI_SET_3,
        _ => &LMI_SET_DEFAULT,
    }
}
