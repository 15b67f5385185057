//! FSRS-6 core formulas
//!
//! Pure functions over stability, difficulty and retrievability. Nothing here
//! knows about cards, items or dates; the scheduler composes these.

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default FSRS-6 weights (21 parameters)
pub const FSRS6_WEIGHTS: [f64; 21] = [
    0.212, 1.2931, 2.3065, 8.2956, 6.4133, 0.8334, 3.0194, 0.001, 1.8722, 0.1666, 0.796, 1.4835,
    0.0614, 0.2629, 1.6483, 0.6014, 1.8729, 0.5425, 0.0912, 0.0658, 0.1542,
];

/// Default target retention
pub const DEFAULT_RETENTION: f64 = 0.9;

/// Default forgetting curve decay (w20)
pub const DEFAULT_DECAY: f64 = 0.1542;

/// Default maximum interval in days (100 years)
pub const DEFAULT_MAXIMUM_INTERVAL: u32 = 36500;

/// Stability bounds (days)
pub const MIN_STABILITY: f64 = 0.001;
pub const MAX_STABILITY: f64 = 36500.0;

/// Difficulty bounds
pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 10.0;

// ============================================================================
// RETRIEVABILITY
// ============================================================================

/// Forgetting curve factor so that R(S, S) = 0.9
fn decay_factor(decay: f64) -> f64 {
    0.9_f64.powf(-1.0 / decay) - 1.0
}

/// Probability of recall after `elapsed_days` with the default decay
pub fn retrievability(stability: f64, elapsed_days: f64) -> f64 {
    retrievability_with_decay(stability, elapsed_days, DEFAULT_DECAY)
}

/// R = (1 + FACTOR * t / S)^(-w20)
pub fn retrievability_with_decay(stability: f64, elapsed_days: f64, decay: f64) -> f64 {
    if stability <= 0.0 {
        return 0.0;
    }
    let t = elapsed_days.max(0.0);
    (1.0 + decay_factor(decay) * t / stability).powf(-decay)
}

// ============================================================================
// INTERVALS
// ============================================================================

/// Interval (fractional days) at which R decays to `desired_retention`,
/// using the default decay
pub fn next_interval(stability: f64, desired_retention: f64) -> f64 {
    next_interval_with_decay(stability, desired_retention, DEFAULT_DECAY)
}

/// t = S / FACTOR * (r^(-1/w20) - 1)
///
/// Returns NaN for degenerate inputs; callers decide on the fallback.
pub fn next_interval_with_decay(stability: f64, desired_retention: f64, decay: f64) -> f64 {
    if !(desired_retention > 0.0 && desired_retention < 1.0) {
        return f64::NAN;
    }
    stability / decay_factor(decay) * (desired_retention.powf(-1.0 / decay) - 1.0)
}

// ============================================================================
// INITIAL STATE
// ============================================================================

/// S0(G) = w[G-1]
pub fn initial_stability(grade: u8) -> f64 {
    initial_stability_with_weights(grade, &FSRS6_WEIGHTS)
}

pub fn initial_stability_with_weights(grade: u8, weights: &[f64; 21]) -> f64 {
    let index = usize::from(grade.clamp(1, 4)) - 1;
    weights[index].max(MIN_STABILITY)
}

/// D0(G) = w4 - e^(w5 * (G - 1)) + 1, clamped to [1, 10]
pub fn initial_difficulty(grade: u8) -> f64 {
    initial_difficulty_with_weights(grade, &FSRS6_WEIGHTS)
}

pub fn initial_difficulty_with_weights(grade: u8, weights: &[f64; 21]) -> f64 {
    raw_initial_difficulty(grade, weights).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Unclamped D0, used as the mean-reversion target
fn raw_initial_difficulty(grade: u8, weights: &[f64; 21]) -> f64 {
    let g = f64::from(grade.clamp(1, 4));
    weights[4] - (weights[5] * (g - 1.0)).exp() + 1.0
}

// ============================================================================
// DIFFICULTY
// ============================================================================

pub fn next_difficulty(difficulty: f64, grade: u8) -> f64 {
    next_difficulty_with_weights(difficulty, grade, &FSRS6_WEIGHTS)
}

/// Linear damping towards 10, then mean reversion towards D0(Easy)
pub fn next_difficulty_with_weights(difficulty: f64, grade: u8, weights: &[f64; 21]) -> f64 {
    let g = f64::from(grade.clamp(1, 4));
    let d = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
    let delta = -weights[6] * (g - 3.0);
    let damped = d + delta * (10.0 - d) / 9.0;
    let reverted = weights[7] * raw_initial_difficulty(4, weights) + (1.0 - weights[7]) * damped;
    reverted.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

// ============================================================================
// STABILITY
// ============================================================================

pub fn next_recall_stability(difficulty: f64, stability: f64, retrievability: f64, grade: u8) -> f64 {
    next_recall_stability_with_weights(difficulty, stability, retrievability, grade, &FSRS6_WEIGHTS)
}

/// Stability after a successful recall (Hard/Good/Easy) in the review phase
pub fn next_recall_stability_with_weights(
    difficulty: f64,
    stability: f64,
    retrievability: f64,
    grade: u8,
    weights: &[f64; 21],
) -> f64 {
    let s = stability.max(MIN_STABILITY);
    let d = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
    let hard_penalty = if grade == 2 { weights[15] } else { 1.0 };
    let easy_bonus = if grade == 4 { weights[16] } else { 1.0 };

    let growth = weights[8].exp()
        * (11.0 - d)
        * s.powf(-weights[9])
        * ((weights[10] * (1.0 - retrievability)).exp() - 1.0)
        * hard_penalty
        * easy_bonus;

    (s * (1.0 + growth)).clamp(MIN_STABILITY, MAX_STABILITY)
}

pub fn next_forget_stability(difficulty: f64, stability: f64, retrievability: f64) -> f64 {
    next_forget_stability_with_weights(difficulty, stability, retrievability, &FSRS6_WEIGHTS)
}

/// Post-lapse stability, never above the short-term ceiling S / e^(w17 * w18)
pub fn next_forget_stability_with_weights(
    difficulty: f64,
    stability: f64,
    retrievability: f64,
    weights: &[f64; 21],
) -> f64 {
    let s = stability.max(MIN_STABILITY);
    let d = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);

    let long_term = weights[11]
        * d.powf(-weights[12])
        * ((s + 1.0).powf(weights[13]) - 1.0)
        * (weights[14] * (1.0 - retrievability)).exp();
    let short_term_ceiling = s / (weights[17] * weights[18]).exp();

    long_term
        .min(short_term_ceiling)
        .clamp(MIN_STABILITY, MAX_STABILITY)
}

pub fn same_day_stability(stability: f64, grade: u8) -> f64 {
    same_day_stability_with_weights(stability, grade, &FSRS6_WEIGHTS)
}

/// S' = S * e^(w17 * (G - 3 + w18)) * S^(-w19)
///
/// Good and Easy never lower stability.
pub fn same_day_stability_with_weights(stability: f64, grade: u8, weights: &[f64; 21]) -> f64 {
    let s = stability.max(MIN_STABILITY);
    let g = f64::from(grade.clamp(1, 4));
    let mut increase = (weights[17] * (g - 3.0 + weights[18])).exp() * s.powf(-weights[19]);
    if grade >= 3 {
        increase = increase.max(1.0);
    }
    (s * increase).clamp(MIN_STABILITY, MAX_STABILITY)
}
