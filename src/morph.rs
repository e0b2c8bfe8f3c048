//! Smoothed scalar animation.
//!
//! Every animated scalar is an explicit little state machine: a live value
//! plus at most one in-flight [`Tween`]. Asking for a new target never
//! queues; the running tween is abandoned and the new one starts from
//! wherever the value is right now, so switching shapes mid-animation gives
//! a continuous motion instead of a snap.
//!
//! [`MorphController`] drives the expansion scalar (0 = every particle at
//! the origin, 1 = fully formed shape). [`ScaleController`] drives the
//! particle system's uniform scale.

use std::f32::consts::TAU;

/// Duration of the collapse-and-reform animation played on shape switches.
pub const SHAPE_SWITCH_MS: f64 = 1500.0;
/// Duration used to follow the pinch distance.
pub const PINCH_FOLLOW_MS: f64 = 200.0;
/// Duration of the space-bar toggle.
pub const TOGGLE_MS: f64 = 1000.0;

/// Easing curves. All map 0 to 0 and 1 to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    /// Damped sine overshoot that settles on the target.
    ElasticOut { amplitude: f32, period: f32 },
}

impl Easing {
    /// The overshooting ease used on deliberate shape switches.
    pub const ELASTIC: Easing = Easing::ElasticOut {
        amplitude: 1.0,
        period: 0.5,
    };

    pub fn apply(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::ElasticOut { amplitude, period } => {
                let amp = amplitude.max(1.0);
                let per = period / amplitude.min(1.0).max(f32::EPSILON);
                let shift = per / TAU * (1.0 / amp).asin();
                amp * 2f32.powf(-10.0 * t) * ((t - shift) * (TAU / per)).sin() + 1.0
            }
        }
    }
}

/// A single interpolation from `start_value` to `target_value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub start_value: f32,
    pub target_value: f32,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Tween {
    /// Normalized progress in `[0, 1]`.
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    /// Value at `now_ms`. Exactly `target_value` once finished.
    pub fn sample(&self, now_ms: f64) -> f32 {
        let t = self.progress(now_ms);
        if t >= 1.0 {
            return self.target_value;
        }
        let k = self.easing.apply(t);
        self.start_value + (self.target_value - self.start_value) * k
    }
}

/// A live value with at most one running tween.
#[derive(Debug, Clone, PartialEq)]
pub struct Animated {
    value: f32,
    tween: Option<Tween>,
}

impl Animated {
    pub fn new(value: f32) -> Self {
        Self { value, tween: None }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Final value of the running tween, or the live value when idle.
    pub fn destination(&self) -> f32 {
        self.tween.map_or(self.value, |t| t.target_value)
    }

    /// Start (or retarget) an animation from the live value.
    pub fn animate_to(&mut self, target: f32, duration_ms: f64, easing: Easing, now_ms: f64) {
        self.advance(now_ms);
        self.start(self.value, target, duration_ms, easing, now_ms);
    }

    /// Jump to `from`, then animate to `target`.
    pub fn animate_from_to(&mut self, from: f32, target: f32, duration_ms: f64, easing: Easing, now_ms: f64) {
        self.value = from;
        self.start(from, target, duration_ms, easing, now_ms);
    }

    fn start(&mut self, from: f32, target: f32, duration_ms: f64, easing: Easing, now_ms: f64) {
        let tween = Tween {
            start_value: from,
            target_value: target,
            start_ms: now_ms,
            duration_ms: duration_ms.max(0.0),
            easing,
        };
        if tween.is_finished(now_ms) {
            self.value = target;
            self.tween = None;
        } else {
            self.tween = Some(tween);
        }
    }

    /// Set the value immediately, dropping any tween.
    pub fn set(&mut self, value: f32) {
        self.value = value;
        self.tween = None;
    }

    /// Bring the live value up to `now_ms`.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        if let Some(tween) = self.tween {
            self.value = tween.sample(now_ms);
            if tween.is_finished(now_ms) {
                self.tween = None;
            }
        }
        self.value
    }
}

/// Owner of the expansion scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphController {
    expansion: Animated,
}

impl MorphController {
    pub fn new(initial: f32) -> Self {
        Self {
            expansion: Animated::new(initial.clamp(0.0, 1.0)),
        }
    }

    /// Current expansion. May briefly leave `[0, 1]` during an elastic ease.
    #[inline]
    pub fn expansion(&self) -> f32 {
        self.expansion.value()
    }

    pub fn is_animating(&self) -> bool {
        self.expansion.is_animating()
    }

    /// Start or retarget the expansion tween. `value` is clamped to `[0, 1]`.
    pub fn set_expansion_target(&mut self, value: f32, duration_ms: f64, easing: Easing, now_ms: f64) {
        self.expansion
            .animate_to(value.clamp(0.0, 1.0), duration_ms, easing, now_ms);
    }

    /// Collapse to the origin and spring back out, as on a shape switch.
    pub fn collapse_and_reform(&mut self, now_ms: f64) {
        self.expansion
            .animate_from_to(0.0, 1.0, SHAPE_SWITCH_MS, Easing::ELASTIC, now_ms);
    }

    /// Follow a thumb-to-index pinch distance (normalized landmark units).
    pub fn follow_pinch(&mut self, distance: f32, now_ms: f64) {
        self.set_expansion_target(pinch_to_expansion(distance), PINCH_FOLLOW_MS, Easing::Linear, now_ms);
    }

    /// Flip between collapsed and formed.
    pub fn toggle(&mut self, now_ms: f64) {
        let target = if self.expansion.advance(now_ms) > 0.5 { 0.0 } else { 1.0 };
        self.set_expansion_target(target, TOGGLE_MS, Easing::QuadInOut, now_ms);
    }

    pub fn advance(&mut self, now_ms: f64) -> f32 {
        self.expansion.advance(now_ms)
    }
}

impl Default for MorphController {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Map a pinch distance to an expansion target.
///
/// Closed fingers (≤ 0.05) collapse the shape, 0.3 and beyond fully form it.
pub fn pinch_to_expansion(distance: f32) -> f32 {
    ((distance - 0.05) * 4.0).clamp(0.0, 1.0)
}

/// Smallest and largest particle-system scale reachable with the wheel.
pub const SCALE_MIN: f32 = 0.1;
pub const SCALE_MAX: f32 = 10.0;

/// Owner of the particle system's uniform scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleController {
    scale: Animated,
    /// Scale the wheel steps from; follows the latest request, not the
    /// animated value.
    requested: f32,
}

impl ScaleController {
    pub fn new() -> Self {
        Self {
            scale: Animated::new(1.0),
            requested: 1.0,
        }
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale.value()
    }

    pub fn requested(&self) -> f32 {
        self.requested
    }

    /// Shrink for an overview while the button is held.
    pub fn press(&mut self, now_ms: f64) {
        self.request(0.5, 600.0, Easing::QuadIn, now_ms);
    }

    /// Spring up to a close-up on release.
    pub fn release(&mut self, now_ms: f64) {
        self.request(1.5, 1200.0, Easing::ELASTIC, now_ms);
    }

    /// Zoom by a wheel delta (pixels, positive = away).
    pub fn wheel(&mut self, delta_y: f32, now_ms: f64) {
        let next = (self.requested - delta_y * 0.002).clamp(SCALE_MIN, SCALE_MAX);
        self.request(next, 300.0, Easing::QuadOut, now_ms);
    }

    pub fn reset(&mut self, now_ms: f64) {
        self.request(1.0, 1000.0, Easing::QuadOut, now_ms);
    }

    fn request(&mut self, target: f32, duration_ms: f64, easing: Easing, now_ms: f64) {
        self.requested = target;
        self.scale.animate_to(target, duration_ms, easing, now_ms);
    }

    pub fn advance(&mut self, now_ms: f64) -> f32 {
        self.scale.advance(now_ms)
    }
}

impl Default for ScaleController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EASINGS: [Easing; 5] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::ELASTIC,
    ];

    #[test]
    fn test_easing_endpoints() {
        for easing in EASINGS {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
        }
    }

    #[test]
    fn test_elastic_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::ELASTIC.apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_tween_reaches_target_exactly() {
        let mut morph = MorphController::new(0.0);
        morph.set_expansion_target(1.0, 1000.0, Easing::ELASTIC, 0.0);
        assert!(morph.is_animating());
        assert_eq!(morph.advance(1000.0), 1.0);
        assert!(!morph.is_animating());
    }

    #[test]
    fn test_repeated_identical_target_is_idempotent() {
        let mut morph = MorphController::new(1.0);
        let mut now = 0.0;
        for _ in 0..5 {
            morph.set_expansion_target(1.0, 500.0, Easing::ELASTIC, now);
            now += 250.0;
            morph.advance(now);
        }
        assert_eq!(morph.advance(now + 1000.0), 1.0);
    }

    #[test]
    fn test_retarget_starts_from_live_value() {
        let mut morph = MorphController::new(0.0);
        morph.set_expansion_target(1.0, 1000.0, Easing::Linear, 0.0);
        morph.advance(500.0);
        assert!((morph.expansion() - 0.5).abs() < 1e-5);

        morph.set_expansion_target(0.0, 1000.0, Easing::Linear, 500.0);
        assert!((morph.expansion() - 0.5).abs() < 1e-5);
        morph.advance(1000.0);
        assert!((morph.expansion() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_retarget_catches_up_before_restarting() {
        let mut morph = MorphController::new(0.0);
        morph.set_expansion_target(1.0, 1000.0, Easing::Linear, 0.0);
        // No advance between frames; the retarget still starts from t=500.
        morph.set_expansion_target(1.0, 1000.0, Easing::Linear, 500.0);
        assert!((morph.expansion() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_collapse_and_reform() {
        let mut morph = MorphController::new(1.0);
        morph.collapse_and_reform(100.0);
        assert_eq!(morph.expansion(), 0.0);
        assert_eq!(morph.advance(100.0 + SHAPE_SWITCH_MS), 1.0);
    }

    #[test]
    fn test_target_clamped() {
        let mut morph = MorphController::new(0.5);
        morph.set_expansion_target(3.0, 0.0, Easing::Linear, 0.0);
        assert_eq!(morph.expansion(), 1.0);
        morph.set_expansion_target(-1.0, 0.0, Easing::Linear, 0.0);
        assert_eq!(morph.expansion(), 0.0);
    }

    #[test]
    fn test_pinch_mapping() {
        assert_eq!(pinch_to_expansion(0.0), 0.0);
        assert_eq!(pinch_to_expansion(0.05), 0.0);
        assert!((pinch_to_expansion(0.175) - 0.5).abs() < 1e-5);
        assert_eq!(pinch_to_expansion(0.3), 1.0);
        assert_eq!(pinch_to_expansion(0.9), 1.0);
    }

    #[test]
    fn test_toggle() {
        let mut morph = MorphController::new(1.0);
        morph.toggle(0.0);
        assert_eq!(morph.advance(TOGGLE_MS), 0.0);
        morph.toggle(TOGGLE_MS);
        assert_eq!(morph.advance(2.0 * TOGGLE_MS), 1.0);
    }

    #[test]
    fn test_scale_wheel_clamps() {
        let mut scale = ScaleController::new();
        scale.wheel(-100_000.0, 0.0);
        assert_eq!(scale.requested(), SCALE_MAX);
        scale.wheel(100_000.0, 0.0);
        assert_eq!(scale.requested(), SCALE_MIN);
        assert_eq!(scale.advance(300.0), SCALE_MIN);
    }
}
