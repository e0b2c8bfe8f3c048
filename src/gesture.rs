//! Freehand gesture recognition.
//!
//! [`CircleDetector`] decides whether the last two seconds of pointer or
//! fingertip motion form a closed loop. It is a coverage heuristic, not a
//! trained classifier: the samples' centroid is taken as the loop centre and
//! the widest angular hole around it tells how much of the circle is
//! missing.
//!
//! ```ignore
//! let mut detector = CircleDetector::new(GestureConfig::default());
//! for (x, y, t) in pointer_samples {
//!     let report = detector.push(GestureSample::new(Vec2::new(x, y), t));
//!     progress_bar.set(report.progress);
//!     if report.triggered {
//!         rotation.advance();
//!     }
//! }
//! ```
//!
//! The thresholds are in screen pixels. Fingertip landmarks are converted to
//! pixels before they get here (see [`HandFrame::fingertip_px`](crate::input::HandFrame::fingertip_px)).
//!
//! [`SwipeDetector`] and [`FlickDetector`] are the simpler discrete gestures
//! used to step through shapes.

use std::collections::VecDeque;
use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::shapes::ShapeFamily;
use crate::Vec2;

/// Circle-detection thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Fewer samples than this in the window report zero progress.
    pub min_samples: usize,
    /// Mean distance from the centroid below which motion is treated as jitter.
    pub min_radius: f32,
    /// Samples at least this old are evicted.
    pub window_ms: f64,
    /// Coverage (radians) that must be exceeded to trigger.
    pub trigger_coverage: f32,
    /// Minimum time between two triggers.
    pub cooldown_ms: f64,
    /// Coverage that maps to a full progress bar.
    pub progress_span: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_samples: 20,
            min_radius: 30.0,
            window_ms: 2000.0,
            trigger_coverage: 1.8 * PI,
            cooldown_ms: 3000.0,
            progress_span: 1.5 * PI,
        }
    }
}

/// A timestamped 2D position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub position: Vec2,
    pub time_ms: f64,
}

impl GestureSample {
    pub fn new(position: Vec2, time_ms: f64) -> Self {
        Self { position, time_ms }
    }
}

/// Outcome of feeding one sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureReport {
    /// Completion in `[0, 1]`, for a progress indicator.
    pub progress: f32,
    /// Angular coverage in radians; 0 when the window was rejected.
    pub coverage: f32,
    /// A full circle was completed with this sample.
    pub triggered: bool,
}

/// Online circle detector over a sliding time window.
#[derive(Debug, Clone)]
pub struct CircleDetector {
    config: GestureConfig,
    samples: VecDeque<GestureSample>,
    last_trigger_ms: Option<f64>,
    progress: f32,
}

impl CircleDetector {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            samples: VecDeque::new(),
            last_trigger_ms: None,
            progress: 0.0,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Progress as of the last sample.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples currently in the window, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &GestureSample> {
        self.samples.iter()
    }

    /// Drop the window. The cooldown is kept.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.progress = 0.0;
    }

    /// Append a sample, evict stale ones and re-evaluate the window.
    pub fn push(&mut self, sample: GestureSample) -> GestureReport {
        let now = sample.time_ms;
        let window = self.config.window_ms;

        self.samples.push_back(sample);
        self.samples.retain(|s| now - s.time_ms < window);

        let report = self.evaluate(now);
        self.progress = if report.triggered { 0.0 } else { report.progress };
        report
    }

    fn evaluate(&mut self, now: f64) -> GestureReport {
        if self.samples.len() < self.config.min_samples {
            return GestureReport::default();
        }

        let n = self.samples.len() as f32;
        let centroid = self.samples.iter().fold(Vec2::ZERO, |acc, s| acc + s.position) / n;

        let avg_radius = self
            .samples
            .iter()
            .map(|s| s.position.distance(centroid))
            .sum::<f32>()
            / n;
        if avg_radius < self.config.min_radius {
            return GestureReport::default();
        }

        let coverage = angular_coverage(self.samples.iter().map(|s| s.position), centroid);
        let progress = (coverage / self.config.progress_span).min(1.0);

        let cooled = self
            .last_trigger_ms
            .map_or(true, |last| now - last > self.config.cooldown_ms);
        let triggered = coverage > self.config.trigger_coverage && cooled;

        if triggered {
            log::debug!(
                "circle completed: coverage {:.2} rad, radius {:.1}",
                coverage,
                avg_radius
            );
            self.last_trigger_ms = Some(now);
            self.samples.clear();
        }

        GestureReport {
            progress,
            coverage,
            triggered,
        }
    }
}

impl Default for CircleDetector {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

/// Angle (radians) swept around `center`: 2π minus the widest gap between
/// neighbouring sample angles, wraparound included.
pub fn angular_coverage(points: impl IntoIterator<Item = Vec2>, center: Vec2) -> f32 {
    let mut angles: Vec<f32> = points
        .into_iter()
        .map(|p| {
            let d = p - center;
            d.y.atan2(d.x)
        })
        .collect();
    if angles.len() < 2 {
        return 0.0;
    }
    angles.sort_by(f32::total_cmp);

    let inner = angles
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(0.0f32, f32::max);
    let first = angles[0];
    let last = angles[angles.len() - 1];
    let max_gap = inner.max(TAU + first - last);

    TAU - max_gap
}

/// Ordered list of shapes that gestures step through.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRotation {
    shapes: Vec<ShapeFamily>,
    index: usize,
}

impl ShapeRotation {
    /// An empty list falls back to the geometric families.
    pub fn new(shapes: Vec<ShapeFamily>) -> Self {
        let shapes = if shapes.is_empty() {
            log::warn!("empty shape rotation, using the geometric families");
            ShapeFamily::GEOMETRIC.to_vec()
        } else {
            shapes
        };
        Self { shapes, index: 0 }
    }

    pub fn current(&self) -> ShapeFamily {
        self.shapes[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> &[ShapeFamily] {
        &self.shapes
    }

    /// Step forward, wrapping. Returns the new current shape.
    pub fn advance(&mut self) -> ShapeFamily {
        self.index = (self.index + 1) % self.shapes.len();
        self.current()
    }

    /// Step back, wrapping.
    pub fn retreat(&mut self) -> ShapeFamily {
        self.index = (self.index + self.shapes.len() - 1) % self.shapes.len();
        self.current()
    }

    /// Jump to `family` if it is in the list.
    pub fn select(&mut self, family: ShapeFamily) -> bool {
        match self.shapes.iter().position(|&s| s == family) {
            Some(i) => {
                self.index = i;
                true
            }
            None => false,
        }
    }
}

/// Direction of a discrete step gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Previous,
    Next,
}

/// Hand swipe from wrist motion between consecutive landmark frames.
#[derive(Debug, Clone)]
pub struct SwipeDetector {
    /// Normalized x displacement per frame that counts as a swipe.
    pub threshold: f32,
    pub cooldown_ms: f64,
    last_wrist_x: Option<f32>,
    last_swipe_ms: Option<f64>,
}

impl SwipeDetector {
    pub fn new() -> Self {
        Self {
            threshold: 0.08,
            cooldown_ms: 1000.0,
            last_wrist_x: None,
            last_swipe_ms: None,
        }
    }

    /// Feed the wrist x of a new frame (landmark space, camera mirrored).
    pub fn push(&mut self, wrist_x: f32, now_ms: f64) -> Option<Step> {
        let previous = self.last_wrist_x.replace(wrist_x)?;
        let velocity = wrist_x - previous;

        let cooled = self
            .last_swipe_ms
            .map_or(true, |last| now_ms - last > self.cooldown_ms);
        if !cooled {
            return None;
        }

        let step = if velocity > self.threshold {
            Step::Previous
        } else if velocity < -self.threshold {
            Step::Next
        } else {
            return None;
        };
        self.last_swipe_ms = Some(now_ms);
        Some(step)
    }

    /// Forget the last wrist position, as when the hand leaves the frame.
    pub fn lose_track(&mut self) {
        self.last_wrist_x = None;
    }
}

impl Default for SwipeDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Mouse flick: a fast horizontal drag released mid-motion.
#[derive(Debug, Clone, Default)]
pub struct FlickDetector {
    press: Option<Vec2>,
    last_move: Vec2,
}

impl FlickDetector {
    /// Horizontal travel from press to release, in pixels.
    pub const MIN_TRAVEL: f32 = 100.0;
    /// Length of the last pointer move before release, in pixels.
    pub const MIN_SPEED: f32 = 5.0;

    pub fn press(&mut self, position: Vec2) {
        self.press = Some(position);
        self.last_move = Vec2::ZERO;
    }

    pub fn moved(&mut self, delta: Vec2) {
        self.last_move = delta;
    }

    pub fn release(&mut self, position: Vec2) -> Option<Step> {
        let start = self.press.take()?;
        let dx = position.x - start.x;
        if dx.abs() <= Self::MIN_TRAVEL || self.last_move.length() <= Self::MIN_SPEED {
            return None;
        }
        Some(if dx > 0.0 { Step::Previous } else { Step::Next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(count: usize, radius: f32, step_deg: f32, t0: f64, dt: f64) -> Vec<GestureSample> {
        (0..count)
            .map(|i| {
                let a = (i as f32 * step_deg).to_radians();
                let p = Vec2::new(400.0 + radius * a.cos(), 300.0 + radius * a.sin());
                GestureSample::new(p, t0 + i as f64 * dt)
            })
            .collect()
    }

    #[test]
    fn test_window_eviction() {
        let mut detector = CircleDetector::default();
        for t in [0.0, 1000.0, 2500.0] {
            detector.push(GestureSample::new(Vec2::ZERO, t));
        }
        let times: Vec<f64> = detector.samples().map(|s| s.time_ms).collect();
        assert_eq!(times, vec![1000.0, 2500.0]);
    }

    #[test]
    fn test_eviction_boundary_is_exclusive() {
        let mut detector = CircleDetector::default();
        detector.push(GestureSample::new(Vec2::ZERO, 0.0));
        detector.push(GestureSample::new(Vec2::ZERO, 2000.0));
        assert_eq!(detector.len(), 1);
    }

    #[test]
    fn test_too_few_samples() {
        let mut detector = CircleDetector::default();
        let mut last = GestureReport::default();
        for s in circle(19, 100.0, 19.0, 0.0, 10.0) {
            last = detector.push(s);
        }
        assert_eq!(last.progress, 0.0);
        assert!(!last.triggered);
    }

    #[test]
    fn test_small_radius_rejected() {
        let mut detector = CircleDetector::default();
        let mut last = GestureReport::default();
        for s in circle(20, 8.0, 18.0, 0.0, 10.0) {
            last = detector.push(s);
        }
        assert_eq!(last.progress, 0.0);
        assert_eq!(last.coverage, 0.0);
        assert!(!last.triggered);
    }

    #[test]
    fn test_full_circle_triggers_once() {
        let mut detector = CircleDetector::default();
        let reports: Vec<GestureReport> = circle(36, 100.0, 10.0, 0.0, 16.0)
            .into_iter()
            .map(|s| detector.push(s))
            .collect();

        let triggers: Vec<&GestureReport> = reports.iter().filter(|r| r.triggered).collect();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].progress, 1.0);
        assert!(detector.len() < 5);
    }

    #[test]
    fn test_cooldown_blocks_second_circle() {
        let mut detector = CircleDetector::default();
        let first = circle(36, 100.0, 10.0, 0.0, 16.0);
        let second = circle(36, 100.0, 10.0, 600.0, 16.0);

        let count = first
            .into_iter()
            .chain(second)
            .map(|s| detector.push(s))
            .filter(|r| r.triggered)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_triggers_again_after_cooldown() {
        let mut detector = CircleDetector::default();
        let first = circle(36, 100.0, 10.0, 0.0, 16.0);
        let second = circle(36, 100.0, 10.0, 5000.0, 16.0);

        let count = first
            .into_iter()
            .chain(second)
            .map(|s| detector.push(s))
            .filter(|r| r.triggered)
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_half_circle_progress() {
        let mut detector = CircleDetector::default();
        let mut last = GestureReport::default();
        // 25 samples over 180 degrees.
        for s in circle(25, 100.0, 7.5, 0.0, 10.0) {
            last = detector.push(s);
        }
        assert!(!last.triggered);
        assert!(last.progress > 0.5 && last.progress < 1.0, "{}", last.progress);
        assert_eq!(detector.progress(), last.progress);
    }

    #[test]
    fn test_angular_coverage() {
        let square = [Vec2::X, Vec2::Y, Vec2::NEG_X, Vec2::NEG_Y];
        assert!((angular_coverage(square, Vec2::ZERO) - 1.5 * PI).abs() < 1e-5);
        assert_eq!(angular_coverage([Vec2::X], Vec2::ZERO), 0.0);
    }

    #[test]
    fn test_rotation_wraps() {
        let mut rotation = ShapeRotation::new(vec![ShapeFamily::Sphere, ShapeFamily::Cube]);
        assert_eq!(rotation.current(), ShapeFamily::Sphere);
        assert_eq!(rotation.advance(), ShapeFamily::Cube);
        assert_eq!(rotation.advance(), ShapeFamily::Sphere);
        assert_eq!(rotation.retreat(), ShapeFamily::Cube);
        assert!(rotation.select(ShapeFamily::Sphere));
        assert!(!rotation.select(ShapeFamily::Runic));
        assert_eq!(rotation.index(), 0);
    }

    #[test]
    fn test_empty_rotation_falls_back() {
        let rotation = ShapeRotation::new(Vec::new());
        assert_eq!(rotation.shapes(), &ShapeFamily::GEOMETRIC);
    }

    #[test]
    fn test_swipe() {
        let mut swipe = SwipeDetector::new();
        assert_eq!(swipe.push(0.5, 0.0), None);
        assert_eq!(swipe.push(0.4, 16.0), Some(Step::Next));
        // Cooldown.
        assert_eq!(swipe.push(0.6, 32.0), None);
        assert_eq!(swipe.push(0.7, 1100.0), Some(Step::Previous));
        assert_eq!(swipe.push(0.72, 2200.0), None);
    }

    #[test]
    fn test_flick() {
        let mut flick = FlickDetector::default();
        flick.press(Vec2::new(500.0, 300.0));
        flick.moved(Vec2::new(-20.0, 0.0));
        assert_eq!(flick.release(Vec2::new(350.0, 300.0)), Some(Step::Next));

        flick.press(Vec2::new(500.0, 300.0));
        flick.moved(Vec2::new(1.0, 0.0));
        assert_eq!(flick.release(Vec2::new(650.0, 300.0)), None);
        assert_eq!(flick.release(Vec2::new(650.0, 300.0)), None);
    }
}
