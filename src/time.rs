//! Frame clock.
//!
//! Everything time-dependent in the engine (tweens, gesture windows, rune
//! lifetimes) is expressed in milliseconds since the clock started, so the
//! same code can be driven by this clock in the app and by literal
//! timestamps in tests.
//!
//! ```ignore
//! let mut clock = Time::new();
//! loop {
//!     let now = clock.update();
//!     engine.frame(now);
//! }
//! ```

use std::time::{Duration, Instant};

/// Monotonic frame clock with FPS tracking.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    /// Milliseconds since start, as of the last `update`.
    now_ms: f64,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            now_ms: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Advance to the current instant. Call once per frame.
    ///
    /// Returns the new timestamp in milliseconds.
    pub fn update(&mut self) -> f64 {
        let now = Instant::now();

        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.now_ms = now.duration_since(self.start).as_secs_f64() * 1000.0;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            log::trace!("{:.1} fps", self.fps);
        }

        self.now_ms
    }

    /// Timestamp of the last frame in milliseconds.
    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Milliseconds since start right now, between frames.
    ///
    /// Input events arrive between `update` calls and are stamped with this.
    pub fn instant_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Seconds since start, as fed to shaders.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        (self.now_ms / 1000.0) as f32
    }

    /// Time since last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
