//! Orbit camera with first-order smoothing.
//!
//! Input only moves the *target* angles and distance; the eye position
//! chases the orbit point derived from them by a fixed fraction every frame.

use glam::{Mat4, Vec2, Vec3};

/// Fraction of the remaining distance covered per frame.
pub const SMOOTHING: f32 = 0.05;
/// Radians of orbit per dragged pixel.
pub const DRAG_SPEED: f32 = 0.005;
/// Radians of lean at the edge of the screen when hovering.
pub const PARALLAX: f32 = 0.3;
/// Distance change per wheel unit.
pub const ZOOM_SPEED: f32 = 0.5;
pub const MIN_DISTANCE: f32 = 50.0;
pub const MAX_DISTANCE: f32 = 500.0;
pub const DEFAULT_DISTANCE: f32 = 200.0;

/// Orbit camera looking at the origin.
#[derive(Debug, Clone)]
pub struct CameraRig {
    /// Target horizontal angle in radians.
    pub yaw: f32,
    /// Target vertical angle in radians.
    pub pitch: f32,
    pub distance: f32,
    /// Smoothed eye position.
    position: Vec3,
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraRig {
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: DEFAULT_DISTANCE,
            position: Vec3::new(0.0, 0.0, DEFAULT_DISTANCE),
            fov_deg: 75.0,
            near: 0.1,
            far: 2000.0,
        }
    }

    /// Where the eye is heading.
    pub fn target_position(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.distance,
            self.pitch.sin() * self.distance * 0.5,
            self.yaw.cos() * self.distance,
        )
    }

    /// Current eye position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the eye one smoothing step toward its target.
    pub fn update(&mut self) -> Vec3 {
        self.position += (self.target_position() - self.position) * SMOOTHING;
        self.position
    }

    /// Jump straight to the target, skipping the glide.
    pub fn snap(&mut self) {
        self.position = self.target_position();
    }

    /// Orbit by a pointer drag in pixels.
    pub fn drag(&mut self, delta_px: Vec2) {
        self.yaw += delta_px.x * DRAG_SPEED;
        self.pitch += delta_px.y * DRAG_SPEED;
    }

    pub fn zoom(&mut self, wheel_delta: f32) {
        self.distance = (self.distance + wheel_delta * ZOOM_SPEED).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Back to the front view. The eye glides there.
    pub fn reset(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.distance = DEFAULT_DISTANCE;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_deg.to_radians(), aspect.max(1e-3), self.near, self.far)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}
