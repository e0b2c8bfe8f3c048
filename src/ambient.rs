//! The warm particle field behind the rune scene.
//!
//! [`AmbientField`] is a shell of orange-to-gold particles around the
//! origin. The cloud is generated once and never rewritten. Its motion lives
//! in the vertex shader and is steered by two small state machines:
//!
//! - [`Attraction`] pulls nearby particles toward the pointer or the
//!   fingertip.
//! - [`Marquee`] swirls the field about the z axis and sweeps a hue band
//!   through it while enabled.

use bytemuck::{Pod, Zeroable};
use std::f32::consts::TAU;

use crate::sampling::{hsv_to_rgb, Sampler};
use crate::{Vec2, Vec3};

/// Default number of field particles.
pub const FIELD_COUNT: usize = 50_000;
/// Radius of the inner surface of the shell.
pub const FIELD_INNER_RADIUS: f32 = 50.0;
/// Thickness of the shell.
pub const FIELD_DEPTH: f32 = 100.0;
/// Half-range of each drift velocity component.
pub const FIELD_DRIFT: f32 = 0.25;
/// Pinch distance is scaled by this to get the attraction strength.
pub const PINCH_ATTRACTION_GAIN: f32 = 5.0;
/// Marquee strength gained per second while enabled.
pub const MARQUEE_RAMP_PER_SEC: f32 = 1.2;
/// Marquee phase, radians per second.
pub const MARQUEE_SPEED: f32 = 2.0;

/// One field particle as laid out in the GPU vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FieldVertex {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
    pub phase: f32,
    /// Drift direction, scaled by a wave in the shader.
    pub velocity: [f32; 3],
    pub _pad: f32,
}

/// Field colour for `t` in `[0, 1]`: orange at 0, pale gold at 1.
pub fn field_color(t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    hsv_to_rgb((30.0 + 30.0 * t) / 360.0, 1.0 - 0.3 * t, 1.0)
}

/// The generated field cloud.
#[derive(Debug, Clone, Default)]
pub struct AmbientField {
    vertices: Vec<FieldVertex>,
}

impl AmbientField {
    pub fn new(count: usize, sampler: &mut Sampler) -> Self {
        let vertices = (0..count)
            .map(|_| {
                let radius = FIELD_INNER_RADIUS + sampler.random() * FIELD_DEPTH;
                let position = sampler.on_sphere(radius);
                let color = field_color(sampler.random());
                let size = sampler.random_range(1.0, 4.0);
                let phase = sampler.random() * TAU;
                let velocity = sampler.in_cube(FIELD_DRIFT);
                FieldVertex {
                    position: position.to_array(),
                    size,
                    color: color.to_array(),
                    phase,
                    velocity: velocity.to_array(),
                    _pad: 0.0,
                }
            })
            .collect();
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[FieldVertex] {
        &self.vertices
    }
}

/// Attraction strength for a thumb-to-index pinch distance.
pub fn pinch_attraction(distance: f32) -> f32 {
    (distance * PINCH_ATTRACTION_GAIN).clamp(0.0, 1.0)
}

/// Where the field is pulled toward, in NDC, and how hard.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Attraction {
    pub point: Vec2,
    pub strength: f32,
}

impl Attraction {
    /// Full pull toward a hovering pointer.
    pub fn pointer(ndc: Vec2) -> Self {
        Self {
            point: ndc,
            strength: 1.0,
        }
    }

    /// Pull toward a fingertip, stronger the wider the pinch.
    pub fn pinch(ndc: Vec2, distance: f32) -> Self {
        Self {
            point: ndc,
            strength: pinch_attraction(distance),
        }
    }

    pub fn release(&mut self) {
        self.strength = 0.0;
    }
}

/// The swirl effect. Fades in while enabled and cuts out when disabled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Marquee {
    enabled: bool,
    amount: f32,
    phase: f32,
    last_ms: Option<f64>,
}

impl Marquee {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the effect and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.amount = 0.0;
        }
        self.enabled
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Blend weight of the effect, `[0, 1]`.
    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Advance to `now_ms`.
    pub fn advance(&mut self, now_ms: f64) {
        let dt = self.last_ms.map_or(0.0, |last| ((now_ms - last) / 1000.0).max(0.0)) as f32;
        self.last_ms = Some(now_ms);
        if self.enabled {
            self.amount = (self.amount + dt * MARQUEE_RAMP_PER_SEC).min(1.0);
            self.phase = (now_ms / 1000.0) as f32 * MARQUEE_SPEED;
        }
    }
}
