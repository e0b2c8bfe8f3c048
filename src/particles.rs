//! Fixed-capacity particle storage.
//!
//! [`ParticleBuffer`] is a structure of arrays: one channel per attribute,
//! all the same length, allocated once. Shape switches only rewrite the
//! `target` channel; the decorative channels (`scatter`, `scale`, `phase`)
//! are drawn once at construction and never touched again, so a given slot
//! keeps its jitter and size while it travels between shapes.
//!
//! [`SpriteCloud`] holds pre-positioned coloured points (stars, rune
//! sigils) that are drawn as-is.

use bytemuck::{Pod, Zeroable};
use std::f32::consts::TAU;

use crate::sampling::Sampler;
use crate::Vec3;

/// Half-extent of the random scatter cube.
pub const SCATTER_EXTENT: f32 = 150.0;
/// Range of the per-particle size factor.
pub const SCALE_MIN: f32 = 0.3;
pub const SCALE_MAX: f32 = 1.5;

/// The never-changing attributes of one morph particle, as laid out in the
/// GPU vertex buffer. Targets live in a second, tightly packed stream (see
/// [`ParticleBuffer::target_bytes`]).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MorphVertex {
    pub position: [f32; 3],
    pub scale: f32,
    pub scatter: [f32; 3],
    pub phase: f32,
}

/// Per-slot particle channels with an immutable length.
#[derive(Debug, Clone)]
pub struct ParticleBuffer {
    positions: Vec<Vec3>,
    targets: Vec<Vec3>,
    scatter: Vec<Vec3>,
    scales: Vec<f32>,
    phases: Vec<f32>,
    /// Number of leading slots that belong to the current shape.
    active: usize,
    /// Set by [`ParticleBuffer::set_target`], cleared by the uploader.
    dirty: bool,
}

impl ParticleBuffer {
    /// Allocate `capacity` slots, all collapsed at the origin.
    pub fn new(capacity: usize, sampler: &mut Sampler) -> Self {
        let mut scatter = Vec::with_capacity(capacity);
        let mut scales = Vec::with_capacity(capacity);
        let mut phases = Vec::with_capacity(capacity);

        for _ in 0..capacity {
            scatter.push(sampler.in_cube(SCATTER_EXTENT));
            scales.push(sampler.random_range(SCALE_MIN, SCALE_MAX));
            phases.push(sampler.random() * TAU);
        }

        Self {
            positions: vec![Vec3::ZERO; capacity],
            targets: vec![Vec3::ZERO; capacity],
            scatter,
            scales,
            phases,
            active: 0,
            dirty: true,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.targets.len()
    }

    /// Slots currently assigned to shape points.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Rewrite the whole target channel.
    ///
    /// Slots `0..points.len()` take the new points; every remaining slot is
    /// sent to the origin. Points beyond capacity are dropped.
    pub fn set_target(&mut self, points: &[Vec3]) {
        let capacity = self.capacity();
        if points.len() > capacity {
            log::debug!(
                "shape has {} points, buffer holds {}; truncating",
                points.len(),
                capacity
            );
        }
        let n = points.len().min(capacity);
        self.targets[..n].copy_from_slice(&points[..n]);
        self.targets[n..].fill(Vec3::ZERO);
        self.active = n;
        self.dirty = true;
    }

    /// Return and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn targets(&self) -> &[Vec3] {
        &self.targets
    }

    pub fn scatter(&self) -> &[Vec3] {
        &self.scatter
    }

    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    pub fn phases(&self) -> &[f32] {
        &self.phases
    }

    /// Pack the static channels into the layout the morph shader reads.
    pub fn vertices(&self) -> Vec<MorphVertex> {
        (0..self.capacity())
            .map(|i| MorphVertex {
                position: self.positions[i].to_array(),
                scale: self.scales[i],
                scatter: self.scatter[i].to_array(),
                phase: self.phases[i],
            })
            .collect()
    }

    /// The target channel as raw bytes, 12 per slot.
    pub fn target_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.targets)
    }
}

/// One sprite as laid out in the GPU vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
    pub phase: f32,
}

/// Coloured points drawn at fixed positions.
#[derive(Debug, Clone, Default)]
pub struct SpriteCloud {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub sizes: Vec<f32>,
    pub phases: Vec<f32>,
}

impl SpriteCloud {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            positions: Vec::with_capacity(n),
            colors: Vec::with_capacity(n),
            sizes: Vec::with_capacity(n),
            phases: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, position: Vec3, color: Vec3, size: f32, phase: f32) {
        self.positions.push(position);
        self.colors.push(color);
        self.sizes.push(size);
        self.phases.push(phase);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn vertices(&self) -> Vec<SpriteVertex> {
        (0..self.len())
            .map(|i| SpriteVertex {
                position: self.positions[i].to_array(),
                size: self.sizes[i],
                color: self.colors[i].to_array(),
                phase: self.phases[i],
            })
            .collect()
    }
}
