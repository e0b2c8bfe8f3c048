//! Fading afterimage of the pointer or fingertip.
//!
//! A ring of fixed size: each new sample overwrites the oldest slot at full
//! size and every slot shrinks a little, so the tail fades out behind the
//! cursor. Like the particle buffer, the storage never grows and a dirty
//! flag tells the uploader when to copy it.

use crate::particles::SpriteVertex;
use crate::Vec3;

/// Default number of trail slots.
pub const TRAIL_CAPACITY: usize = 1000;
/// Size of a freshly written point.
pub const HEAD_SIZE: f32 = 4.0;
/// Per-sample size multiplier.
pub const DECAY: f32 = 0.98;
/// Sizes below this are zeroed.
pub const CUTOFF: f32 = 0.1;
/// Warm orange.
pub const TRAIL_COLOR: Vec3 = Vec3::new(1.0, 0.6, 0.0);

#[derive(Debug, Clone)]
pub struct TrailBuffer {
    positions: Vec<Vec3>,
    sizes: Vec<f32>,
    head: usize,
    dirty: bool,
}

impl TrailBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            positions: vec![Vec3::ZERO; capacity],
            sizes: vec![0.0; capacity],
            head: 0,
            dirty: true,
        }
    }

    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Slot the next sample will be written to.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Record a new point and age every slot, the new one included.
    pub fn push(&mut self, position: Vec3) {
        self.positions[self.head] = position;
        self.sizes[self.head] = HEAD_SIZE;
        self.head = (self.head + 1) % self.capacity();

        for size in &mut self.sizes {
            *size *= DECAY;
            if *size < CUTOFF {
                *size = 0.0;
            }
        }
        self.dirty = true;
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Slots that are still visible.
    pub fn visible(&self) -> usize {
        self.sizes.iter().filter(|s| **s > 0.0).count()
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn vertices(&self) -> Vec<SpriteVertex> {
        self.positions
            .iter()
            .zip(&self.sizes)
            .map(|(p, s)| SpriteVertex {
                position: p.to_array(),
                size: *s,
                color: TRAIL_COLOR.to_array(),
                phase: 0.0,
            })
            .collect()
    }
}

impl Default for TrailBuffer {
    fn default() -> Self {
        Self::new(TRAIL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_wraps() {
        let mut trail = TrailBuffer::new(3);
        for i in 0..4 {
            trail.push(Vec3::splat(i as f32));
        }
        assert_eq!(trail.head(), 1);
        assert_eq!(trail.positions()[0], Vec3::splat(3.0));
        assert_eq!(trail.positions()[1], Vec3::splat(1.0));
    }

    #[test]
    fn test_decay() {
        let mut trail = TrailBuffer::new(4);
        trail.push(Vec3::X);
        assert!((trail.sizes()[0] - HEAD_SIZE * DECAY).abs() < 1e-6);
        trail.push(Vec3::Y);
        assert!((trail.sizes()[0] - HEAD_SIZE * DECAY * DECAY).abs() < 1e-6);
        assert!(trail.sizes()[1] > trail.sizes()[0]);
    }

    #[test]
    fn test_old_points_vanish() {
        let mut trail = TrailBuffer::new(TRAIL_CAPACITY);
        trail.push(Vec3::X);
        // 4 * 0.98^n < 0.1 once n > 182.
        for _ in 0..200 {
            trail.push(Vec3::Y);
        }
        assert_eq!(trail.sizes()[0], 0.0);
        assert!(trail.visible() < 200);
    }

    #[test]
    fn test_dirty_and_vertices() {
        let mut trail = TrailBuffer::new(2);
        assert!(trail.take_dirty());
        trail.push(Vec3::Z);
        assert!(trail.take_dirty());
        assert!(!trail.take_dirty());
        let verts = trail.vertices();
        assert_eq!(verts.len(), 2);
        assert_eq!(verts[0].position, [0.0, 0.0, 1.0]);
        assert_eq!(verts[0].color, [1.0, 0.6, 0.0]);
    }
}
