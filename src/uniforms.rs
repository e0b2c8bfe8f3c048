//! Per-frame uniform blocks.
//!
//! Every struct here mirrors WGSL declarations in [`crate::gpu`] field for field,
//! so a layout change here has to be made there as well. Sizes are multiples
//! of 16 and contain no implicit padding.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Uniforms of the morph particle pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub color: [f32; 3],
    /// Seconds since start.
    pub time: f32,
    /// Framebuffer size in pixels; sprite sizes are given in pixels.
    pub viewport: [f32; 2],
    pub expansion: f32,
    pub point_size: f32,
    pub color_variation: f32,
    pub _pad: [f32; 3],
}

impl FrameUniforms {
    pub fn new(view_proj: Mat4, model: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            color: [0.0, 1.0, 1.0],
            time: 0.0,
            viewport: [1.0, 1.0],
            expansion: 1.0,
            point_size: 2.5,
            color_variation: 0.3,
            _pad: [0.0; 3],
        }
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color.to_array();
        self
    }
}

/// How a sprite batch animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SpriteMode {
    /// Twinkling background stars.
    Star = 0,
    /// Trail points; alpha follows size.
    Trail = 1,
    /// Rotating, breathing rune sigil.
    Rune = 2,
}

/// Uniforms of one sprite batch.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub time: f32,
    pub opacity: f32,
    /// Rotation about z, radians.
    pub rotation: f32,
    /// Pixel size of a unit sprite seen from one world unit away.
    pub size_scale: f32,
    pub viewport: [f32; 2],
    pub mode: u32,
    pub _pad: u32,
}

impl SpriteUniforms {
    pub fn new(mode: SpriteMode, view_proj: Mat4, model: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            time: 0.0,
            opacity: 1.0,
            rotation: 0.0,
            size_scale: 300.0,
            viewport: [1.0, 1.0],
            mode: mode as u32,
            _pad: 0,
        }
    }
}

/// Uniforms of the ambient field pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FieldUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub time: f32,
    /// Attraction strength, `[0, 1]`.
    pub strength: f32,
    /// Attraction point in NDC.
    pub pointer: [f32; 2],
    /// Marquee blend weight, `[0, 1]`; zero disables the swirl.
    pub marquee: f32,
    pub marquee_phase: f32,
    pub viewport: [f32; 2],
}

impl FieldUniforms {
    pub fn new(view_proj: Mat4, model: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            time: 0.0,
            strength: 0.0,
            pointer: [0.0, 0.0],
            marquee: 0.0,
            marquee_phase: 0.0,
            viewport: [1.0, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 176);
        assert_eq!(std::mem::size_of::<SpriteUniforms>(), 160);
        assert_eq!(std::mem::size_of::<FieldUniforms>(), 160);
    }

    #[test]
    fn test_defaults() {
        let u = FrameUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY).with_color(Vec3::X);
        assert_eq!(u.color, [1.0, 0.0, 0.0]);
        assert_eq!(u.point_size, 2.5);
        assert_eq!(u.view_proj[0][0], 1.0);

        let s = SpriteUniforms::new(SpriteMode::Rune, Mat4::IDENTITY, Mat4::IDENTITY);
        assert_eq!(s.mode, 2);
        assert_eq!(bytemuck::bytes_of(&s).len(), 160);
    }
}
