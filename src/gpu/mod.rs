//! GPU state management and rendering.
//!
//! Consumes the [`FrameState`] the engine produces each frame: uniforms are
//! written every frame, particle targets and trail vertices only when their
//! dirty flags are set. A scene draws either the morph particles or the
//! ambient field, never both.

mod field;
mod morph;
mod shaders;
mod sprites;

use std::sync::Arc;

use glam::Mat4;
use winit::window::Window;

use crate::ambient::AmbientField;
use crate::engine::FrameState;
use crate::error::GpuError;
use crate::particles::ParticleBuffer;
use crate::uniforms::{SpriteMode, SpriteUniforms};

use field::FieldRenderer;
use morph::MorphRenderer;
use sprites::SpriteRenderer;

/// Pixel scale of stars and runes one world unit from the eye.
const SPRITE_SIZE_SCALE: f32 = 300.0;
/// Trail points are drawn a little smaller.
const TRAIL_SIZE_SCALE: f32 = 200.0;

/// `src * alpha + dst`, so overlapping glows brighten.
fn additive_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    morph: Option<MorphRenderer>,
    field: Option<FieldRenderer>,
    sprites: SpriteRenderer,
    stars_uploaded: bool,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        particles: &ParticleBuffer,
        field: Option<&AmbientField>,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Colours are authored for a non-sRGB target; prefer one.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoAdapter)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let (morph, field) = match field {
            Some(field) => (None, Some(FieldRenderer::new(&device, surface_format, field))),
            None => (Some(MorphRenderer::new(&device, surface_format, particles)), None),
        };
        let sprites = SpriteRenderer::new(&device, surface_format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            morph,
            field,
            sprites,
            stars_uploaded: false,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reconfigure with the current size, after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn viewport(&self) -> [f32; 2] {
        [self.config.width as f32, self.config.height as f32]
    }

    fn sprite_uniforms(&self, mode: SpriteMode, frame: &FrameState, model: Mat4) -> SpriteUniforms {
        let mut uniforms = SpriteUniforms::new(mode, frame.view_proj, model);
        uniforms.time = frame.time;
        uniforms.viewport = self.viewport();
        uniforms.size_scale = SPRITE_SIZE_SCALE;
        uniforms
    }

    fn upload(&mut self, frame: &FrameState) {
        if let Some(morph) = &self.morph {
            let mut uniforms = frame.uniforms;
            uniforms.viewport = self.viewport();
            morph.upload(&self.queue, &uniforms, frame.particles, frame.particles_dirty);
        }
        if let (Some(field), Some(uniforms)) = (&self.field, frame.field) {
            let mut uniforms = uniforms;
            uniforms.viewport = self.viewport();
            field.upload(&self.queue, &uniforms);
        }

        self.sprites.begin();

        let stars = self.sprite_uniforms(SpriteMode::Star, frame, frame.star_model);
        let star_vertices = (!self.stars_uploaded).then(|| frame.stars.vertices());
        self.sprites
            .queue_batch(&self.device, &self.queue, star_vertices.as_deref(), &stars);
        self.stars_uploaded = true;

        let mut trail = self.sprite_uniforms(SpriteMode::Trail, frame, Mat4::IDENTITY);
        trail.size_scale = TRAIL_SIZE_SCALE;
        let trail_vertices = frame.trail_dirty.then(|| frame.trail.vertices());
        self.sprites
            .queue_batch(&self.device, &self.queue, trail_vertices.as_deref(), &trail);

        for rune in frame.runes.iter() {
            let mut uniforms = self.sprite_uniforms(SpriteMode::Rune, frame, Mat4::IDENTITY);
            uniforms.time = rune.time;
            uniforms.opacity = rune.opacity;
            uniforms.rotation = rune.rotation;
            let vertices = rune.cloud.vertices();
            self.sprites
                .queue_batch(&self.device, &self.queue, Some(&vertices), &uniforms);
        }
    }

    pub fn render(&mut self, frame: &FrameState) -> Result<(), wgpu::SurfaceError> {
        self.upload(frame);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let [r, g, b] = frame.background;
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(morph) = &self.morph {
                morph.draw(&mut render_pass);
            }
            if let Some(field) = &self.field {
                field.draw(&mut render_pass);
            }
            self.sprites.draw(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
