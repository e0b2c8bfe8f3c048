//! Morph particle pipeline.
//!
//! Two instance streams: the static [`MorphVertex`] channels, uploaded
//! once, and the 12-byte target stream, rewritten only when a new shape
//! arrives.

use wgpu::util::DeviceExt;

use super::additive_blend;
use super::shaders::MORPH_SHADER;
use crate::particles::{MorphVertex, ParticleBuffer};
use crate::uniforms::FrameUniforms;

const STATIC_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32,
    2 => Float32x3,
    3 => Float32,
];

const TARGET_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![4 => Float32x3];

/// GPU resources for the morph particles.
pub struct MorphRenderer {
    pipeline: wgpu::RenderPipeline,
    static_buffer: wgpu::Buffer,
    target_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    num_particles: u32,
}

impl MorphRenderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, particles: &ParticleBuffer) -> Self {
        let static_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Morph Static Buffer"),
            contents: bytemuck::cast_slice(&particles.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let target_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Morph Target Buffer"),
            contents: particles.target_bytes(),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Morph Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Morph Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Morph Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Morph Shader"),
            source: wgpu::ShaderSource::Wgsl(MORPH_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Morph Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Morph Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<MorphVertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &STATIC_ATTRIBUTES,
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: 12,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &TARGET_ATTRIBUTES,
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(additive_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            static_buffer,
            target_buffer,
            uniform_buffer,
            bind_group,
            num_particles: particles.capacity() as u32,
        }
    }

    /// Write this frame's uniforms, and the targets when they changed.
    pub fn upload(&self, queue: &wgpu::Queue, uniforms: &FrameUniforms, particles: &ParticleBuffer, dirty: bool) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
        if dirty {
            queue.write_buffer(&self.target_buffer, 0, particles.target_bytes());
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.num_particles == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.static_buffer.slice(..));
        pass.set_vertex_buffer(1, self.target_buffer.slice(..));
        pass.draw(0..6, 0..self.num_particles);
    }
}
