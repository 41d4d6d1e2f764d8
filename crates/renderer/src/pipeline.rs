//! Shader module, render pipeline and depth target creation.

use asset::VertexLayout;
use corelib::{CullMode, FrontFace, PrimitiveTopology, SetupError, SetupResult};
use wgpu::{
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, BlendState,
    BufferBindingType, ColorTargetState, ColorWrites, DepthBiasState, DepthStencilState, Device,
    Extent3d, FragmentState, PipelineLayoutDescriptor, RenderPipeline, RenderPipelineDescriptor,
    ShaderModule, ShaderModuleDescriptor, ShaderSource, ShaderStages, Texture, TextureDescriptor,
    TextureDimension, TextureFormat, TextureUsages, TextureView, TextureViewDescriptor,
    VertexBufferLayout, VertexState, VertexStepMode,
};

use crate::conversions;
use crate::uniforms::uniform_size;

pub const VERTEX_ENTRY: &str = "vertex_main";
pub const FRAGMENT_ENTRY: &str = "fragment_main";
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

const LIT_SHADER: &str = include_str!("shaders/mesh_lit.wgsl");
const UNLIT_SHADER: &str = include_str!("shaders/mesh_unlit.wgsl");

/// Label and WGSL source of the shader variant.
pub fn shader_source(lighting: bool) -> (&'static str, &'static str) {
    if lighting {
        ("mesh_lit.wgsl", LIT_SHADER)
    } else {
        ("mesh_unlit.wgsl", UNLIT_SHADER)
    }
}

/// Runs `f` inside a validation error scope and returns the captured error.
fn with_validation<T>(device: &Device, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    let error = pollster::block_on(device.pop_error_scope());
    (value, error)
}

fn compile_shader(device: &Device, label: &str, source: &str) -> SetupResult<ShaderModule> {
    let (module, error) = with_validation(device, || {
        device.create_shader_module(ShaderModuleDescriptor {
            label: Some(label),
            source: ShaderSource::Wgsl(source.into()),
        })
    });
    match error {
        Some(e) => Err(SetupError::Shader {
            label: label.to_string(),
            message: e.to_string(),
        }),
        None => Ok(module),
    }
}

/// Inputs to [`MeshPipeline::build`].
#[derive(Debug, Clone, Copy)]
pub struct PipelineDesc<'a> {
    pub lighting: bool,
    pub depth_test: bool,
    pub color_format: TextureFormat,
    pub vertex_layout: &'a VertexLayout,
}

/// Compiled pipeline plus the fixed-function state baked into it.
pub struct MeshPipeline {
    pipeline: RenderPipeline,
    uniform_bgl: BindGroupLayout,
    pub topology: PrimitiveTopology,
    pub front_face: FrontFace,
    pub cull_mode: CullMode,
    pub depth_test: bool,
}

impl MeshPipeline {
    pub fn build(device: &Device, desc: PipelineDesc<'_>) -> SetupResult<Self> {
        let (shader_label, shader_src) = shader_source(desc.lighting);
        let shader = compile_shader(device, shader_label, shader_src)?;

        let uniform_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Uniforms BGL"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(uniform_size(desc.lighting)),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Mesh PipelineLayout"),
            bind_group_layouts: &[&uniform_bgl],
            push_constant_ranges: &[],
        });

        let topology = PrimitiveTopology::TriangleList;
        let front_face = FrontFace::Ccw;
        let cull_mode = CullMode::Back;

        let attributes = conversions::vertex_attributes(desc.vertex_layout);
        let vertex_buffers = [VertexBufferLayout {
            array_stride: desc.vertex_layout.stride(),
            step_mode: VertexStepMode::Vertex,
            attributes: &attributes,
        }];

        let label = if desc.lighting {
            "Lit Mesh Pipeline"
        } else {
            "Unlit Mesh Pipeline"
        };
        let (pipeline, error) = with_validation(device, || {
            device.create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: &shader,
                    entry_point: Some(VERTEX_ENTRY),
                    buffers: &vertex_buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(FragmentState {
                    module: &shader,
                    entry_point: Some(FRAGMENT_ENTRY),
                    targets: &[Some(ColorTargetState {
                        format: desc.color_format,
                        blend: Some(BlendState::REPLACE),
                        write_mask: ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: conversions::topology(topology),
                    front_face: conversions::front_face(front_face),
                    cull_mode: conversions::cull_mode(cull_mode),
                    ..Default::default()
                },
                depth_stencil: desc.depth_test.then(|| DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        });
        if let Some(e) = error {
            return Err(SetupError::Pipeline {
                label: label.to_string(),
                message: e.to_string(),
            });
        }
        log::info!(
            "Built {} (color {:?}, depth {})",
            label,
            desc.color_format,
            if desc.depth_test { "Depth32Float" } else { "off" }
        );

        Ok(Self {
            pipeline,
            uniform_bgl,
            topology,
            front_face,
            cull_mode,
            depth_test: desc.depth_test,
        })
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn uniform_layout(&self) -> &BindGroupLayout {
        &self.uniform_bgl
    }
}

/// Depth texture matching the surface size.
pub struct DepthTarget {
    texture: Texture,
    view: TextureView,
}

impl DepthTarget {
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&TextureDescriptor {
            label: Some("DepthTex"),
            size: Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&TextureViewDescriptor::default());
        Self { texture, view }
    }

    pub fn view(&self) -> &TextureView {
        &self.view
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}
