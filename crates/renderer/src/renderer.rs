//! The frame renderer: owns the GPU context, pipeline and mesh, and replays
//! each frame's command sequence against wgpu.

use std::sync::Arc;

use asset::{AssetStore, VertexLayout};
use corelib::{
    Command, CommandSequence, FrameClock, FrameConfig, FrameError, FrameErrorAction, FrameState,
    RendererState, SetupError, SetupResult, Viewport,
};
use wgpu::{
    BindGroup, Buffer, BufferUsages, CommandEncoder, CommandEncoderDescriptor, LoadOp, Operations,
    Queue, RenderPassColorAttachment, RenderPassDepthStencilAttachment, RenderPassDescriptor,
    StoreOp, TextureView, TextureViewDescriptor,
};
use winit::window::Window;

use crate::RendererConfig;
use crate::context::GpuContext;
use crate::conversions;
use crate::mesh::GpuMesh;
use crate::pipeline::{DepthTarget, MeshPipeline, PipelineDesc};
use crate::uniforms::{UNIFORM_BIND_GROUP, uniform_bytes, uniform_size};

/// Result of a frame tick that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented { draw_calls: usize },
    /// Nothing to draw into (zero-sized viewport).
    Skipped,
}

/// Everything released by [`FrameRenderer::teardown`] besides the context.
struct GpuResources {
    pipeline: MeshPipeline,
    depth: Option<DepthTarget>,
    uniform_buf: Buffer,
    uniform_bg: BindGroup,
    mesh: GpuMesh,
}

pub struct FrameRenderer {
    context: Option<GpuContext>,
    resources: Option<GpuResources>,
    frame: FrameState,
    clock: FrameClock,
}

impl FrameRenderer {
    /// Loads the mesh, builds the pipeline and moves to `Ready`.
    pub async fn new(window: Arc<Window>, config: &RendererConfig) -> SetupResult<Self> {
        let size = window.inner_size();
        let mut frame = FrameState::new(
            FrameConfig {
                lighting: config.lighting,
                depth_test: config.depth_test,
            },
            Viewport::new(size.width, size.height),
        );

        let context = GpuContext::new(window, &config.surface).await?;
        let device = context.device();

        // ==== Mesh ====
        let layout = VertexLayout::for_lighting(config.lighting);
        let mesh_data = AssetStore::new(&config.asset_root)
            .load_mesh(&config.mesh_id, &layout)
            .map_err(|e| SetupError::Asset {
                id: config.mesh_id.clone(),
                message: format!("{e:#}"),
            })?;
        let mesh = GpuMesh::upload(device, &config.mesh_id, &mesh_data, &layout)?;

        // ==== Pipeline ====
        let pipeline = MeshPipeline::build(
            device,
            PipelineDesc {
                lighting: config.lighting,
                depth_test: config.depth_test,
                color_format: context.surface_format(),
                vertex_layout: &layout,
            },
        )?;
        let surface_config = context.surface_config();
        let depth = config
            .depth_test
            .then(|| DepthTarget::new(device, surface_config.width, surface_config.height));

        // ==== Uniforms ====
        let uniform_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniforms UBO"),
            size: uniform_size(config.lighting),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniforms BG"),
            layout: pipeline.uniform_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buf.as_entire_binding(),
            }],
        });

        frame.mark_ready();
        log::info!(
            "Renderer ready: mesh '{}' ({} sub-meshes), lighting={}, depth_test={}, {:?}",
            config.mesh_id,
            mesh.draws().len(),
            config.lighting,
            config.depth_test,
            config.time_step
        );

        Ok(Self {
            context: Some(context),
            resources: Some(GpuResources {
                pipeline,
                depth,
                uniform_buf,
                uniform_bg,
                mesh,
            }),
            frame,
            clock: FrameClock::new(config.time_step),
        })
    }

    pub fn state(&self) -> RendererState {
        self.frame.state()
    }

    /// Seconds of animation accumulated so far.
    pub fn time(&self) -> f32 {
        self.frame.time()
    }

    pub fn viewport(&self) -> Viewport {
        self.frame.viewport()
    }

    pub fn frame_index(&self) -> u64 {
        self.clock.frame_index()
    }

    /// Store the new drawable size and resize the surface and depth target.
    pub fn on_viewport_resized(&mut self, width: u32, height: u32) {
        let unchanged = self.frame.viewport() == Viewport::new(width, height);
        self.frame.on_viewport_resized(width, height);
        if unchanged || width == 0 || height == 0 {
            return;
        }

        let (Some(context), Some(res)) = (self.context.as_mut(), self.resources.as_mut()) else {
            return;
        };
        context.resize(width, height);
        if let Some(old) = res.depth.take() {
            old.destroy();
            res.depth = Some(DepthTarget::new(context.device(), width, height));
        }
    }

    /// Produce, submit and present one frame.
    pub fn on_frame_tick(&mut self) -> Result<FrameOutcome, FrameError> {
        let (Some(context), Some(res)) = (self.context.as_ref(), self.resources.as_ref()) else {
            return Err(FrameError::TornDown);
        };

        let viewport = self.frame.viewport();
        if viewport.is_empty() {
            return Ok(FrameOutcome::Skipped);
        }

        let dt = self.clock.tick();
        let commands = self.frame.render_frame(dt, viewport, res.mesh.draws())?;

        let frame = context.acquire()?;
        let view = frame.texture.create_view(&TextureViewDescriptor::default());

        let mut encoder = context
            .device()
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });
        let draw_calls = encode_pass(&commands, &mut encoder, &view, res, context.queue());

        context.queue().submit(Some(encoder.finish()));
        frame.present();

        log::trace!(
            "frame {} t={:.4}s draws={}",
            self.clock.frame_index(),
            self.frame.time(),
            draw_calls
        );
        Ok(FrameOutcome::Presented { draw_calls })
    }

    /// Apply the recovery policy for `err` and report what was done.
    pub fn handle_frame_error(&mut self, err: &FrameError) -> FrameErrorAction {
        let action = err.action();
        match action {
            FrameErrorAction::Reconfigure => {
                if let Some(context) = self.context.as_ref() {
                    context.reconfigure();
                }
                log::warn!("{err}; surface reconfigured, frame skipped");
            }
            FrameErrorAction::SkipFrame => log::warn!("{err}; frame skipped"),
            FrameErrorAction::Fatal => log::error!("{err}; cannot continue rendering"),
        }
        action
    }

    /// Release mesh buffers, pipeline, depth target, queue and device.
    /// Safe to call more than once; returns `true` only the first time.
    pub fn teardown(&mut self) -> bool {
        if !self.frame.teardown() {
            return false;
        }
        if let Some(res) = self.resources.take() {
            res.mesh.destroy();
            res.uniform_buf.destroy();
            if let Some(depth) = &res.depth {
                depth.destroy();
            }
        }
        self.context = None;
        log::info!(
            "Renderer torn down after {} frames",
            self.clock.frame_index()
        );
        true
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Records one frame's render pass from `commands`. Returns the number of
/// indexed draws issued.
fn encode_pass(
    commands: &CommandSequence,
    encoder: &mut CommandEncoder,
    target: &TextureView,
    res: &GpuResources,
    queue: &Queue,
) -> usize {
    let Some((
        Command::BeginPass {
            clear_color,
            clear_depth,
        },
        rest,
    )) = commands.commands().split_first()
    else {
        log::warn!("command sequence does not open a render pass; nothing drawn");
        return 0;
    };

    let [r, g, b, a] = *clear_color;
    let depth_stencil_attachment = match (clear_depth, res.depth.as_ref()) {
        (Some(depth), Some(depth_target)) => Some(RenderPassDepthStencilAttachment {
            view: depth_target.view(),
            depth_ops: Some(Operations {
                load: LoadOp::Clear(*depth),
                store: StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        _ => None,
    };

    let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
        label: Some("MainPass"),
        color_attachments: &[Some(RenderPassColorAttachment {
            view: target,
            depth_slice: None,
            resolve_target: None,
            ops: Operations {
                load: LoadOp::Clear(wgpu::Color { r, g, b, a }),
                store: StoreOp::Store,
            },
        })],
        depth_stencil_attachment,
        occlusion_query_set: None,
        timestamp_writes: None,
    });

    let mut draw_calls = 0;
    for command in rest {
        match command {
            Command::BeginPass { .. } => log::warn!("nested render pass ignored"),
            Command::SetPipeline => rpass.set_pipeline(res.pipeline.pipeline()),
            // Depth, winding and culling are baked into the pipeline.
            Command::SetDepthStencil => {
                debug_assert!(res.pipeline.depth_test && res.depth.is_some());
            }
            Command::SetFrontFace(face) => debug_assert_eq!(*face, res.pipeline.front_face),
            Command::SetCullMode(mode) => debug_assert_eq!(*mode, res.pipeline.cull_mode),
            Command::SetUniforms(uniforms) => {
                queue.write_buffer(&res.uniform_buf, 0, &uniform_bytes(uniforms));
                rpass.set_bind_group(UNIFORM_BIND_GROUP, &res.uniform_bg, &[]);
            }
            Command::SetVertexBuffer {
                slot,
                buffer,
                offset,
            } => match res.mesh.vertex_buffer(*buffer) {
                Some(vb) => rpass.set_vertex_buffer(*slot, vb.slice(*offset..)),
                None => log::warn!("vertex buffer {} does not exist", buffer),
            },
            Command::DrawIndexed {
                topology,
                index_count,
                index_format,
                index_offset,
            } => {
                debug_assert_eq!(*topology, res.pipeline.topology);
                rpass.set_index_buffer(
                    res.mesh.index_buffer().slice(*index_offset..),
                    conversions::index_format(*index_format),
                );
                rpass.draw_indexed(0..*index_count, 0, 0..1);
                draw_calls += 1;
            }
            Command::EndPass => break,
        }
    }
    draw_calls
}
