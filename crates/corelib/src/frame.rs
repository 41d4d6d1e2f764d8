//! Pure per-frame step: time and viewport in, ordered draw commands out.
//!
//! Nothing here touches the GPU. The renderer replays a [`CommandSequence`]
//! against wgpu; tests inspect it directly.

use crate::camera::Viewport;
use crate::error::FrameError;
use crate::uniforms::Uniforms;

/// Opaque black.
pub const CLEAR_COLOR: [f64; 4] = [0.0, 0.0, 0.0, 1.0];
/// Depth cleared to the far plane.
pub const CLEAR_DEPTH: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

impl IndexFormat {
    /// Narrowest format able to address `max_index`.
    pub fn for_max_index(max_index: u32) -> Self {
        if max_index <= u16::MAX as u32 {
            IndexFormat::Uint16
        } else {
            IndexFormat::Uint32
        }
    }

    pub fn byte_size(self) -> u64 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrontFace {
    Ccw,
    Cw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Everything needed to draw one sub-mesh, as recorded at load time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmeshDraw {
    /// Index into the mesh's vertex buffer list.
    pub vertex_buffer: usize,
    /// Byte offset into that vertex buffer.
    pub vertex_offset: u64,
    pub index_count: u32,
    pub topology: PrimitiveTopology,
    pub index_format: IndexFormat,
    /// Byte offset into the index buffer.
    pub index_offset: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    BeginPass {
        clear_color: [f64; 4],
        clear_depth: Option<f32>,
    },
    SetPipeline,
    SetDepthStencil,
    SetFrontFace(FrontFace),
    SetCullMode(CullMode),
    SetUniforms(Uniforms),
    SetVertexBuffer {
        slot: u32,
        buffer: usize,
        offset: u64,
    },
    DrawIndexed {
        topology: PrimitiveTopology,
        index_count: u32,
        index_format: IndexFormat,
        index_offset: u64,
    },
    EndPass,
}

/// Ordered commands for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandSequence {
    commands: Vec<Command>,
}

impl CommandSequence {
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of indexed draw calls.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawIndexed { .. }))
            .count()
    }

    /// Uniforms uploaded by this frame, if any.
    pub fn uniforms(&self) -> Option<&Uniforms> {
        self.commands.iter().find_map(|c| match c {
            Command::SetUniforms(u) => Some(u),
            _ => None,
        })
    }
}

/// Variant switches fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameConfig {
    pub lighting: bool,
    pub depth_test: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            lighting: true,
            depth_test: true,
        }
    }
}

/// Builds the command sequence for a frame at `time` seconds.
pub fn build_commands(
    time: f32,
    viewport: Viewport,
    config: FrameConfig,
    draws: &[SubmeshDraw],
) -> CommandSequence {
    let mut commands = Vec::with_capacity(7 + draws.len() * 2);

    commands.push(Command::BeginPass {
        clear_color: CLEAR_COLOR,
        clear_depth: config.depth_test.then_some(CLEAR_DEPTH),
    });
    commands.push(Command::SetPipeline);
    if config.depth_test {
        commands.push(Command::SetDepthStencil);
    }
    commands.push(Command::SetFrontFace(FrontFace::Ccw));
    commands.push(Command::SetCullMode(CullMode::Back));
    commands.push(Command::SetUniforms(Uniforms::for_frame(
        time,
        viewport,
        config.lighting,
    )));

    for draw in draws {
        commands.push(Command::SetVertexBuffer {
            slot: 0,
            buffer: draw.vertex_buffer,
            offset: draw.vertex_offset,
        });
        commands.push(Command::DrawIndexed {
            topology: draw.topology,
            index_count: draw.index_count,
            index_format: draw.index_format,
            index_offset: draw.index_offset,
        });
    }

    commands.push(Command::EndPass);
    CommandSequence { commands }
}

/// Lifecycle of the frame renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RendererState {
    Uninitialized,
    Ready,
    Rendering,
    Resized,
    TornDown,
}

/// Time accumulator, current viewport and lifecycle state.
#[derive(Debug, Clone)]
pub struct FrameState {
    config: FrameConfig,
    state: RendererState,
    time: f32,
    viewport: Viewport,
}

impl FrameState {
    pub fn new(config: FrameConfig, viewport: Viewport) -> Self {
        Self {
            config,
            state: RendererState::Uninitialized,
            time: 0.0,
            viewport,
        }
    }

    pub fn config(&self) -> FrameConfig {
        self.config
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    /// Seconds accumulated so far.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Pipeline and resources exist; frames may be produced.
    pub fn mark_ready(&mut self) {
        if self.state == RendererState::Uninitialized {
            self.state = RendererState::Ready;
        }
    }

    /// Stores the new drawable size. Bookkeeping only.
    pub fn on_viewport_resized(&mut self, width: u32, height: u32) {
        match self.state {
            RendererState::TornDown => {}
            RendererState::Uninitialized => self.viewport = Viewport::new(width, height),
            _ => {
                log::debug!("viewport resized to {}x{}", width, height);
                self.viewport = Viewport::new(width, height);
                self.state = RendererState::Resized;
            }
        }
    }

    /// Advances time by `delta_time` and produces this frame's commands.
    ///
    /// A viewport different from the stored one is treated as a resize first,
    /// so the projection always matches the size being drawn into.
    pub fn render_frame(
        &mut self,
        delta_time: f32,
        viewport: Viewport,
        draws: &[SubmeshDraw],
    ) -> Result<CommandSequence, FrameError> {
        match self.state {
            RendererState::Uninitialized => return Err(FrameError::NotReady),
            RendererState::TornDown => return Err(FrameError::TornDown),
            _ => {}
        }
        if viewport != self.viewport {
            self.on_viewport_resized(viewport.width, viewport.height);
        }
        if self.viewport.is_empty() {
            return Err(FrameError::EmptyViewport);
        }

        self.time += delta_time;
        self.state = RendererState::Rendering;
        Ok(build_commands(self.time, self.viewport, self.config, draws))
    }

    /// Returns `true` on the first call only.
    pub fn teardown(&mut self) -> bool {
        if self.state == RendererState::TornDown {
            return false;
        }
        log::debug!("frame state torn down after {:.3}s", self.time);
        self.state = RendererState::TornDown;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mat4;

    fn draw(index_count: u32, index_offset: u64) -> SubmeshDraw {
        SubmeshDraw {
            vertex_buffer: 0,
            vertex_offset: 0,
            index_count,
            topology: PrimitiveTopology::TriangleList,
            index_format: IndexFormat::Uint16,
            index_offset,
        }
    }

    fn ready(viewport: Viewport) -> FrameState {
        let mut state = FrameState::new(FrameConfig::default(), viewport);
        state.mark_ready();
        state
    }

    fn draws_of(seq: &CommandSequence) -> Vec<(u32, PrimitiveTopology, IndexFormat, u64)> {
        seq.iter()
            .filter_map(|c| match c {
                Command::DrawIndexed {
                    topology,
                    index_count,
                    index_format,
                    index_offset,
                } => Some((*index_count, *topology, *index_format, *index_offset)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn two_submeshes_yield_two_draws_in_load_order() {
        let mut state = ready(Viewport::new(800, 600));
        let submeshes = [draw(500, 0), draw(300, 1000)];
        let seq = state
            .render_frame(1.0 / 60.0, Viewport::new(800, 600), &submeshes)
            .unwrap();
        assert_eq!(seq.draw_count(), 2);
        assert_eq!(
            draws_of(&seq),
            vec![
                (500, PrimitiveTopology::TriangleList, IndexFormat::Uint16, 0),
                (300, PrimitiveTopology::TriangleList, IndexFormat::Uint16, 1000),
            ]
        );
    }

    #[test]
    fn draws_carry_stored_format_and_vertex_binding() {
        let submeshes = [SubmeshDraw {
            vertex_buffer: 1,
            vertex_offset: 48,
            index_count: 90_000,
            topology: PrimitiveTopology::TriangleList,
            index_format: IndexFormat::Uint32,
            index_offset: 64,
        }];
        let seq = build_commands(0.0, Viewport::new(4, 4), FrameConfig::default(), &submeshes);
        let binds: Vec<_> = seq
            .iter()
            .filter(|c| matches!(c, Command::SetVertexBuffer { .. }))
            .collect();
        assert_eq!(
            binds,
            vec![&Command::SetVertexBuffer {
                slot: 0,
                buffer: 1,
                offset: 48
            }]
        );
        assert_eq!(
            draws_of(&seq),
            vec![(90_000, PrimitiveTopology::TriangleList, IndexFormat::Uint32, 64)]
        );
    }

    #[test]
    fn pass_is_cleared_black_and_bounded() {
        let seq = build_commands(0.0, Viewport::new(8, 8), FrameConfig::default(), &[]);
        let cmds = seq.commands();
        assert_eq!(
            cmds.first(),
            Some(&Command::BeginPass {
                clear_color: [0.0, 0.0, 0.0, 1.0],
                clear_depth: Some(1.0),
            })
        );
        assert_eq!(cmds.last(), Some(&Command::EndPass));
        assert!(cmds.contains(&Command::SetFrontFace(FrontFace::Ccw)));
        assert!(cmds.contains(&Command::SetCullMode(CullMode::Back)));
        assert!(cmds.contains(&Command::SetDepthStencil));
        assert_eq!(seq.draw_count(), 0);
    }

    #[test]
    fn depth_state_is_omitted_without_depth_test() {
        let config = FrameConfig {
            lighting: false,
            depth_test: false,
        };
        let seq = build_commands(0.0, Viewport::new(8, 8), config, &[]);
        assert!(!seq.commands().contains(&Command::SetDepthStencil));
        assert!(matches!(
            seq.commands()[0],
            Command::BeginPass {
                clear_depth: None,
                ..
            }
        ));
        assert!(seq.uniforms().unwrap().normal.is_none());
    }

    #[test]
    fn one_tick_at_sixty_fps() {
        let mut state = ready(Viewport::new(800, 600));
        assert_eq!(state.time(), 0.0);
        let seq = state
            .render_frame(1.0 / 60.0, Viewport::new(800, 600), &[])
            .unwrap();
        assert_eq!(state.time(), 1.0 / 60.0);
        let expected = Uniforms::for_frame(1.0 / 60.0, Viewport::new(800, 600), true);
        assert_eq!(seq.uniforms(), Some(&expected));
        assert_eq!(crate::transform::spin_angle(state.time()), -1.0 / 60.0);
    }

    #[test]
    fn resize_updates_projection_before_next_frame() {
        let mut state = ready(Viewport::new(800, 600));
        let before = state
            .render_frame(0.0, Viewport::new(800, 600), &[])
            .unwrap();
        state.on_viewport_resized(1600, 900);
        assert_eq!(state.state(), RendererState::Resized);
        let after = state
            .render_frame(0.0, state.viewport(), &[])
            .unwrap();
        assert_eq!(state.state(), RendererState::Rendering);

        let p_before = before.uniforms().unwrap().projection;
        let p_after = after.uniforms().unwrap().projection;
        let h = p_before.y_axis.y;
        assert!((h / p_before.x_axis.x - 4.0 / 3.0).abs() < 1e-5);
        assert!((h / p_after.x_axis.x - 16.0 / 9.0).abs() < 1e-5);
        assert_eq!(
            p_after,
            Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 1600.0 / 900.0, 0.1, 100.0)
        );
    }

    #[test]
    fn repeated_resize_is_idempotent() {
        let mut once = ready(Viewport::new(800, 600));
        let mut twice = ready(Viewport::new(800, 600));
        once.on_viewport_resized(1600, 900);
        twice.on_viewport_resized(1600, 900);
        twice.on_viewport_resized(1600, 900);

        let a = once.render_frame(0.1, once.viewport(), &[]).unwrap();
        let b = twice.render_frame(0.1, twice.viewport(), &[]).unwrap();
        let pa = a.uniforms().unwrap().projection.to_cols_array();
        let pb = b.uniforms().unwrap().projection.to_cols_array();
        assert_eq!(pa.map(f32::to_bits), pb.map(f32::to_bits));
    }

    #[test]
    fn explicit_viewport_argument_counts_as_resize() {
        let mut state = ready(Viewport::new(800, 600));
        let seq = state
            .render_frame(0.0, Viewport::new(1600, 900), &[])
            .unwrap();
        assert_eq!(state.viewport(), Viewport::new(1600, 900));
        let p = seq.uniforms().unwrap().projection;
        assert!((p.y_axis.y / p.x_axis.x - 16.0 / 9.0).abs() < 1e-5);
    }

    #[test]
    fn view_translation_is_time_and_size_independent() {
        let a = Uniforms::for_frame(0.0, Viewport::new(800, 600), false).model_view;
        let b = Uniforms::for_frame(0.0, Viewport::new(1600, 900), false).model_view;
        assert_eq!(a, b);
        // Model transform leaves the origin in place, so the translation
        // column is exactly the view translation.
        for t in [0.0_f32, 1.5, 42.0] {
            let mv = Uniforms::for_frame(t, Viewport::new(800, 600), false).model_view;
            assert_eq!(mv.w_axis.truncate(), crate::Vec3::new(0.0, -0.2, -2.0));
        }
    }

    #[test]
    fn lifecycle_transitions() {
        let mut state = FrameState::new(FrameConfig::default(), Viewport::new(10, 10));
        assert_eq!(state.state(), RendererState::Uninitialized);
        assert_eq!(
            state.render_frame(0.0, Viewport::new(10, 10), &[]),
            Err(FrameError::NotReady)
        );
        state.mark_ready();
        assert_eq!(state.state(), RendererState::Ready);
        state.render_frame(0.0, Viewport::new(10, 10), &[]).unwrap();
        assert_eq!(state.state(), RendererState::Rendering);

        assert!(state.teardown());
        assert!(!state.teardown());
        assert_eq!(state.state(), RendererState::TornDown);
        state.on_viewport_resized(20, 20);
        assert_eq!(state.state(), RendererState::TornDown);
        assert_eq!(
            state.render_frame(0.0, Viewport::new(10, 10), &[]),
            Err(FrameError::TornDown)
        );
    }

    #[test]
    fn empty_viewport_does_not_advance_time() {
        let mut state = ready(Viewport::new(800, 600));
        state.on_viewport_resized(0, 600);
        assert_eq!(
            state.render_frame(1.0, state.viewport(), &[]),
            Err(FrameError::EmptyViewport)
        );
        assert_eq!(state.time(), 0.0);
    }

    #[test]
    fn index_format_picks_narrowest() {
        assert_eq!(IndexFormat::for_max_index(0), IndexFormat::Uint16);
        assert_eq!(IndexFormat::for_max_index(65_535), IndexFormat::Uint16);
        assert_eq!(IndexFormat::for_max_index(65_536), IndexFormat::Uint32);
        assert_eq!(IndexFormat::Uint16.byte_size(), 2);
        assert_eq!(IndexFormat::Uint32.byte_size(), 4);
    }
}
