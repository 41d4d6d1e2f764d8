//! Renderer: wgpu context, mesh upload, pipeline variants and the frame
//! renderer that replays `corelib` command sequences.
//! wgpu = 26.x, winit = 0.30.x

use std::path::PathBuf;

use corelib::TimeStep;

pub mod context;
pub mod conversions;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod uniforms;

pub use context::{GpuContext, SurfaceOptions};
pub use renderer::{FrameOutcome, FrameRenderer};

/// Mesh id loaded when none is given.
pub const DEFAULT_MESH_ID: &str = "cube";
/// Asset directory used when none is given.
pub const DEFAULT_ASSET_ROOT: &str = "assets";

/// Everything fixed at renderer construction.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub asset_root: PathBuf,
    pub mesh_id: String,
    /// Selects the lit vertex layout, uniform block and shader.
    pub lighting: bool,
    pub depth_test: bool,
    pub time_step: TimeStep,
    pub surface: SurfaceOptions,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            mesh_id: DEFAULT_MESH_ID.to_string(),
            lighting: true,
            depth_test: true,
            time_step: TimeStep::default(),
            surface: SurfaceOptions::default(),
        }
    }
}
