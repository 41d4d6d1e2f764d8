//! Core types: math re-exports, model/camera transforms, frame clock,
//! uniforms and the pure per-frame command builder.

pub use glam::{Mat3, Mat4, Vec3, Vec4, vec3};

pub mod camera;
pub mod clock;
pub mod error;
pub mod frame;
pub mod transform;
pub mod uniforms;

pub use camera::Viewport;
pub use clock::{FrameClock, TimeStep};
pub use error::{AcquireFailure, FrameError, FrameErrorAction, SetupError, SetupResult};
pub use frame::{
    Command, CommandSequence, CullMode, FrameConfig, FrameState, FrontFace, IndexFormat,
    PrimitiveTopology, RendererState, SubmeshDraw,
};
pub use uniforms::Uniforms;
