//! Error kinds shared by the loader, the renderer and the platform shell.

use thiserror::Error;

/// Failure while building the mesh, device or pipeline. Always fatal.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to load mesh asset '{id}': {message}")]
    Asset { id: String, message: String },

    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),

    #[error("failed to create GPU device: {0}")]
    Device(String),

    #[error("failed to create display surface: {0}")]
    Surface(String),

    #[error("shader module '{label}' failed to compile: {message}")]
    Shader { label: String, message: String },

    #[error("render pipeline '{label}' could not be created: {message}")]
    Pipeline { label: String, message: String },
}

pub type SetupResult<T> = Result<T, SetupError>;

/// Why the next drawable could not be acquired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcquireFailure {
    Timeout,
    Outdated,
    Lost,
    OutOfMemory,
    Other,
}

/// Failure while producing a single frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("could not acquire a drawable: {0:?}")]
    SurfaceAcquisition(AcquireFailure),

    #[error("viewport is empty")]
    EmptyViewport,

    #[error("renderer is not ready")]
    NotReady,

    #[error("renderer was torn down")]
    TornDown,
}

/// What the frame driver should do after a [`FrameError`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameErrorAction {
    /// Surface must be reconfigured; rendering resumes next frame.
    Reconfigure,
    /// Transient; drop this frame.
    SkipFrame,
    /// Unrecoverable; shut down.
    Fatal,
}

impl FrameError {
    pub fn action(&self) -> FrameErrorAction {
        match self {
            FrameError::SurfaceAcquisition(AcquireFailure::Lost | AcquireFailure::Outdated) => {
                FrameErrorAction::Reconfigure
            }
            FrameError::SurfaceAcquisition(AcquireFailure::OutOfMemory) => FrameErrorAction::Fatal,
            FrameError::SurfaceAcquisition(AcquireFailure::Timeout | AcquireFailure::Other)
            | FrameError::EmptyViewport
            | FrameError::NotReady
            | FrameError::TornDown => FrameErrorAction::SkipFrame,
        }
    }
}
