//! wgpu device, queue and window surface.

use std::sync::Arc;

use corelib::{AcquireFailure, FrameError, SetupError, SetupResult};
use wgpu::{
    Device, DeviceDescriptor, Features, Instance, InstanceDescriptor, Limits, PowerPreference,
    PresentMode, Queue, Surface, SurfaceConfiguration, SurfaceTexture, TextureFormat,
    TextureUsages,
};
use winit::{dpi::PhysicalSize, window::Window};

use crate::conversions;

/// Surface-related options chosen by the host.
#[derive(Debug, Clone)]
pub struct SurfaceOptions {
    pub backends: wgpu::Backends,
    pub present_mode: PresentMode,
    pub prefer_srgb: bool,
    pub desired_maximum_frame_latency: u32,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            present_mode: PresentMode::AutoVsync,
            prefer_srgb: true,
            desired_maximum_frame_latency: 2,
        }
    }
}

/// Owns the device, queue and the configured window surface.
pub struct GpuContext {
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    device: Device,
    queue: Queue,
}

impl GpuContext {
    /// Create a context bound to an `Arc<Window>`.
    pub async fn new(window: Arc<Window>, options: &SurfaceOptions) -> SetupResult<Self> {
        let PhysicalSize { width, height } = window.inner_size();

        let instance = Instance::new(&InstanceDescriptor {
            backends: options.backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .map_err(|e| SetupError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SetupError::Adapter(e.to_string()))?;
        let info = adapter.get_info();
        log::info!("Using adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("spinmesh device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| SetupError::Device(e.to_string()))?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !options.prefer_srgb || f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| SetupError::Surface("surface reports no formats".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: options.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: options.desired_maximum_frame_latency,
        };
        surface.configure(&device, &surface_config);
        log::info!(
            "Surface configured: {}x{} {:?} {:?}",
            surface_config.width,
            surface_config.height,
            surface_format,
            options.present_mode
        );

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.surface_config.format
    }

    pub fn surface_config(&self) -> &SurfaceConfiguration {
        &self.surface_config
    }

    /// Reconfigure the surface for a new drawable size. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Reapply the current configuration after a lost/outdated surface.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Acquire the next presentable texture.
    pub fn acquire(&self) -> Result<SurfaceTexture, FrameError> {
        self.surface.get_current_texture().map_err(|e| {
            let failure: AcquireFailure = conversions::acquire_failure(&e);
            FrameError::SurfaceAcquisition(failure)
        })
    }
}
