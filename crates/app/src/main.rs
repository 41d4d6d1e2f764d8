//! Entry point for spinmesh.
//! Logging + command-line configuration, then hands off to the platform loop.

use std::path::PathBuf;

use anyhow::Result;
use platform::AppConfig;
use renderer::RendererConfig;

fn parse_backend(val: &str) -> wgpu::Backends {
    match val.to_ascii_lowercase().as_str() {
        "auto" => wgpu::Backends::all(),
        "vulkan" | "vk" => wgpu::Backends::VULKAN,
        "dx12" | "d3d12" => wgpu::Backends::DX12,
        "metal" | "mtl" => wgpu::Backends::METAL,
        "gl" | "opengl" | "gles" => wgpu::Backends::GL,
        other => {
            log::warn!("Unknown backend '{}', falling back to auto.", other);
            wgpu::Backends::all()
        }
    }
}

fn parse_switch(flag: &str, val: &str, default: bool) -> bool {
    match val.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => true,
        "0" | "false" | "off" | "no" => false,
        other => {
            log::warn!("Invalid value '{}' for --{}, using {}", other, flag, default);
            default
        }
    }
}

/// Accepts `--flag=value` arguments; unknown arguments are logged and ignored.
///
/// --gpu-backend=auto|vulkan|dx12|metal|gl  --size=WxH  --width=N  --height=N
/// --assets=DIR  --mesh=ID  --lighting=on|off  --depth=on|off
/// --fps=N  --time-step=fixed|measured
fn parse_args<S: AsRef<str>>(args: &[S]) -> AppConfig {
    let defaults = AppConfig::default();
    let mut renderer = RendererConfig::default();
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;
    let mut target_fps: Option<u32> = None;
    let mut measured_time = false;

    for arg in args.iter().map(AsRef::as_ref) {
        if let Some(v) = arg.strip_prefix("--gpu-backend=") {
            renderer.surface.backends = parse_backend(v);
        } else if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        } else if let Some(v) = arg.strip_prefix("--assets=") {
            renderer.asset_root = PathBuf::from(v);
        } else if let Some(v) = arg.strip_prefix("--mesh=") {
            renderer.mesh_id = v.to_string();
        } else if let Some(v) = arg.strip_prefix("--lighting=") {
            renderer.lighting = parse_switch("lighting", v, renderer.lighting);
        } else if let Some(v) = arg.strip_prefix("--depth=") {
            renderer.depth_test = parse_switch("depth", v, renderer.depth_test);
        } else if let Some(v) = arg.strip_prefix("--fps=") {
            match v.parse::<u32>() {
                Ok(fps) if fps > 0 => target_fps = Some(fps),
                _ => log::warn!("Invalid --fps value '{}', using the display rate", v),
            }
        } else if let Some(v) = arg.strip_prefix("--time-step=") {
            measured_time = match v.to_ascii_lowercase().as_str() {
                "measured" => true,
                "fixed" => false,
                other => {
                    log::warn!("Unknown time step '{}', using fixed", other);
                    false
                }
            };
        } else {
            log::warn!("Ignoring unknown argument '{}'", arg);
        }
    }

    AppConfig {
        width: w.unwrap_or(defaults.width).max(1),
        height: h.unwrap_or(defaults.height).max(1),
        target_fps,
        measured_time,
        renderer,
        ..defaults
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = parse_args(&args);
    log::info!(
        "Starting spinmesh. Backend: {:?}, window_size={}x{}, mesh='{}' from {}, lighting={}, depth={}",
        config.renderer.surface.backends,
        config.width,
        config.height,
        config.renderer.mesh_id,
        config.renderer.asset_root.display(),
        config.renderer.lighting,
        config.renderer.depth_test
    );

    platform::run(config)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
