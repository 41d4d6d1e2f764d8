//! Mapping of renderer-agnostic types onto wgpu.

use asset::{VertexFormat, VertexLayout};
use corelib::{AcquireFailure, CullMode, FrontFace, IndexFormat, PrimitiveTopology};

pub fn topology(topology: PrimitiveTopology) -> wgpu::PrimitiveTopology {
    match topology {
        PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
    }
}

pub fn index_format(format: IndexFormat) -> wgpu::IndexFormat {
    match format {
        IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
        IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
    }
}

pub fn front_face(face: FrontFace) -> wgpu::FrontFace {
    match face {
        FrontFace::Ccw => wgpu::FrontFace::Ccw,
        FrontFace::Cw => wgpu::FrontFace::Cw,
    }
}

pub fn cull_mode(mode: CullMode) -> Option<wgpu::Face> {
    match mode {
        CullMode::None => None,
        CullMode::Front => Some(wgpu::Face::Front),
        CullMode::Back => Some(wgpu::Face::Back),
    }
}

pub fn vertex_format(format: VertexFormat) -> wgpu::VertexFormat {
    match format {
        VertexFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
    }
}

/// Attribute list for a `wgpu::VertexBufferLayout` built from `layout`.
pub fn vertex_attributes(layout: &VertexLayout) -> Vec<wgpu::VertexAttribute> {
    layout
        .attributes()
        .iter()
        .map(|a| wgpu::VertexAttribute {
            format: vertex_format(a.format),
            offset: a.offset,
            shader_location: a.shader_location,
        })
        .collect()
}

pub fn acquire_failure(err: &wgpu::SurfaceError) -> AcquireFailure {
    match err {
        wgpu::SurfaceError::Timeout => AcquireFailure::Timeout,
        wgpu::SurfaceError::Outdated => AcquireFailure::Outdated,
        wgpu::SurfaceError::Lost => AcquireFailure::Lost,
        wgpu::SurfaceError::OutOfMemory => AcquireFailure::OutOfMemory,
        wgpu::SurfaceError::Other => AcquireFailure::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lit_layout_maps_to_two_float3_attributes() {
        let attrs = vertex_attributes(&VertexLayout::for_lighting(true));
        assert_eq!(
            attrs,
            vec![
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                    shader_location: 1,
                },
            ]
        );
    }

    #[test]
    fn fixed_function_state_maps_directly() {
        assert_eq!(front_face(FrontFace::Ccw), wgpu::FrontFace::Ccw);
        assert_eq!(cull_mode(CullMode::Back), Some(wgpu::Face::Back));
        assert_eq!(cull_mode(CullMode::None), None);
        assert_eq!(index_format(IndexFormat::Uint32), wgpu::IndexFormat::Uint32);
        assert_eq!(
            topology(PrimitiveTopology::TriangleList),
            wgpu::PrimitiveTopology::TriangleList
        );
    }

    #[test]
    fn surface_errors_keep_their_kind() {
        assert_eq!(
            acquire_failure(&wgpu::SurfaceError::Outdated),
            AcquireFailure::Outdated
        );
        assert_eq!(
            acquire_failure(&wgpu::SurfaceError::OutOfMemory),
            AcquireFailure::OutOfMemory
        );
    }
}
