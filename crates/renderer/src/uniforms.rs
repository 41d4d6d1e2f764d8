//! GPU byte layout of the per-frame uniform block.
//!
//! Mirrors the `Uniforms` structs in the WGSL shaders: `mat3x3<f32>` is
//! stored as three 16-byte columns.

use bytemuck::{Pod, Zeroable};
use corelib::{Mat3, Uniforms};

/// Bind group index the uniform block is bound at.
pub const UNIFORM_BIND_GROUP: u32 = 0;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct UnlitUniformsRaw {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LitUniformsRaw {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 3],
}

/// Size in bytes of the uniform block for the given variant.
pub const fn uniform_size(lighting: bool) -> u64 {
    if lighting {
        std::mem::size_of::<LitUniformsRaw>() as u64
    } else {
        std::mem::size_of::<UnlitUniformsRaw>() as u64
    }
}

fn padded_columns(m: Mat3) -> [[f32; 4]; 3] {
    [
        m.x_axis.extend(0.0).to_array(),
        m.y_axis.extend(0.0).to_array(),
        m.z_axis.extend(0.0).to_array(),
    ]
}

/// Serializes `uniforms`; the normal matrix decides the variant.
pub fn uniform_bytes(uniforms: &Uniforms) -> Vec<u8> {
    let model_view = uniforms.model_view.to_cols_array_2d();
    let projection = uniforms.projection.to_cols_array_2d();
    match uniforms.normal {
        Some(normal) => bytemuck::bytes_of(&LitUniformsRaw {
            model_view,
            projection,
            normal_matrix: padded_columns(normal),
        })
        .to_vec(),
        None => bytemuck::bytes_of(&UnlitUniformsRaw {
            model_view,
            projection,
        })
        .to_vec(),
    }
}
