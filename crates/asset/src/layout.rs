//! Vertex layout description and packing of mesh data into GPU-ready bytes.

use corelib::IndexFormat;

use crate::mesh::MeshData;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexSemantic {
    Position,
    Normal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x3,
}

impl VertexFormat {
    pub fn byte_size(self) -> u64 {
        match self {
            VertexFormat::Float32x3 => 12,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub semantic: VertexSemantic,
    pub format: VertexFormat,
    pub offset: u64,
    pub shader_location: u32,
}

/// Interleaved attribute layout of the single vertex buffer.
///
/// Must match the vertex inputs of the shader variant it is used with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    stride: u64,
}

impl VertexLayout {
    /// Position only (12-byte stride).
    pub fn position_only() -> Self {
        Self::from_semantics(&[VertexSemantic::Position])
    }

    /// Position then normal (24-byte stride).
    pub fn position_normal() -> Self {
        Self::from_semantics(&[VertexSemantic::Position, VertexSemantic::Normal])
    }

    pub fn for_lighting(lighting: bool) -> Self {
        if lighting {
            Self::position_normal()
        } else {
            Self::position_only()
        }
    }

    fn from_semantics(semantics: &[VertexSemantic]) -> Self {
        let mut offset = 0;
        let attributes = semantics
            .iter()
            .zip(0u32..)
            .map(|(&semantic, shader_location)| {
                let attr = VertexAttribute {
                    semantic,
                    format: VertexFormat::Float32x3,
                    offset,
                    shader_location,
                };
                offset += attr.format.byte_size();
                attr
            })
            .collect();
        Self {
            attributes,
            stride: offset,
        }
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn has(&self, semantic: VertexSemantic) -> bool {
        self.attributes.iter().any(|a| a.semantic == semantic)
    }
}

/// Interleaves vertex attributes in layout order.
pub fn pack_vertices(mesh: &MeshData, layout: &VertexLayout) -> Vec<u8> {
    let floats_per_vertex = (layout.stride() / 4) as usize;
    let mut floats: Vec<f32> = Vec::with_capacity(mesh.vertices.len() * floats_per_vertex);
    for vertex in &mesh.vertices {
        for attr in layout.attributes() {
            match attr.semantic {
                VertexSemantic::Position => floats.extend_from_slice(&vertex.position),
                VertexSemantic::Normal => floats.extend_from_slice(&vertex.normal),
            }
        }
    }
    bytemuck::cast_slice(&floats).to_vec()
}

/// Location of one sub-mesh inside the packed index blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexRange {
    pub byte_offset: u64,
    pub count: u32,
}

/// All sub-mesh indices concatenated in one blob of a single format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedIndices {
    pub format: IndexFormat,
    pub bytes: Vec<u8>,
    pub ranges: Vec<IndexRange>,
}

/// Concatenates sub-mesh indices using the narrowest format that fits.
pub fn pack_indices(mesh: &MeshData) -> PackedIndices {
    let format = IndexFormat::for_max_index(mesh.max_index().unwrap_or(0));
    let mut bytes = Vec::with_capacity(mesh.index_count() * format.byte_size() as usize);
    let mut ranges = Vec::with_capacity(mesh.submeshes.len());

    for submesh in &mesh.submeshes {
        ranges.push(IndexRange {
            byte_offset: bytes.len() as u64,
            count: submesh.indices.len() as u32,
        });
        match format {
            IndexFormat::Uint16 => {
                let narrow: Vec<u16> = submesh.indices.iter().map(|&i| i as u16).collect();
                bytes.extend_from_slice(bytemuck::cast_slice(&narrow));
            }
            IndexFormat::Uint32 => bytes.extend_from_slice(bytemuck::cast_slice(&submesh.indices)),
        }
    }

    PackedIndices {
        format,
        bytes,
        ranges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{MeshVertex, SubMeshData};

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn sample_mesh() -> MeshData {
        MeshData::new(
            vec![
                MeshVertex::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0]),
                MeshVertex::new([4.0, 5.0, 6.0], [1.0, 0.0, 0.0]),
                MeshVertex::new([7.0, 8.0, 9.0], [0.0, 0.0, 1.0]),
            ],
            vec![
                SubMeshData::new("a", vec![0, 1, 2]),
                SubMeshData::new("b", vec![2, 1, 0, 0, 1, 2]),
            ],
            true,
        )
    }

    #[test]
    fn layouts_match_shader_inputs() {
        let unlit = VertexLayout::for_lighting(false);
        assert_eq!(unlit.stride(), 12);
        assert_eq!(unlit.attributes().len(), 1);
        assert!(!unlit.has(VertexSemantic::Normal));

        let lit = VertexLayout::for_lighting(true);
        assert_eq!(lit.stride(), 24);
        assert_eq!(
            lit.attributes()[1],
            VertexAttribute {
                semantic: VertexSemantic::Normal,
                format: VertexFormat::Float32x3,
                offset: 12,
                shader_location: 1,
            }
        );
    }

    #[test]
    fn vertices_are_interleaved_per_layout() {
        let mesh = sample_mesh();
        let lit = pack_vertices(&mesh, &VertexLayout::position_normal());
        assert_eq!(lit.len(), 3 * 24);
        assert_eq!(floats(&lit)[..6], [1.0, 2.0, 3.0, 0.0, 1.0, 0.0]);

        let unlit = pack_vertices(&mesh, &VertexLayout::position_only());
        assert_eq!(
            floats(&unlit),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
    }

    #[test]
    fn small_meshes_use_sixteen_bit_indices_with_offsets() {
        let packed = pack_indices(&sample_mesh());
        assert_eq!(packed.format, IndexFormat::Uint16);
        assert_eq!(packed.bytes.len(), 9 * 2);
        assert_eq!(
            packed.ranges,
            vec![
                IndexRange {
                    byte_offset: 0,
                    count: 3
                },
                IndexRange {
                    byte_offset: 6,
                    count: 6
                },
            ]
        );
    }

    #[test]
    fn large_meshes_fall_back_to_thirty_two_bit_indices() {
        let mut mesh = sample_mesh();
        mesh.vertices.resize(70_000, MeshVertex::default());
        mesh.submeshes[1].indices[0] = 69_999;
        let packed = pack_indices(&mesh);
        assert_eq!(packed.format, IndexFormat::Uint32);
        assert_eq!(packed.ranges[1].byte_offset, 12);
    }
}
