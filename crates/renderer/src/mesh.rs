//! GPU-resident mesh: one interleaved vertex buffer, one index buffer, and
//! the per-sub-mesh draw records.

use asset::{MeshData, VertexLayout, pack_indices, pack_vertices};
use corelib::{PrimitiveTopology, SetupError, SetupResult, SubmeshDraw};
use wgpu::{Buffer, BufferUsages, Device, util::DeviceExt};

pub struct GpuMesh {
    vertex_buffers: Vec<Buffer>,
    index_buffer: Buffer,
    draws: Vec<SubmeshDraw>,
    names: Vec<String>,
}

impl GpuMesh {
    /// Packs `mesh` per `layout` and uploads it once.
    pub fn upload(
        device: &Device,
        id: &str,
        mesh: &MeshData,
        layout: &VertexLayout,
    ) -> SetupResult<Self> {
        if !mesh.is_valid() {
            return Err(SetupError::Asset {
                id: id.to_string(),
                message: "mesh has no drawable sub-meshes".into(),
            });
        }

        let vertex_bytes = pack_vertices(mesh, layout);
        let indices = pack_indices(mesh);

        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh VB"),
            contents: &vertex_bytes,
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh IB"),
            contents: &indices.bytes,
            usage: BufferUsages::INDEX,
        });

        let draws: Vec<SubmeshDraw> = indices
            .ranges
            .iter()
            .map(|range| SubmeshDraw {
                vertex_buffer: 0,
                vertex_offset: 0,
                index_count: range.count,
                topology: PrimitiveTopology::TriangleList,
                index_format: indices.format,
                index_offset: range.byte_offset,
            })
            .collect();
        let names = mesh.submeshes.iter().map(|s| s.name.clone()).collect();

        log::info!(
            "Uploaded mesh '{}': {} vertex bytes (stride {}), {} index bytes ({:?}), {} sub-meshes",
            id,
            vertex_bytes.len(),
            layout.stride(),
            indices.bytes.len(),
            indices.format,
            draws.len()
        );

        Ok(Self {
            vertex_buffers: vec![vertex_buf],
            index_buffer,
            draws,
            names,
        })
    }

    /// Draw records in load order.
    pub fn draws(&self) -> &[SubmeshDraw] {
        &self.draws
    }

    pub fn submesh_names(&self) -> &[String] {
        &self.names
    }

    pub fn vertex_buffer(&self, index: usize) -> Option<&Buffer> {
        self.vertex_buffers.get(index)
    }

    pub fn index_buffer(&self) -> &Buffer {
        &self.index_buffer
    }

    /// Releases GPU memory now instead of waiting for drop.
    pub fn destroy(&self) {
        for buf in &self.vertex_buffers {
            buf.destroy();
        }
        self.index_buffer.destroy();
    }
}
