//! Asset loading: OBJ meshes with grouped sub-meshes, vertex layouts and
//! packing into GPU-ready byte blobs.

pub mod layout;
pub mod mesh;
pub mod obj;
pub mod store;

pub use layout::{
    IndexRange, PackedIndices, VertexAttribute, VertexFormat, VertexLayout, VertexSemantic,
    pack_indices, pack_vertices,
};
pub use mesh::{MeshData, MeshVertex, SubMeshData};
pub use store::AssetStore;
