//! CPU-side mesh representation used by loaders.

use corelib::Vec3;

/// Vertex with position/normal. Values are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// One indexed triangle list referencing the shared vertex list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubMeshData {
    pub name: String,
    pub indices: Vec<u32>,
}

impl SubMeshData {
    pub fn new(name: impl Into<String>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            indices,
        }
    }
}

/// Shared vertices plus one or more sub-meshes, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub submeshes: Vec<SubMeshData>,
    /// Every vertex came with an authored normal.
    pub has_normals: bool,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, submeshes: Vec<SubMeshData>, has_normals: bool) -> Self {
        Self {
            vertices,
            submeshes,
            has_normals,
        }
    }

    /// Returns `true` if there are vertices and every sub-mesh has triangles.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty()
            && !self.submeshes.is_empty()
            && self
                .submeshes
                .iter()
                .all(|s| !s.indices.is_empty() && s.indices.len() % 3 == 0)
    }

    pub fn index_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.indices.len()).sum()
    }

    pub fn max_index(&self) -> Option<u32> {
        self.submeshes
            .iter()
            .flat_map(|s| s.indices.iter().copied())
            .max()
    }

    /// Replaces all normals with smooth, area-weighted vertex normals.
    pub fn generate_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.submeshes.iter().flat_map(|s| s.indices.chunks_exact(3)) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = Vec3::from(self.vertices[a].position);
            let pb = Vec3::from(self.vertices[b].position);
            let pc = Vec3::from(self.vertices[c].position);
            // Unnormalized cross product weights by triangle area.
            let n = (pb - pa).cross(pc - pa);
            accum[a] += n;
            accum[b] += n;
            accum[c] += n;
        }
        for (vertex, n) in self.vertices.iter_mut().zip(accum) {
            vertex.normal = n.normalize_or(Vec3::Z).to_array();
        }
        self.has_normals = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_data_validity() {
        let data = MeshData::new(
            vec![MeshVertex::default(); 3],
            vec![SubMeshData::new("default", vec![0, 1, 2])],
            false,
        );
        assert!(data.is_valid());
        assert_eq!(data.index_count(), 3);
        assert_eq!(data.max_index(), Some(2));

        let empty_submesh = MeshData::new(
            vec![MeshVertex::default()],
            vec![SubMeshData::new("a", vec![])],
            false,
        );
        assert!(!empty_submesh.is_valid());
    }

    #[test]
    fn generated_normals_face_out_of_ccw_triangle() {
        let mut data = MeshData::new(
            vec![
                MeshVertex::new([0.0, 0.0, 0.0], [0.0; 3]),
                MeshVertex::new([1.0, 0.0, 0.0], [0.0; 3]),
                MeshVertex::new([0.0, 1.0, 0.0], [0.0; 3]),
                MeshVertex::new([5.0, 5.0, 5.0], [0.0; 3]),
            ],
            vec![SubMeshData::new("default", vec![0, 1, 2])],
            false,
        );
        data.generate_normals();
        assert!(data.has_normals);
        for v in &data.vertices[..3] {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
        // Unreferenced vertex falls back to +Z instead of NaN.
        assert_eq!(data.vertices[3].normal, [0.0, 0.0, 1.0]);
    }
}
