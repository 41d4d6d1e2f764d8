//! Resolves mesh identifiers against an asset directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::layout::{VertexLayout, VertexSemantic};
use crate::mesh::MeshData;
use crate::obj::load_obj_from_path;

const MESH_EXTENSION: &str = "obj";

/// Directory of mesh files addressed by identifier (`cube` → `<root>/cube.obj`).
#[derive(Clone, Debug)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the mesh file for `id`. An explicit `.obj` suffix is accepted.
    pub fn resolve(&self, id: &str) -> Result<PathBuf> {
        anyhow::ensure!(!id.trim().is_empty(), "empty asset identifier");
        let mut path = self.root.join(id);
        if path.extension().and_then(|e| e.to_str()) != Some(MESH_EXTENSION) {
            path.set_extension(MESH_EXTENSION);
        }
        anyhow::ensure!(
            path.is_file(),
            "asset '{}' not found at {}",
            id,
            path.display()
        );
        Ok(path)
    }

    /// Loads the mesh for `id` with the attributes `layout` needs.
    ///
    /// Normals are generated when the layout wants them and the file does not
    /// provide them.
    pub fn load_mesh(&self, id: &str, layout: &VertexLayout) -> Result<MeshData> {
        let path = self.resolve(id)?;
        log::info!("Loading mesh '{}' from {}", id, path.display());

        let mut mesh = load_obj_from_path(&path)
            .with_context(|| format!("Failed to parse mesh '{}'", id))?;

        if layout.has(VertexSemantic::Normal) && !mesh.has_normals {
            log::info!("Mesh '{}' has no normals; generating smooth normals", id);
            mesh.generate_normals();
        }

        log::info!(
            "Loaded mesh '{}': {} vertices, {} sub-meshes, {} indices",
            id,
            mesh.vertices.len(),
            mesh.submeshes.len(),
            mesh.index_count()
        );
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_store(name: &str, contents: &str) -> AssetStore {
        let dir = std::env::temp_dir().join(format!(
            "spinmesh-asset-test-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{name}.obj")), contents).unwrap();
        AssetStore::new(dir)
    }

    #[test]
    fn resolves_with_or_without_extension() {
        let store = temp_store("tri", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let a = store.resolve("tri").unwrap();
        let b = store.resolve("tri.obj").unwrap();
        assert_eq!(a, b);
        assert!(store.resolve("").is_err());
    }

    #[test]
    fn missing_asset_is_an_error() {
        let store = AssetStore::new(std::env::temp_dir().join("spinmesh-no-such-dir"));
        let err = store
            .load_mesh("teapot", &VertexLayout::position_only())
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn lit_layout_generates_missing_normals() {
        let store = temp_store("flat", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let unlit = store
            .load_mesh("flat", &VertexLayout::position_only())
            .unwrap();
        assert!(!unlit.has_normals);

        let lit = store
            .load_mesh("flat", &VertexLayout::position_normal())
            .unwrap();
        assert!(lit.has_normals);
        assert_eq!(lit.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn bundled_cube_has_two_groups() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets");
        let mesh = AssetStore::new(root)
            .load_mesh("cube", &VertexLayout::position_normal())
            .unwrap();
        let names: Vec<_> = mesh.submeshes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["sides", "caps"]);
        assert_eq!(mesh.submeshes[0].indices.len(), 24);
        assert_eq!(mesh.submeshes[1].indices.len(), 12);
        assert_eq!(mesh.vertices.len(), 24);
        assert!(mesh.has_normals);
    }
}
