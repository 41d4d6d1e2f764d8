//! Minimal OBJ parser supporting positions, normals and grouped sub-meshes.
//!
//! Texture coordinates are validated but not stored. Each `o`, `g` or
//! `usemtl` directive starts a new sub-mesh once the current one has
//! triangles; a file without grouping yields a single `default` sub-mesh.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result, anyhow};

use crate::mesh::{MeshData, MeshVertex, SubMeshData};

const DEFAULT_SUBMESH: &str = "default";

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<MeshData> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open OBJ file: {}", path.as_ref().display()))?;
    load_obj_from_reader(BufReader::new(file))
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<MeshData> {
    parse_obj(reader)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<MeshData> {
    parse_obj(io::Cursor::new(contents))
}

fn parse_obj<R: BufRead>(reader: R) -> Result<MeshData> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut texcoord_count = 0usize;

    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    struct Key(usize, Option<usize>);

    let mut unique: HashMap<Key, u32> = HashMap::new();
    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut submeshes: Vec<SubMeshData> = Vec::new();
    let mut current = SubMeshData::new(DEFAULT_SUBMESH, Vec::new());
    let mut all_normals = true;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let tag = parts
            .next()
            .ok_or_else(|| anyhow!("Malformed OBJ line {}: '{}'", line_no + 1, trimmed))?;

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                positions.push([x, y, z]);
            }
            "vt" => {
                parse_f32(parts.next(), line_no, "u coordinate")?;
                texcoord_count += 1;
            }
            "vn" => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                normals.push([nx, ny, nz]);
            }
            "o" | "g" | "usemtl" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                let name = if name.is_empty() {
                    DEFAULT_SUBMESH.to_string()
                } else {
                    name
                };
                if current.indices.is_empty() {
                    current.name = name;
                } else {
                    submeshes.push(std::mem::replace(
                        &mut current,
                        SubMeshData::new(name, Vec::new()),
                    ));
                }
            }
            "f" => {
                let mut face_indices: Vec<u32> = Vec::new();
                for part in parts {
                    let (vi, vni) = parse_face_vertex(
                        part,
                        positions.len(),
                        texcoord_count,
                        normals.len(),
                        line_no,
                    )?;
                    let key = Key(vi, vni);
                    let index = match unique.get(&key) {
                        Some(&idx) => idx,
                        None => {
                            let position = positions[vi];
                            let normal = match vni {
                                Some(i) => normals[i],
                                None => {
                                    all_normals = false;
                                    [0.0, 0.0, 0.0]
                                }
                            };

                            let idx = u32::try_from(vertices.len())
                                .map_err(|_| anyhow!("Too many vertices in OBJ (>{})", u32::MAX))?;
                            vertices.push(MeshVertex::new(position, normal));
                            unique.insert(key, idx);
                            idx
                        }
                    };
                    face_indices.push(index);
                }

                if face_indices.len() < 3 {
                    log::warn!(
                        "Skipping degenerate face with {} vertices on line {}",
                        face_indices.len(),
                        line_no + 1
                    );
                    continue;
                }
                // Triangulate fan
                for tri in 1..(face_indices.len() - 1) {
                    current.indices.push(face_indices[0]);
                    current.indices.push(face_indices[tri]);
                    current.indices.push(face_indices[tri + 1]);
                }
            }
            _ => {
                // Ignore other directives (s/mtllib/l/etc.)
            }
        }
    }

    if !current.indices.is_empty() {
        submeshes.push(current);
    }

    if vertices.is_empty() || submeshes.is_empty() {
        anyhow::bail!("OBJ contained no triangles");
    }

    Ok(MeshData::new(vertices, submeshes, all_normals))
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &str) -> Result<f32> {
    let token = value.ok_or_else(|| anyhow!("Missing {} on line {}", what, line_no + 1))?;
    token
        .parse::<f32>()
        .with_context(|| format!("Failed to parse {} on line {}", what, line_no + 1))
}

/// Resolves `v`, `v/vt`, `v//vn` or `v/vt/vn` into (position, normal) indices.
fn parse_face_vertex(
    token: &str,
    pos_count: usize,
    tex_count: usize,
    norm_count: usize,
    line_no: usize,
) -> Result<(usize, Option<usize>)> {
    let mut split = token.split('/');
    let pos = split
        .next()
        .ok_or_else(|| anyhow!("Malformed face element '{}' on line {}", token, line_no + 1))?;
    let pos_idx = resolve_index(pos, pos_count, line_no)?;

    if let Some(value) = split.next().filter(|v| !v.is_empty()) {
        resolve_index(value, tex_count, line_no)?;
    }

    let norm_idx = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, norm_count, line_no)?),
        _ => None,
    };

    Ok((pos_idx, norm_idx))
}

fn resolve_index(token: &str, len: usize, line_no: usize) -> Result<usize> {
    let raw = token
        .parse::<i32>()
        .with_context(|| format!("Invalid index '{}' on line {}", token, line_no + 1))?;
    if raw == 0 {
        anyhow::bail!("OBJ indices are 1-based; found 0 on line {}", line_no + 1);
    }

    let idx = if raw > 0 {
        (raw - 1) as isize
    } else {
        (len as isize) + (raw as isize)
    };

    if idx < 0 || idx as usize >= len {
        anyhow::bail!(
            "OBJ index {} resolved out of bounds (len={}) on line {}",
            raw,
            len,
            line_no + 1
        );
    }

    Ok(idx as usize)
}
