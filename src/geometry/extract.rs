use glam::Vec3;

use crate::error::{LevelCompilerError, Result};
use crate::types::MeshGeometry;

/// One entry of an expanded vertex sequence.
///
/// `idx` is the vertex's position in the original buffers and is used to
/// look up per-vertex attributes such as UVs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryVertex {
    pub idx: usize,
    pub position: Vec3,
}

/// Expand a mesh into its non-indexed vertex sequence.
///
/// Without an index buffer every buffer vertex is emitted once, in buffer
/// order. With one, every index entry is emitted in index order, so shared
/// vertices appear once per reference. Nothing is reordered or merged.
pub fn non_indexed_vertices(geometry: &MeshGeometry) -> Result<Vec<GeometryVertex>> {
    if geometry.positions.len() % 3 != 0 {
        return Err(LevelCompilerError::MalformedMesh(format!(
            "Position buffer length {} is not a multiple of 3",
            geometry.positions.len()
        )));
    }

    let vertex_count = geometry.vertex_count();

    match &geometry.indices {
        None => Ok(geometry
            .positions
            .chunks_exact(3)
            .enumerate()
            .map(|(idx, p)| GeometryVertex {
                idx,
                position: Vec3::new(p[0], p[1], p[2]),
            })
            .collect()),
        Some(indices) => indices
            .iter()
            .map(|&i| {
                let idx = i as usize;
                let position = geometry.position(idx).ok_or_else(|| {
                    LevelCompilerError::MalformedMesh(format!(
                        "Index {idx} out of range for {vertex_count} vertices"
                    ))
                })?;
                Ok(GeometryVertex { idx, position })
            })
            .collect(),
    }
}
