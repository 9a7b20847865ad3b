use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{LevelCompilerError, Result};

/// Local translation / rotation / scale of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub translation: Vec3,
    /// Quaternion, serialized as `[x, y, z, w]`.
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Column-major 4×4 matrix equivalent (scale, then rotate, then translate).
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Raw buffers of a single mesh, as handed over by the scene.
///
/// Buffers are flat `Vec<f32>` / `Vec<u32>` like the GPU-side attributes
/// they were read from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshGeometry {
    /// Interleaved positions: [x, y, z, x, y, z, ...]
    pub positions: Vec<f32>,
    /// Interleaved UVs: [u, v, u, v, ...] or empty
    pub uvs: Vec<f32>,
    /// Triangle indices into the vertex buffers, `None` for non-indexed geometry
    pub indices: Option<Vec<u32>>,
    /// Texture file name, `None` to use the level's default texture
    pub texture: Option<String>,
}

impl MeshGeometry {
    /// Number of vertices (positions / 3).
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Whether UV coordinates are present.
    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Whether the mesh contains no geometry.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of the vertex at buffer index `idx`.
    pub fn position(&self, idx: usize) -> Option<Vec3> {
        self.positions
            .get(idx * 3..idx * 3 + 3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
    }

    /// Texture coordinate of the vertex at buffer index `idx`.
    ///
    /// Meshes without a UV attribute map every vertex to `(0, 0)`; a UV
    /// attribute shorter than the position buffer is malformed.
    pub fn uv(&self, idx: usize) -> Result<Vec2> {
        if !self.has_uvs() {
            return Ok(Vec2::ZERO);
        }
        self.uvs
            .get(idx * 2..idx * 2 + 2)
            .map(|uv| Vec2::new(uv[0], uv[1]))
            .ok_or_else(|| {
                LevelCompilerError::MalformedMesh(format!(
                    "UV attribute has {} entries, no coordinate for vertex {idx}",
                    self.uvs.len() / 2
                ))
            })
    }

    /// Transform every position in place.
    pub fn apply_matrix(&mut self, matrix: &Mat4) {
        for p in self.positions.chunks_exact_mut(3) {
            let v = matrix.transform_point3(Vec3::new(p[0], p[1], p[2]));
            p[0] = v.x;
            p[1] = v.y;
            p[2] = v.z;
        }
    }

    /// A single-segment `width × depth` plane lying in the XZ plane, facing +Y,
    /// centred on the origin.
    ///
    /// Vertex, UV and index layout match a 1×1 segment plane rotated -90°
    /// about X, which is what the editor places for floor tiles.
    pub fn ground_plane(width: f32, depth: f32, texture: Option<String>) -> Self {
        let hw = width * 0.5;
        let hd = depth * 0.5;
        Self {
            positions: vec![
                -hw, 0.0, -hd, //
                hw, 0.0, -hd, //
                -hw, 0.0, hd, //
                hw, 0.0, hd,
            ],
            uvs: vec![0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            indices: Some(vec![0, 2, 1, 2, 3, 1]),
            texture,
        }
    }
}

/// A node of the scene tree: owns its children, optionally carries geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshNode {
    pub name: Option<String>,
    pub transform: Transform,
    pub geometry: Option<MeshGeometry>,
    pub children: Vec<MeshNode>,
}

impl MeshNode {
    /// An empty group node with an identity transform.
    pub fn group(children: Vec<MeshNode>) -> Self {
        Self {
            children,
            ..Default::default()
        }
    }

    /// A leaf node carrying `geometry` at `transform`.
    pub fn mesh(geometry: MeshGeometry, transform: Transform) -> Self {
        Self {
            transform,
            geometry: Some(geometry),
            ..Default::default()
        }
    }

    /// Count total nodes in the subtree (including self).
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// All geometry in the subtree, depth-first pre-order.
    pub fn geometries(&self) -> Vec<&MeshGeometry> {
        let mut out = Vec::new();
        self.collect_geometries(&mut out);
        out
    }

    fn collect_geometries<'a>(&'a self, out: &mut Vec<&'a MeshGeometry>) {
        if let Some(geometry) = &self.geometry {
            out.push(geometry);
        }
        for child in &self.children {
            child.collect_geometries(out);
        }
    }
}
