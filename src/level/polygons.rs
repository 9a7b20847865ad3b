use tracing::debug;

use crate::config::LevelSettings;
use crate::error::{LevelCompilerError, Result};
use crate::geometry::{
    GeometryVertex, face_normals, flip_uv_vertically, non_indexed_vertices, normalize_uv,
    polygon_area,
};
use crate::level::rooms::POLYGON_ROOM;
use crate::types::{MeshGeometry, MeshNode, Polygon, PolygonFlags, TextureContainer, Vertex};

/// Expanded vertices per quad: two triangles sharing an edge.
const VERTICES_PER_QUAD: usize = 6;

/// Polygons of a scene plus the texture containers they reference.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPolygons {
    pub polygons: Vec<Polygon>,
    pub textures: Vec<TextureContainer>,
}

/// Assigns container ids to texture names in first-use order, starting at 1.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    containers: Vec<TextureContainer>,
}

impl TextureRegistry {
    pub fn id_for(&mut self, filename: &str) -> i32 {
        if let Some(existing) = self.containers.iter().find(|c| c.filename == filename) {
            return existing.id;
        }
        let id = self.containers.len() as i32 + 1;
        self.containers.push(TextureContainer {
            id,
            filename: filename.to_string(),
        });
        id
    }

    pub fn into_containers(self) -> Vec<TextureContainer> {
        self.containers
    }
}

/// Compile every mesh of an already flattened scene into engine quads.
///
/// Meshes are visited depth-first, pre-order; each mesh contributes one quad
/// per group of six expanded vertices.
pub fn compile_polygons(scene: &MeshNode, settings: &LevelSettings) -> Result<CompiledPolygons> {
    let mut polygons = Vec::new();
    let mut textures = TextureRegistry::default();

    for (i, geometry) in scene.geometries().into_iter().enumerate() {
        let before = polygons.len();
        compile_mesh(geometry, settings, &mut textures, &mut polygons)
            .map_err(|e| match e {
                LevelCompilerError::MalformedMesh(msg) => {
                    LevelCompilerError::MalformedMesh(format!("mesh {i}: {msg}"))
                }
                other => other,
            })?;
        debug!(mesh = i, polygons = polygons.len() - before, "Compiled mesh");
    }

    Ok(CompiledPolygons {
        polygons,
        textures: textures.into_containers(),
    })
}

fn compile_mesh(
    geometry: &MeshGeometry,
    settings: &LevelSettings,
    textures: &mut TextureRegistry,
    out: &mut Vec<Polygon>,
) -> Result<()> {
    let expanded = non_indexed_vertices(geometry)?;
    if expanded.is_empty() {
        return Ok(());
    }
    if expanded.len() % VERTICES_PER_QUAD != 0 {
        return Err(LevelCompilerError::MalformedMesh(format!(
            "expands to {} vertices, expected a multiple of {VERTICES_PER_QUAD} (two triangles per quad)",
            expanded.len()
        )));
    }

    let texture_name = geometry
        .texture
        .as_deref()
        .unwrap_or(&settings.default_texture);
    let texture_container_id = textures.id_for(texture_name);

    for (q, quad) in expanded.chunks_exact(VERTICES_PER_QUAD).enumerate() {
        if !shares_second_edge(quad) {
            return Err(LevelCompilerError::MalformedMesh(format!(
                "quad {q}: second triangle does not start on the b-c edge of the first, indices {:?}",
                quad.iter().map(|v| v.idx).collect::<Vec<_>>()
            )));
        }

        // [a, b, c, d, e, f] -> corners [a, b, c, e]
        let corners = [&quad[0], &quad[1], &quad[2], &quad[4]];
        let mut vertices = [Vertex::default(); 4];
        for (slot, corner) in vertices.iter_mut().zip(corners) {
            *slot = to_engine_vertex(corner, geometry, settings)?;
        }

        flip_uv_vertically(&mut vertices);
        normalize_uv(&mut vertices);

        let flags = PolygonFlags::QUAD;
        let positions = vertices.map(|v| v.position());
        let (norm, norm2) = face_normals(positions, true);

        out.push(Polygon {
            vertices,
            norm,
            norm2,
            texture_container_id,
            flags,
            transval: 0.0,
            area: polygon_area(positions, true),
            room: POLYGON_ROOM,
        });
    }

    Ok(())
}

/// Whether `[a, b, c, d, e, f]` triangulates a quad as `(a, b, c)` and
/// `(b, e, c)`: `d` must be `b` and `f` must be `c`.
///
/// Vertices match by buffer index, or by position for non-indexed meshes.
fn shares_second_edge(quad: &[GeometryVertex]) -> bool {
    let same =
        |i: usize, j: usize| quad[i].idx == quad[j].idx || quad[i].position == quad[j].position;
    same(3, 1) && same(5, 2)
}

/// Move a world-space vertex into engine space: shifted by the world offset,
/// with Y and Z mirrored.
fn to_engine_vertex(
    vertex: &GeometryVertex,
    geometry: &MeshGeometry,
    settings: &LevelSettings,
) -> Result<Vertex> {
    let uv = geometry.uv(vertex.idx)?;
    let offset = settings.world_offset;
    let precision = settings.vertex_precision;

    Ok(Vertex {
        x: offset.x + round_to_decimals(vertex.position.x, precision),
        y: offset.y - round_to_decimals(vertex.position.y, precision),
        z: offset.z - round_to_decimals(vertex.position.z, precision),
        u: uv.x,
        v: uv.y,
    })
}

/// Round to `decimals` decimal places (computed in f64).
pub fn round_to_decimals(value: f32, decimals: u32) -> f32 {
    let factor = 10f64.powi(decimals as i32);
    ((value as f64 * factor).round() / factor) as f32
}
