pub mod assemble;
pub mod polygons;
pub mod rooms;

use tracing::info;

use crate::config::LevelSettings;
use crate::error::Result;
use crate::geometry::flatten;
use crate::types::{LevelRecords, MeshNode};

pub use assemble::assemble;
pub use polygons::{CompiledPolygons, compile_polygons};
pub use rooms::{Bucketing, CellCounters, bucket_polygons, cell_coords};

/// Turn a scene snapshot into the three level records.
///
/// The snapshot is left untouched; flattening happens on a private copy.
pub fn build_level(
    scene: &MeshNode,
    settings: &LevelSettings,
    timestamp: i32,
) -> Result<LevelRecords> {
    let mut world = scene.clone();
    flatten(&mut world);

    let compiled = compile_polygons(&world, settings)?;
    info!(
        polygons = compiled.polygons.len(),
        textures = compiled.textures.len(),
        "Compiled scene polygons"
    );

    assemble(compiled, settings, timestamp)
}
