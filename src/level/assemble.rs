use tracing::debug;

use crate::config::LevelSettings;
use crate::error::{LevelCompilerError, Result};
use crate::level::polygons::CompiledPolygons;
use crate::level::rooms::{build_rooms, cell_coords, default_room_distances};
use crate::types::level::{
    Cell, Color, DlfHeader, DlfRecord, FtsRecord, LevelRecords, LlfHeader, LlfRecord,
    MAP_DEPTH_IN_CELLS, MAP_WIDTH_IN_CELLS,
};

/// Build the FTS, DLF and LLF records for one level.
///
/// `timestamp` (seconds since the Unix epoch) is stamped into the DLF and
/// LLF headers; passing it in keeps this a pure function of its inputs.
pub fn assemble(
    compiled: CompiledPolygons,
    settings: &LevelSettings,
    timestamp: i32,
) -> Result<LevelRecords> {
    let CompiledPolygons { polygons, textures } = compiled;

    for (i, polygon) in polygons.iter().enumerate() {
        let cell = cell_coords(polygon);
        if !cell.is_inside_map() {
            return Err(LevelCompilerError::OutOfBounds(format!(
                "polygon {i} lies in cell ({}, {}), outside the {MAP_WIDTH_IN_CELLS}×{MAP_DEPTH_IN_CELLS} map",
                cell.x, cell.y
            )));
        }
    }

    let polygon_count = polygons.len() as u32;
    let rooms = build_rooms(&polygons)?;

    let colors: Vec<Color> = polygons
        .iter()
        .flat_map(|p| std::iter::repeat_n(Color::WHITE, p.vertex_count()))
        .collect();

    debug!(
        polygons = polygon_count,
        textures = textures.len(),
        colors = colors.len(),
        "Assembled level records"
    );

    let fts = FtsRecord {
        level_idx: settings.level_idx,
        unique_headers: Vec::new(),
        player_position: settings.world_offset + settings.player_spawn,
        scene_position: settings.world_offset,
        textures,
        cells: vec![Cell::default(); MAP_WIDTH_IN_CELLS * MAP_DEPTH_IN_CELLS],
        anchors: Vec::new(),
        rooms,
        room_distances: default_room_distances(),
        polygons,
    };

    let dlf = DlfRecord {
        header: DlfHeader {
            last_user: settings.generator.clone(),
            time: timestamp,
            pos_edit: settings.player_spawn,
            angle_edit: settings.player_orientation,
            number_of_background_polygons: polygon_count,
        },
        level_idx: settings.level_idx,
        interactive_objects: Vec::new(),
        fogs: Vec::new(),
        paths: Vec::new(),
        zones: Vec::new(),
    };

    let llf = LlfRecord {
        header: LlfHeader {
            last_user: settings.generator.clone(),
            time: timestamp,
            number_of_background_polygons: polygon_count,
        },
        lights: Vec::new(),
        colors,
    };

    Ok(LevelRecords { fts, dlf, llf })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::polygons::compile_polygons;
    use crate::level::rooms::ROOM_COUNT;
    use crate::types::{MeshGeometry, MeshNode, Transform};
    use glam::Vec3;

    const NOW: i32 = 1_700_000_000;

    fn compiled(scene: &MeshNode, settings: &LevelSettings) -> CompiledPolygons {
        compile_polygons(scene, settings).unwrap()
    }

    fn single_plane() -> MeshNode {
        MeshNode::group(vec![MeshNode::mesh(
            MeshGeometry::ground_plane(100.0, 100.0, None),
            Transform::IDENTITY,
        )])
    }

    #[test]
    fn single_plane_records() {
        let settings = LevelSettings::default();
        let records = assemble(compiled(&single_plane(), &settings), &settings, NOW).unwrap();

        assert_eq!(records.fts.polygons.len(), 1);
        assert_eq!(records.fts.textures.len(), 1);
        assert_eq!(records.fts.rooms.len(), ROOM_COUNT);
        assert_eq!(records.fts.rooms[1].polygons.len(), 1);
        assert_eq!(records.fts.rooms[1].polygons[0].cell_x, 60);
        assert_eq!(records.fts.rooms[1].polygons[0].cell_y, 60);
        assert_eq!(records.fts.rooms[1].polygons[0].polygon_idx, 0);
        assert_eq!(records.fts.cells.len(), MAP_WIDTH_IN_CELLS * MAP_DEPTH_IN_CELLS);
        assert_eq!(records.fts.scene_position, Vec3::new(6000.0, 0.0, 6000.0));
        assert_eq!(records.fts.player_position, Vec3::new(6000.0, -180.0, 6000.0));

        assert_eq!(records.dlf.header.time, NOW);
        assert_eq!(records.dlf.header.number_of_background_polygons, 1);
        assert_eq!(records.dlf.header.pos_edit, Vec3::new(0.0, -180.0, 0.0));
        assert_eq!(records.dlf.header.last_user, settings.generator);
        assert!(records.dlf.interactive_objects.is_empty());

        assert_eq!(records.llf.header.time, NOW);
        assert_eq!(records.llf.colors, vec![Color::WHITE; 4]);
        assert!(records.llf.lights.is_empty());
    }

    #[test]
    fn empty_scene_records() {
        let settings = LevelSettings::default();
        let records = assemble(compiled(&MeshNode::default(), &settings), &settings, NOW).unwrap();

        assert!(records.fts.polygons.is_empty());
        assert!(records.fts.textures.is_empty());
        assert!(records.fts.cells.iter().all(|c| c.anchors.is_empty()));
        assert_eq!(records.fts.cells.len(), MAP_WIDTH_IN_CELLS * MAP_DEPTH_IN_CELLS);
        assert!(records.fts.rooms.iter().all(|r| r.polygons.is_empty()));
        assert_eq!(records.dlf.header.number_of_background_polygons, 0);
        assert!(records.llf.colors.is_empty());
    }

    #[test]
    fn polygon_outside_map_fails() {
        let settings = LevelSettings {
            world_offset: Vec3::new(-500.0, 0.0, 6000.0),
            ..Default::default()
        };
        let err = assemble(compiled(&single_plane(), &settings), &settings, NOW).unwrap_err();
        assert!(matches!(err, LevelCompilerError::OutOfBounds(_)));
    }

    #[test]
    fn shared_polygon_count() {
        let settings = LevelSettings::default();
        let scene = MeshNode::group(
            (0..3)
                .map(|i| {
                    MeshNode::mesh(
                        MeshGeometry::ground_plane(100.0, 100.0, None),
                        Transform::from_translation(Vec3::new(i as f32 * 100.0, 0.0, 0.0)),
                    )
                })
                .collect(),
        );
        let mut world = scene.clone();
        crate::geometry::flatten(&mut world);
        let records = assemble(compiled(&world, &settings), &settings, NOW).unwrap();

        assert_eq!(records.fts.polygons.len(), 3);
        assert_eq!(records.dlf.header.number_of_background_polygons, 3);
        assert_eq!(records.llf.header.number_of_background_polygons, 3);
        assert_eq!(records.llf.colors.len(), 12);
    }
}
