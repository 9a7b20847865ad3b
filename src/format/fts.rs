//! `fast.fts`: background geometry, cell grid, anchors and rooms.
//!
//! Layout: a 280-byte primary header plus 768 bytes per unique header
//! (uncompressed), followed by the body, which the compiler compresses.

use crate::error::{LevelCompilerError, Result};
use crate::format::LevelFormat;
use crate::format::writer::BinaryWriter;
use crate::level::rooms::cell_coords;
use crate::types::level::{
    Anchor, FtsRecord, MAP_DEPTH_IN_CELLS, MAP_WIDTH_IN_CELLS, Polygon, Room, RoomDistance,
    TextureContainer,
};

pub const FTS_VERSION: f32 = 0.141;
pub const PRIMARY_HEADER_SIZE: usize = 280;
pub const UNIQUE_HEADER_SIZE: usize = 768;
pub const SCENE_HEADER_SIZE: usize = 56;
pub const TEXTURE_SIZE: usize = 264;
pub const CELL_INFO_SIZE: usize = 8;
pub const POLYGON_SIZE: usize = 172;
pub const ROOM_SIZE: usize = 32;
pub const ROOM_POLYGON_SIZE: usize = 8;
pub const ROOM_DISTANCE_SIZE: usize = 28;

const PATH_LEN: usize = 256;
const CHECK_LEN: usize = 512;
const COUNT_OFFSET: usize = 256;
const BODY_SIZE_OFFSET: usize = 264;
const TEXTURE_DIR: &str = "GRAPH\\OBJ3D\\TEXTURES\\";

/// Level directory written into the primary header.
pub fn level_path(level_idx: u32) -> String {
    format!("C:\\ARX\\Game\\Graph\\Levels\\level{level_idx}\\")
}

/// Header length of an encoded FTS buffer: `280 + 768 × unique headers`.
pub fn header_size(raw: &[u8]) -> Result<usize> {
    let field = raw
        .get(COUNT_OFFSET..COUNT_OFFSET + 4)
        .ok_or(LevelCompilerError::HeaderMismatch {
            format: LevelFormat::Fts,
            header_len: PRIMARY_HEADER_SIZE,
            available: raw.len(),
        })?;
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(field);

    let count = usize::try_from(i32::from_le_bytes(bytes)).map_err(|_| {
        LevelCompilerError::Encoding("negative unique header count in FTS header".into())
    })?;
    Ok(PRIMARY_HEADER_SIZE + UNIQUE_HEADER_SIZE * count)
}

pub fn encode(record: &FtsRecord) -> Result<Vec<u8>> {
    validate(record)?;
    let cells = distribute_polygons(&record.polygons)?;

    let mut w = BinaryWriter::with_capacity(
        PRIMARY_HEADER_SIZE
            + SCENE_HEADER_SIZE
            + record.cells.len() * CELL_INFO_SIZE
            + record.polygons.len() * (POLYGON_SIZE + ROOM_POLYGON_SIZE),
    );

    w.write_fixed_str(&level_path(record.level_idx), PATH_LEN)?;
    w.write_count("unique header", record.unique_headers.len())?;
    w.write_f32(FTS_VERSION);
    w.write_i32(0);
    w.write_zeros(3 * 4);
    for unique in &record.unique_headers {
        w.write_fixed_str(&unique.path, PATH_LEN)?;
        w.write_fixed_bytes(&unique.check, CHECK_LEN)?;
    }
    let header_len = w.len();

    w.write_f32(FTS_VERSION);
    w.write_count("cell column", MAP_WIDTH_IN_CELLS)?;
    w.write_count("cell row", MAP_DEPTH_IN_CELLS)?;
    w.write_count("texture", record.textures.len())?;
    w.write_count("polygon", record.polygons.len())?;
    w.write_count("anchor", record.anchors.len())?;
    w.write_vec3(record.player_position);
    w.write_vec3(record.scene_position);
    w.write_i32(0);
    w.write_count("room", record.rooms.len() - 1)?;

    for texture in &record.textures {
        write_texture(&mut w, texture)?;
    }

    for (cell, polygons) in record.cells.iter().zip(&cells) {
        w.write_count("cell polygon", polygons.len())?;
        w.write_count("cell anchor", cell.anchors.len())?;
        for polygon in polygons {
            write_polygon(&mut w, polygon);
        }
        for &anchor in &cell.anchors {
            w.write_i32(anchor);
        }
    }

    for anchor in &record.anchors {
        write_anchor(&mut w, anchor)?;
    }

    for room in &record.rooms {
        write_room(&mut w, room)?;
    }

    for distance in &record.room_distances {
        write_room_distance(&mut w, distance);
    }

    let body_len = w.len() - header_len;
    let body_len = i32::try_from(body_len).map_err(|_| {
        LevelCompilerError::Encoding(format!("FTS body of {body_len} bytes is too large"))
    })?;
    w.patch_i32(BODY_SIZE_OFFSET, body_len)?;

    Ok(w.into_bytes())
}

fn validate(record: &FtsRecord) -> Result<()> {
    let expected_cells = MAP_WIDTH_IN_CELLS * MAP_DEPTH_IN_CELLS;
    if record.cells.len() != expected_cells {
        return Err(LevelCompilerError::Encoding(format!(
            "FTS needs {expected_cells} cells, got {}",
            record.cells.len()
        )));
    }
    if record.rooms.is_empty() {
        return Err(LevelCompilerError::Encoding(
            "FTS needs at least the sentinel room".into(),
        ));
    }
    let expected_distances = record.rooms.len() * record.rooms.len();
    if record.room_distances.len() != expected_distances {
        return Err(LevelCompilerError::Encoding(format!(
            "{} rooms need {expected_distances} room distances, got {}",
            record.rooms.len(),
            record.room_distances.len()
        )));
    }
    Ok(())
}

/// Group polygons by grid cell, keeping input order within each cell.
fn distribute_polygons(polygons: &[Polygon]) -> Result<Vec<Vec<&Polygon>>> {
    let mut cells = vec![Vec::new(); MAP_WIDTH_IN_CELLS * MAP_DEPTH_IN_CELLS];
    for (i, polygon) in polygons.iter().enumerate() {
        let cell = cell_coords(polygon);
        let idx = cell.grid_index().ok_or_else(|| {
            LevelCompilerError::OutOfBounds(format!(
                "polygon {i} lies in cell ({}, {}), outside the map",
                cell.x, cell.y
            ))
        })?;
        cells[idx].push(polygon);
    }
    Ok(cells)
}

fn write_texture(w: &mut BinaryWriter, texture: &TextureContainer) -> Result<()> {
    w.write_i32(texture.id);
    w.write_i32(0);
    w.write_fixed_str(&format!("{TEXTURE_DIR}{}", texture.filename), PATH_LEN)
}

fn write_polygon(w: &mut BinaryWriter, polygon: &Polygon) {
    for v in &polygon.vertices {
        w.write_f32(v.y);
        w.write_f32(v.x);
        w.write_f32(v.z);
        w.write_f32(v.u);
        w.write_f32(v.v);
    }
    w.write_i32(polygon.texture_container_id);
    w.write_vec3(polygon.norm);
    w.write_vec3(polygon.norm2);

    // per-vertex normals: the last corner belongs to the second triangle of a quad
    for i in 0..4 {
        let normal = if i == 3 && polygon.is_quad() {
            polygon.norm2
        } else {
            polygon.norm
        };
        w.write_vec3(normal);
    }

    w.write_f32(polygon.transval);
    w.write_f32(polygon.area);
    w.write_u32(polygon.flags.bits());
    w.write_i16(polygon.room);
    w.write_i16(0);
}

fn write_anchor(w: &mut BinaryWriter, anchor: &Anchor) -> Result<()> {
    w.write_vec3(anchor.position);
    w.write_f32(anchor.radius);
    w.write_f32(anchor.height);
    let linked = i16::try_from(anchor.linked_anchors.len()).map_err(|_| {
        LevelCompilerError::Encoding(format!(
            "anchor links {} anchors, more than fit in 16 bits",
            anchor.linked_anchors.len()
        ))
    })?;
    w.write_i16(linked);
    w.write_i16(anchor.flags);
    for &link in &anchor.linked_anchors {
        w.write_i32(link);
    }
    Ok(())
}

fn write_room(w: &mut BinaryWriter, room: &Room) -> Result<()> {
    w.write_count("room portal", room.portals.len())?;
    w.write_count("room polygon", room.polygons.len())?;
    w.write_zeros(6 * 4);
    for &portal in &room.portals {
        w.write_i32(portal);
    }
    for membership in &room.polygons {
        w.write_i16(membership.cell_x);
        w.write_i16(membership.cell_y);
        w.write_i16(membership.polygon_idx);
        w.write_i16(0);
    }
    Ok(())
}

fn write_room_distance(w: &mut BinaryWriter, distance: &RoomDistance) {
    w.write_f32(distance.distance);
    w.write_vec3(distance.start_position);
    w.write_vec3(distance.end_position);
}
