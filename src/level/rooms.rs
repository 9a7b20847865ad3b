use std::collections::HashMap;

use glam::Vec3;

use crate::error::{LevelCompilerError, Result};
use crate::types::level::{CELL_SIZE, RoomDistance};
use crate::types::{CellCoord, Polygon, Room, RoomPolygon};

/// Rooms written per level: an empty sentinel room 0 and room 1, which
/// holds every background polygon.
pub const ROOM_COUNT: usize = 2;
/// Room id carried by every compiled polygon.
pub const POLYGON_ROOM: i16 = 1;

/// Running number of polygons already placed in each cell.
pub type CellCounters = HashMap<CellCoord, usize>;

/// Output of one bucketing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucketing {
    /// One membership per input polygon, in input order.
    pub memberships: Vec<RoomPolygon>,
    /// Counters after the pass; feed them back in to continue numbering.
    pub counters: CellCounters,
}

/// Grid cell of a polygon: the mean X and Z of its used corners, divided by
/// the cell size and floored.
pub fn cell_coords(polygon: &Polygon) -> CellCoord {
    let used = &polygon.vertices[..polygon.vertex_count()];
    let n = used.len() as f32;
    let x = used.iter().map(|v| v.x).sum::<f32>() / n;
    let z = used.iter().map(|v| v.z).sum::<f32>() / n;

    CellCoord::new(
        (x / CELL_SIZE).floor() as i32,
        (z / CELL_SIZE).floor() as i32,
    )
}

/// Assign every polygon a `(cell_x, cell_y, index)` membership.
///
/// The index is the number of polygons that reached the same cell earlier
/// in this pass (or in the passes that produced `counters`), so it matches
/// the polygon's position within its cell. Reordering the input changes
/// the indices.
pub fn bucket_polygons(polygons: &[Polygon], mut counters: CellCounters) -> Result<Bucketing> {
    let mut memberships = Vec::with_capacity(polygons.len());

    for polygon in polygons {
        let cell = cell_coords(polygon);
        let count = counters.entry(cell).or_insert(0);

        let out_of_range =
            || LevelCompilerError::OutOfBounds(format!("cell ({}, {}) membership", cell.x, cell.y));
        memberships.push(RoomPolygon {
            cell_x: i16::try_from(cell.x).map_err(|_| out_of_range())?,
            cell_y: i16::try_from(cell.y).map_err(|_| out_of_range())?,
            polygon_idx: i16::try_from(*count).map_err(|_| out_of_range())?,
        });
        *count += 1;
    }

    Ok(Bucketing {
        memberships,
        counters,
    })
}

/// Room table for a level: sentinel room 0, then room 1 with every polygon.
pub fn build_rooms(polygons: &[Polygon]) -> Result<Vec<Room>> {
    let mut rooms = vec![Room::default(); ROOM_COUNT];
    rooms[POLYGON_ROOM as usize].polygons =
        bucket_polygons(polygons, CellCounters::new())?.memberships;
    Ok(rooms)
}

/// Distance table between every pair of the `ROOM_COUNT` rooms.
///
/// Values are the defaults the engine's own editor writes for a two-room level;
/// a distance of -1 marks the pair as unconnected.
pub fn default_room_distances() -> Vec<RoomDistance> {
    let entry = |start: Vec3, end: Vec3| RoomDistance {
        distance: -1.0,
        start_position: start,
        end_position: end,
    };

    vec![
        entry(Vec3::ZERO, Vec3::X),
        entry(Vec3::ZERO, Vec3::Y),
        entry(Vec3::new(0.984_375, 0.984_375, 0.0), Vec3::ZERO),
        entry(Vec3::ZERO, Vec3::ZERO),
    ]
}
