use bitflags::bitflags;
use glam::Vec3;

/// Width of the engine's background grid, in cells.
pub const MAP_WIDTH_IN_CELLS: usize = 160;
/// Depth of the engine's background grid, in cells.
pub const MAP_DEPTH_IN_CELLS: usize = 160;
/// Edge length of one grid cell in engine units.
pub const CELL_SIZE: f32 = 100.0;

/// A polygon corner in engine space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub u: f32,
    pub v: f32,
}

impl Vertex {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

bitflags! {
    /// Background polygon type flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PolygonFlags: u32 {
        const NO_SHADOW = 1 << 0;
        const DOUBLE_SIDED = 1 << 1;
        const TRANSPARENT = 1 << 2;
        const WATER = 1 << 3;
        const GLOW = 1 << 4;
        const IGNORE = 1 << 5;
        const QUAD = 1 << 6;
        const TILED = 1 << 7;
        const METAL = 1 << 8;
        const HIDE = 1 << 9;
        const STONE = 1 << 10;
        const WOOD = 1 << 11;
        const GRAVEL = 1 << 12;
        const EARTH = 1 << 13;
        const NO_COLLISION = 1 << 14;
        const LAVA = 1 << 15;
        const CLIMB = 1 << 16;
        const FALL = 1 << 17;
        const NO_PATH = 1 << 18;
        const NO_DRAW = 1 << 19;
    }
}

/// One compiled background polygon.
///
/// The vertex tuple always has four slots; triangles leave the fourth unused
/// and do not carry `PolygonFlags::QUAD`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: [Vertex; 4],
    pub norm: Vec3,
    /// Normal of the quad's second triangle `(d, c, b)`; zero for triangles.
    pub norm2: Vec3,
    pub texture_container_id: i32,
    pub flags: PolygonFlags,
    pub transval: f32,
    pub area: f32,
    pub room: i16,
}

impl Polygon {
    pub fn is_quad(&self) -> bool {
        self.flags.contains(PolygonFlags::QUAD)
    }

    /// Number of vertex slots in use.
    pub fn vertex_count(&self) -> usize {
        if self.is_quad() { 4 } else { 3 }
    }
}

/// Integer coordinate of one grid cell. `y` runs along the world Z axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether the cell lies on the fixed-size map grid.
    pub fn is_inside_map(&self) -> bool {
        (0..MAP_WIDTH_IN_CELLS as i32).contains(&self.x)
            && (0..MAP_DEPTH_IN_CELLS as i32).contains(&self.y)
    }

    /// Row-major (z-major) index into the cell grid, `None` off the map.
    pub fn grid_index(&self) -> Option<usize> {
        self.is_inside_map()
            .then(|| self.y as usize * MAP_WIDTH_IN_CELLS + self.x as usize)
    }
}

/// Membership of one polygon in a room: the polygon is the
/// `polygon_idx`-th polygon stored in cell `(cell_x, cell_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomPolygon {
    pub cell_x: i16,
    pub cell_y: i16,
    pub polygon_idx: i16,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Room {
    pub portals: Vec<i32>,
    pub polygons: Vec<RoomPolygon>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomDistance {
    pub distance: f32,
    pub start_position: Vec3,
    pub end_position: Vec3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureContainer {
    pub id: i32,
    pub filename: String,
}

/// Extra data stored alongside an FTS file's primary header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueHeader {
    pub path: String,
    pub check: Vec<u8>,
}

/// Per-cell payload besides polygons, which are placed by the encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub anchors: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub position: Vec3,
    pub radius: f32,
    pub height: f32,
    pub linked_anchors: Vec<i32>,
    pub flags: i16,
}

/// Euler orientation as stored by the engine (pitch, yaw, roll).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Angle {
    pub a: f32,
    pub b: f32,
    pub g: f32,
}

/// RGBA colour, one per lit polygon vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
}

/// Geometry + spatial partition record (`fast.fts`).
#[derive(Debug, Clone, PartialEq)]
pub struct FtsRecord {
    pub level_idx: u32,
    pub unique_headers: Vec<UniqueHeader>,
    /// Absolute player position stored in the scene header.
    pub player_position: Vec3,
    /// World-origin offset of the scene.
    pub scene_position: Vec3,
    pub textures: Vec<TextureContainer>,
    /// `MAP_WIDTH_IN_CELLS × MAP_DEPTH_IN_CELLS` entries, z-major.
    pub cells: Vec<Cell>,
    pub anchors: Vec<Anchor>,
    pub rooms: Vec<Room>,
    /// `rooms.len()²` entries.
    pub room_distances: Vec<RoomDistance>,
    pub polygons: Vec<Polygon>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DlfHeader {
    pub last_user: String,
    pub time: i32,
    /// Player spawn, relative to the scene position.
    pub pos_edit: Vec3,
    pub angle_edit: Angle,
    pub number_of_background_polygons: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveObject {
    pub name: String,
    pub position: Vec3,
    pub orientation: Angle,
    pub identifier: i32,
    pub flags: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fog {
    pub position: Vec3,
    pub color: Vec3,
    pub size: f32,
    pub special: i32,
    pub scale: f32,
    pub direction: Vec3,
    pub orientation: Angle,
    pub speed: f32,
    pub rotate_speed: f32,
    pub to_live: i32,
    pub blend: i32,
    pub frequency: f32,
}

/// A point of a path or zone outline, relative to its owner's position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub position: Vec3,
    pub flag: i32,
    pub time: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub name: String,
    pub position: Vec3,
    pub points: Vec<PathPoint>,
}

/// A path with a height, optionally overriding ambience, colour and draw distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub name: String,
    pub position: Vec3,
    pub points: Vec<PathPoint>,
    pub height: i32,
    pub background_color: Option<Vec3>,
    pub draw_distance: Option<f32>,
    pub ambience: Option<String>,
    pub ambience_max_volume: Option<f32>,
}

/// Scene / object layout record (`levelN.dlf`).
#[derive(Debug, Clone, PartialEq)]
pub struct DlfRecord {
    pub header: DlfHeader,
    pub level_idx: u32,
    pub interactive_objects: Vec<InteractiveObject>,
    pub fogs: Vec<Fog>,
    pub paths: Vec<Path>,
    pub zones: Vec<Zone>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlfHeader {
    pub last_user: String,
    pub time: i32,
    pub number_of_background_polygons: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub fall_start: f32,
    pub fall_end: f32,
    pub intensity: f32,
    pub flags: i32,
}

/// Lighting record (`levelN.llf`).
#[derive(Debug, Clone, PartialEq)]
pub struct LlfRecord {
    pub header: LlfHeader,
    pub lights: Vec<Light>,
    /// One colour per used polygon vertex, in polygon order.
    pub colors: Vec<Color>,
}

/// The three records compiled from one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRecords {
    pub fts: FtsRecord,
    pub dlf: DlfRecord,
    pub llf: LlfRecord,
}
