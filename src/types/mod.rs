pub mod level;
pub mod scene;

pub use level::{
    CellCoord, Color, DlfRecord, FtsRecord, LevelRecords, LlfRecord, Polygon, PolygonFlags, Room,
    RoomPolygon, TextureContainer, Vertex,
};
pub use scene::{MeshGeometry, MeshNode, Transform};
