//! Per-mesh geometry passes: hierarchy flattening, vertex expansion,
//! UV wrapping and face normals.

pub mod extract;
pub mod flatten;
pub mod normals;
pub mod uv;

pub use extract::{GeometryVertex, non_indexed_vertices};
pub use flatten::flatten;
pub use normals::{face_normals, polygon_area};
pub use uv::{flip_uv_vertically, normalize_uv};
