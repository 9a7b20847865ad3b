use glam::Vec3;

/// Unit face normal of triangle `(a, b, c)`: `(c - b) × (a - b)`, normalized.
///
/// Degenerate triangles yield the zero vector.
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let n = (c - b).cross(a - b);
    let length_sq = n.length_squared();
    if length_sq > 0.0 {
        n / length_sq.sqrt()
    } else {
        Vec3::ZERO
    }
}

/// Area of triangle `(a, b, c)`.
pub fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (c - b).cross(a - b).length() * 0.5
}

/// Primary and secondary normals of a polygon.
///
/// The primary normal comes from `(a, b, c)`. A quad's second triangle is
/// wound `(d, c, b)` so that both normals of a planar quad agree; triangles
/// get a zero secondary normal.
pub fn face_normals(corners: [Vec3; 4], is_quad: bool) -> (Vec3, Vec3) {
    let [a, b, c, d] = corners;
    let norm = triangle_normal(a, b, c);
    let norm2 = if is_quad {
        triangle_normal(d, c, b)
    } else {
        Vec3::ZERO
    };
    (norm, norm2)
}

/// Surface area of a polygon: `(a, b, c)` plus `(d, c, b)` for quads.
pub fn polygon_area(corners: [Vec3; 4], is_quad: bool) -> f32 {
    let [a, b, c, d] = corners;
    let first = triangle_area(a, b, c);
    if is_quad {
        first + triangle_area(d, c, b)
    } else {
        first
    }
}
