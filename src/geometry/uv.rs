use crate::types::Vertex;

/// Negate `v` on all four corners: scene textures have V pointing up,
/// the engine's point down.
pub fn flip_uv_vertically(vertices: &mut [Vertex; 4]) {
    for vertex in vertices.iter_mut() {
        vertex.v = -vertex.v;
    }
}

/// Wrap the polygon's texture coordinates into `[0, 1]`.
///
/// Per axis, corners are visited in order:
/// - a negative whole number becomes 0 and marks the axis as corrected,
/// - any other negative value wraps to `1 + (value % 1)`,
/// - a value above 1 wraps to `value % 1`,
/// - a value inside `[0, 1]` becomes 1 if an earlier corner corrected the axis.
///
/// The last rule carries a clamped edge over to the opposite side of the
/// polygon. It only affects corners after the one that triggered it.
pub fn normalize_uv(vertices: &mut [Vertex; 4]) {
    let mut corrected_u = false;
    let mut corrected_v = false;

    for vertex in vertices.iter_mut() {
        vertex.u = normalize_component(vertex.u, &mut corrected_u);
        vertex.v = normalize_component(vertex.v, &mut corrected_v);
    }
}

fn normalize_component(value: f32, corrected: &mut bool) -> f32 {
    if value < 0.0 {
        if value % 1.0 == 0.0 {
            *corrected = true;
            0.0
        } else {
            1.0 + value % 1.0
        }
    } else if value > 1.0 {
        value % 1.0
    } else if *corrected {
        1.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(uvs: [(f32, f32); 4]) -> [Vertex; 4] {
        uvs.map(|(u, v)| Vertex {
            u,
            v,
            ..Default::default()
        })
    }

    fn uvs(vertices: &[Vertex; 4]) -> [(f32, f32); 4] {
        vertices.map(|v| (v.u, v.v))
    }

    #[test]
    fn flip_negates_v_only() {
        let mut vertices = quad([(0.25, 1.0), (1.0, 0.5), (0.0, 0.0), (2.0, -3.0)]);
        flip_uv_vertically(&mut vertices);
        assert_eq!(uvs(&vertices), [(0.25, -1.0), (1.0, -0.5), (0.0, -0.0), (2.0, 3.0)]);
    }

    #[test]
    fn in_range_values_untouched() {
        let mut vertices = quad([(0.0, 0.0), (0.5, 0.25), (1.0, 1.0), (0.75, 0.1)]);
        let before = uvs(&vertices);
        normalize_uv(&mut vertices);
        assert_eq!(uvs(&vertices), before);
    }

    #[test]
    fn negative_fraction_wraps() {
        let mut vertices = quad([(-0.25, -1.75), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0)]);
        normalize_uv(&mut vertices);
        assert!((vertices[0].u - 0.75).abs() < 1e-6);
        assert!((vertices[0].v - 0.25).abs() < 1e-6);
        // Wrapping does not mark the axis as corrected
        assert_eq!(vertices[1].u, 0.0);
        assert_eq!(vertices[1].v, 0.0);
    }

    #[test]
    fn above_one_wraps() {
        let mut vertices = quad([(1.5, 3.25), (2.0, 0.0), (0.0, 0.0), (0.0, 0.0)]);
        normalize_uv(&mut vertices);
        assert!((vertices[0].u - 0.5).abs() < 1e-6);
        assert!((vertices[0].v - 0.25).abs() < 1e-6);
        assert_eq!(vertices[1].u, 0.0);
    }

    #[test]
    fn negative_integer_clamps_and_propagates_forward() {
        let mut vertices = quad([(0.5, 0.5), (-1.0, 0.0), (0.0, 0.5), (0.25, 0.0)]);
        normalize_uv(&mut vertices);

        // Corner 0 precedes the correction and is left alone
        assert_eq!(vertices[0].u, 0.5);
        assert_eq!(vertices[1].u, 0.0);
        assert_eq!(vertices[2].u, 1.0);
        assert_eq!(vertices[3].u, 1.0);
        // The v axis is tracked independently
        assert_eq!(
            [vertices[0].v, vertices[1].v, vertices[2].v, vertices[3].v],
            [0.5, 0.0, 0.5, 0.0]
        );
    }

    #[test]
    fn flipped_unit_square() {
        // Corner UVs of the default ground plane, in polygon order
        let mut vertices = quad([(0.0, 1.0), (0.0, 0.0), (1.0, 1.0), (1.0, 0.0)]);
        flip_uv_vertically(&mut vertices);
        normalize_uv(&mut vertices);

        assert_eq!(uvs(&vertices), [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)]);
    }

    #[test]
    fn results_stay_in_unit_range() {
        let inputs = [-3.0, -2.5, -1.0, -0.1, 0.0, 0.3, 1.0, 1.2, 4.0, 7.75];
        for window in inputs.windows(4) {
            let mut vertices = quad([
                (window[0], window[3]),
                (window[1], window[2]),
                (window[2], window[1]),
                (window[3], window[0]),
            ]);
            normalize_uv(&mut vertices);
            for v in &vertices {
                assert!((0.0..=1.0).contains(&v.u), "u = {}", v.u);
                assert!((0.0..=1.0).contains(&v.v), "v = {}", v.v);
            }
        }
    }
}
