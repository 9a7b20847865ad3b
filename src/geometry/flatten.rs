use glam::Mat4;
use tracing::debug;

use crate::types::{MeshNode, Transform};

/// Bake the transform hierarchy into world-space geometry.
///
/// Each node's geometry is multiplied by the product of its ancestors'
/// transforms and its own, then every transform in the tree is reset to
/// identity. Running it again on a flattened tree changes nothing.
pub fn flatten(root: &mut MeshNode) {
    debug!(nodes = root.node_count(), "Flattening transform hierarchy");
    flatten_node(root, &Mat4::IDENTITY);
}

fn flatten_node(node: &mut MeshNode, parent: &Mat4) {
    let world = *parent * node.transform.to_matrix();

    if world != Mat4::IDENTITY {
        if let Some(geometry) = node.geometry.as_mut() {
            geometry.apply_matrix(&world);
        }
    }

    for child in node.children.iter_mut() {
        flatten_node(child, &world);
    }

    node.transform = Transform::IDENTITY;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MeshGeometry;
    use glam::{Quat, Vec3};

    fn point(x: f32, y: f32, z: f32) -> MeshGeometry {
        MeshGeometry {
            positions: vec![x, y, z],
            ..Default::default()
        }
    }

    fn first_position(node: &MeshNode) -> Vec3 {
        node.geometry.as_ref().unwrap().position(0).unwrap()
    }

    #[test]
    fn translation_baked_and_reset() {
        let mut node = MeshNode::mesh(
            point(1.0, 2.0, 3.0),
            Transform::from_translation(Vec3::new(0.0, 0.0, 4.0)),
        );
        flatten(&mut node);

        assert_eq!(first_position(&node), Vec3::new(1.0, 2.0, 7.0));
        assert!(node.transform.is_identity());
    }

    #[test]
    fn nested_transforms_compose_parent_first() {
        let child = MeshNode::mesh(
            point(1.0, 0.0, 0.0),
            Transform {
                rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
                ..Transform::IDENTITY
            },
        );
        let mut root = MeshNode {
            transform: Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)),
            children: vec![child],
            ..Default::default()
        };

        flatten(&mut root);

        let p = first_position(&root.children[0]);
        assert!(p.abs_diff_eq(Vec3::new(10.0, 0.0, -1.0), 1e-5), "got {p}");
        assert!(root.transform.is_identity());
        assert!(root.children[0].transform.is_identity());
    }

    #[test]
    fn scale_applies_to_descendants() {
        let grandchild = MeshNode::mesh(point(1.0, 1.0, 1.0), Transform::IDENTITY);
        let mut root = MeshNode {
            transform: Transform {
                scale: Vec3::splat(2.0),
                ..Transform::IDENTITY
            },
            children: vec![MeshNode::group(vec![grandchild])],
            ..Default::default()
        };

        flatten(&mut root);

        let p = first_position(&root.children[0].children[0]);
        assert_eq!(p, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn flatten_is_idempotent() {
        let child = MeshNode::mesh(
            MeshGeometry::ground_plane(100.0, 100.0, None),
            Transform {
                translation: Vec3::new(3.5, -2.0, 8.25),
                rotation: Quat::from_rotation_x(0.3),
                scale: Vec3::new(1.0, 2.0, 0.5),
            },
        );
        let mut root = MeshNode {
            transform: Transform::from_translation(Vec3::new(-40.0, 0.0, 12.0)),
            children: vec![child],
            ..Default::default()
        };

        flatten(&mut root);
        let once = root.clone();
        flatten(&mut root);

        assert_eq!(root, once);
    }

    #[test]
    fn empty_leaf_is_noop() {
        let mut node = MeshNode {
            transform: Transform::from_translation(Vec3::ONE),
            ..Default::default()
        };
        flatten(&mut node);

        assert!(node.geometry.is_none());
        assert!(node.children.is_empty());
        assert!(node.transform.is_identity());
    }
}
