use std::path::Path;

use glam::{Quat, Vec3};
use tracing::{debug, warn};

use crate::error::{LevelCompilerError, Result};
use crate::types::{MeshGeometry, MeshNode, Transform};

/// Load the node hierarchy of a glTF or GLB file.
///
/// Only buffers are resolved; images are referenced by file name and never
/// decoded. The default scene's root nodes become children of one group node.
pub fn load_gltf(path: &Path) -> Result<MeshNode> {
    let gltf = gltf::Gltf::open(path)
        .map_err(|e| LevelCompilerError::Input(format!("Failed to load glTF: {e}")))?;
    let buffers = gltf::import_buffers(&gltf.document, path.parent(), gltf.blob.clone())
        .map_err(|e| LevelCompilerError::Input(format!("Failed to load glTF buffers: {e}")))?;

    let document = &gltf.document;
    debug!(
        nodes = document.nodes().len(),
        meshes = document.meshes().len(),
        materials = document.materials().len(),
        "Loaded glTF document"
    );

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| LevelCompilerError::Input("glTF file contains no scene".into()))?;

    let children = scene
        .nodes()
        .map(|node| convert_node(&node, &buffers))
        .collect::<Result<Vec<_>>>()?;

    Ok(MeshNode {
        name: scene.name().map(str::to_string),
        ..MeshNode::group(children)
    })
}

fn convert_node(node: &gltf::Node<'_>, buffers: &[gltf::buffer::Data]) -> Result<MeshNode> {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Transform {
        translation: Vec3::from(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from(scale),
    };

    let mut geometry = None;
    let mut children = Vec::new();

    if let Some(mesh) = node.mesh() {
        let mut primitives = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                warn!(mesh = ?mesh.name(), mode = ?primitive.mode(), "Skipping non-triangle primitive");
                continue;
            }
            primitives.push(extract_primitive(&primitive, buffers)?);
        }

        // several primitives become identity-transformed children
        if primitives.len() == 1 {
            geometry = primitives.pop();
        } else {
            children.extend(
                primitives
                    .into_iter()
                    .map(|p| MeshNode::mesh(p, Transform::IDENTITY)),
            );
        }
    }

    for child in node.children() {
        children.push(convert_node(&child, buffers)?);
    }

    Ok(MeshNode {
        name: node.name().map(str::to_string),
        transform,
        geometry,
        children,
    })
}

/// Extract geometry from a single glTF primitive.
fn extract_primitive(
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
) -> Result<MeshGeometry> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d[..]));

    let positions: Vec<f32> = reader
        .read_positions()
        .ok_or_else(|| LevelCompilerError::Input("Primitive missing positions".into()))?
        .flatten()
        .collect();

    let uvs: Vec<f32> = reader
        .read_tex_coords(0)
        .map(|iter| iter.into_f32().flatten().collect())
        .unwrap_or_default();

    let indices: Option<Vec<u32>> = reader
        .read_indices()
        .map(|iter| iter.into_u32().collect());

    Ok(MeshGeometry {
        positions,
        uvs,
        indices,
        texture: base_color_texture(&primitive.material()),
    })
}

/// File name of the material's base colour image, if it references one by URI.
fn base_color_texture(material: &gltf::Material<'_>) -> Option<String> {
    let info = material.pbr_metallic_roughness().base_color_texture()?;
    let image = info.texture().source();
    match image.source() {
        gltf::image::Source::Uri { uri, .. } => texture_file_name(uri),
        gltf::image::Source::View { .. } => image.name().map(str::to_string),
    }
}

fn texture_file_name(uri: &str) -> Option<String> {
    if uri.starts_with("data:") {
        return None;
    }
    uri.rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
