pub mod gltf_loader;
pub mod snapshot;

use std::path::Path;

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{LevelCompilerError, Result};
use crate::types::{MeshGeometry, MeshNode, Transform};

/// Result of the ingestion stage.
#[derive(Debug)]
pub struct IngestionResult {
    pub scene: MeshNode,
    pub stats: IngestionStats,
}

/// Statistics about the ingested scene.
#[derive(Debug)]
pub struct IngestionStats {
    pub total_nodes: usize,
    pub total_meshes: usize,
    pub total_vertices: usize,
    pub textured_meshes: usize,
    pub input_format: String,
}

/// Supported scene sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Serialized mesh tree
    Json,
    Gltf,
    Glb,
}

impl InputFormat {
    /// Detect format from file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(InputFormat::Json),
            "gltf" => Ok(InputFormat::Gltf),
            "glb" => Ok(InputFormat::Glb),
            _ => Err(LevelCompilerError::Input(format!(
                "Unsupported file format: .{ext}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Json => "JSON",
            InputFormat::Gltf => "glTF",
            InputFormat::Glb => "GLB",
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source label reported for the built-in scene.
pub const DEFAULT_SCENE_SOURCE: &str = "default scene";

/// One 100×100 floor tile at the origin, using the level's default texture.
pub fn default_scene() -> MeshNode {
    MeshNode {
        name: Some("default".into()),
        ..MeshNode::group(vec![MeshNode::mesh(
            MeshGeometry::ground_plane(100.0, 100.0, None),
            Transform::IDENTITY,
        )])
    }
}

/// Run the ingestion stage.
pub fn ingest(config: &PipelineConfig) -> Result<IngestionResult> {
    let (scene, source) = match &config.input {
        None => {
            info!("No input given, using the default scene");
            (default_scene(), DEFAULT_SCENE_SOURCE.to_string())
        }
        Some(path) => {
            if !path.exists() {
                return Err(LevelCompilerError::Input(format!(
                    "Input file not found: {}",
                    path.display()
                )));
            }

            let format = InputFormat::from_path(path)?;
            info!(format = %format, path = %path.display(), "Detected input format");

            let scene = match format {
                InputFormat::Json => snapshot::load_snapshot(path)?,
                InputFormat::Gltf | InputFormat::Glb => gltf_loader::load_gltf(path)?,
            };
            (scene, format.to_string())
        }
    };

    let stats = compute_stats(&scene, &source);
    debug!(
        nodes = stats.total_nodes,
        meshes = stats.total_meshes,
        vertices = stats.total_vertices,
        "Ingestion stats"
    );

    Ok(IngestionResult { scene, stats })
}

/// Compute summary statistics for a scene tree read from `source`.
pub fn compute_stats(scene: &MeshNode, source: &str) -> IngestionStats {
    let geometries = scene.geometries();

    IngestionStats {
        total_nodes: scene.node_count(),
        total_meshes: geometries.len(),
        total_vertices: geometries.iter().map(|g| g.vertex_count()).sum(),
        textured_meshes: geometries.iter().filter(|g| g.texture.is_some()).count(),
        input_format: source.to_string(),
    }
}
