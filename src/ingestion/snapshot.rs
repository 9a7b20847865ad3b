use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{LevelCompilerError, Result};
use crate::types::MeshNode;

/// Load a JSON snapshot of a mesh tree.
///
/// The snapshot is the serde form of [`MeshNode`]: `name`, `transform`
/// (`translation`, `rotation` as `[x, y, z, w]`, `scale`), optional
/// `geometry` (`positions`, `uvs`, `indices`, `texture`) and `children`.
/// Every field may be omitted.
pub fn load_snapshot(path: &Path) -> Result<MeshNode> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| LevelCompilerError::Input(format!("Invalid scene snapshot: {e}")))
}

/// Write a mesh tree as a pretty-printed JSON snapshot.
pub fn save_snapshot(scene: &MeshNode, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, scene)
        .map_err(|e| LevelCompilerError::Output(format!("Failed to write scene snapshot: {e}")))?;
    writer
        .flush()
        .map_err(|e| LevelCompilerError::Output(format!("Failed to flush scene snapshot: {e}")))
}
