use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::codec::Compressor;
use crate::error::{LevelCompilerError, Result};
use crate::format::{LevelEncoding, LevelFormat, header_size};
use crate::types::LevelRecords;

/// The three finished level files, ready to be written or packaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelArtifacts {
    pub level_idx: u32,
    pub fts: Vec<u8>,
    pub dlf: Vec<u8>,
    pub llf: Vec<u8>,
}

impl LevelArtifacts {
    /// Path of one artifact relative to the game data root.
    pub fn relative_path(level_idx: u32, format: LevelFormat) -> PathBuf {
        let level_dir = format!("level{level_idx}");
        let levels: PathBuf = ["graph", "levels", level_dir.as_str()].iter().collect();
        match format {
            LevelFormat::Fts => Path::new("game").join(levels).join("fast.fts"),
            LevelFormat::Dlf => levels.join(format!("{level_dir}.dlf")),
            LevelFormat::Llf => levels.join(format!("{level_dir}.llf")),
        }
    }

    pub fn get(&self, format: LevelFormat) -> &[u8] {
        match format {
            LevelFormat::Fts => &self.fts,
            LevelFormat::Dlf => &self.dlf,
            LevelFormat::Llf => &self.llf,
        }
    }

    /// (relative path, bytes) for every artifact.
    pub fn files(&self) -> Vec<(PathBuf, &[u8])> {
        [LevelFormat::Fts, LevelFormat::Dlf, LevelFormat::Llf]
            .into_iter()
            .map(|format| (Self::relative_path(self.level_idx, format), self.get(format)))
            .collect()
    }

    pub fn total_bytes(&self) -> usize {
        self.fts.len() + self.dlf.len() + self.llf.len()
    }

    /// Write all three files below `root`, creating directories as needed.
    ///
    /// Every directory is created before any file is touched, and the files
    /// are staged under temporary names and renamed into place, so a failure
    /// leaves none of this build's files behind.
    pub fn write_to(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let targets: Vec<(PathBuf, &[u8])> = self
            .files()
            .into_iter()
            .map(|(relative, bytes)| (root.join(relative), bytes))
            .collect();

        for (path, _) in &targets {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| output_error(parent, e))?;
            }
        }

        let mut staged = Vec::with_capacity(targets.len());
        for (path, bytes) in &targets {
            let temp = staging_path(path);
            if let Err(e) = fs::write(&temp, bytes) {
                staged.push(temp.clone());
                discard(&staged);
                return Err(output_error(&temp, e));
            }
            staged.push(temp);
        }

        let mut written = Vec::with_capacity(targets.len());
        for ((path, bytes), temp) in targets.iter().zip(&staged) {
            if let Err(e) = fs::rename(temp, path) {
                discard(&staged[written.len()..]);
                discard(&written);
                return Err(output_error(path, e));
            }
            info!(path = %path.display(), bytes = bytes.len(), "Wrote level file");
            written.push(path.clone());
        }
        Ok(written)
    }
}

/// Temporary name a file is written under before being renamed into place.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Best-effort removal of files left by a failed write.
fn discard(paths: &[PathBuf]) {
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Removed partial output"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), %e, "Could not remove partial output"),
        }
    }
}

fn output_error(path: &Path, e: io::Error) -> LevelCompilerError {
    LevelCompilerError::Output(format!("{}: {e}", path.display()))
}

/// Split an encoded file into its header and body.
pub fn split_at_header(raw: &[u8], format: LevelFormat) -> Result<(&[u8], &[u8])> {
    let header_len = header_size(raw, format)?;
    if header_len > raw.len() {
        return Err(LevelCompilerError::HeaderMismatch {
            format,
            header_len,
            available: raw.len(),
        });
    }
    Ok(raw.split_at(header_len))
}

/// Encode one record and compress everything after its header.
pub fn compile_artifact<R: LevelEncoding>(
    record: &R,
    compressor: &dyn Compressor,
) -> Result<Vec<u8>> {
    let raw = record.encode()?;
    let (header, body) = split_at_header(&raw, R::FORMAT)?;

    let compressed = compressor.compress(body).map_err(|e| match e {
        LevelCompilerError::Compression(msg) => {
            LevelCompilerError::Compression(format!("{} body: {msg}", R::FORMAT))
        }
        other => other,
    })?;

    let mut artifact = Vec::with_capacity(header.len() + compressed.len());
    artifact.extend_from_slice(header);
    artifact.extend_from_slice(&compressed);

    let format = R::FORMAT;
    debug!(
        format = %format,
        raw = raw.len(),
        header = header.len(),
        body = body.len(),
        compressed = compressed.len(),
        "Compiled artifact"
    );
    Ok(artifact)
}

/// Compile all three records; either every artifact is produced or none is.
pub fn compile(records: &LevelRecords, compressor: &dyn Compressor) -> Result<LevelArtifacts> {
    let (fts, (dlf, llf)) = rayon::join(
        || compile_artifact(&records.fts, compressor),
        || {
            rayon::join(
                || compile_artifact(&records.dlf, compressor),
                || compile_artifact(&records.llf, compressor),
            )
        },
    );

    let artifacts = LevelArtifacts {
        level_idx: records.fts.level_idx,
        fts: fts?,
        dlf: dlf?,
        llf: llf?,
    };
    info!(
        level = artifacts.level_idx,
        fts = artifacts.fts.len(),
        dlf = artifacts.dlf.len(),
        llf = artifacts.llf.len(),
        "Compiled level artifacts"
    );
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Implode;
    use crate::codec::explode::explode;
    use crate::config::LevelSettings;
    use crate::format::{dlf, fts};
    use crate::level::build_level;
    use crate::types::{MeshGeometry, MeshNode, Transform};

    struct Failing;

    impl Compressor for Failing {
        fn compress(&self, _input: &[u8]) -> Result<Vec<u8>> {
            Err(LevelCompilerError::Compression("out of memory".into()))
        }
    }

    /// Returns the body unchanged.
    struct Identity;

    impl Compressor for Identity {
        fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
            Ok(input.to_vec())
        }
    }

    fn plane_records() -> LevelRecords {
        let scene = MeshNode::group(vec![MeshNode::mesh(
            MeshGeometry::ground_plane(100.0, 100.0, None),
            Transform::IDENTITY,
        )]);
        build_level(&scene, &LevelSettings::default(), 1_700_000_000).unwrap()
    }

    #[test]
    fn relative_paths() {
        assert_eq!(
            LevelArtifacts::relative_path(1, LevelFormat::Fts),
            PathBuf::from("game/graph/levels/level1/fast.fts")
        );
        assert_eq!(
            LevelArtifacts::relative_path(1, LevelFormat::Dlf),
            PathBuf::from("graph/levels/level1/level1.dlf")
        );
        assert_eq!(
            LevelArtifacts::relative_path(12, LevelFormat::Llf),
            PathBuf::from("graph/levels/level12/level12.llf")
        );
    }

    #[test]
    fn split_keeps_header_prefix() {
        let raw = dlf::encode(&plane_records().dlf).unwrap();
        let (header, body) = split_at_header(&raw, LevelFormat::Dlf).unwrap();
        assert_eq!(header.len(), dlf::HEADER_SIZE);
        assert_eq!(header, &raw[..dlf::HEADER_SIZE]);
        assert_eq!(body.len(), raw.len() - dlf::HEADER_SIZE);
    }

    #[test]
    fn split_rejects_short_buffer() {
        let err = split_at_header(&[0u8; 100], LevelFormat::Dlf).unwrap_err();
        assert!(matches!(
            err,
            LevelCompilerError::HeaderMismatch {
                format: LevelFormat::Dlf,
                header_len: 8520,
                available: 100,
            }
        ));
    }

    #[test]
    fn split_rejects_header_count_past_end() {
        let mut raw = vec![0u8; fts::PRIMARY_HEADER_SIZE + 10];
        raw[256..260].copy_from_slice(&1i32.to_le_bytes());
        assert!(matches!(
            split_at_header(&raw, LevelFormat::Fts).unwrap_err(),
            LevelCompilerError::HeaderMismatch { .. }
        ));
    }

    #[test]
    fn llf_is_compressed_whole() {
        let raw = crate::format::llf::encode(&plane_records().llf).unwrap();
        let (header, body) = split_at_header(&raw, LevelFormat::Llf).unwrap();
        assert!(header.is_empty());
        assert_eq!(body, &raw[..]);
    }

    #[test]
    fn artifact_is_header_then_compressed_body() {
        let records = plane_records();
        let raw = fts::encode(&records.fts).unwrap();
        let artifact = compile_artifact(&records.fts, &Implode::default()).unwrap();

        let header_len = fts::PRIMARY_HEADER_SIZE;
        assert_eq!(&artifact[..header_len], &raw[..header_len]);
        assert!(artifact.len() <= raw.len());
        assert_eq!(explode(&artifact[header_len..]).unwrap(), &raw[header_len..]);
    }

    #[test]
    fn identity_compressor_reproduces_encoding() {
        let records = plane_records();
        let artifacts = compile(&records, &Identity).unwrap();
        assert_eq!(artifacts.fts, fts::encode(&records.fts).unwrap());
        assert_eq!(artifacts.dlf, dlf::encode(&records.dlf).unwrap());
    }

    #[test]
    fn compile_produces_all_three() {
        let artifacts = compile(&plane_records(), &Implode::default()).unwrap();
        assert_eq!(artifacts.level_idx, 1);
        assert_eq!(artifacts.files().len(), 3);
        assert_eq!(
            artifacts.total_bytes(),
            artifacts.fts.len() + artifacts.dlf.len() + artifacts.llf.len()
        );
        // LLF has no uncompressed header: it starts with the implode header
        assert_eq!(&artifacts.llf[..2], &[0x00, 0x06]);
    }

    #[test]
    fn compression_failure_fails_the_compile() {
        let err = compile(&plane_records(), &Failing).unwrap_err();
        assert!(matches!(err, LevelCompilerError::Compression(_)));
        assert!(err.to_string().contains("body: out of memory"));
    }

    #[test]
    fn write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = compile(&plane_records(), &Implode::default()).unwrap();
        let written = artifacts.write_to(dir.path()).unwrap();

        assert_eq!(written.len(), 3);
        let fts_path = dir.path().join("game/graph/levels/level1/fast.fts");
        assert_eq!(std::fs::read(fts_path).unwrap(), artifacts.fts);
        assert!(dir.path().join("graph/levels/level1/level1.dlf").exists());
        assert!(dir.path().join("graph/levels/level1/level1.llf").exists());
    }

    #[test]
    fn blocked_directory_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        // a plain file where the DLF/LLF directory tree should start
        std::fs::write(dir.path().join("graph"), b"").unwrap();
        let artifacts = compile(&plane_records(), &Implode::default()).unwrap();

        let err = artifacts.write_to(dir.path()).unwrap_err();
        assert!(matches!(err, LevelCompilerError::Output(_)));
        let level_dir = dir.path().join("game/graph/levels/level1");
        assert!(!level_dir.join("fast.fts").exists());
        assert!(!level_dir.join("fast.fts.partial").exists());
    }

    #[test]
    fn failed_rename_rolls_back_earlier_files() {
        let dir = tempfile::tempdir().unwrap();
        // a directory in place of the DLF makes its rename fail after the FTS landed
        let level_dir = dir.path().join("graph/levels/level1");
        std::fs::create_dir_all(level_dir.join("level1.dlf")).unwrap();
        let artifacts = compile(&plane_records(), &Implode::default()).unwrap();

        let err = artifacts.write_to(dir.path()).unwrap_err();
        assert!(matches!(err, LevelCompilerError::Output(_)));
        assert!(!dir.path().join("game/graph/levels/level1/fast.fts").exists());
        assert!(!level_dir.join("level1.llf").exists());

        let leftovers: Vec<_> = walk_files(dir.path())
            .into_iter()
            .filter(|p| p.extension().is_some_and(|e| e == "partial"))
            .collect();
        assert!(leftovers.is_empty(), "staged files left behind: {leftovers:?}");
    }

    #[test]
    fn rewrite_replaces_previous_build() {
        let dir = tempfile::tempdir().unwrap();
        let fts_path = dir.path().join("game/graph/levels/level1/fast.fts");
        std::fs::create_dir_all(fts_path.parent().unwrap()).unwrap();
        std::fs::write(&fts_path, b"stale").unwrap();

        let artifacts = compile(&plane_records(), &Implode::default()).unwrap();
        artifacts.write_to(dir.path()).unwrap();
        assert_eq!(std::fs::read(&fts_path).unwrap(), artifacts.fts);
    }

    fn walk_files(root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(root).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                files.extend(walk_files(&path));
            } else {
                files.push(path);
            }
        }
        files
    }
}
