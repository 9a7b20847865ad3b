use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::codec::Implode;
use crate::compiler::{self, LevelArtifacts};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::format::LevelFormat;
use crate::ingestion::{self, IngestionResult};
use crate::level;

/// Summary of a completed pipeline run.
#[derive(Debug)]
pub struct ProcessingResult {
    pub polygon_count: usize,
    /// Total size of the three compiled files.
    pub bytes: usize,
    /// Files written, empty for a dry run.
    pub files: Vec<PathBuf>,
    pub duration: Duration,
}

/// Pipeline orchestrator -- drives the compile stages.
pub struct Pipeline;

impl Pipeline {
    /// Run the full pipeline, stamping the level with the current time.
    pub fn run(config: &PipelineConfig) -> Result<ProcessingResult> {
        Self::run_at(config, unix_timestamp())
    }

    /// Run the full pipeline with an explicit header timestamp.
    pub fn run_at(config: &PipelineConfig, timestamp: i32) -> Result<ProcessingResult> {
        let start = Instant::now();

        let input = config
            .input
            .as_ref()
            .map_or_else(|| "<default scene>".to_string(), |p| p.display().to_string());
        info!(input = %input, level = config.level.level_idx, "Starting pipeline");

        info!("Stage 1/3: Ingestion");
        let ingestion_result = ingestion::ingest(config)?;
        print_ingestion_summary(&ingestion_result);

        info!("Stage 2/3: Level assembly");
        let records = level::build_level(&ingestion_result.scene, &config.level, timestamp)?;
        let polygon_count = records.fts.polygons.len();

        info!(dictionary = %config.dictionary, "Stage 3/3: Encoding and compression");
        let artifacts = compiler::compile(&records, &Implode::new(config.dictionary))?;

        let files = if config.dry_run {
            info!("--dry-run: skipping output");
            print_dry_run_summary(&artifacts);
            Vec::new()
        } else {
            info!(output = %config.output.display(), "Writing level files");
            artifacts.write_to(&config.output)?
        };

        let duration = start.elapsed();
        info!(
            polygons = polygon_count,
            bytes = artifacts.total_bytes(),
            elapsed = ?duration,
            "Pipeline complete"
        );

        Ok(ProcessingResult {
            polygon_count,
            bytes: artifacts.total_bytes(),
            files,
            duration,
        })
    }
}

/// Seconds since the Unix epoch, saturated to the header's 32-bit field.
fn unix_timestamp() -> i32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i32::try_from(d.as_secs()).unwrap_or(i32::MAX))
        .unwrap_or_default()
}

fn print_ingestion_summary(result: &IngestionResult) {
    let stats = &result.stats;
    println!("=== Scene ===");
    println!("  Source:    {}", stats.input_format);
    println!("  Nodes:     {}", stats.total_nodes);
    println!("  Meshes:    {}", stats.total_meshes);
    println!("  Vertices:  {}", stats.total_vertices);
    println!("  Textured:  {}", stats.textured_meshes);
}

fn print_dry_run_summary(artifacts: &LevelArtifacts) {
    println!("=== Dry run: level {} ===", artifacts.level_idx);
    for format in [LevelFormat::Fts, LevelFormat::Dlf, LevelFormat::Llf] {
        println!(
            "  {}  {:>8} bytes  {}",
            format,
            artifacts.get(format).len(),
            LevelArtifacts::relative_path(artifacts.level_idx, format).display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_recent() {
        // 2020-01-01
        assert!(unix_timestamp() > 1_577_836_800);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output: dir.path().join("out"),
            dry_run: true,
            ..Default::default()
        };
        let result = Pipeline::run_at(&config, 0).unwrap();

        assert_eq!(result.polygon_count, 1);
        assert!(result.files.is_empty());
        assert!(result.bytes > 0);
        assert!(!config.output.exists());
    }

    #[test]
    fn default_scene_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output: dir.path().to_path_buf(),
            ..Default::default()
        };
        let result = Pipeline::run_at(&config, 0).unwrap();

        assert_eq!(result.files.len(), 3);
        assert!(result.files.iter().all(|f| f.exists()));
    }
}
