use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;

use crate::types::level::Angle;

/// Texture assigned to meshes that do not name one.
pub const DEFAULT_TEXTURE: &str = "l1_prison_[stone]_ground19.jpg";

/// Sliding-window size of the body compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DictionarySize {
    /// 1 KiB window
    #[value(name = "small")]
    Small,
    /// 2 KiB window
    #[value(name = "medium")]
    Medium,
    /// 4 KiB window
    #[value(name = "large")]
    Large,
}

impl DictionarySize {
    /// Number of low distance bits, as stored in the stream header.
    pub fn bits(self) -> u8 {
        match self {
            DictionarySize::Small => 4,
            DictionarySize::Medium => 5,
            DictionarySize::Large => 6,
        }
    }

    /// Window size in bytes.
    pub fn window(self) -> usize {
        64 << self.bits()
    }
}

impl std::fmt::Display for DictionarySize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DictionarySize::Small => write!(f, "small"),
            DictionarySize::Medium => write!(f, "medium"),
            DictionarySize::Large => write!(f, "large"),
        }
    }
}

/// Level metadata that does not come from the scene itself.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSettings {
    /// Level number; parameterizes all three output paths.
    pub level_idx: u32,
    /// Engine-space position of the scene origin.
    pub world_offset: Vec3,
    /// Player spawn relative to the scene origin (engine units, Y down).
    pub player_spawn: Vec3,
    pub player_orientation: Angle,
    /// Written into the "last user" field of the DLF and LLF headers.
    pub generator: String,
    pub default_texture: String,
    /// Decimal places kept when converting vertex positions.
    pub vertex_precision: u32,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            level_idx: 1,
            world_offset: Vec3::new(6000.0, 0.0, 6000.0),
            player_spawn: Vec3::new(0.0, -180.0, 0.0),
            player_orientation: Angle::default(),
            generator: default_generator(),
            default_texture: DEFAULT_TEXTURE.to_string(),
            vertex_precision: 10,
        }
    }
}

fn default_generator() -> String {
    format!("Arx Fatalis Level Compiler - v{}", env!("CARGO_PKG_VERSION"))
}

/// Fully resolved pipeline configuration (constructed from CLI args).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Scene to compile; `None` compiles the built-in default scene.
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub level: LevelSettings,
    pub dictionary: DictionarySize,
    pub dry_run: bool,
    pub verbose: bool,
    pub threads: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: PathBuf::new(),
            level: LevelSettings::default(),
            dictionary: DictionarySize::Large,
            dry_run: false,
            verbose: false,
            threads: None,
        }
    }
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "arx-level-compiler",
    about = "Compiles 3D scene meshes into Arx Fatalis FTS/DLF/LLF level files",
    version
)]
pub struct CliArgs {
    /// Scene file (JSON snapshot, glTF, GLB); omit for the default scene
    #[arg(short = 'i', long)]
    pub input: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    /// Level number
    #[arg(short = 'l', long, default_value_t = 1)]
    pub level: u32,

    /// Engine X coordinate of the scene origin
    #[arg(long, default_value_t = 6000.0)]
    pub offset_x: f32,

    /// Engine Y coordinate of the scene origin
    #[arg(long, default_value_t = 0.0)]
    pub offset_y: f32,

    /// Engine Z coordinate of the scene origin
    #[arg(long, default_value_t = 6000.0)]
    pub offset_z: f32,

    /// Texture for meshes that do not name one
    #[arg(long, default_value = DEFAULT_TEXTURE)]
    pub texture: String,

    /// Generator string stored in the level headers
    #[arg(long)]
    pub generator: Option<String>,

    /// Compression dictionary size: small, medium or large
    #[arg(long, value_enum, default_value = "large")]
    pub dictionary: DictionarySize,

    /// Compile but do not write any files
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Worker thread count (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl From<CliArgs> for PipelineConfig {
    fn from(args: CliArgs) -> Self {
        let level = LevelSettings {
            level_idx: args.level,
            world_offset: Vec3::new(args.offset_x, args.offset_y, args.offset_z),
            generator: args.generator.unwrap_or_else(default_generator),
            default_texture: args.texture,
            ..Default::default()
        };

        PipelineConfig {
            input: args.input,
            output: args.output,
            level,
            dictionary: args.dictionary,
            dry_run: args.dry_run,
            verbose: args.verbose,
            threads: args.threads,
        }
    }
}
