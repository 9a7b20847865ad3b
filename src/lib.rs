pub mod codec;
pub mod compiler;
pub mod config;
pub mod error;
pub mod format;
pub mod geometry;
pub mod ingestion;
pub mod level;
pub mod pipeline;
pub mod types;

pub use compiler::{LevelArtifacts, compile};
pub use config::{DictionarySize, LevelSettings, PipelineConfig};
pub use error::{LevelCompilerError, Result};
pub use level::build_level;
pub use pipeline::Pipeline;
