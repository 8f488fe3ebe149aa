//! Configuration loading and types

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    Config, EmbeddingConfig, GenerationConfig, RetrievalConfig, ScanConfig, StorageConfig,
};
