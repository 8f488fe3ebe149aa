//! AI Integration Layer
//!
//! Text generation and embedding provider abstractions, plus the
//! response-parsing contract shared by the batched scanners.

pub mod embedding;
pub mod provider;
pub mod validation;

pub use embedding::{EmbeddingClient, OpenAiEmbeddings, SharedEmbedder, truncate_for_embedding};
pub use provider::{
    AnthropicProvider, CompletionRequest, OllamaProvider, SharedGenerator, TextGenerator,
    create_generator,
};
pub use validation::extract_json_array;
