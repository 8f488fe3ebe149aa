//! Retrieval Index and Chat
//!
//! Builds the per-project embedding index and answers free-text questions
//! by nearest-neighbor retrieval plus one generation call.

pub mod indexer;
pub mod query;

pub use indexer::RagIndexer;
pub use query::{Answer, INSUFFICIENT_CONTEXT_MESSAGE, RagQuery};
