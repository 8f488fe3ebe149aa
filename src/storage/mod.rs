//! Persistence Layer
//!
//! Pooled SQLite database, per-entity stores, and the object store for
//! write-only artifacts.

pub mod chunks;
pub mod database;
pub mod documentation;
pub mod findings;
pub mod improvements;
pub mod object;
pub mod projects;

pub use chunks::{ChunkStore, blob_to_vec, cosine_similarity, vec_to_blob};
pub use database::{Database, PoolConfig, SharedDatabase};
pub use documentation::DocumentationStore;
pub use findings::FindingStore;
pub use improvements::ImprovementStore;
pub use object::{LocalObjectStore, ObjectStore};
pub use projects::ProjectStore;
