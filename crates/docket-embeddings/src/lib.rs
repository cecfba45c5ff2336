//! # docket-embeddings
//!
//! Embedding providers for the retrieval store.
//! `HashEmbedder` is deterministic and dependency-free; `CachedEmbedder`
//! puts a moka L1 cache in front of any provider.

pub mod cache;
pub mod factory;
pub mod providers;

pub use cache::CachedEmbedder;
pub use factory::create_embedder;
pub use providers::HashEmbedder;
