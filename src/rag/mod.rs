//! Embedding capability and similarity ranking used by the knowledge base.

pub mod embeddings;
pub mod similarity;

pub use embeddings::{
    placeholder_vector, Embedding, EmbeddingOrigin, EmbeddingProvider, OpenAIEmbeddings,
    DEFAULT_DIMENSIONS,
};
pub use similarity::{cosine_similarity, rank_by_similarity};
