pub mod chunking;
pub mod coordinator;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod features;
pub mod generation;
pub mod ingest;
pub mod models;
pub mod scoring;
pub mod session;

pub use chunking::{chunk_text, normalize_whitespace};
pub use coordinator::ChatCoordinator;
pub use embeddings::{try_embed, Embedder, HttpEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{GenerationError, IngestError, RetrievalError};
pub use extractor::{extract_text, extract_text_from_bytes};
pub use features::build_features;
pub use generation::{
    build_prompt, ChatClient, ChatOutcome, GenerativeBackend, HttpGenerativeBackend,
    DEFAULT_GENERATION_HOST, FALLBACK_MODELS,
};
pub use ingest::{
    digest_bytes, discover_document_files, ingest_bytes, ingest_file, ingest_folder_best_effort,
    IngestionReport, SkippedDocument,
};
pub use models::{
    ChatMessage, DocumentChunk, FeatureSet, IngestedFile, RetrievalOptions, Role, ScoredChunk,
    SourceRef,
};
pub use scoring::{cosine_similarity, rank_chunks, score_chunk};
pub use session::SessionState;
