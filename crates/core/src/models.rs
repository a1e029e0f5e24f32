use crate::error::IngestError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Features derived from chunk text at ingestion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSet {
    pub words: HashSet<String>,
    pub length: usize,
    pub keywords: Vec<String>,
    pub embedding: Option<Vec<f32>>,
}

/// One retrievable piece of an ingested document. Immutable after ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub filename: String,
    pub text: String,
    pub features: FeatureSet,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

impl DocumentChunk {
    pub fn chunk_id(filename: &str, index: usize) -> String {
        format!("{filename}_{index}")
    }
}

/// A chunk paired with its relevance score for one query. Discarded after
/// top-k selection.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Pointer from an assistant message back to the chunk it was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub filename: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub preview: String,
}

impl SourceRef {
    pub fn from_chunk(chunk: &DocumentChunk) -> Self {
        const PREVIEW_CHARS: usize = 300;
        let preview: String = chunk.text.chars().take(PREVIEW_CHARS).collect();
        Self {
            filename: chunk.filename.clone(),
            chunk_index: chunk.chunk_index,
            total_chunks: chunk.total_chunks,
            preview,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub sources: Vec<SourceRef>,
    pub id: Option<Uuid>,
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            id: None,
            at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<SourceRef>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sources,
            id: Some(Uuid::new_v4()),
            at: Utc::now(),
        }
    }
}

/// Record of one ingested file, kept for dedup and reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestedFile {
    pub filename: String,
    pub checksum: String,
    pub chunk_count: usize,
    pub ingested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct RetrievalOptions {
    pub chunk_size: usize,
    pub overlap: usize,
    pub top_k: usize,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1_000,
            overlap: 200,
            top_k: 5,
        }
    }
}

impl RetrievalOptions {
    /// A stride of zero or less would never advance the chunking window.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.chunk_size == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(IngestError::InvalidChunkConfig(format!(
                "overlap {} must be smaller than chunk_size {}",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}
