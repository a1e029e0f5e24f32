use crate::chunking::{chunk_text, normalize_whitespace};
use crate::embeddings::{try_embed, Embedder};
use crate::error::IngestError;
use crate::extractor::extract_text_from_bytes;
use crate::features::build_features;
use crate::models::{DocumentChunk, IngestedFile, RetrievalOptions};
use crate::session::SessionState;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

const SUPPORTED_EXTENSIONS: [&str; 2] = ["pdf", "txt"];

pub fn discover_document_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let supported = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });

        if supported {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Ingest one uploaded document into the session: extract its text, chunk
/// it, derive features (embedding each chunk best-effort), and record the
/// file for duplicate detection. Returns the number of chunks produced.
///
/// A file whose checksum already sits in the session is rejected so the
/// same upload cannot double its chunks.
pub async fn ingest_bytes(
    session: &mut SessionState,
    embedder: Option<&dyn Embedder>,
    bytes: &[u8],
    filename: &str,
    options: RetrievalOptions,
) -> Result<usize, IngestError> {
    options.validate()?;

    let checksum = digest_bytes(bytes);
    if session.has_checksum(&checksum) {
        return Err(IngestError::DuplicateDocument(filename.to_string()));
    }

    let text = extract_text_from_bytes(bytes, filename)?;
    let normalized = normalize_whitespace(&text);
    let pieces = chunk_text(&normalized, options.chunk_size, options.overlap)?;
    let total_chunks = pieces.len();

    let mut chunks = Vec::with_capacity(total_chunks);
    for (index, piece) in pieces.into_iter().enumerate() {
        let embedding = try_embed(embedder, &piece).await;
        chunks.push(DocumentChunk {
            id: DocumentChunk::chunk_id(filename, index),
            filename: filename.to_string(),
            features: build_features(&piece, embedding),
            text: piece,
            chunk_index: index,
            total_chunks,
        });
    }

    info!(filename, chunk_count = total_chunks, "document ingested");

    session.record_document(
        IngestedFile {
            filename: filename.to_string(),
            checksum,
            chunk_count: total_chunks,
            ingested_at: Utc::now(),
        },
        chunks,
    );

    Ok(total_chunks)
}

pub async fn ingest_file(
    session: &mut SessionState,
    embedder: Option<&dyn Embedder>,
    path: &Path,
    options: RetrievalOptions,
) -> Result<usize, IngestError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            IngestError::InvalidArgument(format!("path missing filename: {}", path.display()))
        })?
        .to_string();

    let bytes = std::fs::read(path)?;
    ingest_bytes(session, embedder, &bytes, &filename, options).await
}

pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

pub struct IngestionReport {
    pub ingested_files: usize,
    pub chunk_count: usize,
    pub skipped_files: Vec<SkippedDocument>,
}

/// Walk a folder and ingest every supported document, collecting per-file
/// failures instead of aborting the whole run.
pub async fn ingest_folder_best_effort(
    session: &mut SessionState,
    embedder: Option<&dyn Embedder>,
    folder: &Path,
    options: RetrievalOptions,
) -> Result<IngestionReport, IngestError> {
    let files = discover_document_files(folder);

    if files.is_empty() {
        return Err(IngestError::InvalidArgument(format!(
            "no pdf or txt files found in {}",
            folder.display()
        )));
    }

    let mut ingested_files = 0;
    let mut chunk_count = 0;
    let mut skipped_files = Vec::new();

    for path in files {
        match ingest_file(session, embedder, &path, options).await {
            Ok(count) => {
                ingested_files += 1;
                chunk_count += count;
            }
            Err(error) => skipped_files.push(SkippedDocument {
                path,
                reason: error.to_string(),
            }),
        }
    }

    Ok(IngestionReport {
        ingested_files,
        chunk_count,
        skipped_files,
    })
}
