use crate::models::{ChatMessage, DocumentChunk, IngestedFile, SourceRef};

/// All state for one interactive session: the chat transcript, the ingested
/// chunks, and the file records used for duplicate detection. Held only in
/// memory; everything is lost when the session ends.
///
/// Callers own the session and pass it explicitly to each operation; there
/// is no ambient global state.
#[derive(Debug, Default)]
pub struct SessionState {
    messages: Vec<ChatMessage>,
    chunks: Vec<DocumentChunk>,
    files: Vec<IngestedFile>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }

    pub fn files(&self) -> &[IngestedFile] {
        &self.files
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn has_checksum(&self, checksum: &str) -> bool {
        self.files.iter().any(|file| file.checksum == checksum)
    }

    pub fn record_document(&mut self, file: IngestedFile, chunks: Vec<DocumentChunk>) {
        self.files.push(file);
        self.chunks.extend(chunks);
    }

    /// Drop every ingested document but keep the transcript.
    pub fn clear_documents(&mut self) {
        self.chunks.clear();
        self.files.clear();
    }

    pub fn last_sources(&self) -> &[SourceRef] {
        self.messages
            .iter()
            .rev()
            .find(|message| !message.sources.is_empty())
            .map(|message| message.sources.as_slice())
            .unwrap_or(&[])
    }
}
