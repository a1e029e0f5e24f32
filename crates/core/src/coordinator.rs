use crate::embeddings::{try_embed, Embedder};
use crate::error::RetrievalError;
use crate::generation::{ChatClient, GenerativeBackend};
use crate::models::{ChatMessage, DocumentChunk, RetrievalOptions};
use crate::scoring::rank_chunks;
use crate::session::SessionState;
use tracing::debug;

/// Runs one chat turn end to end: embed the query (best-effort), rank the
/// session's chunks, ask the generation backend, and append both sides of
/// the exchange to the transcript.
pub struct ChatCoordinator<B: GenerativeBackend> {
    chat: ChatClient<B>,
    options: RetrievalOptions,
}

impl<B: GenerativeBackend> ChatCoordinator<B> {
    pub fn new(chat: ChatClient<B>, options: RetrievalOptions) -> Self {
        Self { chat, options }
    }

    pub async fn respond(
        &self,
        session: &mut SessionState,
        embedder: Option<&dyn Embedder>,
        query: &str,
    ) -> Result<ChatMessage, RetrievalError> {
        if query.trim().is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }

        session.push_message(ChatMessage::user(query));

        let query_embedding = try_embed(embedder, query).await;
        let ranked = rank_chunks(
            query,
            session.chunks(),
            query_embedding.as_deref(),
            self.options.top_k,
        );
        debug!(candidates = ranked.len(), "retrieval pass complete");

        let context: Vec<DocumentChunk> = ranked.into_iter().map(|hit| hit.chunk).collect();
        let outcome = self.chat.answer(query, &context).await;

        let message = ChatMessage::assistant(outcome.reply, outcome.sources);
        session.push_message(message.clone());
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::features::build_features;
    use crate::models::{IngestedFile, Role};
    use async_trait::async_trait;
    use chrono::Utc;

    struct EchoBackend;

    #[async_trait]
    impl GenerativeBackend for EchoBackend {
        async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
            Ok(format!("{model}: {}", prompt.len()))
        }
    }

    fn seeded_session() -> SessionState {
        let mut session = SessionState::new();
        let text = "informasi tentang suku bunga acuan bank sentral";
        let chunk = DocumentChunk {
            id: DocumentChunk::chunk_id("bi.txt", 0),
            filename: "bi.txt".to_string(),
            text: text.to_string(),
            features: build_features(text, None),
            chunk_index: 0,
            total_chunks: 1,
        };
        session.record_document(
            IngestedFile {
                filename: "bi.txt".to_string(),
                checksum: "c1".to_string(),
                chunk_count: 1,
                ingested_at: Utc::now(),
            },
            vec![chunk],
        );
        session
    }

    #[tokio::test]
    async fn a_turn_appends_exactly_two_messages() {
        let coordinator =
            ChatCoordinator::new(ChatClient::new(EchoBackend), RetrievalOptions::default());
        let mut session = seeded_session();

        let reply = coordinator
            .respond(&mut session, None, "suku bunga")
            .await
            .unwrap();

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].role, Role::User);
        assert_eq!(session.messages()[1].role, Role::Assistant);
        assert!(reply.id.is_some());
        assert_eq!(reply.sources.len(), 1);
    }

    #[tokio::test]
    async fn empty_query_is_rejected_without_touching_the_session() {
        let coordinator =
            ChatCoordinator::new(ChatClient::new(EchoBackend), RetrievalOptions::default());
        let mut session = seeded_session();

        let result = coordinator.respond(&mut session, None, "   ").await;

        assert!(matches!(result, Err(RetrievalError::EmptyQuery)));
        assert!(session.messages().is_empty());
    }

    #[tokio::test]
    async fn unmatched_query_answers_without_sources() {
        let coordinator =
            ChatCoordinator::new(ChatClient::new(EchoBackend), RetrievalOptions::default());
        let mut session = seeded_session();

        let reply = coordinator
            .respond(&mut session, None, "zzz")
            .await
            .unwrap();

        assert!(reply.sources.is_empty());
    }
}
