use crate::error::RetrievalError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Produces dense vectors for chunk and query text. Implementations talk to
/// an external model host; callers treat every failure as "no embedding
/// available" and fall back to keyword scoring.
#[async_trait]
pub trait Embedder {
    fn dimensions(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

/// Client for a sentence-transformers style inference endpoint that accepts
/// `{"inputs": [text]}` and answers with one vector per input.
pub struct HttpEmbedder {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
    dimensions: usize,
}

impl HttpEmbedder {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_dimensions(endpoint, api_key, DEFAULT_EMBEDDING_DIMENSIONS)
    }

    pub fn with_dimensions(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            client: reqwest::Client::new(),
            dimensions,
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({ "inputs": [text] }));

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(RetrievalError::BackendResponse {
                backend: "embedding".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        let vector = parsed
            .pointer("/0")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_f64)
                    .map(|value| value as f32)
                    .collect::<Vec<f32>>()
            })
            .ok_or_else(|| RetrievalError::BackendResponse {
                backend: "embedding".to_string(),
                details: "response is not an array of vectors".to_string(),
            })?;

        if vector.len() != self.dimensions {
            return Err(RetrievalError::BackendResponse {
                backend: "embedding".to_string(),
                details: format!(
                    "vector has {} dimensions, expected {}",
                    vector.len(),
                    self.dimensions
                ),
            });
        }

        debug!(chars = text.chars().count(), "embedded text");
        Ok(vector)
    }
}

/// Best-effort wrapper used on both ingestion and query paths: any embedding
/// failure degrades to `None` instead of propagating.
pub async fn try_embed(embedder: Option<&dyn Embedder>, text: &str) -> Option<Vec<f32>> {
    let embedder = embedder?;
    match embedder.embed(text).await {
        Ok(vector) => Some(vector),
        Err(error) => {
            tracing::warn!(%error, "embedding unavailable, falling back to keyword scoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder {
        vector: Vec<f32>,
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        fn dimensions(&self) -> usize {
            self.vector.len()
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
            Ok(self.vector.clone())
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        fn dimensions(&self) -> usize {
            0
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
            Err(RetrievalError::Request("host down".to_string()))
        }
    }

    #[tokio::test]
    async fn try_embed_returns_vector_on_success() {
        let embedder = FixedEmbedder {
            vector: vec![1.0, 0.0],
        };
        let vector = try_embed(Some(&embedder), "text").await;
        assert_eq!(vector, Some(vec![1.0, 0.0]));
    }

    #[tokio::test]
    async fn try_embed_degrades_to_none_on_failure() {
        let vector = try_embed(Some(&FailingEmbedder), "text").await;
        assert_eq!(vector, None);
    }

    #[tokio::test]
    async fn try_embed_without_embedder_is_none() {
        assert_eq!(try_embed(None, "text").await, None);
    }
}
