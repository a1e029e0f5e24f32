use crate::error::GenerationError;
use crate::models::{DocumentChunk, SourceRef};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_GENERATION_HOST: &str = "https://generativelanguage.googleapis.com";

/// Ordered fallback list; the first model to answer wins.
pub const FALLBACK_MODELS: [&str; 4] = [
    "gemini-2.5-flash",
    "gemini-2.0-flash",
    "gemini-2.5-flash-lite",
    "gemini-2.0-flash-lite",
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One attempt against a single generative model.
#[async_trait]
pub trait GenerativeBackend {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}

/// Client for a `generateContent`-style REST endpoint.
pub struct HttpGenerativeBackend {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpGenerativeBackend {
    /// An absent or blank credential is rejected here, before any network
    /// call can happen.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GenerationError> {
        Self::with_base_url(DEFAULT_GENERATION_HOST, api_key)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        Ok(Self {
            base_url: base_url.into(),
            api_key,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl GenerativeBackend for HttpGenerativeBackend {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{}/v1/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        debug!(model, "generation request");

        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                model: model.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Value = response.json().await?;
        let candidates = parsed
            .pointer("/candidates")
            .and_then(Value::as_array)
            .filter(|candidates| !candidates.is_empty())
            .ok_or_else(|| GenerationError::MalformedResponse {
                model: model.to_string(),
                details: "response has no candidates".to_string(),
            })?;

        candidates[0]
            .pointer("/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GenerationError::MalformedResponse {
                model: model.to_string(),
                details: "missing candidates[0].content.parts[0].text".to_string(),
            })
    }
}

/// Build the single text prompt sent to the model. With context, each chunk
/// is cited so the model can name its sources; without context the model is
/// asked to answer from general knowledge and suggest uploading documents.
pub fn build_prompt(query: &str, context_chunks: &[DocumentChunk]) -> String {
    if context_chunks.is_empty() {
        return format!(
            "You are an assistant answering questions about the user's documents.\n\n\
             Question: {query}\n\n\
             Instructions:\n\
             - No documents are loaded, so answer from general knowledge.\n\
             - Be accurate and concise.\n\
             - Suggest uploading relevant documents for more detailed answers."
        );
    }

    let mut context = String::from("Information from the uploaded documents:\n\n");
    for (position, chunk) in context_chunks.iter().enumerate() {
        context.push_str(&format!(
            "[Document {}: {}, part {}/{}]\n{}\n\n",
            position + 1,
            chunk.filename,
            chunk.chunk_index + 1,
            chunk.total_chunks,
            chunk.text
        ));
    }

    format!(
        "You are an assistant answering questions about the user's documents.\n\n\
         {context}\
         Question: {query}\n\n\
         Instructions:\n\
         - Answer using the document excerpts above.\n\
         - Name the document each piece of information came from.\n\
         - If the excerpts are incomplete, say so before adding general knowledge.\n\
         - Answer clearly, with short paragraphs or bullet points where helpful."
    )
}

#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub reply: String,
    pub sources: Vec<SourceRef>,
}

/// Drives one generation turn: build the prompt, then walk the fallback
/// model list until one answers.
pub struct ChatClient<B: GenerativeBackend> {
    backend: B,
    models: Vec<String>,
}

impl<B: GenerativeBackend> ChatClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            models: FALLBACK_MODELS.iter().map(|model| model.to_string()).collect(),
        }
    }

    pub fn with_models(backend: B, models: Vec<String>) -> Self {
        Self { backend, models }
    }

    /// First-success semantics over the ordered model list. Each failure is
    /// recorded and the next model is tried; only after the whole list is
    /// exhausted does the caller see a composed failure reply, carrying the
    /// last error and no sources.
    pub async fn answer(&self, query: &str, context_chunks: &[DocumentChunk]) -> ChatOutcome {
        let prompt = build_prompt(query, context_chunks);
        let mut last_error: Option<GenerationError> = None;

        for model in &self.models {
            match self.backend.generate(model, &prompt).await {
                Ok(reply) => {
                    debug!(%model, "generation succeeded");
                    return ChatOutcome {
                        reply,
                        sources: context_chunks.iter().map(SourceRef::from_chunk).collect(),
                    };
                }
                Err(error) => {
                    warn!(%model, %error, "generation attempt failed, trying next model");
                    last_error = Some(error);
                }
            }
        }

        let detail = last_error
            .map(|error| error.to_string())
            .unwrap_or_else(|| "no models configured".to_string());

        ChatOutcome {
            reply: format!("No model was able to answer. Last error: {detail}"),
            sources: Vec::new(),
        }
    }
}
