use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("text is not valid utf-8: {0}")]
    BadEncoding(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("document already ingested: {0}")]
    DuplicateDocument(String),
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("embedding request failed: {0}")]
    Request(String),

    #[error("query is empty")]
    EmptyQuery,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("api key is missing")]
    MissingApiKey,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model {model} returned {status}: {body}")]
    Api {
        model: String,
        status: u16,
        body: String,
    },

    #[error("malformed response from {model}: {details}")]
    MalformedResponse { model: String, details: String },
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
