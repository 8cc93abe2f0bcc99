use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing API credential: set {variable} or pass an API key explicitly")]
    MissingCredential { variable: &'static str },
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("LLM service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode LLM response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("malformed stream event: {0}")]
    Stream(String),

    #[error("LLM service returned no content")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("response contains no JSON object")]
    NotFound,

    #[error("response contains malformed JSON: {0}")]
    Invalid(#[source] serde_json::Error),
}
