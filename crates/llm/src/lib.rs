pub mod client;
pub mod config;
pub mod error;
pub mod openai;
pub mod payload;
pub mod prompt;
pub mod sse;

pub use client::{ChatRequest, FragmentObserver, LlmClient, NullObserver, StdoutEcho};
pub use config::LlmConfig;
pub use error::{ConfigError, LlmError, PayloadError};
pub use openai::OpenAiClient;
pub use payload::extract_json_object;
