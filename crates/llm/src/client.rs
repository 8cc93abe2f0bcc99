use async_trait::async_trait;
use std::io::Write;

use crate::error::LlmError;

/// One chat completion call.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
    /// Ask the service for a JSON object reply.
    pub json_mode: bool,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: 0.1,
            max_tokens: 8000,
            stream: false,
            json_mode: false,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }
}

/// Receives streamed text fragments in arrival order.
pub trait FragmentObserver: Send {
    fn on_fragment(&mut self, fragment: &str);
}

impl<F: FnMut(&str) + Send> FragmentObserver for F {
    fn on_fragment(&mut self, fragment: &str) {
        (self)(fragment)
    }
}

pub struct NullObserver;

impl FragmentObserver for NullObserver {
    fn on_fragment(&mut self, _fragment: &str) {}
}

/// Echoes each fragment to stdout as it arrives.
pub struct StdoutEcho;

impl FragmentObserver for StdoutEcho {
    fn on_fragment(&mut self, fragment: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(fragment.as_bytes()).and_then(|()| stdout.flush()) {
            tracing::debug!(error = %e, "fragment echo failed");
        }
    }
}

/// Opaque prompt -> text collaborator.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the full response text. For streaming requests every fragment
    /// is also passed to `observer` before being appended.
    async fn complete(
        &self,
        request: &ChatRequest,
        observer: &mut dyn FragmentObserver,
    ) -> Result<String, LlmError>;

    fn model_name(&self) -> &str;
}
