use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::client::{ChatRequest, FragmentObserver, LlmClient};
use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::sse::{SseDecoder, SseEvent};

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    config: LlmConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(LlmError::Client)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn read_full(&self, response: reqwest::Response) -> Result<String, LlmError> {
        let body: ChatCompletionResponse = response.json().await.map_err(LlmError::Decode)?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)
    }

    async fn read_stream(
        &self,
        response: reqwest::Response,
        observer: &mut dyn FragmentObserver,
    ) -> Result<String, LlmError> {
        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut text = String::new();
        let mut fragments = 0usize;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(LlmError::Decode)?;
            let events = decoder.push(&chunk)?;
            if append_events(events, observer, &mut text, &mut fragments) {
                tracing::debug!(fragments, "stream finished");
                return Ok(text);
            }
        }

        append_events(decoder.finish()?, observer, &mut text, &mut fragments);
        tracing::debug!(fragments, "stream closed without [DONE]");
        Ok(text)
    }
}

/// Appends fragments in order; returns true once the end marker is seen.
fn append_events(
    events: Vec<SseEvent>,
    observer: &mut dyn FragmentObserver,
    text: &mut String,
    fragments: &mut usize,
) -> bool {
    for event in events {
        match event {
            SseEvent::Fragment(fragment) => {
                observer.on_fragment(&fragment);
                text.push_str(&fragment);
                *fragments += 1;
            }
            SseEvent::Done => return true,
        }
    }
    false
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(
        &self,
        request: &ChatRequest,
        observer: &mut dyn FragmentObserver,
    ) -> Result<String, LlmError> {
        let url = self.config.chat_completions_url();

        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: request.stream,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        tracing::info!(
            model = %self.config.model,
            stream = request.stream,
            json_mode = request.json_mode,
            "calling LLM service"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| LlmError::Transport {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let text = if request.stream {
            self.read_stream(response, observer).await?
        } else {
            self.read_full(response).await?
        };

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::NullObserver;
    use crate::config::DEFAULT_MODEL;

    #[test]
    fn test_request_body_shape() {
        let body = ChatCompletionRequest {
            model: "m",
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
            temperature: 0.1,
            max_tokens: 10,
            stream: true,
            response_format: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], true);
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_append_events_stops_at_done() {
        let mut text = String::new();
        let mut count = 0;
        let done = append_events(
            vec![
                SseEvent::Fragment("a".into()),
                SseEvent::Done,
                SseEvent::Fragment("late".into()),
            ],
            &mut NullObserver,
            &mut text,
            &mut count,
        );
        assert!(done);
        assert_eq!(text, "a");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let config = LlmConfig::new("sk-test".into(), "http://127.0.0.1:9".into(), DEFAULT_MODEL.into())
            .with_timeout_secs(5);
        let client = OpenAiClient::new(config).unwrap();
        let request = ChatRequest::new("sys", "user");

        let err = client.complete(&request, &mut NullObserver).await.unwrap_err();
        assert!(matches!(err, LlmError::Transport { .. }));
    }
}
