use serde::{Deserialize, Serialize};
use visualize::RenderCapabilities;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub generation: GenerationConfig,
    pub capabilities: RenderCapabilities,
    /// Issue a second, JSON-mode call for the radar scores.
    pub request_scores: bool,
    pub source_excerpt_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
    pub request_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 8000,
            stream: true,
            request_timeout_secs: llm::config::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            capabilities: RenderCapabilities::default(),
            request_scores: false,
            source_excerpt_chars: 500,
        }
    }
}

impl PipelineConfig {
    /// No charts, no layout, no templating engine. Text-only diagrams and
    /// placeholder HTML.
    pub fn plain_text() -> Self {
        Self {
            capabilities: RenderCapabilities::none(),
            ..Self::default()
        }
    }

    pub fn scored() -> Self {
        Self {
            request_scores: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let plain = PipelineConfig::plain_text();
        assert!(!plain.capabilities.charting);
        assert!(!plain.capabilities.templating);
        assert!(!plain.request_scores);

        let scored = PipelineConfig::scored();
        assert!(scored.request_scores);
        assert!(scored.capabilities.charting);
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "generation": {"temperature": 0.3, "max_tokens": 2000, "stream": false, "request_timeout_secs": 60},
            "capabilities": {"charting": true, "graph_layout": false, "templating": true},
            "request_scores": true,
            "source_excerpt_chars": 120
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.generation.max_tokens, 2000);
        assert!(!config.capabilities.graph_layout);
        assert_eq!(config.source_excerpt_chars, 120);
    }
}
