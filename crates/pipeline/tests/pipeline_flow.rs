use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use llm::{ChatRequest, FragmentObserver, LlmClient, LlmError, NullObserver};
use pipeline::{AnalysisError, AnalysisPipeline, OutputPaths, PipelineConfig};

/// Replays canned replies in order and remembers every request.
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(
        &self,
        request: &ChatRequest,
        observer: &mut dyn FragmentObserver,
    ) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse))?;

        if request.stream {
            let mut collected = String::new();
            for line in reply.split_inclusive('\n') {
                observer.on_fragment(line);
                collected.push_str(line);
            }
            Ok(collected)
        } else {
            Ok(reply)
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

const SOURCE: &str = "Acme Robotics builds warehouse robots.";
const RESPONSE: &str = "行业: Robotics\n价值主张: Faster picking\n创始人: Jane Doe";

fn paths_in(dir: &Path) -> OutputPaths {
    OutputPaths::for_input(dir, Path::new("acme.txt"))
}

#[tokio::test]
async fn test_full_run_writes_both_documents() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths_in(dir.path());
    let pipeline = AnalysisPipeline::new(
        ScriptedClient::new(vec![Ok(RESPONSE.to_string())]),
        PipelineConfig::plain_text(),
    );

    let mut echoed = String::new();
    let mut observer = |fragment: &str| echoed.push_str(fragment);
    let record = pipeline.run(SOURCE, &paths, &mut observer).await.unwrap();

    assert_eq!(echoed, RESPONSE);
    assert_eq!(record.raw_response(), RESPONSE);
    assert_eq!(record.elements().get("company_name"), Some("Acme"));
    assert_eq!(record.graph().nodes.len(), 2);
    assert_eq!(record.graph().edges.len(), 1);
    assert_eq!(record.sources().len(), 1);
    assert!(record.scores().is_empty());

    let markdown = std::fs::read_to_string(&paths.markdown).unwrap();
    assert!(markdown.starts_with("# 🚀 Startup Analysis Report · Acme"));
    assert!(markdown.contains("| Sector | Robotics |"));
    assert!(markdown.contains("```mermaid"));
    assert!(markdown.contains("company_acme -->|FOUNDED_BY| person_jane_doe"));
    assert!(!markdown.contains("## 📊"));

    let html = std::fs::read_to_string(&paths.html).unwrap();
    assert!(html.contains("Startup Analysis Report · Acme"));
    assert!(html.contains("<pre class=\"mermaid\">"));
    assert!(!html.contains("{{"));
}

#[tokio::test]
async fn test_empty_response_still_renders() {
    let pipeline = AnalysisPipeline::new(
        ScriptedClient::new(vec![Ok(String::new())]),
        PipelineConfig::plain_text(),
    );

    let record = pipeline
        .analyze("一家做仓储机器人的初创公司", &mut NullObserver)
        .await
        .unwrap();
    assert!(record.elements().len() <= 1);
    assert!(record.graph().edges.is_empty());

    let report = pipeline.render(&record);
    assert!(report.markdown.starts_with("# 🚀 Startup Analysis Report · N/A"));
    assert!(report.markdown.contains("| Founded | — |"));
    assert!(report.markdown.contains("> No graph data available"));
    assert!(report.html.contains("No graph data available"));
}

#[tokio::test]
async fn test_external_failure_is_wrapped_and_nothing_written() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths_in(dir.path());
    let pipeline = AnalysisPipeline::new(
        ScriptedClient::new(vec![Err(LlmError::Status {
            status: 503,
            body: "overloaded".to_string(),
        })]),
        PipelineConfig::default(),
    );

    let err = pipeline.run(SOURCE, &paths, &mut NullObserver).await.unwrap_err();

    assert!(matches!(err, AnalysisError::ExternalService(LlmError::Status { status: 503, .. })));
    assert!(err.to_string().contains("overloaded"));
    assert!(!paths.markdown.exists());
    assert!(!paths.html.exists());
}

#[tokio::test]
async fn test_scoring_call_fills_radar() {
    let scores = "```json\n{\"people\": 8, \"market\": 7.5, \"note\": \"strong team\"}\n```";
    let client = ScriptedClient::new(vec![Ok(RESPONSE.to_string()), Ok(scores.to_string())]);
    let pipeline = AnalysisPipeline::new(client, PipelineConfig::scored());

    let record = pipeline.analyze(SOURCE, &mut NullObserver).await.unwrap();
    assert_eq!(record.scores().len(), 2);
    assert_eq!(record.scores().get("market"), Some(7.5));

    let report = pipeline.render(&record);
    assert!(report.markdown.contains("## 📊 Investment Score Radar"));
    assert!(report.markdown.contains("data:image/png;base64,"));
}

#[tokio::test]
async fn test_scoring_request_shape() {
    let client = ScriptedClient::new(vec![Ok(RESPONSE.to_string()), Ok("{\"moat\": 6}".to_string())]);
    let pipeline = AnalysisPipeline::new(client, PipelineConfig::scored());

    pipeline.analyze(SOURCE, &mut NullObserver).await.unwrap();

    let requests = pipeline_requests(&pipeline);
    assert_eq!(requests.len(), 2);
    assert!(requests[0].stream);
    assert!(!requests[0].json_mode);
    assert!(requests[0].user.contains(SOURCE));
    assert!(!requests[1].stream);
    assert!(requests[1].json_mode);
}

#[tokio::test]
async fn test_unparseable_scores_are_fatal() {
    let client = ScriptedClient::new(vec![Ok(RESPONSE.to_string()), Ok("no scores today".to_string())]);
    let pipeline = AnalysisPipeline::new(client, PipelineConfig::scored());

    let err = pipeline.analyze(SOURCE, &mut NullObserver).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Parse(_)));
}

#[tokio::test]
async fn test_long_source_is_truncated() {
    let source = format!("Acme {}", "x".repeat(600));
    let pipeline = AnalysisPipeline::new(
        ScriptedClient::new(vec![Ok(RESPONSE.to_string())]),
        PipelineConfig::plain_text(),
    );

    let record = pipeline.analyze(&source, &mut NullObserver).await.unwrap();
    assert_eq!(record.source_text().chars().count(), 503);
    assert!(record.source_text().ends_with("..."));
}

fn pipeline_requests(pipeline: &AnalysisPipeline<ScriptedClient>) -> Vec<ChatRequest> {
    pipeline.client().requests()
}
