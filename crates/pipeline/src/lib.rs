pub mod config;
pub mod error;
pub mod persist;

pub use config::{GenerationConfig, PipelineConfig};
pub use error::{AnalysisError, PersistError};
pub use persist::{persist, OutputPaths};

use extract::{Extraction, Extractor, ScoreVector, SourceCitation, StartupAnalysisRecord};
use llm::prompt::{
    build_analysis_prompt, build_scoring_prompt, ANALYST_SYSTEM_PROMPT, SCORING_SYSTEM_PROMPT,
};
use llm::{extract_json_object, ChatRequest, FragmentObserver, LlmClient, LlmConfig, NullObserver, OpenAiClient};
use report::{ComposedReport, ReportComposer};
use visualize::{VisualArtifacts, Visualizer};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Sequences the LLM call, extraction, visualization and composition for one
/// input document.
pub struct AnalysisPipeline<C> {
    client: C,
    config: PipelineConfig,
    extractor: Extractor,
    visualizer: Visualizer,
    composer: ReportComposer,
}

impl AnalysisPipeline<OpenAiClient> {
    /// Builds the HTTP client. Fails before any work if the client cannot be set up.
    pub fn connect(llm_config: LlmConfig, config: PipelineConfig) -> Result<Self, AnalysisError> {
        let llm_config = llm_config.with_timeout_secs(config.generation.request_timeout_secs);
        let client = OpenAiClient::new(llm_config)?;
        Ok(Self::new(client, config))
    }
}

impl<C: LlmClient> AnalysisPipeline<C> {
    pub fn new(client: C, config: PipelineConfig) -> Self {
        let visualizer = Visualizer::from_capabilities(&config.capabilities);
        let composer = ReportComposer::from_capabilities(&config.capabilities);
        Self {
            client,
            config,
            extractor: Extractor::default(),
            visualizer,
            composer,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Calls the LLM and turns (input, response) into an immutable record.
    pub async fn analyze(
        &self,
        text: &str,
        observer: &mut dyn FragmentObserver,
    ) -> Result<StartupAnalysisRecord, AnalysisError> {
        let generation = &self.config.generation;
        let request = ChatRequest::new(ANALYST_SYSTEM_PROMPT, build_analysis_prompt(text))
            .temperature(generation.temperature)
            .max_tokens(generation.max_tokens)
            .stream(generation.stream);

        tracing::info!(
            model = self.client.model_name(),
            stream = request.stream,
            input_chars = text.chars().count(),
            "requesting analysis"
        );
        let response = self.client.complete(&request, observer).await?;

        let Extraction {
            elements,
            keywords,
            graph,
        } = self.extractor.extract(text, &response);
        tracing::info!(
            fields = elements.len(),
            keywords = keywords.len(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "extraction finished"
        );

        let scores = if self.config.request_scores {
            self.request_scores(text).await?
        } else {
            ScoreVector::new()
        };

        let now = chrono::Local::now();
        let record = StartupAnalysisRecord::builder(now.format(TIMESTAMP_FORMAT).to_string())
            .source_excerpt(text, self.config.source_excerpt_chars)
            .raw_response(response)
            .elements(elements)
            .graph(graph)
            .scores(scores)
            .keywords(keywords)
            .source(SourceCitation {
                title: "Source text analysis".to_string(),
                url: "N/A".to_string(),
                level: "L1".to_string(),
                captured_at: now.format(DATE_FORMAT).to_string(),
            })
            .build();

        Ok(record)
    }

    /// Structured scoring; the reply must contain a JSON object.
    async fn request_scores(&self, text: &str) -> Result<ScoreVector, AnalysisError> {
        let request = ChatRequest::new(SCORING_SYSTEM_PROMPT, build_scoring_prompt(text))
            .temperature(self.config.generation.temperature)
            .max_tokens(self.config.generation.max_tokens)
            .json_mode(true);

        let response = self.client.complete(&request, &mut NullObserver).await?;
        let payload = extract_json_object(&response)?;
        let scores = ScoreVector::from_json_object(&payload);

        tracing::info!(dimensions = scores.len(), "scores received");
        Ok(scores)
    }

    pub fn visualize(&self, record: &StartupAnalysisRecord) -> VisualArtifacts {
        self.visualizer.render(record)
    }

    pub fn render(&self, record: &StartupAnalysisRecord) -> ComposedReport {
        let artifacts = self.visualize(record);
        self.composer.compose(record, &artifacts)
    }

    pub async fn persist(&self, report: &ComposedReport, paths: &OutputPaths) -> Result<(), AnalysisError> {
        persist(report, paths).await?;
        Ok(())
    }

    /// The whole flow: analyze, render and write both documents.
    pub async fn run(
        &self,
        text: &str,
        paths: &OutputPaths,
        observer: &mut dyn FragmentObserver,
    ) -> Result<StartupAnalysisRecord, AnalysisError> {
        let record = self.analyze(text, observer).await?;
        let report = self.render(&record);
        self.persist(&report, paths).await?;
        Ok(record)
    }
}
