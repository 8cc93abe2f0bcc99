//! Startup report CLI
//!
//! Reads a narrative about a company, asks the LLM for an analysis and writes
//! a Markdown and an HTML report next to each other.
//!
//! ```bash
//! startup-report notes/acme.txt --out reports
//! startup-report notes/acme.txt --no-charts --no-templates
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use llm::{FragmentObserver, LlmConfig, NullObserver, StdoutEcho};
use pipeline::{AnalysisPipeline, OutputPaths, PipelineConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "startup-report")]
#[command(version = "0.1.0")]
#[command(about = "Turn a company narrative into a Markdown and HTML analysis report")]
struct Cli {
    /// Text file describing the company
    input: PathBuf,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Skip raster charts (radar, keyword charts, graph image)
    #[arg(long)]
    no_charts: bool,

    /// Skip the force-directed graph image; the diagram text is kept
    #[arg(long)]
    no_layout: bool,

    /// Fill the HTML report by plain placeholder substitution
    #[arg(long)]
    no_templates: bool,

    /// Ask for structured investment scores (second LLM call)
    #[arg(long)]
    scores: bool,

    /// Wait for the full response instead of streaming it to stdout
    #[arg(long)]
    no_stream: bool,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.capabilities.charting = !self.no_charts;
        config.capabilities.graph_layout = !self.no_layout;
        config.capabilities.templating = !self.no_templates;
        config.request_scores = self.scores;
        config.generation.stream = !self.no_stream;
        config
    }
}

async fn run(cli: Cli) -> anyhow::Result<OutputPaths> {
    let llm_config = LlmConfig::resolve(cli.api_key.clone(), cli.base_url.clone(), cli.model.clone())
        .map_err(pipeline::AnalysisError::from)?;

    let text = tokio::fs::read_to_string(&cli.input)
        .await
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let config = cli.pipeline_config();
    let stream = config.generation.stream;
    let pipeline = AnalysisPipeline::connect(llm_config, config)?;
    let paths = OutputPaths::for_input(&cli.out, &cli.input);

    let mut echo = StdoutEcho;
    let mut quiet = NullObserver;
    let observer: &mut dyn FragmentObserver = if stream { &mut echo } else { &mut quiet };

    let record = pipeline.run(&text, &paths, observer).await?;
    if stream {
        println!();
    }

    tracing::info!(
        company = record.elements().company_name().unwrap_or("unknown"),
        "analysis complete"
    );
    Ok(paths)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(paths) => {
            println!("Markdown report: {}", paths.markdown.display());
            println!("HTML report:     {}", paths.html.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_config() {
        let cli = Cli::parse_from([
            "startup-report",
            "acme.txt",
            "--no-charts",
            "--no-templates",
            "--scores",
            "--no-stream",
            "--api-key",
            "sk-test",
        ]);
        let config = cli.pipeline_config();

        assert!(!config.capabilities.charting);
        assert!(config.capabilities.graph_layout);
        assert!(!config.capabilities.templating);
        assert!(config.request_scores);
        assert!(!config.generation.stream);
        assert_eq!(cli.out, PathBuf::from("."));
    }

    #[test]
    fn test_defaults_keep_everything_on() {
        let cli = Cli::parse_from(["startup-report", "acme.txt", "--out", "reports"]);
        let config = cli.pipeline_config();

        assert!(config.capabilities.charting);
        assert!(config.generation.stream);
        assert!(!config.request_scores);
        assert_eq!(cli.out, PathBuf::from("reports"));
    }
}
