use extract::StartupAnalysisRecord;
use visualize::VisualArtifacts;

use crate::elements::{or_dash, CoreElements, DISCLAIMER, METHODOLOGY, NO_GRAPH_DATA};

fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Renders the Markdown report. Section order is fixed; optional sections are
/// left out when their artifact is missing.
pub fn render_markdown(record: &StartupAnalysisRecord, artifacts: &VisualArtifacts) -> String {
    let core = CoreElements::resolve(record.elements());
    let mut md: Vec<String> = Vec::new();

    md.push(format!("# 🚀 Startup Analysis Report · {}", cell(core.title_name())));
    md.push(String::new());
    md.push(format!("**Generated at**: {}", record.extracted_at()));
    md.push(String::new());

    md.push("## 🧩 Core Elements".to_string());
    md.push(String::new());
    md.push("| Element | Value |".to_string());
    md.push("|---|---|".to_string());
    for (label, value) in core.rows() {
        md.push(format!("| {} | {} |", label, cell(or_dash(value))));
    }
    md.push(String::new());

    if let Some(radar) = &artifacts.radar {
        md.push("## 📊 Investment Score Radar".to_string());
        md.push(format!("![radar]({})", radar.data_uri()));
        md.push(String::new());
    }

    md.push("## 🧠 LLM Analysis (verbatim)".to_string());
    md.push(String::new());
    md.push(record.raw_response().trim().to_string());
    md.push(String::new());

    md.push("## 🔗 Relationship Graph".to_string());
    if let Some(image) = &artifacts.graph_image {
        md.push(format!("![graph]({})", image.data_uri()));
    } else if let Some(diagram) = &artifacts.diagram {
        md.push("```mermaid".to_string());
        md.push(diagram.clone());
        md.push("```".to_string());
    } else {
        md.push(format!("> {}", NO_GRAPH_DATA));
    }
    md.push(String::new());

    if let Some(keywords) = &artifacts.keywords {
        md.push("## ☁️ Keyword Visualization".to_string());
        md.push(format!("![keywords]({})", keywords.data_uri()));
        md.push(String::new());
    }

    if !record.sources().is_empty() {
        md.push("## 🗂️ Sources".to_string());
        md.push(String::new());
        md.push("| Title | URL | Level | Captured at |".to_string());
        md.push("|---|---|---|---|".to_string());
        for source in record.sources() {
            md.push(format!(
                "| {} | {} | {} | {} |",
                cell(or_dash(Some(source.title.as_str()))),
                cell(or_dash(Some(source.url.as_str()))),
                cell(or_dash(Some(source.level.as_str()))),
                cell(or_dash(Some(source.captured_at.as_str()))),
            ));
        }
        md.push(String::new());
    }

    md.push("---".to_string());
    md.push(format!("**Data & methodology**: {}", METHODOLOGY));
    md.push(String::new());
    md.push(format!("_{}_", DISCLAIMER));

    md.join("\n")
}
