use extract::StartupAnalysisRecord;
use handlebars::{html_escape, Handlebars};
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;
use visualize::VisualArtifacts;

use crate::elements::{or_dash, CoreElements, DISCLAIMER, METHODOLOGY, NO_GRAPH_DATA};

pub const REPORT_TEMPLATE: &str = include_str!("../templates/report.html.hbs");
const TEMPLATE_NAME: &str = "report";

/// Values the HTML template refers to. Fields rendered with `{{{ }}}` hold
/// markup that is already escaped.
#[derive(Debug, Clone, Serialize)]
pub struct HtmlContext {
    pub title: String,
    pub company_name: String,
    pub company_name_cell: String,
    pub founded: String,
    pub sector: String,
    pub one_liner: String,
    pub description: String,
    pub extracted_at: String,
    pub radar_b64: Option<String>,
    /// Image, else diagram, else the no-data note. Never empty.
    pub graph_section: String,
    pub keywords_b64: Option<String>,
    pub raw_response: String,
    pub source_rows: String,
    pub methodology: &'static str,
    pub disclaimer: &'static str,
}

impl HtmlContext {
    pub fn build(record: &StartupAnalysisRecord, artifacts: &VisualArtifacts) -> Self {
        let core = CoreElements::resolve(record.elements());

        let graph_section = graph_section(artifacts);

        let source_rows = record
            .sources()
            .iter()
            .map(|s| {
                format!(
                    "        <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    html_escape(or_dash(Some(s.title.as_str()))),
                    html_escape(or_dash(Some(s.url.as_str()))),
                    html_escape(or_dash(Some(s.level.as_str()))),
                    html_escape(or_dash(Some(s.captured_at.as_str()))),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            title: format!("Startup Analysis Report · {}", core.title_name()),
            company_name: core.title_name().to_string(),
            company_name_cell: or_dash(core.name).to_string(),
            founded: or_dash(core.founded).to_string(),
            sector: or_dash(core.sector).to_string(),
            one_liner: or_dash(core.one_liner).to_string(),
            description: or_dash(core.description).to_string(),
            extracted_at: record.extracted_at().to_string(),
            radar_b64: artifacts.radar.as_ref().map(|i| i.base64().to_string()),
            graph_section,
            keywords_b64: artifacts.keywords.as_ref().map(|i| i.base64().to_string()),
            raw_response: record.raw_response().trim().to_string(),
            source_rows,
            methodology: METHODOLOGY,
            disclaimer: DISCLAIMER,
        }
    }
}

/// Graph card body, following the same precedence as the Markdown report.
fn graph_section(artifacts: &VisualArtifacts) -> String {
    if let Some(image) = &artifacts.graph_image {
        return format!("<img class=\"img\" src=\"{}\" alt=\"graph\"/>", image.data_uri());
    }
    match &artifacts.diagram {
        Some(diagram) => format!(
            "<pre class=\"mermaid\">{}</pre>\n      <div class=\"muted\">(renders directly in Mermaid-capable viewers)</div>",
            html_escape(diagram)
        ),
        None => format!("<div class=\"muted\">{}</div>", NO_GRAPH_DATA),
    }
}

pub trait HtmlRenderer: Send + Sync {
    /// Never fails; a renderer that cannot do better returns the skeleton.
    fn render(&self, context: &HtmlContext) -> String;
}

/// Template rendering with `{{#if}}` blocks through handlebars.
pub struct TemplateHtml {
    registry: Handlebars<'static>,
}

impl TemplateHtml {
    pub fn new() -> Result<Self, handlebars::TemplateError> {
        Self::with_template(REPORT_TEMPLATE)
    }

    pub fn with_template(template: &str) -> Result<Self, handlebars::TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_template_string(TEMPLATE_NAME, template)?;
        Ok(Self { registry })
    }
}

impl HtmlRenderer for TemplateHtml {
    fn render(&self, context: &HtmlContext) -> String {
        match self.registry.render(TEMPLATE_NAME, context) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(error = %e, "template rendering failed, using placeholder substitution");
                PlaceholderHtml::default().render(context)
            }
        }
    }
}

static ELSE_BRANCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{\s*else\s*\}\}.*?\{\{\s*/if\s*\}\}").expect("else branch pattern"));

static CONTROL_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{~?\s*[#/^!][^}]*\}\}").expect("control tag pattern"));

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\{\s*([^}]*?)\s*\}\}\}|\{\{\s*([^}]*?)\s*\}\}").expect("placeholder pattern")
});

/// Literal substitution without a templating engine. Conditional blocks are
/// flattened to their first branch, so the structure is always the same and
/// absent values are left blank.
pub struct PlaceholderHtml {
    template: String,
}

impl PlaceholderHtml {
    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The template with every control tag and `else` branch removed.
    fn skeleton(&self) -> String {
        let without_else = ELSE_BRANCH.replace_all(&self.template, "");
        CONTROL_TAG.replace_all(&without_else, "").into_owned()
    }
}

impl Default for PlaceholderHtml {
    fn default() -> Self {
        Self::with_template(REPORT_TEMPLATE)
    }
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl HtmlRenderer for PlaceholderHtml {
    fn render(&self, context: &HtmlContext) -> String {
        let values = serde_json::to_value(context).unwrap_or(Value::Null);
        let skeleton = self.skeleton();

        // single pass, so inserted values are never scanned for placeholders
        PLACEHOLDER
            .replace_all(&skeleton, |caps: &Captures<'_>| {
                if let Some(raw) = caps.get(1) {
                    value_text(values.get(raw.as_str()))
                } else {
                    let key = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                    html_escape(&value_text(values.get(key)))
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::{ExtractedElements, SourceCitation};
    use visualize::EmbeddedImage;

    fn full_record() -> StartupAnalysisRecord {
        let mut elements = ExtractedElements::new();
        elements.insert("company_name", "Acme");
        elements.insert("founded", "2021-03-15");
        elements.insert("sector", "Robotics & Automation");
        elements.insert("one_liner", "Faster picking");
        elements.insert("description", "Warehouse <robots>");
        StartupAnalysisRecord::builder("2025-08-13 10:00:00")
            .elements(elements)
            .raw_response("行业: Robotics\n{{not a placeholder}}")
            .source(SourceCitation {
                title: "Source text analysis".into(),
                url: "N/A".into(),
                level: "L1".into(),
                captured_at: "2025-08-13".into(),
            })
            .build()
    }

    fn full_artifacts() -> VisualArtifacts {
        VisualArtifacts {
            radar: Some(EmbeddedImage::from_png(b"radar")),
            graph_image: Some(EmbeddedImage::from_png(b"graph")),
            diagram: Some("graph TD".to_string()),
            keywords: Some(EmbeddedImage::from_png(b"keywords")),
        }
    }

    fn tokens(html: &str) -> Vec<&str> {
        html.split_whitespace().collect()
    }

    #[test]
    fn test_strategies_agree_when_everything_present() {
        let context = HtmlContext::build(&full_record(), &full_artifacts());
        let templated = TemplateHtml::new().unwrap().render(&context);
        let degraded = PlaceholderHtml::default().render(&context);

        assert_eq!(tokens(&templated), tokens(&degraded));
        assert!(templated.contains("Warehouse &lt;robots&gt;"));
        assert!(templated.contains("Robotics &amp; Automation"));
    }

    #[test]
    fn test_degraded_output_has_no_template_syntax_left() {
        let context = HtmlContext::build(&StartupAnalysisRecord::builder("t").build(), &VisualArtifacts::default());
        let html = PlaceholderHtml::default().render(&context);

        assert!(!html.contains("{{#"));
        assert!(!html.contains("{{/"));
        assert!(!html.contains("{{else"));
        assert!(html.contains("src=\"data:image/png;base64,\""));
        assert!(html.contains("Startup Analysis Report · N/A"));
    }

    #[test]
    fn test_inserted_values_are_not_rescanned() {
        let context = HtmlContext::build(&full_record(), &full_artifacts());
        let html = PlaceholderHtml::default().render(&context);
        assert!(html.contains("{{not a placeholder}}"));
    }

    #[test]
    fn test_templated_fallbacks() {
        let context = HtmlContext::build(&StartupAnalysisRecord::builder("t").build(), &VisualArtifacts::default());
        let html = TemplateHtml::new().unwrap().render(&context);

        assert!(html.contains("No scores available"));
        assert!(html.contains("No graph data available"));
        assert!(html.contains("No keywords available"));
        assert!(html.contains("No sources"));
        assert!(html.contains("<td>—</td>"));
    }

    #[test]
    fn test_diagram_fallback_in_html() {
        let artifacts = VisualArtifacts {
            diagram: Some("graph TD\n    a -->|REL| b".to_string()),
            ..Default::default()
        };
        let context = HtmlContext::build(&full_record(), &artifacts);
        let html = TemplateHtml::new().unwrap().render(&context);
        assert!(html.contains("<pre class=\"mermaid\">graph TD\n    a --&gt;|REL| b</pre>"));
    }

    #[test]
    fn test_degraded_path_keeps_diagram() {
        let diagram = "graph TD\n    company_acme[\"Acme (Company)\"]";
        let artifacts = VisualArtifacts {
            diagram: Some(diagram.to_string()),
            ..Default::default()
        };
        let record = full_record();
        let html = PlaceholderHtml::default().render(&HtmlContext::build(&record, &artifacts));
        let markdown = crate::render_markdown(&record, &artifacts);

        assert!(html.contains("<pre class=\"mermaid\">graph TD\n    company_acme[&quot;Acme (Company)&quot;]</pre>"));
        assert!(markdown.contains(diagram));
        assert!(!html.contains("alt=\"graph\""));
    }

    #[test]
    fn test_degraded_path_without_graph() {
        let record = StartupAnalysisRecord::builder("t").build();
        let artifacts = VisualArtifacts::default();
        let html = PlaceholderHtml::default().render(&HtmlContext::build(&record, &artifacts));
        let markdown = crate::render_markdown(&record, &artifacts);

        assert!(html.contains("<div class=\"muted\">No graph data available</div>"));
        assert!(markdown.contains("> No graph data available"));
    }

    #[test]
    fn test_graph_image_preferred_in_both_strategies() {
        let context = HtmlContext::build(&full_record(), &full_artifacts());
        let uri = EmbeddedImage::from_png(b"graph").data_uri();

        for html in [
            TemplateHtml::new().unwrap().render(&context),
            PlaceholderHtml::default().render(&context),
        ] {
            assert!(html.contains(&format!("src=\"{}\" alt=\"graph\"", uri)));
            assert!(!html.contains("class=\"mermaid\""));
        }
    }

    #[test]
    fn test_broken_template_degrades() {
        // an unknown helper fails at render time
        let renderer = TemplateHtml::with_template("{{missing_helper title}}").unwrap();
        let context = HtmlContext::build(&full_record(), &full_artifacts());
        let html = renderer.render(&context);
        assert!(html.contains("<h1>"));
    }
}
