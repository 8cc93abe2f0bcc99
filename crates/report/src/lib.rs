pub mod elements;
pub mod html;
pub mod markdown;

pub use html::{HtmlContext, HtmlRenderer, PlaceholderHtml, TemplateHtml};
pub use markdown::render_markdown;

use extract::StartupAnalysisRecord;
use visualize::{RenderCapabilities, VisualArtifacts};

/// Both report documents, fully rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedReport {
    pub markdown: String,
    pub html: String,
}

pub struct ReportComposer {
    html: Box<dyn HtmlRenderer>,
}

impl ReportComposer {
    pub fn new(html: Box<dyn HtmlRenderer>) -> Self {
        Self { html }
    }

    pub fn from_capabilities(capabilities: &RenderCapabilities) -> Self {
        if !capabilities.templating {
            return Self::new(Box::new(PlaceholderHtml::default()));
        }
        match TemplateHtml::new() {
            Ok(renderer) => Self::new(Box::new(renderer)),
            Err(e) => {
                tracing::warn!(error = %e, "report template rejected, using placeholder substitution");
                Self::new(Box::new(PlaceholderHtml::default()))
            }
        }
    }

    pub fn markdown(&self, record: &StartupAnalysisRecord, artifacts: &VisualArtifacts) -> String {
        render_markdown(record, artifacts)
    }

    pub fn html(&self, record: &StartupAnalysisRecord, artifacts: &VisualArtifacts) -> String {
        let context = HtmlContext::build(record, artifacts);
        self.html.render(&context)
    }

    pub fn compose(&self, record: &StartupAnalysisRecord, artifacts: &VisualArtifacts) -> ComposedReport {
        ComposedReport {
            markdown: self.markdown(record, artifacts),
            html: self.html(record, artifacts),
        }
    }
}

impl Default for ReportComposer {
    fn default() -> Self {
        Self::from_capabilities(&RenderCapabilities::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::ExtractedElements;

    fn record() -> StartupAnalysisRecord {
        let mut elements = ExtractedElements::new();
        elements.insert("company_name", "Acme");
        StartupAnalysisRecord::builder("2025-08-13 10:00:00")
            .elements(elements)
            .raw_response("Analysis body")
            .build()
    }

    #[test]
    fn test_compose_produces_both_documents() {
        let report = ReportComposer::default().compose(&record(), &VisualArtifacts::default());

        assert!(report.markdown.starts_with("# 🚀 Startup Analysis Report · Acme"));
        assert!(report.html.contains("<h1>🚀 Startup Analysis Report · Acme</h1>"));
        assert!(report.html.contains("Analysis body"));
    }

    #[test]
    fn test_without_templating_uses_placeholders() {
        let composer = ReportComposer::from_capabilities(&RenderCapabilities::none());
        let html = composer.html(&record(), &VisualArtifacts::default());

        assert!(!html.contains("{{"));
        assert!(html.contains("Generated at: 2025-08-13 10:00:00"));
    }
}
