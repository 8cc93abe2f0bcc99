pub mod graph;
pub mod keywords;
pub mod layout;
pub mod radar;
pub mod raster;

pub use graph::{to_diagram, DiagramGraphRenderer, GraphArtifacts, GraphRenderer, LayoutGraphRenderer};
pub use keywords::{KeywordRenderer, NoKeywords, PlottersKeywords, DEFAULT_TOP_K};
pub use layout::SpringLayout;
pub use radar::{NoRadar, PlottersRadar, ScoreRadar};
pub use raster::EmbeddedImage;

use extract::StartupAnalysisRecord;
use serde::{Deserialize, Serialize};

/// Optional rendering capabilities, fixed when the renderers are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderCapabilities {
    /// Raster charts (radar, keyword charts, graph images).
    pub charting: bool,
    /// Force-directed graph images; also needs `charting`.
    pub graph_layout: bool,
    /// Templating engine for the HTML report.
    pub templating: bool,
}

impl Default for RenderCapabilities {
    fn default() -> Self {
        Self {
            charting: true,
            graph_layout: true,
            templating: true,
        }
    }
}

impl RenderCapabilities {
    pub fn none() -> Self {
        Self {
            charting: false,
            graph_layout: false,
            templating: false,
        }
    }
}

/// Whatever the adapters managed to produce; every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualArtifacts {
    pub radar: Option<EmbeddedImage>,
    pub graph_image: Option<EmbeddedImage>,
    pub diagram: Option<String>,
    pub keywords: Option<EmbeddedImage>,
}

pub struct Visualizer {
    radar: Box<dyn ScoreRadar>,
    graph: Box<dyn GraphRenderer>,
    keywords: Box<dyn KeywordRenderer>,
    top_k: usize,
}

impl Visualizer {
    pub fn new(
        radar: Box<dyn ScoreRadar>,
        graph: Box<dyn GraphRenderer>,
        keywords: Box<dyn KeywordRenderer>,
    ) -> Self {
        Self {
            radar,
            graph,
            keywords,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Picks the rich or degraded variant of each adapter.
    pub fn from_capabilities(capabilities: &RenderCapabilities) -> Self {
        let radar: Box<dyn ScoreRadar> = if capabilities.charting {
            Box::new(PlottersRadar::default())
        } else {
            Box::new(NoRadar)
        };
        let graph: Box<dyn GraphRenderer> = if capabilities.charting && capabilities.graph_layout {
            Box::new(LayoutGraphRenderer::default())
        } else {
            Box::new(DiagramGraphRenderer)
        };
        let keywords: Box<dyn KeywordRenderer> = if capabilities.charting {
            Box::new(PlottersKeywords)
        } else {
            Box::new(NoKeywords)
        };

        tracing::debug!(?capabilities, "visualizer configured");
        Self::new(radar, graph, keywords)
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn render(&self, record: &StartupAnalysisRecord) -> VisualArtifacts {
        let radar = self.radar.render(record.scores());
        let GraphArtifacts { image, diagram } = self.graph.render(record.graph());
        let keywords = self.keywords.render(record.keywords(), self.top_k);

        tracing::info!(
            radar = radar.is_some(),
            graph_image = image.is_some(),
            diagram = diagram.is_some(),
            keywords = keywords.is_some(),
            "visualizations rendered"
        );

        VisualArtifacts {
            radar,
            graph_image: image,
            diagram,
            keywords,
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::from_capabilities(&RenderCapabilities::default())
    }
}
