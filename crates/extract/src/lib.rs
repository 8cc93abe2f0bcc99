pub mod schema;
pub mod fields;
pub mod keywords;
pub mod graph;

pub use schema::{
    ExtractedElements, GraphEdge, GraphNode, KeywordWeight, RecordBuilder, RelationGraph,
    ScoreVector, SourceCitation, StartupAnalysisRecord,
};
pub use fields::FieldExtractor;
pub use keywords::{KeywordWeighter, KeywordWeighterConfig};
pub use graph::GraphBuilder;

/// Output of the three text stages for one (source, response) pair.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub elements: ExtractedElements,
    pub keywords: Vec<KeywordWeight>,
    pub graph: RelationGraph,
}

pub struct Extractor {
    fields: FieldExtractor,
    weighter: KeywordWeighter,
    graph_builder: GraphBuilder,
}

impl Extractor {
    pub fn new(fields: FieldExtractor, weighter: KeywordWeighter, graph_builder: GraphBuilder) -> Self {
        Self {
            fields,
            weighter,
            graph_builder,
        }
    }

    /// Runs field extraction, keyword weighting and graph building.
    /// None of them fail; missing matches only mean less data.
    pub fn extract(&self, source: &str, response: &str) -> Extraction {
        Extraction {
            elements: self.fields.extract(source, response),
            keywords: self.weighter.weigh(source, response),
            graph: self.graph_builder.build(source, response),
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(FieldExtractor::standard(), KeywordWeighter::default(), GraphBuilder::new())
    }
}
