use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field names recognized by the extractors and the report composer.
pub mod fields {
    pub const COMPANY_NAME: &str = "company_name";
    pub const FOUNDED: &str = "founded";
    pub const SECTOR: &str = "sector";
    pub const ONE_LINER: &str = "one_liner";
    pub const DESCRIPTION: &str = "description";
}

/// Field name -> extracted value. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedElements(BTreeMap<String, String>);

impl ExtractedElements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// First non-blank value among `keys`, so legacy aliases resolve too.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.get(k))
            .find(|v| !v.trim().is_empty())
    }

    pub fn company_name(&self) -> Option<&str> {
        self.get(fields::COMPANY_NAME)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordWeight {
    pub term: String,
    pub weight: f64,
}

impl KeywordWeight {
    pub fn new(term: impl Into<String>, weight: f64) -> Self {
        Self {
            term: term.into(),
            weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type: node_type.into(),
        }
    }

    /// Label to display, falling back to the id when the label is blank.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.id
        } else {
            &self.label
        }
    }

    pub fn display_type(&self) -> &str {
        if self.node_type.trim().is_empty() {
            "Node"
        } else {
            &self.node_type
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub rel: String,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            rel: rel.into(),
        }
    }
}

/// Small typed node/edge graph. Node and relation types are open strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node unless one with the same id already exists.
    /// Returns whether the node was inserted.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.contains_node(&node.id) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Edges are stored as given; dangling ones are filtered by `valid_edges`.
    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges whose endpoints both reference declared nodes.
    pub fn valid_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges
            .iter()
            .filter(|e| self.contains_node(&e.source) && self.contains_node(&e.target))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Scoring dimension -> value. Unknown dimensions are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreVector(BTreeMap<String, f64>);

impl ScoreVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dimension: impl Into<String>, value: f64) {
        self.0.insert(dimension.into(), value);
    }

    pub fn get(&self, dimension: &str) -> Option<f64> {
        self.0.get(dimension).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reads every numeric member of a JSON object; other members are skipped.
    pub fn from_json_object(value: &serde_json::Value) -> Self {
        let mut scores = Self::new();
        if let Some(object) = value.as_object() {
            for (key, member) in object {
                if let Some(number) = member.as_f64() {
                    scores.insert(key.clone(), number);
                }
            }
        }
        scores
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ScoreVector {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut scores = Self::new();
        for (k, v) in iter {
            scores.insert(k, v);
        }
        scores
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub title: String,
    pub url: String,
    pub level: String,
    pub captured_at: String,
}

/// Everything one analysis run produced. Built once, then only read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupAnalysisRecord {
    extracted_at: String,
    source_text: String,
    raw_response: String,
    elements: ExtractedElements,
    graph: RelationGraph,
    scores: ScoreVector,
    keywords: Vec<KeywordWeight>,
    sources: Vec<SourceCitation>,
}

impl StartupAnalysisRecord {
    pub fn builder(extracted_at: impl Into<String>) -> RecordBuilder {
        RecordBuilder::new(extracted_at)
    }

    pub fn extracted_at(&self) -> &str {
        &self.extracted_at
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn raw_response(&self) -> &str {
        &self.raw_response
    }

    pub fn elements(&self) -> &ExtractedElements {
        &self.elements
    }

    pub fn graph(&self) -> &RelationGraph {
        &self.graph
    }

    pub fn scores(&self) -> &ScoreVector {
        &self.scores
    }

    pub fn keywords(&self) -> &[KeywordWeight] {
        &self.keywords
    }

    pub fn sources(&self) -> &[SourceCitation] {
        &self.sources
    }
}

pub struct RecordBuilder {
    record: StartupAnalysisRecord,
}

impl RecordBuilder {
    pub fn new(extracted_at: impl Into<String>) -> Self {
        Self {
            record: StartupAnalysisRecord {
                extracted_at: extracted_at.into(),
                source_text: String::new(),
                raw_response: String::new(),
                elements: ExtractedElements::new(),
                graph: RelationGraph::new(),
                scores: ScoreVector::new(),
                keywords: Vec::new(),
                sources: Vec::new(),
            },
        }
    }

    /// Stores at most `max_chars` characters of the source, marking a cut with `...`.
    pub fn source_excerpt(mut self, text: &str, max_chars: usize) -> Self {
        self.record.source_text = match text.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text.to_string(),
        };
        self
    }

    pub fn raw_response(mut self, response: impl Into<String>) -> Self {
        self.record.raw_response = response.into();
        self
    }

    pub fn elements(mut self, elements: ExtractedElements) -> Self {
        self.record.elements = elements;
        self
    }

    pub fn graph(mut self, graph: RelationGraph) -> Self {
        self.record.graph = graph;
        self
    }

    pub fn scores(mut self, scores: ScoreVector) -> Self {
        self.record.scores = scores;
        self
    }

    pub fn keywords(mut self, keywords: Vec<KeywordWeight>) -> Self {
        self.record.keywords = keywords;
        self
    }

    pub fn source(mut self, citation: SourceCitation) -> Self {
        self.record.sources.push(citation);
        self
    }

    pub fn build(self) -> StartupAnalysisRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_edges_skip_dangling() {
        let mut graph = RelationGraph::new();
        graph.add_node(GraphNode::new("company:acme", "Acme", "Company"));
        graph.add_node(GraphNode::new("person:jane", "Jane", "Person"));
        graph.add_edge(GraphEdge::new("company:acme", "person:jane", "FOUNDED_BY"));
        graph.add_edge(GraphEdge::new("company:acme", "investor:ghost", "INVESTED_IN"));

        let valid: Vec<_> = graph.valid_edges().collect();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].rel, "FOUNDED_BY");
    }

    #[test]
    fn test_duplicate_node_ids_rejected() {
        let mut graph = RelationGraph::new();
        assert!(graph.add_node(GraphNode::new("company:acme", "Acme", "Company")));
        assert!(!graph.add_node(GraphNode::new("company:acme", "ACME", "Company")));
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn test_source_excerpt_truncates_by_chars() {
        let text = "机器人".repeat(300);
        let record = StartupAnalysisRecord::builder("2025-01-01 00:00:00")
            .source_excerpt(&text, 500)
            .build();
        assert_eq!(record.source_text().chars().count(), 503);
        assert!(record.source_text().ends_with("..."));

        let short = StartupAnalysisRecord::builder("t")
            .source_excerpt("short", 500)
            .build();
        assert_eq!(short.source_text(), "short");
    }

    #[test]
    fn test_scores_from_json_skip_non_numeric() {
        let value = serde_json::json!({"people": 8, "market": 7.5, "note": "strong"});
        let scores = ScoreVector::from_json_object(&value);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores.get("market"), Some(7.5));
        assert_eq!(scores.get("note"), None);
    }

    #[test]
    fn test_first_of_uses_aliases() {
        let mut elements = ExtractedElements::new();
        elements.insert("industry", "Robotics");
        assert_eq!(elements.first_of(&["sector", "industry"]), Some("Robotics"));
        assert_eq!(elements.first_of(&["founded"]), None);
    }
}
