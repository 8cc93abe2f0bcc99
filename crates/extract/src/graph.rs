use crate::fields;
use crate::schema::{GraphEdge, GraphNode, RelationGraph};

pub const COMPANY: &str = "Company";
pub const PERSON: &str = "Person";
pub const FOUNDED_BY: &str = "FOUNDED_BY";

pub fn company_node_id(name: &str) -> String {
    format!("company:{}", name.to_lowercase())
}

pub fn person_node_id(name: &str) -> String {
    format!("person:{}", name.to_lowercase())
}

/// Derives the company/founder graph from the same text the fields come from.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, source: &str, response: &str) -> RelationGraph {
        let mut graph = RelationGraph::new();

        // Same heuristic as the company_name field, so ids and labels agree
        let Some(company) = fields::company_name(source) else {
            return graph;
        };
        let company_id = company_node_id(&company);
        graph.add_node(GraphNode::new(company_id.clone(), company, COMPANY));

        if let Some(founder) = fields::founder(response) {
            let person_id = person_node_id(&founder);
            graph.add_node(GraphNode::new(person_id.clone(), founder, PERSON));
            graph.add_edge(GraphEdge::new(company_id, person_id, FOUNDED_BY));
        }

        tracing::debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "built relation graph"
        );
        graph
    }
}
