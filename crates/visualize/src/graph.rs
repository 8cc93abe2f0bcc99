use anyhow::Result;
use extract::{GraphNode, RelationGraph};
use petgraph::graph::DiGraph;
use plotters::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::layout::SpringLayout;
use crate::raster::{draw_label, render_png, Canvas, EmbeddedImage};

const NODE_RADIUS: i32 = 30;
const ARROW_LENGTH: f64 = 12.0;
const ARROW_HALF_WIDTH: f64 = 5.0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphArtifacts {
    pub image: Option<EmbeddedImage>,
    pub diagram: Option<String>,
}

pub trait GraphRenderer: Send + Sync {
    fn render(&self, graph: &RelationGraph) -> GraphArtifacts;
}

/// Replaces every character Mermaid ids cannot hold (`:`, `-`, spaces, ...) with `_`.
pub fn sanitize_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "node".to_string() } else { cleaned }
}

/// Mermaid entity codes for characters that end a label or edge text early.
fn escape_label(label: &str) -> String {
    let mut escaped = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '"' => escaped.push_str("#quot;"),
            '|' => escaped.push_str("#124;"),
            '[' => escaped.push_str("#91;"),
            ']' => escaped.push_str("#93;"),
            '\r' | '\n' => escaped.push(' '),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Mermaid `graph TD` script: one line per node, then one per valid edge.
/// Returns `None` only for a graph without nodes and edges.
pub fn to_diagram(graph: &RelationGraph) -> Option<String> {
    if graph.is_empty() {
        return None;
    }

    let mut ids: HashMap<&str, String> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut lines = vec!["graph TD".to_string()];

    for node in &graph.nodes {
        let base = sanitize_id(&node.id);
        let mut id = base.clone();
        let mut suffix = 2;
        while taken.contains(&id) {
            id = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        taken.insert(id.clone());

        lines.push(format!(
            "    {}[\"{} ({})\"]",
            id,
            escape_label(node.display_label()),
            escape_label(node.display_type())
        ));
        ids.insert(node.id.as_str(), id);
    }

    for edge in graph.valid_edges() {
        let (Some(source), Some(target)) = (ids.get(edge.source.as_str()), ids.get(edge.target.as_str())) else {
            continue;
        };
        let rel = edge.rel.trim();
        if rel.is_empty() {
            lines.push(format!("    {} --> {}", source, target));
        } else {
            lines.push(format!("    {} -->|{}| {}", source, escape_label(rel), target));
        }
    }

    Some(lines.join("\n"))
}

/// Diagram only; used when no layout/raster capability is present.
pub struct DiagramGraphRenderer;

impl GraphRenderer for DiagramGraphRenderer {
    fn render(&self, graph: &RelationGraph) -> GraphArtifacts {
        GraphArtifacts {
            image: None,
            diagram: to_diagram(graph),
        }
    }
}

/// Force-directed raster image plus the diagram.
pub struct LayoutGraphRenderer {
    width: u32,
    height: u32,
    layout: SpringLayout,
}

impl LayoutGraphRenderer {
    pub fn new(width: u32, height: u32, layout: SpringLayout) -> Self {
        Self {
            width,
            height,
            layout,
        }
    }

    fn draw(&self, canvas: &Canvas<'_>, graph: &RelationGraph) -> Result<()> {
        // Only valid edges make it into the layout graph
        let mut layout_graph: DiGraph<&GraphNode, &str> = DiGraph::new();
        let mut index = HashMap::new();
        for node in &graph.nodes {
            index.entry(node.id.as_str()).or_insert_with(|| layout_graph.add_node(node));
        }
        for edge in graph.valid_edges() {
            layout_graph.add_edge(index[edge.source.as_str()], index[edge.target.as_str()], edge.rel.as_str());
        }

        let positions = self.layout.positions(&layout_graph);
        let margin = (NODE_RADIUS * 2) as f64;
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        let to_px = |(x, y): (f64, f64)| -> (f64, f64) {
            (half_w + x * (half_w - margin), half_h - y * (half_h - margin))
        };
        let points: Vec<(f64, f64)> = positions.into_iter().map(to_px).collect();
        let edge_color = RGBColor(90, 90, 90);

        for edge in layout_graph.edge_indices() {
            let Some((a, b)) = layout_graph.edge_endpoints(edge) else {
                continue;
            };
            let (from, to) = (points[a.index()], points[b.index()]);
            self.draw_arrow(canvas, from, to, &edge_color)?;

            let rel = layout_graph[edge];
            if !rel.is_empty() {
                let mid = (((from.0 + to.0) / 2.0) as i32, ((from.1 + to.1) / 2.0) as i32 - 8);
                draw_label(canvas, rel, mid, 12.0, &edge_color);
            }
        }

        let fill = RGBColor(198, 219, 239);
        for node in layout_graph.node_indices() {
            let (x, y) = points[node.index()];
            let center = (x as i32, y as i32);
            canvas.draw(&Circle::new(center, NODE_RADIUS, fill.filled()))?;
            canvas.draw(&Circle::new(center, NODE_RADIUS, BLACK.stroke_width(1)))?;

            let data = layout_graph[node];
            draw_label(canvas, data.display_label(), (center.0, center.1 - 7), 13.0, &BLACK);
            draw_label(canvas, &format!("({})", data.display_type()), (center.0, center.1 + 9), 11.0, &BLACK);
        }

        Ok(())
    }

    fn draw_arrow(&self, canvas: &Canvas<'_>, from: (f64, f64), to: (f64, f64), color: &RGBColor) -> Result<()> {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len = dx.hypot(dy);
        if len <= (NODE_RADIUS * 2) as f64 {
            return Ok(());
        }
        let (ux, uy) = (dx / len, dy / len);
        let r = NODE_RADIUS as f64;

        let start = (from.0 + ux * r, from.1 + uy * r);
        let tip = (to.0 - ux * r, to.1 - uy * r);
        let base = (tip.0 - ux * ARROW_LENGTH, tip.1 - uy * ARROW_LENGTH);
        let px = |p: (f64, f64)| (p.0.round() as i32, p.1.round() as i32);

        canvas.draw(&PathElement::new(vec![px(start), px(base)], color.stroke_width(2)))?;
        let head = vec![
            px(tip),
            px((base.0 - uy * ARROW_HALF_WIDTH, base.1 + ux * ARROW_HALF_WIDTH)),
            px((base.0 + uy * ARROW_HALF_WIDTH, base.1 - ux * ARROW_HALF_WIDTH)),
        ];
        canvas.draw(&Polygon::new(head, color.filled()))?;
        Ok(())
    }
}

impl Default for LayoutGraphRenderer {
    fn default() -> Self {
        Self::new(600, 450, SpringLayout::default())
    }
}

impl GraphRenderer for LayoutGraphRenderer {
    fn render(&self, graph: &RelationGraph) -> GraphArtifacts {
        let diagram = to_diagram(graph);
        if graph.nodes.is_empty() {
            return GraphArtifacts { image: None, diagram };
        }

        let image = match render_png(self.width, self.height, |canvas| self.draw(canvas, graph)) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(error = %e, "graph image rendering failed, keeping diagram only");
                None
            }
        };
        GraphArtifacts { image, diagram }
    }
}
