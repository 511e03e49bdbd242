//! MindMap format (`spec.md` §4.4): nodes referenced as `[N]`, connected by
//! edges; topological score multiplies in each node's in-degree
//! (connectivity) on top of the usual intrinsic weight. A mind map is a
//! graph, so it is first reduced to a spanning tree (BFS from the first
//! declared node, or an explicit `ROOT`) before the engine — which only
//! ever walks trees — can see it.
//!
//! Text input, one record per line:
//! ```text
//! NODE <id> <label>
//! EDGE <from> <to>
//! ROOT <id>
//! ```

use std::collections::{HashMap, HashSet};

use crate::error::{EngineError, EngineResult};
use crate::node::{LineSpan, Node, NodeKind};
use crate::options::Weights;

use super::Format;

pub struct MindMapFormat {
    pub weights: Weights,
}

impl MindMapFormat {
    pub fn new(weights: Weights) -> Self {
        MindMapFormat { weights }
    }
}

impl Default for MindMapFormat {
    fn default() -> Self {
        MindMapFormat::new(Weights::default())
    }
}

impl Format for MindMapFormat {
    fn parse(&self, source: &[u8]) -> EngineResult<Node> {
        let text = String::from_utf8_lossy(source);

        let mut labels: HashMap<String, String> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut edges: Vec<(String, String)> = Vec::new();
        let mut explicit_root: Option<String> = None;

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut parts = trimmed.splitn(3, ' ');
            match parts.next() {
                Some("NODE") => {
                    let id = parts.next().ok_or_else(|| EngineError::Parse("NODE missing id".into()))?;
                    let label = parts.next().unwrap_or(id).to_string();
                    if !labels.contains_key(id) {
                        order.push(id.to_string());
                    }
                    labels.insert(id.to_string(), label);
                }
                Some("EDGE") => {
                    let from = parts.next().ok_or_else(|| EngineError::Parse("EDGE missing from".into()))?;
                    let to = parts.next().ok_or_else(|| EngineError::Parse("EDGE missing to".into()))?;
                    edges.push((from.to_string(), to.to_string()));
                }
                Some("ROOT") => {
                    let id = parts.next().ok_or_else(|| EngineError::Parse("ROOT missing id".into()))?;
                    explicit_root = Some(id.to_string());
                }
                _ => return Err(EngineError::Parse(format!("unrecognized record: {trimmed:?}"))),
            }
        }

        if order.is_empty() {
            return Err(EngineError::Parse("mind map has no nodes".into()));
        }

        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        for (from, to) in &edges {
            adjacency.entry(from.as_str()).or_default().push(to.as_str());
            *in_degree.entry(to.as_str()).or_insert(0) += 1;
        }

        let root_id = explicit_root.unwrap_or_else(|| order[0].clone());

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(root_id.clone());

        let mut line_counter = 0usize;
        let mut root = build_node(&root_id, &labels, &adjacency, &in_degree, &mut visited, self.weights.text, &mut line_counter);

        // Any node unreached from the declared root (a disconnected
        // component) still needs to surface — attach it as an extra
        // top-level child rather than dropping it silently.
        for id in &order {
            if !visited.contains(id) {
                visited.insert(id.clone());
                root.children.push(build_node(id, &labels, &adjacency, &in_degree, &mut visited, self.weights.text, &mut line_counter));
            }
        }

        root.line_span = LineSpan::new(root.line_span.start, line_counter.max(root.line_span.start));
        root.assign_depths(0);
        Ok(root)
    }
}

fn build_node(
    id: &str,
    labels: &HashMap<String, String>,
    adjacency: &HashMap<&str, Vec<&str>>,
    in_degree: &HashMap<&str, usize>,
    visited: &mut HashSet<String>,
    base_weight: f64,
    line_counter: &mut usize,
) -> Node {
    *line_counter += 1;
    let here = *line_counter;
    let label = labels.get(id).cloned().unwrap_or_else(|| id.to_string());
    let degree = *in_degree.get(id).unwrap_or(&0);

    let mut node = Node::new(NodeKind::Section, "mindmap-node", LineSpan::new(here, here));
    node.name = format!("[{id}] {label}");
    node.signature = node.name.clone();
    node.preview = label;
    node.intrinsic_weight = base_weight * (1.0 + degree as f64);

    if let Some(children) = adjacency.get(id) {
        for child_id in children {
            if visited.insert(child_id.to_string()) {
                node.children.push(build_node(child_id, labels, adjacency, in_degree, visited, base_weight, line_counter));
            }
        }
    }
    node.line_span = LineSpan::new(here, (*line_counter).max(here));
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_spanning_tree_from_edges() {
        let src = "NODE 1 Root\nNODE 2 Child A\nNODE 3 Child B\nEDGE 1 2\nEDGE 1 3\n";
        let fmt = MindMapFormat::default();
        let root = fmt.parse(src.as_bytes()).unwrap();
        assert_eq!(root.name, "[1] Root");
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn in_degree_boosts_intrinsic_weight() {
        let src = "NODE 1 Root\nNODE 2 Hub\nNODE 3 A\nNODE 4 B\nEDGE 1 2\nEDGE 3 2\nEDGE 4 2\n";
        let fmt = MindMapFormat::default();
        let root = fmt.parse(src.as_bytes()).unwrap();
        let hub = &root.children[0];
        assert_eq!(hub.name, "[2] Hub");
        assert!(hub.intrinsic_weight > 1.0);
    }

    #[test]
    fn disconnected_nodes_still_surface() {
        let src = "NODE 1 Root\nNODE 2 Orphan\n";
        let fmt = MindMapFormat::default();
        let root = fmt.parse(src.as_bytes()).unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "[2] Orphan");
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        let fmt = MindMapFormat::default();
        assert!(fmt.parse(b"").is_err());
    }
}
