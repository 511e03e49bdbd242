//! Node importance scoring: positional + topological signals, boosted by
//! grep relevance. See `spec.md` §4.2.

use crate::node::Node;
use crate::options::{Options, SCORE_EPSILON};

const POSITIONAL_ALPHA: f64 = 2.0;
const GREP_K: f64 = 2.0;

/// U-shaped positional score for sibling `i` of `n` (§4.2).
pub fn positional_score(i: usize, n: usize) -> f64 {
    if n <= 1 {
        return 1.0;
    }
    let x = i as f64 / n as f64;
    let f = |v: f64| (1.0 - v).max(0.0).powf(POSITIONAL_ALPHA);
    f(x).max(f(1.0 - x))
}

/// `intrinsic_weight * 1/(1+depth)` (§4.2).
pub fn topological_score(intrinsic_weight: f64, depth: usize) -> f64 {
    intrinsic_weight * (1.0 / (1.0 + depth as f64))
}

/// `1 + k*ln(1+matches)`, or exactly `1.0` (neutral) with no pattern or no
/// matches — multiplicative identity, never zero (§4.2).
pub fn grep_boost(matches: usize) -> f64 {
    1.0 + GREP_K * (1.0 + matches as f64).ln()
}

fn count_matches(node: &Node, pattern: &regex::Regex) -> usize {
    pattern.find_iter(&node.full_text()).count()
}

/// Final per-node score: `grep_boost * (positional + topological)`, floored
/// at `SCORE_EPSILON` so softmax never collapses on an all-zero row.
pub fn score_node(node: &Node, sibling_index: usize, sibling_count: usize, options: &Options) -> f64 {
    let positional = positional_score(sibling_index, sibling_count);
    let topological = topological_score(node.intrinsic_weight, node.depth);
    let boost = match &options.grep_pattern {
        Some(pattern) => grep_boost(count_matches(node, pattern)),
        None => 1.0,
    };
    (boost * (positional + topological)).max(SCORE_EPSILON)
}

/// Score every child of `node` against its siblings, preserving order.
pub fn score_children(node: &Node, options: &Options) -> Vec<f64> {
    let n = node.children.len();
    node.children
        .iter()
        .enumerate()
        .map(|(i, child)| score_node(child, i, n, options))
        .collect()
}
