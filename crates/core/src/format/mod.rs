//! Format contract (`spec.md` §4.1) and the shared Level-of-Detail renderer
//! (§4.4) that every format plugs into.

pub mod folder;
pub mod markdown;
pub mod mindmap;
pub mod python;
pub mod text;

use crate::error::EngineResult;
use crate::node::{total_chars, Node, OutputLine};
use crate::options::Options;
use crate::{allocator, scorer, ucurve};

/// Discrete rendering density, densest first. See `spec.md` §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lod {
    Focus,
    Detailed,
    Regional,
    Overview,
    Fold,
}

/// A format collaborator: parses raw bytes into a [`Node`] tree and supplies
/// the non-recursive rendering forms the shared renderer composes.
///
/// `Focus` (verbatim reproduction of a node's own body) and `Fold` (an
/// elision marker) are kind-agnostic, so the engine provides them itself —
/// a format only needs to say how it wants to look at `Detailed` (a
/// recursion header, for containers), `Regional` (signature + preview), and
/// `Overview` (bare name).
pub trait Format: Sync {
    fn parse(&self, source: &[u8]) -> EngineResult<Node>;

    /// Header line(s) for `Detailed`/`Focus` recursion into a container's
    /// children (e.g. `"class Name(Bases):"`, `"## Heading"`). `None` means
    /// this node has no structured detailed form (typical for leaves, which
    /// fall back to verbatim/U-curve rendering instead).
    fn detailed_header(&self, node: &Node) -> Option<String> {
        if node.signature.is_empty() {
            None
        } else {
            Some(node.signature.clone())
        }
    }

    /// Signature + first preview line, no recursion (~10:1).
    fn regional(&self, node: &Node) -> Option<Vec<String>> {
        if node.signature.is_empty() {
            return None;
        }
        let mut lines = vec![node.signature.clone()];
        if !node.preview.is_empty() {
            lines.push(node.preview.clone());
        }
        Some(lines)
    }

    /// Bare name only (~100:1).
    fn overview(&self, node: &Node) -> Option<String> {
        if node.name.is_empty() {
            None
        } else {
            Some(node.name.clone())
        }
    }
}

fn fold_text(node: &Node) -> String {
    format!("[{} more lines…]", node.line_span.len())
}

/// Verbatim reproduction of `node`'s full source span. For a leaf this is
/// just its own body lines; for a container whose text lives entirely in
/// `children` (the common case — a class with only method children, a
/// module root), that alone would be empty, so a container's Focus is its
/// own header line (the same text `Detailed` would show) plus every
/// descendant's Focus, recursively, merged back into source order.
fn focus_lines(fmt: &dyn Format, node: &Node) -> Vec<OutputLine> {
    let mut lines: Vec<OutputLine> =
        node.body_lines.iter().map(|l| OutputLine::new(l.line_number as f64, l.text.clone(), node.intrinsic_weight)).collect();

    if !node.is_leaf() {
        if let Some(header_text) = fmt.detailed_header(node) {
            lines.extend(
                header_text
                    .lines()
                    .map(|l| OutputLine::new(node.line_span.start as f64, l, node.intrinsic_weight)),
            );
        }
        for child in &node.children {
            lines.extend(focus_lines(fmt, child));
        }
        lines.sort_by(|a, b| a.line_number.partial_cmp(&b.line_number).unwrap_or(std::cmp::Ordering::Equal));
    }
    lines
}

/// Render `node` into at most `budget` characters, choosing the densest LoD
/// that fits (`spec.md` §4.4). This is the shared "Level-of-Detail
/// Renderer" component; per-format behavior comes in only through the
/// [`Format`] hooks.
pub fn render(fmt: &dyn Format, node: &Node, budget: usize, options: &Options) -> Vec<OutputLine> {
    if budget == 0 {
        return Vec::new();
    }

    if node.is_leaf() {
        return render_leaf(fmt, node, budget, options);
    }

    // Focus: verbatim reproduction of this node's entire source span,
    // descendants included — Focus always means "identical to source"
    // (round-trip property, spec.md §8 invariant 4). An empty result only
    // counts as Focus when the node's span is genuinely empty; otherwise an
    // empty `focus` means nothing has been gathered yet and must fall
    // through to Detailed rather than being accepted as a trivial fit.
    let focus = focus_lines(fmt, node);
    if (!focus.is_empty() || node.line_span.is_empty()) && total_chars(&focus) <= budget {
        return focus;
    }

    // Detailed: header line(s) + recursively rendered, budget-allocated children.
    if let Some(header_text) = fmt.detailed_header(node) {
        let header: Vec<OutputLine> =
            header_text.lines().map(|l| OutputLine::new(node.line_span.start as f64, l, node.intrinsic_weight)).collect();
        let header_cost = total_chars(&header);
        if header_cost < budget {
            let child_budget = budget - header_cost;
            let children_rendered = render_children(fmt, node, child_budget, options);
            let mut combined = header;
            combined.extend(children_rendered);
            if total_chars(&combined) <= budget {
                return combined;
            }
        }
    }

    // Regional: signature + preview, no recursion.
    if let Some(lines) = fmt.regional(node) {
        let rendered: Vec<OutputLine> =
            lines.iter().map(|l| OutputLine::new(node.line_span.start as f64, l.clone(), node.intrinsic_weight)).collect();
        if total_chars(&rendered) <= budget {
            return rendered;
        }
    }

    // Overview: bare name.
    if let Some(name) = fmt.overview(node) {
        let line = OutputLine::new(node.line_span.start as f64, name, node.intrinsic_weight);
        if line.char_len() <= budget {
            return vec![line];
        }
        let truncated = truncate_with_ellipsis(&line.text, budget);
        return vec![OutputLine::new(node.line_span.start as f64, truncated, node.intrinsic_weight)];
    }

    // Fold: always fits something, even if it itself must be truncated.
    fold_or_truncated(node, budget)
}

fn render_leaf(fmt: &dyn Format, node: &Node, budget: usize, options: &Options) -> Vec<OutputLine> {
    let focus = focus_lines(fmt, node);
    if total_chars(&focus) <= budget {
        return focus;
    }

    if !node.body_lines.is_empty() {
        let mean_width = (node.body_char_count() / node.body_lines.len().max(1)).max(1);
        let target_k = ucurve::target_k_for_budget(budget, mean_width);
        let selection = ucurve::select(node.body_lines.len(), target_k);
        let rendered = render_u_curve_selection(node, &selection);
        if total_chars(&rendered) <= budget {
            return rendered;
        }
        // Narrower second attempt before giving up to Overview/Fold.
        let tighter = ucurve::select(node.body_lines.len(), (target_k / 2).max(1));
        let rendered = render_u_curve_selection(node, &tighter);
        if total_chars(&rendered) <= budget {
            return rendered;
        }
    }

    if let Some(lines) = fmt.regional(node) {
        let rendered: Vec<OutputLine> =
            lines.iter().map(|l| OutputLine::new(node.line_span.start as f64, l.clone(), node.intrinsic_weight)).collect();
        if total_chars(&rendered) <= budget {
            return rendered;
        }
    }

    if let Some(name) = fmt.overview(node) {
        let line = OutputLine::new(node.line_span.start as f64, name, node.intrinsic_weight);
        if line.char_len() <= budget {
            return vec![line];
        }
    }

    let _ = options;
    fold_or_truncated(node, budget)
}

fn render_u_curve_selection(node: &Node, selection: &[ucurve::Selected]) -> Vec<OutputLine> {
    let mut out = Vec::with_capacity(selection.len());
    for item in selection {
        match item {
            ucurve::Selected::Line(i) => {
                let line = &node.body_lines[*i];
                out.push(OutputLine::new(line.line_number as f64, line.text.clone(), node.intrinsic_weight));
            }
            ucurve::Selected::Fold { start, end } => {
                let start_line = node.body_lines[*start].line_number;
                let end_line = node.body_lines[*end].line_number;
                let count = end - start + 1;
                let midpoint = (start_line as f64 + end_line as f64) / 2.0;
                out.push(OutputLine::fold_marker(midpoint, format!("[…{count} more lines…]")));
            }
        }
    }
    out
}

fn fold_or_truncated(node: &Node, budget: usize) -> Vec<OutputLine> {
    let text = fold_text(node);
    if text.chars().count() <= budget {
        return vec![OutputLine::fold_marker(node.line_span.start as f64, text)];
    }
    let truncated = truncate_with_ellipsis(&text, budget);
    vec![OutputLine::fold_marker(node.line_span.start as f64, truncated)]
}

pub(crate) fn truncate_with_ellipsis(text: &str, budget: usize) -> String {
    if budget == 0 {
        return String::new();
    }
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= budget {
        return text.to_string();
    }
    if budget < 2 {
        return chars[..budget].iter().collect();
    }
    let keep = budget - 1;
    let mut out: String = chars[..keep].iter().collect();
    out.push('…');
    out
}

fn render_children(fmt: &dyn Format, node: &Node, budget: usize, options: &Options) -> Vec<OutputLine> {
    let scores = scorer::score_children(node, options);
    let shares = allocator::allocate(&scores, budget, options.temperature, options.min_line_chars);

    let mut out = Vec::new();
    for (child, share) in node.children.iter().zip(shares.iter()) {
        match share {
            allocator::Share::Render(child_budget) => {
                out.extend(render(fmt, child, *child_budget, options));
            }
            allocator::Share::Fold => {
                out.push(OutputLine::fold_marker(child.line_span.start as f64, fold_text(child)));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{LineSpan, NodeKind};

    struct DummyFormat;
    impl Format for DummyFormat {
        fn parse(&self, _source: &[u8]) -> EngineResult<Node> {
            unimplemented!()
        }
    }

    #[test]
    fn truncate_adds_ellipsis() {
        let truncated = truncate_with_ellipsis("hello world", 5);
        assert_eq!(truncated.chars().count(), 5);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn truncate_noop_when_fits() {
        assert_eq!(truncate_with_ellipsis("hi", 10), "hi");
    }

    #[test]
    fn leaf_renders_verbatim_with_ample_budget() {
        let mut node = Node::new(NodeKind::TextBlock, "text", LineSpan::new(1, 2));
        node.body_lines.push(crate::node::BodyLine { line_number: 1, text: "a".into() });
        node.body_lines.push(crate::node::BodyLine { line_number: 2, text: "b".into() });
        let options = Options::default();
        let out = render(&DummyFormat, &node, 100, &options);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "a");
    }

    #[test]
    fn focus_on_container_reproduces_descendant_body_lines() {
        let mut child = Node::new(NodeKind::Definition, "function", LineSpan::new(2, 3));
        child.name = "helper".into();
        child.signature = "def helper():".into();
        child.body_lines.push(crate::node::BodyLine { line_number: 3, text: "    return 1".into() });

        let mut container = Node::new(NodeKind::Container, "class", LineSpan::new(1, 3));
        container.name = "A".into();
        container.signature = "class A:".into();
        container.children.push(child);

        let options = Options::default();
        let out = render(&DummyFormat, &container, 100, &options);
        assert!(out.iter().any(|l| l.text.contains("return 1")));
    }

    #[test]
    fn tiny_budget_produces_fold_or_truncated_overview() {
        let mut node = Node::new(NodeKind::TextBlock, "text", LineSpan::new(1, 100));
        for i in 1..=100 {
            node.body_lines.push(crate::node::BodyLine { line_number: i, text: format!("line {i}") });
        }
        let options = Options::default();
        let out = render(&DummyFormat, &node, 10, &options);
        let total: usize = out.iter().map(|l| l.char_len()).sum();
        assert!(total <= 10);
    }
}
