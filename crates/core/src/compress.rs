//! Top-level engine entry point (`spec.md` §6): wires the scorer, allocator,
//! Level-of-Detail renderer and Budget Enforcer into the single call external
//! collaborators use.

use tracing::{debug, instrument, warn};

use crate::error::{EngineError, EngineResult};
use crate::format::{self, Format};
use crate::node::{BodyLine, Node, OutputLine};
use crate::options::{CharBudget, Options};
use crate::{enforcer, format::text::TextFormat};

/// Parse `source` with `fmt` and compress the result. On a parse failure,
/// retries once with the plain-text fallback format before surfacing the
/// error (§7 ParseError policy) — a degraded rendering beats a hard failure.
#[instrument(skip(fmt, source, options))]
pub fn compress_source(fmt: &dyn Format, source: &[u8], budget: CharBudget, options: &Options) -> EngineResult<Vec<OutputLine>> {
    match fmt.parse(source) {
        Ok(tree) => compress(fmt, &tree, budget, options),
        Err(err) => {
            warn!(error = %err, "format parse failed, retrying with text fallback");
            let fallback = TextFormat::new(options.weights);
            let tree = fallback.parse(source)?;
            compress(&fallback, &tree, budget, options)
        }
    }
}

/// Compress an already-parsed tree. This is the pure `(tree, budget,
/// options) -> output` function described in §5 — no I/O, no retries.
#[instrument(skip(fmt, tree, options))]
pub fn compress(fmt: &dyn Format, tree: &Node, budget: CharBudget, options: &Options) -> EngineResult<Vec<OutputLine>> {
    options.validate()?;
    let cap = options.effective_cap(&budget);

    let pruned;
    let tree = match options.range {
        Some((start, end)) => {
            pruned = prune_to_range(tree, start, end).unwrap_or_else(|| empty_like(tree));
            &pruned
        }
        None => tree,
    };

    if cap == 0 {
        return Ok(Vec::new());
    }

    // BudgetTooSmall (§7): even the root's bare name does not fit. Degrade to
    // a single truncated line rather than failing.
    if let Some(overview) = fmt.overview(tree) {
        if overview.chars().count() > cap {
            debug!(cap, "budget too small for root overview, degrading to truncated line");
            let truncated = format::truncate_with_ellipsis(&overview, cap);
            return Ok(vec![OutputLine::new(tree.line_span.start as f64, truncated, tree.intrinsic_weight)]);
        }
    }

    let rendered = format::render(fmt, tree, cap, options);
    let enforced = enforcer::enforce(rendered, cap, budget.width as usize, options);
    Ok(apply_line_number_prefix(enforced, options))
}

fn apply_line_number_prefix(lines: Vec<OutputLine>, options: &Options) -> Vec<OutputLine> {
    if !options.line_numbers {
        return lines;
    }
    lines
        .into_iter()
        .map(|mut l| {
            l.text = format!("{}: {}", l.line_number, l.text);
            l
        })
        .collect()
}

/// Keep only the subtree overlapping `[start, end]`, truncating the last
/// surviving line character-wise when `end` is fractional (§6, scenario S6).
fn prune_to_range(node: &Node, start: f64, end: f64) -> Option<Node> {
    let node_start = node.line_span.start as f64;
    let node_end = node.line_span.end as f64;
    if node_end < start || node_start > end {
        return None;
    }

    let mut pruned = node.clone();
    pruned.body_lines = node
        .body_lines
        .iter()
        .filter_map(|line| truncate_body_line(line, start, end))
        .collect();
    pruned.children = node.children.iter().filter_map(|child| prune_to_range(child, start, end)).collect();

    if pruned.body_lines.is_empty() && pruned.children.is_empty() && !node.is_leaf() {
        return None;
    }

    let lo = pruned
        .body_lines
        .first()
        .map(|l| l.line_number)
        .into_iter()
        .chain(pruned.children.first().map(|c| c.line_span.start))
        .min()
        .unwrap_or(node.line_span.start);
    let hi = pruned
        .body_lines
        .last()
        .map(|l| l.line_number)
        .into_iter()
        .chain(pruned.children.last().map(|c| c.line_span.end))
        .max()
        .unwrap_or(node.line_span.end);
    pruned.line_span = crate::node::LineSpan::new(lo, hi);
    Some(pruned)
}

fn truncate_body_line(line: &BodyLine, start: f64, end: f64) -> Option<BodyLine> {
    let ln = line.line_number as f64;
    let start_floor = start.floor();
    let end_floor = end.floor();
    if ln < start_floor || ln > end_floor {
        return None;
    }

    let mut text = line.text.clone();
    if ln == end_floor && end.fract() > 0.0 {
        let total = text.chars().count();
        let keep = (end.fract() * total as f64).floor() as usize;
        text = text.chars().take(keep).collect();
    }
    if ln == start_floor && start.fract() > 0.0 {
        let total = text.chars().count();
        let skip = (start.fract() * total as f64).floor() as usize;
        text = text.chars().skip(skip).collect();
    }
    Some(BodyLine { line_number: line.line_number, text })
}

fn empty_like(node: &Node) -> Node {
    let mut empty = node.clone();
    empty.body_lines.clear();
    empty.children.clear();
    empty
}
