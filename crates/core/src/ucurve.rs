//! U-Curve Line Selector: when a leaf text block exceeds its budget, picks
//! which source lines to keep, biased toward head and tail. See
//! `spec.md` §4.5.

const BETA: f64 = 2.0;

/// One outcome of [`select`]: keep a specific source line, or fold a
/// contiguous run of dropped lines (inclusive start/end, 0-indexed into the
/// original slice).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selected {
    Line(usize),
    Fold { start: usize, end: usize },
}

/// Select `target_k` of `total_lines` source lines, biased to head and tail.
///
/// `target_k >= total_lines` keeps everything unchanged (§4.5 edge case).
/// `target_k < 2` keeps only the first line plus one trailing fold marker.
pub fn select(total_lines: usize, target_k: usize) -> Vec<Selected> {
    if total_lines == 0 {
        return Vec::new();
    }
    if target_k >= total_lines {
        return (0..total_lines).map(Selected::Line).collect();
    }
    if target_k < 2 {
        let mut out = vec![Selected::Line(0)];
        if total_lines > 1 {
            out.push(Selected::Fold { start: 1, end: total_lines - 1 });
        }
        return out;
    }

    let mut weighted: Vec<(usize, f64)> = (0..total_lines)
        .map(|i| {
            let x = i as f64 / total_lines as f64;
            let w = (1.0 - x).powf(BETA).max(x.powf(BETA));
            (i, w)
        })
        .collect();
    // Descending by weight; stable tie-break by original index keeps the
    // selection deterministic.
    weighted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));

    let mut keep: Vec<usize> = weighted.into_iter().take(target_k).map(|(i, _)| i).collect();
    keep.sort_unstable();

    let mut out = Vec::with_capacity(keep.len() * 2);
    let mut cursor = 0usize;
    for idx in keep {
        if idx > cursor {
            out.push(Selected::Fold { start: cursor, end: idx - 1 });
        }
        out.push(Selected::Line(idx));
        cursor = idx + 1;
    }
    if cursor < total_lines {
        out.push(Selected::Fold { start: cursor, end: total_lines - 1 });
    }
    out
}

/// Derive a target line count from a character budget and the block's mean
/// line width, per §4.5's "`K` derived from char budget / mean line width".
pub fn target_k_for_budget(budget: usize, mean_line_width: usize) -> usize {
    if mean_line_width == 0 {
        return budget;
    }
    (budget / mean_line_width.max(1)).max(1)
}
