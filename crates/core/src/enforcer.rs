//! Budget Enforcer (`spec.md` §4.6): the last pass over rendered output,
//! independent of any particular format. Runs in this order — merge
//! adjacent fold markers, wrap or truncate overlong lines, evict down to the
//! hard cap, then (optionally) drop repeated runs.

use std::collections::HashSet;

use crate::format::truncate_with_ellipsis;
use crate::node::{total_chars, LineNumber, OutputLine};
use crate::options::Options;

/// `width` is `CharBudget.width` (§6): it additionally bounds every
/// individual output line, independent of the total `cap`. By default a
/// line wider than `width` is truncated with an ellipsis; `--wrap` switches
/// that to wrapping with fractional continuation numbers instead (§4.6
/// step 2).
pub fn enforce(lines: Vec<OutputLine>, cap: usize, width: usize, options: &Options) -> Vec<OutputLine> {
    let lines = merge_adjacent_fold_markers(lines);
    let lines = match options.wrap_width {
        Some(wrap_width) => wrap_overlong_lines(lines, wrap_width as usize),
        None => truncate_overlong_lines(lines, width),
    };
    let lines = evict_to_cap(lines, cap);
    if options.deduplicate {
        dedup_three_grams(lines)
    } else {
        lines
    }
}

/// Two fold markers never survive next to each other — a child that folded
/// next to its sibling's own fold collapses into a single marker spanning
/// both gaps (§4.6 step 1).
fn merge_adjacent_fold_markers(lines: Vec<OutputLine>) -> Vec<OutputLine> {
    let mut out: Vec<OutputLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_fold_marker {
            if let Some(prev) = out.last() {
                if prev.is_fold_marker {
                    let merged_count = fold_count(&prev.text) + fold_count(&line.text);
                    let mut merged = out.pop().unwrap();
                    merged.text = format!("[…{merged_count} more lines…]");
                    out.push(merged);
                    continue;
                }
            }
        }
        out.push(line);
    }
    out
}

fn fold_count(text: &str) -> usize {
    text.chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(1)
}

/// Lines wider than `width` are wrapped, not truncated, when `wrap_width` is
/// set (§4.6 step 2). Continuation lines get fractional line numbers
/// (`n.33`, `n.67`, …) so the original source position is still derivable.
fn wrap_overlong_lines(lines: Vec<OutputLine>, width: usize) -> Vec<OutputLine> {
    if width == 0 {
        return lines;
    }
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let chars: Vec<char> = line.text.chars().collect();
        if chars.len() <= width {
            out.push(line);
            continue;
        }
        let chunks: Vec<String> = chars.chunks(width).map(|c| c.iter().collect()).collect();
        let n = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            let number = if i == 0 {
                line.line_number.0
            } else {
                line.line_number.0 + (i as f64) / (n as f64)
            };
            out.push(OutputLine {
                line_number: LineNumber(number),
                text: chunk,
                score: line.score,
                is_fold_marker: line.is_fold_marker,
            });
        }
    }
    out
}

/// Lines wider than `width` are truncated with an ellipsis when wrapping is
/// not requested (§4.6 step 2 default case, §8 invariant 2). Fold markers
/// are truncated the same as any other line.
fn truncate_overlong_lines(lines: Vec<OutputLine>, width: usize) -> Vec<OutputLine> {
    if width == 0 {
        return lines;
    }
    lines
        .into_iter()
        .map(|mut line| {
            if line.char_len() > width {
                line.text = truncate_with_ellipsis(&line.text, width);
            }
            line
        })
        .collect()
}

/// Drop lines, lowest score first, until the total fits `cap` (§4.6 step 3).
/// Fold markers get a synthetic score above every real line's so they are
/// only ever evicted once nothing cheaper is left to cut.
fn evict_to_cap(mut lines: Vec<OutputLine>, cap: usize) -> Vec<OutputLine> {
    if total_chars(&lines) <= cap {
        return lines;
    }
    loop {
        if lines.is_empty() || total_chars(&lines) <= cap {
            break;
        }
        let victim = lines
            .iter()
            .enumerate()
            .min_by(|a, b| eviction_key(a.1).partial_cmp(&eviction_key(b.1)).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)))
            .map(|(i, _)| i);
        match victim {
            Some(i) => {
                lines.remove(i);
            }
            None => break,
        }
    }
    lines
}

fn eviction_key(line: &OutputLine) -> f64 {
    if line.is_fold_marker {
        f64::MAX
    } else {
        line.score
    }
}

/// Collapse a run of lines that exactly repeats an earlier 3-line window —
/// a common artifact of overview-level recursion producing the same
/// boilerplate signature at several nesting levels (§4.6 step 4, opt-in).
fn dedup_three_grams(lines: Vec<OutputLine>) -> Vec<OutputLine> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<OutputLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if out.len() >= 2 {
            let key = format!("{}\u{0}{}\u{0}{}", out[out.len() - 2].text, out[out.len() - 1].text, line.text);
            if seen.contains(&key) {
                continue;
            }
            seen.insert(key);
        }
        out.push(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: f64, text: &str, score: f64) -> OutputLine {
        OutputLine::new(n, text, score)
    }

    #[test]
    fn adjacent_fold_markers_merge() {
        let lines = vec![
            line(1.0, "a", 1.0),
            OutputLine::fold_marker(2.0, "[…3 more lines…]"),
            OutputLine::fold_marker(5.0, "[…4 more lines…]"),
            line(9.0, "b", 1.0),
        ];
        let options = Options::default();
        let out = enforce(lines, 1000, 1000, &options);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].text, "[…7 more lines…]");
    }

    #[test]
    fn wrapping_produces_fractional_continuations() {
        let lines = vec![line(1.0, &"x".repeat(25), 1.0)];
        let mut options = Options::default();
        options.wrap_width = Some(10);
        let out = enforce(lines, 1000, 1000, &options);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].line_number.0, 1.0);
        assert!(out[1].line_number.0 > 1.0 && out[1].line_number.0 < 2.0);
    }

    #[test]
    fn truncates_overlong_lines_by_default_when_wrap_not_set() {
        let lines = vec![line(1.0, &"x".repeat(25), 1.0)];
        let options = Options::default();
        let out = enforce(lines, 1000, 10, &options);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].char_len(), 10);
        assert!(out[0].text.ends_with('…'));
    }

    #[test]
    fn eviction_drops_lowest_score_first() {
        let lines = vec![line(1.0, "important", 10.0), line(2.0, "filler one", 0.1), line(3.0, "filler two", 0.2)];
        let cap = line(1.0, "important", 10.0).char_len();
        let options = Options::default();
        let out = enforce(lines, cap, 1000, &options);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "important");
    }

    #[test]
    fn fold_markers_evicted_last() {
        let lines = vec![OutputLine::fold_marker(1.0, "[…1 more lines…]"), line(2.0, "low", 0.01)];
        let options = Options::default();
        let out = enforce(lines, 3, 1000, &options);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_fold_marker);
    }

    #[test]
    fn dedup_drops_repeated_three_line_window() {
        let lines = vec![
            line(1.0, "a", 1.0),
            line(2.0, "b", 1.0),
            line(3.0, "c", 1.0),
            line(4.0, "a", 1.0),
            line(5.0, "b", 1.0),
            line(6.0, "c", 1.0),
        ];
        let mut options = Options::default();
        options.deduplicate = true;
        let out = enforce(lines, 1000, 1000, &options);
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn dedup_off_by_default_keeps_repeats() {
        let lines = vec![line(1.0, "a", 1.0), line(2.0, "b", 1.0), line(3.0, "c", 1.0), line(4.0, "a", 1.0), line(5.0, "b", 1.0), line(6.0, "c", 1.0)];
        let options = Options::default();
        let out = enforce(lines, 1000, 1000, &options);
        assert_eq!(out.len(), 6);
    }
}
