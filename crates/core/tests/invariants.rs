//! Property-style coverage of the testable invariants and concrete
//! scenarios this engine must satisfy.

use nub_core::{
    compress, compress_source, total_chars, BodyLine, CharBudget, LineSpan, Node, NodeKind, Options, PythonFormat,
    TextFormat,
};

fn make_text_node(lines: usize) -> Node {
    let mut node = Node::new(NodeKind::TextBlock, "text", LineSpan::new(1, lines));
    for i in 1..=lines {
        node.body_lines.push(BodyLine { line_number: i, text: format!("L{i:03}") });
    }
    node
}

#[test]
fn invariant_total_chars_within_budget() {
    let fmt = TextFormat::default();
    let node = make_text_node(300);
    let budget = CharBudget::new(20, 10);
    let options = Options::default();
    let out = compress(&fmt, &node, budget, &options).unwrap();
    assert!(total_chars(&out) <= budget.total());
}

#[test]
fn invariant_no_line_exceeds_width_when_wrapping_enabled() {
    let fmt = TextFormat::default();
    let mut node = Node::new(NodeKind::TextBlock, "text", LineSpan::new(1, 1));
    node.body_lines.push(BodyLine { line_number: 1, text: "x".repeat(500) });
    let budget = CharBudget::new(30, 50);
    let mut options = Options::default();
    options.wrap_width = Some(30);
    let out = compress(&fmt, &node, budget, &options).unwrap();
    for line in &out {
        assert!(line.char_len() <= 30);
    }
}

#[test]
fn invariant_output_lines_non_decreasing_by_source_position() {
    let fmt = TextFormat::default();
    let node = make_text_node(200);
    let budget = CharBudget::new(20, 10);
    let options = Options::default();
    let out = compress(&fmt, &node, budget, &options).unwrap();
    let mut last = f64::MIN;
    for line in &out {
        assert!(line.line_number.0 >= last);
        last = line.line_number.0;
    }
}

#[test]
fn invariant_identity_under_sufficient_budget() {
    let fmt = TextFormat::default();
    let source = b"alpha\nbeta\ngamma\ndelta";
    let options = Options::default();
    let out = compress_source(&fmt, source, CharBudget::new(500, 500), &options).unwrap();
    let rendered: String = out.iter().map(|l| l.text.clone()).collect::<Vec<_>>().join("\n");
    assert_eq!(rendered, "alpha\nbeta\ngamma\ndelta");
}

#[test]
fn invariant_monotonic_surviving_lines_as_budget_grows() {
    let fmt = TextFormat::default();
    let node = make_text_node(300);
    let options = Options::default();

    let small = compress(&fmt, &node, CharBudget::new(20, 5), &options).unwrap();
    let large = compress(&fmt, &node, CharBudget::new(20, 40), &options).unwrap();

    let small_lines: std::collections::HashSet<i64> =
        small.iter().filter(|l| !l.is_fold_marker).map(|l| l.line_number.0 as i64).collect();
    let large_lines: std::collections::HashSet<i64> =
        large.iter().filter(|l| !l.is_fold_marker).map(|l| l.line_number.0 as i64).collect();
    assert!(small_lines.is_subset(&large_lines));
}

#[test]
fn invariant_deterministic_given_same_input() {
    let fmt = TextFormat::default();
    let node = make_text_node(150);
    let options = Options::default();
    let a = compress(&fmt, &node, CharBudget::new(25, 12), &options).unwrap();
    let b = compress(&fmt, &node, CharBudget::new(25, 12), &options).unwrap();
    let a_text: Vec<&str> = a.iter().map(|l| l.text.as_str()).collect();
    let b_text: Vec<&str> = b.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(a_text, b_text);
}

#[test]
fn invariant_no_adjacent_fold_markers() {
    let fmt = TextFormat::default();
    let node = make_text_node(300);
    let options = Options::default();
    let out = compress(&fmt, &node, CharBudget::new(15, 8), &options).unwrap();
    for w in out.windows(2) {
        assert!(!(w[0].is_fold_marker && w[1].is_fold_marker));
    }
}

const PYTHON_SAMPLE: &str = r#"import os
import sys
from typing import Optional

class A:
    def method1(self):
        return 1

    def method2(self):
        return 2

class B:
    def method3(self):
        return 3

def top_fn():
    pass

def auth():
    check_credentials()
    return True

def helper_one():
    pass

def helper_two():
    pass
"#;

#[test]
fn s1_python_overview_budget_80x8() {
    let fmt = PythonFormat::default();
    let options = Options::default();
    let out = compress_source(&fmt, PYTHON_SAMPLE.as_bytes(), CharBudget::new(80, 8), &options).unwrap();
    assert!(total_chars(&out) <= 80 * 8);
    let joined: String = out.iter().map(|l| l.text.clone()).collect::<Vec<_>>().join("\n");
    assert!(joined.contains("class A"));
}

#[test]
fn s3_grep_boost_surfaces_matching_function_body() {
    let fmt = PythonFormat::default();
    let mut options = Options::default();
    options.grep_pattern = Some(regex::Regex::new("auth").unwrap());
    let out = compress_source(&fmt, PYTHON_SAMPLE.as_bytes(), CharBudget::new(80, 12), &options).unwrap();
    let joined: String = out.iter().map(|l| l.text.clone()).collect::<Vec<_>>().join("\n");
    assert!(joined.contains("auth"));
    assert!(joined.contains("check_credentials") || joined.contains("def auth"));
}

#[test]
fn s5_budget_too_small_single_truncated_line() {
    let fmt = TextFormat::default();
    let source = b"this line is far too long to fit in a ten character budget";
    let options = Options::default();
    let out = compress_source(&fmt, source, CharBudget::new(10, 1), &options).unwrap();
    assert_eq!(out.len(), 1);
    assert!(out[0].char_len() <= 10);
    assert!(out[0].text.ends_with('…'));
}

#[test]
fn s6_range_selection_draws_exclusively_from_span() {
    let fmt = TextFormat::default();
    let node = make_text_node(200);
    let mut options = Options::default();
    options.range = Some((50.0, 80.0));
    let out = compress(&fmt, &node, CharBudget::new(2000, 2000), &options).unwrap();
    for line in &out {
        assert!(line.line_number.0 >= 50.0 && line.line_number.0 <= 80.0);
    }
}

#[test]
fn invalid_regex_grep_pattern_is_rejected_by_caller() {
    // The engine never parses regex strings itself — Options::grep_pattern
    // is already a compiled Regex, so invalid patterns are a caller-side
    // (CLI) concern. This test documents that boundary.
    assert!(regex::Regex::new("(unclosed").is_err());
}
