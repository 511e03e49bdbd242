//! Python format (`spec.md` §4.4): indentation-tracked structural parse into
//! Module/Class/Function/Import-group/Decorator-block nodes, in the spirit
//! of `codescope`'s `stub_python` line scanner — a line-oriented pass, not a
//! full AST.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::EngineResult;
use crate::node::{BodyLine, LineSpan, Node, NodeKind};
use crate::options::Weights;

use super::Format;

pub struct PythonFormat {
    pub weights: Weights,
}

impl PythonFormat {
    pub fn new(weights: Weights) -> Self {
        PythonFormat { weights }
    }
}

impl Default for PythonFormat {
    fn default() -> Self {
        PythonFormat::new(Weights::default())
    }
}

fn class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^class\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap())
}

fn def_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap())
}

fn indent_of(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

struct Frame {
    indent: usize,
    node: Node,
    /// Index of an open, still-extendable import-group child, if the last
    /// thing appended to this frame was an import line.
    open_import_group: Option<usize>,
}

impl Format for PythonFormat {
    fn parse(&self, source: &[u8]) -> EngineResult<Node> {
        let text = String::from_utf8_lossy(source);
        let raw_lines: Vec<&str> = text.lines().collect();
        let last_line = raw_lines.len().max(1);

        let mut module = Node::new(NodeKind::Root, "module", LineSpan::new(1, last_line));
        module.name = "(module)".to_string();
        module.signature = "(module)".to_string();

        let mut stack: Vec<Frame> = vec![Frame { indent: 0, node: module, open_import_group: None }];
        let mut pending_decorators: Vec<BodyLine> = Vec::new();

        let mut i = 0usize;
        while i < raw_lines.len() {
            let line_no = i + 1;
            let raw = raw_lines[i];
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                i += 1;
                continue;
            }

            let indent = indent_of(raw);

            // Close frames whose body has ended (a less-or-equally indented,
            // non-blank line signals the end of every open block at or
            // deeper than this indent).
            while stack.len() > 1 && indent <= stack.last().unwrap().indent {
                close_top(&mut stack, line_no - 1);
            }

            // Decorator block: `@foo` lines attach to the Class/Function they
            // precede rather than the enclosing frame, so they travel with
            // whatever they decorate instead of getting stranded as a plain
            // body line of the class/module above it.
            if trimmed.starts_with('@') {
                stack.last_mut().unwrap().open_import_group = None;
                pending_decorators.push(BodyLine { line_number: line_no, text: raw.to_string() });
                i += 1;
                continue;
            }

            if trimmed.starts_with("import ") || trimmed.starts_with("from ") {
                append_import(&mut stack, line_no, raw);
                i += 1;
                continue;
            }

            if let Some(caps) = class_re().captures(trimmed) {
                let name = caps.get(1).unwrap().as_str().to_string();
                let start = pending_decorators.first().map(|d| d.line_number).unwrap_or(line_no);
                let mut node = Node::new(NodeKind::Container, "class", LineSpan::new(start, line_no));
                node.name = name;
                node.signature = trimmed.trim_end_matches(':').to_string() + ":";
                node.intrinsic_weight = self.weights.class;
                node.preview = docstring_preview(&raw_lines, i);
                node.body_lines.extend(pending_decorators.drain(..));
                stack.last_mut().unwrap().open_import_group = None;
                stack.push(Frame { indent, node, open_import_group: None });
                i += 1;
                continue;
            }

            if let Some(caps) = def_re().captures(trimmed) {
                let name = caps.get(1).unwrap().as_str().to_string();
                let in_class = stack.last().map(|f| f.node.category == "class").unwrap_or(false);
                let start = pending_decorators.first().map(|d| d.line_number).unwrap_or(line_no);
                let mut node =
                    Node::new(NodeKind::Definition, if in_class { "method" } else { "function" }, LineSpan::new(start, line_no));
                node.name = name;
                node.signature = trimmed.trim_end_matches(':').to_string() + ":";
                node.intrinsic_weight = self.weights.function;
                node.preview = docstring_preview(&raw_lines, i);
                node.body_lines.extend(pending_decorators.drain(..));
                stack.last_mut().unwrap().open_import_group = None;
                stack.push(Frame { indent, node, open_import_group: None });
                i += 1;
                continue;
            }

            // A decorator not immediately followed by a class/def is
            // malformed Python, but we still surface it rather than drop it.
            if !pending_decorators.is_empty() {
                stack.last_mut().unwrap().node.body_lines.extend(pending_decorators.drain(..));
            }

            // Plain body/statement line: attach to the nearest open container.
            stack.last_mut().unwrap().open_import_group = None;
            stack.last_mut().unwrap().node.body_lines.push(BodyLine { line_number: line_no, text: raw.to_string() });
            i += 1;
        }

        if !pending_decorators.is_empty() {
            stack.last_mut().unwrap().node.body_lines.extend(pending_decorators.drain(..));
        }

        while stack.len() > 1 {
            close_top(&mut stack, raw_lines.len());
        }

        let mut root = stack.pop().unwrap().node;
        root.line_span = LineSpan::new(1, last_line);
        root.assign_depths(0);
        Ok(root)
    }
}

fn close_top(stack: &mut Vec<Frame>, end_line: usize) {
    let frame = stack.pop().unwrap();
    let mut node = frame.node;
    node.line_span = LineSpan::new(node.line_span.start, end_line.max(node.line_span.start));
    if node.body_lines.is_empty() && !node.children.is_empty() {
        // Keep line_span tight around the last child when there's no direct body.
        if let Some(last_child) = node.children.last() {
            node.line_span = LineSpan::new(node.line_span.start, last_child.line_span.end.max(node.line_span.start));
        }
    }
    stack.last_mut().unwrap().node.children.push(node);
}

fn append_import(stack: &mut [Frame], line_no: usize, raw: &str) {
    let frame = stack.last_mut().unwrap();
    if let Some(idx) = frame.open_import_group {
        let group = &mut frame.node.children[idx];
        group.line_span = LineSpan::new(group.line_span.start, line_no);
        group.body_lines.push(BodyLine { line_number: line_no, text: raw.to_string() });
        group.name = format!("[{} imports]", group.body_lines.len());
        group.signature = format!("[{} imports, lines {}-{}]", group.body_lines.len(), group.line_span.start, group.line_span.end);
        return;
    }
    let mut group = Node::new(NodeKind::Import, "import", LineSpan::new(line_no, line_no));
    group.body_lines.push(BodyLine { line_number: line_no, text: raw.to_string() });
    group.name = "[1 import]".to_string();
    group.signature = format!("[1 import, line {line_no}]");
    group.intrinsic_weight = 0.3;
    let idx = frame.node.children.len();
    frame.node.children.push(group);
    frame.open_import_group = Some(idx);
}

fn docstring_preview(lines: &[&str], def_line_idx: usize) -> String {
    for raw in lines.iter().skip(def_line_idx + 1) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(stripped) = trimmed.strip_prefix("\"\"\"").or_else(|| trimmed.strip_prefix("'''")) {
            let stripped = stripped.trim_end_matches("\"\"\"").trim_end_matches("'''");
            return stripped.trim().to_string();
        }
        return String::new();
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"import os
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
"#;

    #[test]
    fn s1_python_overview_structure() {
        let fmt = PythonFormat::default();
        let root = fmt.parse(SAMPLE.as_bytes()).unwrap();
        // imports collapse into one group, then class A, class B, top_fn
        assert_eq!(root.children.len(), 4);
        assert_eq!(root.children[0].category, "import");
        assert_eq!(root.children[0].body_lines.len(), 3);
        assert_eq!(root.children[1].name, "A");
        assert_eq!(root.children[1].children.len(), 2);
        assert_eq!(root.children[1].children[0].name, "method1");
        assert_eq!(root.children[2].name, "B");
        assert_eq!(root.children[2].children.len(), 1);
        assert_eq!(root.children[3].name, "top_fn");
    }

    #[test]
    fn docstring_becomes_preview() {
        let src = "def greet():\n    \"\"\"Say hello.\"\"\"\n    print('hi')\n";
        let fmt = PythonFormat::default();
        let root = fmt.parse(src.as_bytes()).unwrap();
        assert_eq!(root.children[0].preview, "Say hello.");
    }

    #[test]
    fn decorator_attaches_to_following_function() {
        let src = "@staticmethod\n@another.deco\ndef helper():\n    pass\n";
        let fmt = PythonFormat::default();
        let root = fmt.parse(src.as_bytes()).unwrap();
        assert_eq!(root.children.len(), 1);
        let func = &root.children[0];
        assert_eq!(func.name, "helper");
        assert_eq!(func.line_span.start, 1);
        assert_eq!(func.body_lines[0].text, "@staticmethod");
        assert_eq!(func.body_lines[1].text, "@another.deco");
    }

    #[test]
    fn decorator_attaches_to_following_class() {
        let src = "@register\nclass Widget:\n    def render(self):\n        pass\n";
        let fmt = PythonFormat::default();
        let root = fmt.parse(src.as_bytes()).unwrap();
        let class = &root.children[0];
        assert_eq!(class.name, "Widget");
        assert_eq!(class.line_span.start, 1);
        assert!(class.body_lines.iter().any(|l| l.text == "@register"));
    }

    #[test]
    fn weights_applied() {
        let fmt = PythonFormat::default();
        let root = fmt.parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(root.children[1].intrinsic_weight, 3.0);
        assert_eq!(root.children[1].children[0].intrinsic_weight, 2.0);
    }
}
