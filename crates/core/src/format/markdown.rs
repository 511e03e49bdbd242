//! Markdown format (`spec.md` §4.4): sections nest by ATX heading level;
//! fenced code blocks and paragraphs are leaves. A line-oriented scanner,
//! consistent with this crate's other formats rather than a full CommonMark
//! parser — the engine only needs structural landmarks, not semantics.

use crate::error::EngineResult;
use crate::node::{BodyLine, LineSpan, Node, NodeKind};
use crate::options::Weights;

use super::Format;

pub struct MarkdownFormat {
    pub weights: Weights,
}

impl MarkdownFormat {
    pub fn new(weights: Weights) -> Self {
        MarkdownFormat { weights }
    }
}

impl Default for MarkdownFormat {
    fn default() -> Self {
        MarkdownFormat::new(Weights::default())
    }
}

fn heading_level(trimmed: &str) -> Option<(usize, &str)> {
    if !trimmed.starts_with('#') {
        return None;
    }
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = trimmed[level..].trim();
    if trimmed.as_bytes().get(level).is_some_and(|b| !b.is_ascii_whitespace()) {
        // `#word` is not a heading in CommonMark — requires a space.
        return None;
    }
    Some((level, rest))
}

struct Frame {
    level: usize,
    node: Node,
}

impl Format for MarkdownFormat {
    fn parse(&self, source: &[u8]) -> EngineResult<Node> {
        let text = String::from_utf8_lossy(source);
        let lines: Vec<&str> = text.lines().collect();
        let last_line = lines.len().max(1);

        let mut root = Node::new(NodeKind::Root, "document", LineSpan::new(1, last_line));
        root.name = "(document)".to_string();
        root.signature = "(document)".to_string();

        let mut stack: Vec<Frame> = vec![Frame { level: 0, node: root }];
        let mut pending_paragraph: Option<Node> = None;

        let mut i = 0usize;
        while i < lines.len() {
            let line_no = i + 1;
            let raw = lines[i];
            let trimmed = raw.trim();

            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                flush_paragraph(&mut stack, &mut pending_paragraph);
                let fence = &trimmed[..3];
                let start = line_no;
                let mut body = vec![BodyLine { line_number: line_no, text: raw.to_string() }];
                i += 1;
                while i < lines.len() && !lines[i].trim_start().starts_with(fence) {
                    body.push(BodyLine { line_number: i + 1, text: lines[i].to_string() });
                    i += 1;
                }
                let end = if i < lines.len() {
                    body.push(BodyLine { line_number: i + 1, text: lines[i].to_string() });
                    i += 1;
                    i
                } else {
                    i
                };
                let mut node = Node::new(NodeKind::TextBlock, "codeblock", LineSpan::new(start, end.max(start)));
                node.name = "(code block)".to_string();
                node.signature = format!("```{}", trimmed.trim_start_matches(fence));
                node.preview = body.get(1).map(|l| l.text.clone()).unwrap_or_default();
                node.intrinsic_weight = self.weights.text;
                node.body_lines = body;
                stack.last_mut().unwrap().node.children.push(node);
                continue;
            }

            if trimmed.is_empty() {
                flush_paragraph(&mut stack, &mut pending_paragraph);
                i += 1;
                continue;
            }

            if let Some((level, heading_text)) = heading_level(trimmed) {
                flush_paragraph(&mut stack, &mut pending_paragraph);
                while stack.len() > 1 && stack.last().unwrap().level >= level {
                    close_section(&mut stack, line_no - 1);
                }
                let mut node = Node::new(NodeKind::Section, "heading", LineSpan::new(line_no, line_no));
                node.name = heading_text.to_string();
                node.signature = trimmed.to_string();
                node.intrinsic_weight = self.weights.heading_base;
                stack.push(Frame { level, node });
                i += 1;
                continue;
            }

            match &mut pending_paragraph {
                Some(p) => p.body_lines.push(BodyLine { line_number: line_no, text: raw.to_string() }),
                None => {
                    let mut node = Node::new(NodeKind::TextBlock, "paragraph", LineSpan::new(line_no, line_no));
                    node.intrinsic_weight = self.weights.text;
                    node.body_lines.push(BodyLine { line_number: line_no, text: raw.to_string() });
                    pending_paragraph = Some(node);
                }
            }
            i += 1;
        }

        flush_paragraph(&mut stack, &mut pending_paragraph);
        while stack.len() > 1 {
            close_section(&mut stack, lines.len());
        }

        let mut root = stack.pop().unwrap().node;
        root.line_span = LineSpan::new(1, last_line);
        root.assign_depths(0);
        Ok(root)
    }
}

fn flush_paragraph(stack: &mut [Frame], pending: &mut Option<Node>) {
    if let Some(mut p) = pending.take() {
        let start = p.body_lines.first().map(|l| l.line_number).unwrap_or(1);
        let end = p.body_lines.last().map(|l| l.line_number).unwrap_or(start);
        p.line_span = LineSpan::new(start, end);
        p.name = "(paragraph)".to_string();
        p.signature = p.body_lines.first().map(|l| l.text.clone()).unwrap_or_default();
        p.preview = p.signature.clone();
        stack.last_mut().unwrap().node.children.push(p);
    }
}

fn close_section(stack: &mut Vec<Frame>, end_line: usize) {
    let frame = stack.pop().unwrap();
    let mut node = frame.node;
    node.line_span = LineSpan::new(node.line_span.start, end_line.max(node.line_span.start));
    if let Some(first_child) = node.children.first() {
        if node.preview.is_empty() {
            node.preview = first_child.signature.clone();
        }
    }
    stack.last_mut().unwrap().node.children.push(node);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Title\n\nIntro paragraph.\n\n## Section One\n\nBody text.\n\n```rust\nfn main() {}\n```\n\n## Section Two\n\nMore text.\n";

    #[test]
    fn nests_sections_by_heading_level() {
        let fmt = MarkdownFormat::default();
        let root = fmt.parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(root.children.len(), 1);
        let title = &root.children[0];
        assert_eq!(title.name, "Title");
        assert_eq!(title.children.len(), 3); // intro paragraph + 2 sub-sections
        assert_eq!(title.children[1].name, "Section One");
        assert_eq!(title.children[2].name, "Section Two");
    }

    #[test]
    fn code_block_kept_as_leaf() {
        let fmt = MarkdownFormat::default();
        let root = fmt.parse(SAMPLE.as_bytes()).unwrap();
        let section_one = &root.children[0].children[1];
        let code = section_one.children.iter().find(|c| c.category == "codeblock").unwrap();
        assert!(code.is_leaf());
        assert!(code.body_lines.iter().any(|l| l.text.contains("fn main")));
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        assert!(heading_level("#tag").is_none());
        assert!(heading_level("# Heading").is_some());
    }
}
