//! Fallback Text format (`spec.md` §4.4): a single leaf whose rendering is
//! driven entirely by the U-Curve Selector. Also the engine's retry target
//! when a structured format's parser fails (§7).

use crate::error::EngineResult;
use crate::node::{BodyLine, LineSpan, Node, NodeKind};
use crate::options::Weights;

use super::Format;

pub struct TextFormat {
    pub weights: Weights,
}

impl TextFormat {
    pub fn new(weights: Weights) -> Self {
        TextFormat { weights }
    }
}

impl Default for TextFormat {
    fn default() -> Self {
        TextFormat::new(Weights::default())
    }
}

impl Format for TextFormat {
    fn parse(&self, source: &[u8]) -> EngineResult<Node> {
        let text = String::from_utf8_lossy(source);
        let lines: Vec<BodyLine> = text
            .lines()
            .enumerate()
            .map(|(i, l)| BodyLine { line_number: i + 1, text: l.to_string() })
            .collect();
        let end = lines.len().max(1);
        let mut root = Node::new(NodeKind::TextBlock, "text", LineSpan::new(1, end));
        root.name = "(text)".to_string();
        root.signature = "(text)".to_string();
        root.preview = lines.first().map(|l| l.text.clone()).unwrap_or_default();
        root.intrinsic_weight = self.weights.text;
        root.body_lines = lines;
        Ok(root)
    }
}
