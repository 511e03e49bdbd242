//! The uniform tree model every format parses into and every algorithm in
//! this crate walks. See `spec.md` §3 for the attribute table and invariants.

/// Coarse structural tag for a [`Node`]. Finer distinctions that affect
/// scoring (class vs. function, heading level, directory vs. file) live in
/// `Node::category`, not in extra enum variants — the engine itself only
/// ever switches on `NodeKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Container,
    Section,
    Definition,
    TextBlock,
    Import,
    FoldMarker,
}

/// 1-indexed, inclusive source line range. `start > end` only for an empty
/// node (never produced by a parser, but synthesized fold markers always
/// have `start <= end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        LineSpan { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn encloses(&self, other: &LineSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A single source line retained inside a node's body, tagged with its
/// original 1-indexed line number so fold markers and output line numbers
/// can reference the real source position after reordering/dropping.
#[derive(Debug, Clone)]
pub struct BodyLine {
    pub line_number: usize,
    pub text: String,
}

/// A structural unit of parsed content. See `spec.md` §3.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Fine-grained category used for weight lookup and LoD dispatch, e.g.
    /// "class", "function", "heading", "import", "file", "directory", "text".
    pub category: String,
    /// Short label used at Overview LoD.
    pub name: String,
    /// Dense one-line form used at Regional LoD.
    pub signature: String,
    /// First docstring / first non-blank line, used at Detailed LoD.
    pub preview: String,
    pub body_lines: Vec<BodyLine>,
    pub line_span: LineSpan,
    pub children: Vec<Node>,
    pub depth: usize,
    pub intrinsic_weight: f64,
}

impl Node {
    pub fn new(kind: NodeKind, category: impl Into<String>, line_span: LineSpan) -> Self {
        Node {
            kind,
            category: category.into(),
            name: String::new(),
            signature: String::new(),
            preview: String::new(),
            body_lines: Vec::new(),
            line_span,
            children: Vec::new(),
            depth: 0,
            intrinsic_weight: 1.0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Recompute `depth` for this node and every descendant, assuming
    /// `self` sits at `depth`. Parsers build nodes bottom-up without knowing
    /// their final depth, so this is run once after a tree is assembled.
    pub fn assign_depths(&mut self, depth: usize) {
        self.depth = depth;
        for child in &mut self.children {
            child.assign_depths(depth + 1);
        }
    }

    /// Concatenated body text of this node and every descendant, used by the
    /// grep scorer to count matches without caring about tree shape.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for line in &self.body_lines {
            out.push_str(&line.text);
            out.push('\n');
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Total raw character count of this node's own body (not descendants) —
    /// used by the Focus LoD, which reproduces a node verbatim.
    pub fn body_char_count(&self) -> usize {
        self.body_lines.iter().map(|l| l.text.chars().count()).sum::<usize>()
            + self.body_lines.len() // newline per line
    }
}

/// A fractional line number: whole for real source lines, `.5` for wrapped
/// continuations, and for fold markers (positioned at the gap midpoint).
/// Ordering is numeric, never lexicographic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineNumber(pub f64);

impl Eq for LineNumber {}

impl PartialOrd for LineNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Ord for LineNumber {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(std::cmp::Ordering::Equal)
    }
}

impl std::fmt::Display for LineNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{:.1}", self.0)
        }
    }
}

/// One line of rendered output: a source-position tag plus text, per
/// `spec.md` §3.
#[derive(Debug, Clone)]
pub struct OutputLine {
    pub line_number: LineNumber,
    pub text: String,
    /// Carries the originating node's score so the Budget Enforcer can evict
    /// the lowest-scoring leaf lines first (§4.6 step 3).
    pub score: f64,
    /// True for synthetic fold-marker lines; the enforcer merges adjacent
    /// markers and never lets two of them survive next to each other.
    pub is_fold_marker: bool,
}

impl OutputLine {
    pub fn new(line_number: f64, text: impl Into<String>, score: f64) -> Self {
        OutputLine {
            line_number: LineNumber(line_number),
            text: text.into(),
            score,
            is_fold_marker: false,
        }
    }

    pub fn fold_marker(line_number: f64, text: impl Into<String>) -> Self {
        OutputLine {
            line_number: LineNumber(line_number),
            text: text.into(),
            score: 0.0,
            is_fold_marker: true,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

pub fn total_chars(lines: &[OutputLine]) -> usize {
    // +1 per line for the `\n` joiner, matching how `compress` joins output;
    // the very last line's separator is trimmed by the caller.
    lines.iter().map(|l| l.char_len() + 1).sum::<usize>().saturating_sub(if lines.is_empty() { 0 } else { 1 })
}
