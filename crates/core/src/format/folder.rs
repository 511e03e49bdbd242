//! Folder format (`spec.md` §4.4): directories and files rendered as an
//! indented tree. Filesystem walking is an external collaborator (§1
//! Non-goals) — this format never touches disk. It converts a pre-built
//! [`FsEntry`] tree (the CLI builds one with the `ignore` crate) into
//! [`Node`]s, assigning synthetic sequential "line numbers" since a
//! directory listing has no source lines of its own.

use crate::error::{EngineError, EngineResult};
use crate::node::{BodyLine, LineSpan, Node, NodeKind};
use crate::options::Weights;

use super::Format;

/// One filesystem entry, pre-walked by the caller. `preview` is the first
/// ~40 characters of file content for files; ignored for directories.
#[derive(Debug, Clone)]
pub struct FsEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub preview: String,
    pub children: Vec<FsEntry>,
}

impl FsEntry {
    pub fn file(name: impl Into<String>, size: u64, preview: impl Into<String>) -> Self {
        FsEntry { name: name.into(), is_dir: false, size, preview: preview.into(), children: Vec::new() }
    }

    pub fn dir(name: impl Into<String>, children: Vec<FsEntry>) -> Self {
        FsEntry { name: name.into(), is_dir: true, size: 0, preview: String::new(), children }
    }
}

pub struct FolderFormat {
    pub weights: Weights,
}

impl FolderFormat {
    pub fn new(weights: Weights) -> Self {
        FolderFormat { weights }
    }

    /// Build a [`Node`] tree directly from pre-walked entries. This is the
    /// real entry point in production use; [`Format::parse`] exists for
    /// trait uniformity and accepts the same structure pre-serialized as
    /// tab-separated records (see module tests).
    pub fn build(&self, root_name: &str, entries: Vec<FsEntry>) -> Node {
        let mut counter = 0usize;
        let mut root = Node::new(NodeKind::Container, "directory", LineSpan::new(1, 1));
        root.name = root_name.to_string();
        root.signature = format!("{root_name}/");
        root.intrinsic_weight = self.weights.directory;
        counter += 1;
        root.line_span = LineSpan::new(counter, counter);
        for entry in entries {
            root.children.push(self.convert(entry, &mut counter));
        }
        root.line_span = LineSpan::new(root.line_span.start, counter.max(root.line_span.start));
        root.assign_depths(0);
        root
    }

    fn convert(&self, entry: FsEntry, counter: &mut usize) -> Node {
        *counter += 1;
        let start = *counter;
        if entry.is_dir {
            let mut node = Node::new(NodeKind::Container, "directory", LineSpan::new(start, start));
            node.name = entry.name.clone();
            node.signature = format!("{}/", entry.name);
            node.intrinsic_weight = self.weights.directory;
            for child in entry.children {
                node.children.push(self.convert(child, counter));
            }
            node.line_span = LineSpan::new(start, (*counter).max(start));
            node
        } else {
            let mut node = Node::new(NodeKind::TextBlock, "file", LineSpan::new(start, start));
            node.name = entry.name.clone();
            node.signature = if entry.size > 1024 {
                format!("{} [{} bytes]", entry.name, entry.size)
            } else {
                entry.name.clone()
            };
            node.preview = entry.preview.chars().take(40).collect();
            node.intrinsic_weight = self.weights.file;
            if !node.preview.is_empty() {
                node.body_lines.push(BodyLine { line_number: start, text: node.preview.clone() });
            }
            node
        }
    }
}

impl Default for FolderFormat {
    fn default() -> Self {
        FolderFormat::new(Weights::default())
    }
}

impl Format for FolderFormat {
    /// Accepts a minimal line-oriented encoding: each record is
    /// `depth\tD|F\tsize\tname`, pre-order, one per line. Intended for
    /// tests and for callers without direct `FsEntry` construction; real
    /// callers should prefer [`FolderFormat::build`].
    fn parse(&self, source: &[u8]) -> EngineResult<Node> {
        let text = String::from_utf8_lossy(source);
        let mut root_entries: Vec<(usize, FsEntry)> = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.splitn(4, '\t').collect();
            if parts.len() != 4 {
                return Err(EngineError::Parse(format!("malformed folder record: {line:?}")));
            }
            let depth: usize = parts[0].parse().map_err(|_| EngineError::Parse("bad depth".into()))?;
            let is_dir = parts[1] == "D";
            let size: u64 = parts[2].parse().unwrap_or(0);
            let name = parts[3].to_string();
            let entry = if is_dir { FsEntry::dir(name, Vec::new()) } else { FsEntry::file(name, size, "") };
            root_entries.push((depth, entry));
        }
        let entries = nest_by_depth(root_entries, 0);
        Ok(self.build(".", entries))
    }
}

fn nest_by_depth(flat: Vec<(usize, FsEntry)>, at_depth: usize) -> Vec<FsEntry> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < flat.len() {
        if flat[i].0 != at_depth {
            i += 1;
            continue;
        }
        let (_, mut entry) = flat[i].clone();
        let mut j = i + 1;
        let mut nested = Vec::new();
        while j < flat.len() && flat[j].0 > at_depth {
            nested.push(flat[j].clone());
            j += 1;
        }
        if entry.is_dir {
            entry.children = nest_by_depth(nested, at_depth + 1);
        }
        out.push(entry);
        i = j;
    }
    out
}
