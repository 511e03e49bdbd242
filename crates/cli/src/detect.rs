//! Extension-based format dispatch. A thin external collaborator — the
//! engine itself never inspects file paths (`spec.md` §1 Non-goals).

use std::path::Path;

use nub_core::{Format, FolderFormat, MarkdownFormat, MindMapFormat, PythonFormat, TextFormat, Weights};

pub fn by_name(name: &str, weights: Weights) -> Option<Box<dyn Format>> {
    match name {
        "python" | "py" => Some(Box::new(PythonFormat::new(weights))),
        "markdown" | "md" => Some(Box::new(MarkdownFormat::new(weights))),
        "mindmap" => Some(Box::new(MindMapFormat::new(weights))),
        "folder" | "dir" => Some(Box::new(FolderFormat::new(weights))),
        "text" | "txt" => Some(Box::new(TextFormat::new(weights))),
        _ => None,
    }
}

pub fn by_extension(path: &Path, weights: Weights) -> Box<dyn Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py") => Box::new(PythonFormat::new(weights)),
        Some("md") | Some("markdown") => Box::new(MarkdownFormat::new(weights)),
        Some("mm") => Box::new(MindMapFormat::new(weights)),
        _ => Box::new(TextFormat::new(weights)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_python_by_extension() {
        let fmt = by_extension(Path::new("module.py"), Weights::default());
        let node = fmt.parse(b"def f():\n    pass\n").unwrap();
        assert_eq!(node.children.len(), 1);
    }

    #[test]
    fn unknown_extension_falls_back_to_text() {
        let fmt = by_extension(Path::new("data.bin"), Weights::default());
        let node = fmt.parse(b"raw bytes here").unwrap();
        assert!(node.is_leaf());
    }

    #[test]
    fn by_name_rejects_unknown() {
        assert!(by_name("cobol", Weights::default()).is_none());
    }
}
