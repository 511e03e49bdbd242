//! `nub-core`: parses heterogeneous content into a uniform tree and renders
//! it into a fixed character budget. See `DESIGN.md` for how each module
//! here is grounded, and `SPEC_FULL.md` for the full behavioral contract.

pub mod allocator;
pub mod compress;
pub mod enforcer;
pub mod error;
pub mod format;
pub mod node;
pub mod options;
pub mod scorer;
pub mod ucurve;

pub use compress::{compress, compress_source};
pub use error::{EngineError, EngineResult};
pub use format::folder::{FolderFormat, FsEntry};
pub use format::markdown::MarkdownFormat;
pub use format::mindmap::MindMapFormat;
pub use format::python::PythonFormat;
pub use format::text::TextFormat;
pub use format::{Format, Lod};
pub use node::{total_chars, BodyLine, LineNumber, LineSpan, Node, NodeKind, OutputLine};
pub use options::{CharBudget, Options, Weights};
