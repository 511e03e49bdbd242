//! Directory walking, the filesystem collaborator `nub-core`'s Folder format
//! deliberately has no part of (`spec.md` §1 Non-goals). Respects
//! `.gitignore` via the `ignore` crate, the same way `codescope`'s own
//! repository scanner does.

use std::io;
use std::path::Path;

use ignore::WalkBuilder;
use nub_core::FsEntry;

pub fn walk_tree(root: &Path) -> io::Result<Vec<FsEntry>> {
    let mut flat: Vec<(usize, FsEntry)> = Vec::new();

    let walker = WalkBuilder::new(root).hidden(false).sort_by_file_name(|a, b| a.cmp(b)).build();
    for result in walker {
        let entry = result.map_err(io::Error::other)?;
        if entry.depth() == 0 {
            continue;
        }
        let path = entry.path();
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        let fs_entry = if is_dir {
            FsEntry::dir(name, Vec::new())
        } else {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            let preview: String = std::fs::read_to_string(path).unwrap_or_default().chars().take(40).collect();
            FsEntry::file(name, size, preview)
        };
        flat.push((entry.depth() - 1, fs_entry));
    }

    Ok(nest_by_depth(flat, 0))
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
