use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

/// Expands `include` globs under `root` into a sorted file list, skipping
/// anything matched by `ignore`.
pub fn scan(root: &Path, include: &[String], ignore: &[String]) -> Vec<PathBuf> {
    if include.is_empty() {
        return Vec::new();
    }
    let include_set = build_glob_set(include);
    let ignore_set = build_glob_set(ignore);
    let mut files = Vec::new();
    walk_dir(root, root, &ignore_set, &include_set, &mut files);
    files.sort();
    files
}

pub(crate) fn build_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    patterns
        .iter()
        .filter_map(|p| match GlobBuilder::new(p).case_insensitive(true).build() {
            Ok(glob) => Some(glob),
            Err(e) => {
                tracing::warn!(pattern = %p, "ignoring invalid glob: {e}");
                None
            }
        })
        .for_each(|glob| {
            builder.add(glob);
        });
    builder.build().unwrap_or_default()
}

pub(crate) fn matches_glob(path: &Path, root: &Path, set: &GlobSet) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| set.is_match(name))
        || path.strip_prefix(root).is_ok_and(|rel| set.is_match(rel))
}

fn walk_dir(
    dir: &Path,
    root: &Path,
    ignore: &GlobSet,
    include: &GlobSet,
    files: &mut Vec<PathBuf>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), "skipping unreadable directory: {e}");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if matches_glob(&path, root, ignore) {
            continue;
        }

        if path.is_dir() {
            walk_dir(&path, root, ignore, include, files);
        } else if matches_glob(&path, root, include) {
            files.push(path);
        }
    }
}
