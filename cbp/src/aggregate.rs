//! Filesystem-facing entry points: analyzing a single trace file, a target's build-artifact
//! directory, or a whole CMake build tree (spec §4.6). Grounded on the original's
//! `backend/invoke.cpp`; trace files that don't match the expected schema are logged and skipped
//! rather than aborting the whole target, the way the original prints a warning and `continue`s.

use std::path::Path;

use crate::error::{Context, Error, Result};
use crate::tree::{Tree, TreeKind};

/// Analyzing a single file is equivalent to analyzing a single translation unit.
pub fn analyze_translation_unit(path: impl AsRef<Path>) -> Result<Tree> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::MalformedTrace {
            message: format!("could not read trace file {}: {e}", path.display()),
        })
        .context(format!("could not analyze file {}", path.display()))?;

    let events = crate::trace::decode(&contents).context(format!("could not analyze file {}", path.display()))?;

    tracing::debug!(file = %path.display(), events = events.len(), "analyzing translation unit");
    crate::analyze::analyze_trace(events, path.display().to_string())
        .context(format!("could not analyze file {}", path.display()))
}

/// Analyzing a target means analyzing every `.json` trace file found anywhere under `path`. This
/// is the main way non-CMake targets get analyzed, since virtually any build system produces a
/// build-artifacts directory with traces sitting next to their object files.
pub fn analyze_target(path: impl AsRef<Path>) -> Result<Tree> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Err(Error::SchemaMismatch {
            message: format!("target path {} does not point to a valid directory", path.display()),
        });
    }

    let mut target_tree = Tree::new(TreeKind::Target, path.display().to_string());

    for entry in walk_json_files(path)? {
        let contents = match std::fs::read_to_string(&entry) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(file = %entry.display(), target = %path.display(), error = %e, "could not read trace file, skipping");
                continue;
            }
        };

        let events = match crate::trace::decode(&contents) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(
                    file = %entry.display(),
                    target = %path.display(),
                    error = %e,
                    "file does not match the trace schema, skipping"
                );
                continue;
            }
        };

        tracing::debug!(file = %entry.display(), target = %path.display(), "analyzing translation unit");
        let child = crate::analyze::analyze_trace(events, entry.display().to_string())
            .context(format!("could not analyze file {}", entry.display()))?;
        target_tree.children.push(child);
    }

    target_tree.sum_children_into_total();
    Ok(target_tree)
}

/// Recursively collects every `.json` file under `root`, in directory-traversal order.
fn walk_json_files(root: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|e| Error::SchemaMismatch {
            message: format!("could not read directory {}: {e}", dir.display()),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| Error::SchemaMismatch {
                message: format!("could not read directory entry under {}: {e}", dir.display()),
            })?;
            let path = entry.path();

            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Every CMake target has a corresponding build-artifact directory listed in
/// `CMakeFiles/TargetDirectories.txt`; a handful of entries are CMake-internal targets with no
/// directory (or an empty one), and are skipped rather than analyzed.
pub fn analyze_build(path: impl AsRef<Path>) -> Result<Tree> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Err(Error::SchemaMismatch {
            message: format!("build path {} does not point to a valid directory", path.display()),
        });
    }

    let manifest_path = path.join("CMakeFiles").join("TargetDirectories.txt");
    let manifest = std::fs::read_to_string(&manifest_path).map_err(|_| Error::MissingManifest {
        path: manifest_path.clone(),
    })?;

    let target_directories: Vec<&str> = manifest
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let p = Path::new(line);
            p.is_dir() && std::fs::read_dir(p).map(|mut it| it.next().is_some()).unwrap_or(false)
        })
        .collect();

    let mut targets_tree = Tree::new(TreeKind::Targets, "Targets");
    for target_directory in target_directories {
        let child = analyze_target(target_directory).context(format!("could not analyze build {}", path.display()))?;
        targets_tree.children.push(child);
    }

    targets_tree.sum_children_into_total();
    Ok(targets_tree)
}
