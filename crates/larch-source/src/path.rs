//! Import path canonicalization.
//!
//! An import path takes one of three forms:
//! - root-style (`collections/list`): relative to the configured library root
//! - relative (`./util`, `../shared/util`): relative to the importing module's directory
//! - absolute (`/opt/app/main`): used as-is
//!
//! The result is lexically normalized (no `.` or `..` components) and carries the
//! configured source extension. The filesystem is never consulted, so modules held
//! in memory canonicalize the same way as modules on disk.

use std::path::{Component, Path, PathBuf};
use crate::{LoaderConfig, SourceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    Root,
    Relative,
    Absolute,
}

impl PathStyle {
    pub fn classify(raw: &str) -> Self {
        if raw.starts_with("./") || raw.starts_with("../") || raw == "." || raw == ".." {
            PathStyle::Relative
        } else if Path::new(raw).is_absolute() {
            PathStyle::Absolute
        } else {
            PathStyle::Root
        }
    }
}

/// Turns an import path into the absolute path that keys the module registry.
///
/// # Arguments
///
/// * `raw` - The path as written in the `using` declaration (or handed to the loader)
/// * `config` - Loader configuration supplying the library root and extension
/// * `base_dir` - Directory of the importing module; `None` for top-level loads,
///   in which case relative paths resolve against the current working directory
pub fn canonicalize(raw: &str, config: &LoaderConfig, base_dir: Option<&Path>) -> Result<PathBuf, SourceError> {
    if raw.trim().is_empty() {
        return Err(SourceError::InvalidPath { path: raw.to_string(), reason: "path is empty".to_string() });
    }

    let joined = match PathStyle::classify(raw) {
        PathStyle::Absolute => PathBuf::from(raw),
        PathStyle::Relative => {
            let base = match base_dir {
                Some(dir) => dir.to_path_buf(),
                None => std::env::current_dir().map_err(|err| SourceError::InvalidPath {
                    path: raw.to_string(),
                    reason: format!("cannot read the working directory: {err}"),
                })?,
            };
            base.join(raw)
        }
        PathStyle::Root => match &config.library_root {
            Some(root) => root.join(raw),
            None => return Err(SourceError::LibraryRootUnset { path: raw.to_string() }),
        },
    };

    let mut normalized = normalize(&joined).ok_or_else(|| SourceError::InvalidPath {
        path: raw.to_string(),
        reason: "path climbs above its base directory".to_string(),
    })?;
    if normalized.extension().is_none() && !config.extension.is_empty() {
        normalized.set_extension(&config.extension);
    }

    log::debug!("Canonicalized import `{raw}` to {}", normalized.display());
    Ok(normalized)
}

/// Removes `.` and `..` components without touching the filesystem.
///
/// Returns `None` when a `..` would climb past the root (or past the start of a
/// relative path).
pub fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                out.pop();
                depth -= 1;
            }
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
        }
    }
    Some(out)
}
