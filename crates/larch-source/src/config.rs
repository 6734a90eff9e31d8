use serde::{Serialize, Deserialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use crate::SourceError;

/// Environment variable that sets the library root for root-style imports.
pub const LIBRARY_ROOT_ENV: &str = "LARCH_LIBRARY_ROOT";

/// Configuration of the module loader.
///
/// Read from a TOML file such as:
///
/// ```toml
/// library_root = "/opt/larch/lib"
/// extension = "lr"
/// prelude = "core/prelude"
/// constructor = "constructor"
/// ```
///
/// Every key is optional; missing keys take the values of [`LoaderConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoaderConfig {
    /// Base directory for root-style import paths.
    pub library_root: Option<PathBuf>,

    /// File extension appended to import paths that have none.
    pub extension: String,

    /// Module whose exported classes are visible in every module.
    pub prelude: Option<String>,

    /// Name of the constructor marker function inside classes.
    pub constructor: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            library_root: None,
            extension: default_extension(),
            prelude: None,
            constructor: default_constructor(),
        }
    }
}

pub fn default_extension() -> String {
    "lr".to_string()
}

pub fn default_constructor() -> String {
    "constructor".to_string()
}

impl LoaderConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, SourceError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let source = std::fs::read_to_string(path).map_err(|err| SourceError::ConfigRead {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        log::debug!("Loaded loader configuration from {}", path.display());
        Self::from_toml_str(&source)
    }

    /// Applies the `LARCH_LIBRARY_ROOT` environment override, if set.
    pub fn with_env(self) -> Self {
        self.with_library_root_override(std::env::var_os(LIBRARY_ROOT_ENV))
    }

    pub fn with_library_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.library_root = Some(root.into());
        self
    }

    pub fn with_prelude(mut self, prelude: impl Into<String>) -> Self {
        self.prelude = Some(prelude.into());
        self
    }

    fn with_library_root_override(mut self, value: Option<OsString>) -> Self {
        match value {
            Some(root) if !root.is_empty() => {
                log::debug!("Library root overridden by {LIBRARY_ROOT_ENV}: {root:?}");
                self.library_root = Some(PathBuf::from(root));
            }
            _ => {}
        }
        self
    }
}
