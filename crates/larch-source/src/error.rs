use std::path::PathBuf;
use thiserror::Error;
use miette::Diagnostic;

/// Errors raised while turning an import path into a module location or while
/// reading the loader configuration.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// A root-style import was used but no library root is configured.
    #[error("Library root is not set: cannot locate `{path}`")]
    #[diagnostic(
        code("SOURCE-001"),
        help("Set `library_root` in the loader configuration or the LARCH_LIBRARY_ROOT environment variable")
    )]
    LibraryRootUnset { path: String },

    /// The import path is empty or climbs above its base directory.
    #[error("Invalid module path `{path}`: {reason}")]
    #[diagnostic(code("SOURCE-002"))]
    InvalidPath { path: String, reason: String },

    /// Error reading the loader configuration file
    #[error("Error reading loader configuration {}: {message}", path.display())]
    #[diagnostic(code("SOURCE-003"), help("Check file permissions and ensure the file exists"))]
    ConfigRead { path: PathBuf, message: String },

    /// Error parsing the loader configuration
    #[error("Invalid loader configuration: {0}")]
    #[diagnostic(code("SOURCE-004"), help("Check the TOML syntax of the configuration file"))]
    ConfigParse(String),
}

// Conversion from toml::de::Error to SourceError
impl From<toml::de::Error> for SourceError {
    fn from(err: toml::de::Error) -> Self {
        SourceError::ConfigParse(err.to_string())
    }
}
