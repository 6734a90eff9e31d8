//! Module location and loader configuration for the Larch compiler.
//!
//! - [`canonicalize`] maps an import path (root-style, relative or absolute) to the
//!   absolute path that identifies a module for the whole run
//! - [`LoaderConfig`] carries the library root, source extension, prelude module and
//!   constructor marker, read from TOML with an environment override

mod config;
mod error;
mod path;

pub use config::{default_constructor, default_extension, LoaderConfig, LIBRARY_ROOT_ENV};
pub use error::SourceError;
pub use path::{canonicalize, normalize, PathStyle};
