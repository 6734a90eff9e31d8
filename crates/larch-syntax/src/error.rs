use thiserror::Error;
use miette::{Diagnostic, SourceSpan};
use std::path::PathBuf;

#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Parse error in {}: {message}", path.display())]
    #[diagnostic(code(larch_syntax::parse_error))]
    ParseError {
        path: PathBuf,
        message: String,
        #[label("error occurred here")]
        span: Option<SourceSpan>,
    },

    #[error("No source registered for {}", path.display())]
    #[diagnostic(code(larch_syntax::missing_source), help("Check the import path and the library root"))]
    MissingSource { path: PathBuf },

    #[error("Tree error: node {node} is attached to more than one parent")]
    #[diagnostic(code(larch_syntax::shared_node))]
    SharedNode { node: u32 },

    #[error("Tree error: node {node} references missing child {child}")]
    #[diagnostic(code(larch_syntax::dangling_node))]
    DanglingNode { node: u32, child: u32 },

    #[error("Tree error: the root node must be a module, found {found}")]
    #[diagnostic(code(larch_syntax::root_not_module))]
    RootNotModule { found: &'static str },
}
