use thiserror::Error;
use miette::{Diagnostic, SourceSpan};
use larch_source::SourceError;
use larch_syntax::SyntaxError;

/// Errors that abort a resolution attempt.
///
/// Every error is terminal for the traversal that raised it: the resolver stops at
/// the first one and hands it back through every caller frame. There is no warning
/// severity.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No declaration with this name is visible from the lookup site.
    #[error("Reference not found: Could not find `{name}` in the current scope")]
    #[diagnostic(code(larch_resolve::reference_not_found))]
    ReferenceNotFound {
        name: String,
        #[label("referenced here")]
        span: SourceSpan,
    },

    /// The declaration exists but its visibility forbids this access.
    #[error("Private access: `{name}` (declared at {declared_at}) is not visible here")]
    #[diagnostic(
        code(larch_resolve::private_access),
        help("Mark the declaration `export` (or `protect` for subclasses) to access it from here")
    )]
    PrivateAccess {
        name: String,
        #[label("accessed here")]
        span: SourceSpan,
        /// `file:line:column` of the private declaration.
        declared_at: String,
    },

    /// An instance-only member was reached without an instance.
    #[error("Non-static access: `{name}` requires an instance")]
    #[diagnostic(code(larch_resolve::non_static))]
    NonStatic {
        name: String,
        #[label("no instance available here")]
        span: SourceSpan,
    },

    /// The type/instance duality was violated, or a literal mixes shapes.
    #[error("Typing mismatch: {message}")]
    #[diagnostic(code(larch_resolve::typing_mismatch))]
    TypingMismatch {
        message: String,
        #[label("here")]
        span: SourceSpan,
    },

    /// The same name is declared twice in one binding scope.
    #[error("Already defined: `{name}` was first defined at {previous}")]
    #[diagnostic(code(larch_resolve::already_defined))]
    AlreadyDefined {
        name: String,
        #[label("redefined here")]
        span: SourceSpan,
        /// `file:line:column` of the first definition.
        previous: String,
    },

    /// A value holder has neither an initializer nor a declared type.
    #[error("Uninitialized: `{name}` has no initializer and no type")]
    #[diagnostic(code(larch_resolve::uninitialized), help("Add a type annotation or an initializer"))]
    Uninitialized {
        name: String,
        #[label("declared here")]
        span: SourceSpan,
    },

    /// Callee candidates exist but none accepts the arguments.
    #[error("Wrong call: no overload of `{name}` accepts these arguments")]
    #[diagnostic(code(larch_resolve::wrong_call))]
    WrongCall {
        name: String,
        #[label("called here")]
        span: SourceSpan,
    },

    /// A generic instantiation matched nothing, or its argument list is malformed.
    #[error("Non-generic: cannot apply type arguments to `{name}`: {reason}")]
    #[diagnostic(code(larch_resolve::non_generic))]
    NonGeneric {
        name: String,
        reason: String,
        #[label("instantiated here")]
        span: SourceSpan,
    },

    #[error("No such attribute: `{name}` is not a member of {on}")]
    #[diagnostic(code(larch_resolve::no_such_attribute))]
    NoSuchAttribute {
        name: String,
        on: String,
        #[label("unknown member")]
        span: SourceSpan,
    },

    /// The left side of `left.name` produced no result (for example a void call).
    #[error("Base has no result: cannot select `{name}` from an expression without a value")]
    #[diagnostic(code(larch_resolve::base_has_no_result))]
    BaseHasNoResult {
        name: String,
        #[label("this expression has no result")]
        span: SourceSpan,
    },

    /// `this` or `self` used outside a context that provides it.
    #[error("Invalid context: `{keyword}` {reason}")]
    #[diagnostic(code(larch_resolve::invalid_context))]
    InvalidContext {
        keyword: &'static str,
        reason: String,
        #[label("used here")]
        span: SourceSpan,
    },

    /// A `static` class with generics, heritage, or non-static members.
    #[error("Static class `{name}` {reason}")]
    #[diagnostic(code(larch_resolve::static_class_shape))]
    StaticClassShape {
        name: String,
        reason: String,
        #[label("declared here")]
        span: SourceSpan,
    },

    /// An imported module failed to load or resolve; its own error was reported
    /// against that module.
    #[error("Import failed: module `{path}` could not be loaded")]
    #[diagnostic(code(larch_resolve::import_failed))]
    ImportFailed {
        path: String,
        #[label("imported here")]
        span: SourceSpan,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    /// Unconditionally fatal failure inside the resolver or one of its collaborators.
    #[error("Internal resolver error: {message}")]
    #[diagnostic(code(larch_resolve::internal_error))]
    Internal { message: String },
}

impl ResolveError {
    pub fn internal(message: impl Into<String>) -> Self {
        ResolveError::Internal { message: message.into() }
    }

    pub fn typing(message: impl Into<String>, span: SourceSpan) -> Self {
        ResolveError::TypingMismatch { message: message.into(), span }
    }
}

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
