//! Semantic analysis core of the Larch compiler front-end.
//!
//! Given parser-produced [`SyntaxTree`](larch_syntax::SyntaxTree)s, this crate
//! resolves names, tracks the type/instance duality of every reference, selects
//! members through inheritance chains, matches calls against constructors and
//! overloads, and applies generic instantiations. Modules are loaded on demand and
//! deduplicated per canonical path.
//!
//! ## Entry points
//!
//! - [`Session`]: owns the loader, the resolution cache and the diagnostics;
//!   [`Session::load`] compiles a module and everything it imports
//! - [`Resolver`]: direct queries (`resolve_value`, `resolve_type`, `lookup`)
//!   against loaded modules
//!
//! ## Results
//!
//! Every query produces [`Candidates`]: an ordered list of [`Resolved`]
//! references. A reference names its target declaration and what it denotes:
//! the declaration itself, a value, or a fresh instance. Two instantiations of the
//! same declaration never compare equal.

pub mod cache;
pub mod diagnostics;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod reference;
pub mod resolver;
pub mod scope;
pub mod session;

pub use cache::{ResolutionCache, SlotKind};
pub use diagnostics::{Diagnostics, Reported};
pub use error::{ResolveError, Result};
pub use loader::{LoadStats, Loader, MemoryParser, Module, ModuleParser};
pub use matcher::{MatchOutcome, SignatureMatcher, StructuralMatcher};
pub use reference::{Candidates, DeclRef, Denotes, InstanceId, ModuleId, Position, Resolved};
pub use resolver::Resolver;
pub use scope::{Access, Scope};
pub use session::Session;
