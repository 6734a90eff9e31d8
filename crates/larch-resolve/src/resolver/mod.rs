//! The resolution engine.
//!
//! A [`Resolver`] is a cheap, per-thread view of a [`Session`]. Resolution is plain
//! recursion on the calling thread; every result that must stay stable is kept in
//! the session's [`ResolutionCache`](crate::ResolutionCache), so separate resolvers
//! of one session observe the same instances.
//!
//! The work is split by concern:
//! - `select`: the scope walker (lexical frames, class members, heritage, modules)
//! - `expr`: dispatch over expression kinds and literal shapes
//! - `attribute`, `call`, `pseudonym`: `a.b`, `f(x)` and `F<T>`
//! - `helpers`: generic bounds, heritage bases and declaration values
//! - `driver`: the whole-module walk and declaration checks

mod attribute;
mod call;
mod driver;
mod expr;
mod helpers;
mod pseudonym;
mod select;

use crate::error::{ResolveError, Result};
use crate::loader::Module;
use crate::matcher::MatchOutcome;
use crate::reference::{Candidates, DeclRef, ModuleId, Position, Resolved};
use crate::scope::{Access, Scope};
use crate::session::Session;
use fxhash::{FxHashMap, FxHashSet};
use larch_syntax::NodeId;
use miette::SourceSpan;
use std::cell::RefCell;
use std::sync::Arc;

pub(crate) use select::Lookup;

pub struct Resolver<'s> {
    session: &'s Session,
    modules: RefCell<FxHashMap<ModuleId, Arc<Module>>>,
    /// Heritage clauses whose base is being resolved on this resolver.
    heritage_in_progress: RefCell<FxHashSet<DeclRef>>,
    /// Declarations whose value is being computed.
    values_in_progress: RefCell<FxHashSet<DeclRef>>,
    /// Generics whose bound chain is being walked.
    bounds_in_progress: RefCell<FxHashSet<DeclRef>>,
}

impl<'s> Resolver<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            modules: RefCell::new(FxHashMap::default()),
            heritage_in_progress: RefCell::new(FxHashSet::default()),
            values_in_progress: RefCell::new(FxHashSet::default()),
            bounds_in_progress: RefCell::new(FxHashSet::default()),
        }
    }

    pub fn session(&self) -> &'s Session {
        self.session
    }

    /// Resolves `expr` as a value (the right-hand side of an initializer, an argument).
    pub fn resolve_value(&self, module: &Module, expr: NodeId) -> Result<Candidates> {
        let mut out = Candidates::new();
        self.resolve_expr(DeclRef::new(module.id, expr), Position::Value, &mut out)?;
        Ok(out)
    }

    /// Resolves `expr` as a type (a declared type, a bound, a base class).
    pub fn resolve_type(&self, module: &Module, expr: NodeId) -> Result<Candidates> {
        let mut out = Candidates::new();
        self.resolve_expr(DeclRef::new(module.id, expr), Position::Type, &mut out)?;
        Ok(out)
    }

    /// Looks `name` up as if it were written at node `at`.
    pub fn lookup(&self, module: &Module, at: NodeId, name: &str) -> Result<Candidates> {
        let site = DeclRef::new(module.id, at);
        let scope = Scope::enclosing(module, at).unwrap_or(Scope::body(DeclRef::new(module.id, module.tree.root())));
        let lookup = Lookup { name, site, span: module.tree.node(at).span };
        let mut out = Candidates::new();
        self.select(scope, &lookup, Access::Own, false, &mut out)?;
        Ok(out)
    }

    /// The value a variable, entity, property, parameter or pair holds.
    pub fn value_of_node(&self, module: &Module, decl: NodeId) -> Result<Resolved> {
        self.value_of(DeclRef::new(module.id, decl))
    }

    pub(crate) fn module(&self, id: ModuleId) -> Result<Arc<Module>> {
        if let Some(module) = self.modules.borrow().get(&id) {
            return Ok(Arc::clone(module));
        }
        let module = self
            .session
            .loader()
            .module(id)
            .ok_or_else(|| ResolveError::internal(format!("module #{} is not loaded", id.0)))?;
        self.modules.borrow_mut().insert(id, Arc::clone(&module));
        Ok(module)
    }

    pub(crate) fn fresh_instance(&self, target: DeclRef) -> Resolved {
        Resolved::instance(target, self.session.next_instance())
    }

    pub(crate) fn span(&self, decl: DeclRef) -> Result<SourceSpan> {
        Ok(self.module(decl.module)?.tree.node(decl.node).span)
    }

    /// The declared name of a node, or its kind for anonymous nodes.
    pub(crate) fn display_name(&self, decl: DeclRef) -> Result<String> {
        let module = self.module(decl.module)?;
        let node = module.tree.node(decl.node);
        Ok(match node.name_str() {
            Some(name) => name.to_string(),
            None => node.kind.describe().to_string(),
        })
    }

    /// `file:line:column` of a declaration's name.
    pub(crate) fn location(&self, decl: DeclRef) -> Result<String> {
        let module = self.module(decl.module)?;
        Ok(match module.tree.name(decl.node) {
            Some(ident) => format!("{}:{}:{}", module.path.display(), ident.line, ident.column),
            None => module.path.display().to_string(),
        })
    }

    pub(crate) fn matches(&self, outcome: MatchOutcome) -> Result<bool> {
        match outcome {
            MatchOutcome::Match => Ok(true),
            MatchOutcome::NoMatch => Ok(false),
            MatchOutcome::InternalError(message) => Err(ResolveError::internal(format!("signature matcher: {message}"))),
        }
    }

    /// Loads a module imported by `importer`. Load failures surface as
    /// `ImportFailed`; the dependency's own error was reported against it.
    pub(crate) fn import(&self, importer: &Module, raw: &str, site: NodeId) -> Result<Arc<Module>> {
        self.session.load_from(raw, importer.dir()).map_err(|error| match error {
            ResolveError::Source(_) => error,
            _ => ResolveError::ImportFailed { path: raw.to_string(), span: importer.tree.node(site).span },
        })
    }

    /// The configured prelude module, loaded on first use.
    pub(crate) fn prelude(&self) -> Result<Option<Arc<Module>>> {
        let Some(raw) = &self.session.config().prelude else {
            return Ok(None);
        };
        self.session.load_from(raw, None).map(Some).map_err(|error| match error {
            ResolveError::Source(_) => error,
            _ => ResolveError::ImportFailed { path: raw.clone(), span: SourceSpan::from((0, 0)) },
        })
    }
}
