//! Generic bounds, heritage bases and declaration values.

use super::Resolver;
use crate::cache::SlotKind;
use crate::error::{ResolveError, Result};
use crate::reference::{Candidates, DeclRef, Position, Resolved};
use larch_syntax::{NodeId, NodeKind};

impl<'s> Resolver<'s> {
    /// Resolves a generic parameter's bound chain down to a class declaration.
    ///
    /// Returns `None` for an unbounded generic. Not memoized here; callers cache
    /// what they derive from it. A bound that needs its own generic to resolve
    /// (`T: T.x`, or through a chain) fails instead of recursing.
    pub(crate) fn bound_of(&self, generic: DeclRef) -> Result<Option<DeclRef>> {
        let mut walked = Vec::new();
        let bound = self.walk_bounds(generic, &mut walked);
        let mut in_progress = self.bounds_in_progress.borrow_mut();
        for current in walked {
            in_progress.remove(&current);
        }
        bound
    }

    fn walk_bounds(&self, generic: DeclRef, walked: &mut Vec<DeclRef>) -> Result<Option<DeclRef>> {
        let mut current = generic;
        loop {
            if !self.bounds_in_progress.borrow_mut().insert(current) {
                return Err(ResolveError::typing(
                    format!("the bound of `{}` depends on itself", self.display_name(current)?),
                    self.span(current)?,
                ));
            }
            walked.push(current);
            let module = self.module(current.module)?;
            let NodeKind::Generic { bound: Some(bound), .. } = module.tree.kind(current.node) else {
                return Ok(None);
            };
            let bound = DeclRef::new(current.module, *bound);
            let mut found = Candidates::new();
            self.resolve_expr(bound, Position::Type, &mut found)?;
            let Some(first) = found.first().copied() else {
                return Err(ResolveError::ReferenceNotFound {
                    name: self.display_name(bound)?,
                    span: self.span(bound)?,
                });
            };
            match self.module(first.target.module)?.tree.kind(first.target.node) {
                NodeKind::Class { .. } if first.is_instance() => {
                    return Err(ResolveError::typing("a generic bound must be a type, not a value", self.span(bound)?));
                }
                NodeKind::Class { .. } => return Ok(Some(first.target)),
                NodeKind::Generic { .. } => current = first.target,
                other => {
                    return Err(ResolveError::typing(
                        format!("a generic bound must name a class, found {}", other.describe()),
                        self.span(bound)?,
                    ))
                }
            }
        }
    }

    /// The instantiated class a bounded generic stands for, cached on the generic.
    pub(crate) fn unwrap_generic(&self, generic: DeclRef) -> Result<Option<Resolved>> {
        if let Some(cached) = self.session.cache().slot(SlotKind::Unwrap, generic) {
            return Ok(Some(cached));
        }
        let Some(class) = self.bound_of(generic)? else {
            return Ok(None);
        };
        let instance = self.fresh_instance(class);
        Ok(Some(self.session.cache().store_slot(SlotKind::Unwrap, generic, instance)))
    }

    /// The instantiated base class of a heritage clause, cached on the clause.
    pub(crate) fn heritage_base(&self, heritage: DeclRef) -> Result<Resolved> {
        if let Some(cached) = self.session.cache().slot(SlotKind::Heritage, heritage) {
            return Ok(cached);
        }
        if !self.heritage_in_progress.borrow_mut().insert(heritage) {
            return Err(ResolveError::typing("inheritance cycle", self.span(heritage)?));
        }
        let base = self.compute_heritage_base(heritage);
        self.heritage_in_progress.borrow_mut().remove(&heritage);
        let base = base?;
        log::trace!("heritage {heritage} resolves to base {}", base.target);
        Ok(self.session.cache().store_slot(SlotKind::Heritage, heritage, base))
    }

    fn compute_heritage_base(&self, heritage: DeclRef) -> Result<Resolved> {
        let module = self.module(heritage.module)?;
        let NodeKind::Heritage { ty } = module.tree.kind(heritage.node) else {
            return Err(ResolveError::internal("heritage base requested for a non-heritage node"));
        };
        let ty = DeclRef::new(heritage.module, *ty);
        let mut found = Candidates::new();
        self.resolve_expr(ty, Position::Type, &mut found)?;
        let Some(first) = found.first().copied() else {
            return Err(ResolveError::ReferenceNotFound { name: self.display_name(ty)?, span: self.span(ty)? });
        };
        match self.module(first.target.module)?.tree.kind(first.target.node) {
            NodeKind::Class { .. } => Ok(self.fresh_instance(first.target)),
            NodeKind::Generic { .. } => match self.bound_of(first.target)? {
                Some(class) => Ok(self.fresh_instance(class)),
                None => Err(ResolveError::ReferenceNotFound {
                    name: self.display_name(first.target)?,
                    span: self.span(ty)?,
                }),
            },
            other => Err(ResolveError::typing(
                format!("a class can only inherit from a class, found {}", other.describe()),
                self.span(ty)?,
            )),
        }
    }

    /// The receiver `this` (in a class) or `self` (in a function) denotes; one
    /// instance per declaration.
    pub(crate) fn receiver(&self, decl: DeclRef) -> Resolved {
        if let Some(cached) = self.session.cache().slot(SlotKind::Receiver, decl) {
            return cached;
        }
        let instance = self.fresh_instance(decl);
        self.session.cache().store_slot(SlotKind::Receiver, decl, instance)
    }

    /// Turns a resolved type into a value of that type.
    pub(crate) fn instantiate_type(&self, ty: Resolved, at: DeclRef) -> Result<Resolved> {
        let module = self.module(ty.target.module)?;
        match module.tree.kind(ty.target.node) {
            NodeKind::Class { .. } | NodeKind::Primitive(_) => Ok(self.fresh_instance(ty.target)),
            NodeKind::Generic { .. } => match self.unwrap_generic(ty.target)? {
                Some(instance) => Ok(instance),
                None => Ok(self.fresh_instance(ty.target)),
            },
            NodeKind::Lambda { body: None, .. } => Ok(Resolved::declaration(ty.target)),
            NodeKind::Tuple { .. } => Ok(Resolved::value(ty.target)),
            other => Err(ResolveError::typing(
                format!("expected a type, found {}", other.describe()),
                self.span(at)?,
            )),
        }
    }

    /// The value held by a variable, entity, property, parameter or pair, cached
    /// on the declaration.
    pub(crate) fn value_of(&self, decl: DeclRef) -> Result<Resolved> {
        if let Some(cached) = self.session.cache().slot(SlotKind::Value, decl) {
            return Ok(cached);
        }
        let value = self.compute_value(decl)?;
        Ok(self.session.cache().store_slot(SlotKind::Value, decl, value))
    }

    /// Values under computation stay marked until they finish, so a value that
    /// reaches itself through any expression (`var a = a.x`, `var f = f()`) fails.
    fn compute_value(&self, decl: DeclRef) -> Result<Resolved> {
        if !self.values_in_progress.borrow_mut().insert(decl) {
            return Err(ResolveError::typing(
                format!("the value of `{}` depends on itself", self.display_name(decl)?),
                self.span(decl)?,
            ));
        }
        let value = self.compute_value_unguarded(decl);
        self.values_in_progress.borrow_mut().remove(&decl);
        value
    }

    fn compute_value_unguarded(&self, decl: DeclRef) -> Result<Resolved> {
        let module = self.module(decl.module)?;
        let tree = &module.tree;
        let (ty, value) = match tree.kind(decl.node) {
            NodeKind::Variable { ty, value, .. } | NodeKind::Property { ty, value } | NodeKind::Parameter { ty, value } => {
                (*ty, *value)
            }
            NodeKind::Pair { value, .. } => (None, Some(*value)),
            NodeKind::Entity { ty } => match ty {
                Some(ty) => (Some(*ty), None),
                None => return self.destructured_value(decl),
            },
            other => {
                return Err(ResolveError::internal(format!("{} holds no value", other.describe())));
            }
        };

        if let Some(value) = value {
            return self.initializer_value(decl, DeclRef::new(decl.module, value));
        }
        if let Some(ty) = ty {
            return self.typed_value(DeclRef::new(decl.module, ty));
        }
        Err(ResolveError::Uninitialized { name: self.display_name(decl)?, span: self.span(decl)? })
    }

    fn initializer_value(&self, decl: DeclRef, init: DeclRef) -> Result<Resolved> {
        let mut found = Candidates::new();
        self.resolve_expr(init, Position::Value, &mut found)?;
        let Some(first) = found.first().copied() else {
            return Err(ResolveError::typing(
                format!("the initializer of `{}` has no result", self.display_name(decl)?),
                self.span(init)?,
            ));
        };
        let target = self.module(first.target.module)?;
        match target.tree.kind(first.target.node) {
            _ if first.is_instance() => Ok(first),
            NodeKind::Lambda { .. } | NodeKind::Function { .. } => Ok(first),
            kind if kind.is_value_holder() => {
                if let Some(cached) = self.session.cache().slot(SlotKind::Value, first.target) {
                    return Ok(cached);
                }
                let value = self.compute_value(first.target)?;
                Ok(self.session.cache().store_slot(SlotKind::Value, first.target, value))
            }
            _ => Err(ResolveError::typing(
                format!("`{}` is not an instance of object or function", self.display_name(decl)?),
                self.span(init)?,
            )),
        }
    }

    /// The value of a declaration that only has a type: a function signature stays
    /// a bodyless lambda, anything else is instantiated.
    fn typed_value(&self, ty: DeclRef) -> Result<Resolved> {
        let mut found = Candidates::new();
        self.resolve_expr(ty, Position::Type, &mut found)?;
        let Some(first) = found.first().copied() else {
            return Err(ResolveError::ReferenceNotFound { name: self.display_name(ty)?, span: self.span(ty)? });
        };
        self.instantiate_type(first, ty)
    }

    /// An untyped entity of `var { a, b } = value` takes the member of the same
    /// name from the destructured value.
    fn destructured_value(&self, entity: DeclRef) -> Result<Resolved> {
        let module = self.module(entity.module)?;
        let tree = &module.tree;
        let name = self.display_name(entity)?;
        let uninitialized = || ResolveError::Uninitialized { name: name.clone(), span: tree.node(entity.node).span };

        let Some(variable) = tree.parent(entity.node) else {
            return Err(uninitialized());
        };
        let (NodeKind::Variable { value: Some(_), .. } | NodeKind::Variable { ty: Some(_), .. }) = tree.kind(variable) else {
            return Err(uninitialized());
        };
        let source = self.value_of(DeclRef::new(entity.module, variable))?;
        let source_module = self.module(source.target.module)?;
        match source_module.tree.kind(source.target.node) {
            NodeKind::Object { entries } => {
                let pair = find_named(&source_module.tree, entries, &name).ok_or_else(uninitialized)?;
                self.value_of(DeclRef::new(source.target.module, pair))
            }
            NodeKind::Class { members, .. } => {
                let member = find_named(&source_module.tree, members, &name).ok_or_else(uninitialized)?;
                let member = DeclRef::new(source.target.module, member);
                match source_module.tree.kind(member.node) {
                    kind if kind.is_value_holder() => self.value_of(member),
                    _ => Ok(Resolved::declaration(member)),
                }
            }
            _ => Err(ResolveError::typing(
                format!("cannot destructure `{name}` from a value without members"),
                tree.node(entity.node).span,
            )),
        }
    }
}

fn find_named(tree: &larch_syntax::SyntaxTree, ids: &[NodeId], name: &str) -> Option<NodeId> {
    ids.iter().copied().find(|id| tree.node(*id).name_str() == Some(name))
}
