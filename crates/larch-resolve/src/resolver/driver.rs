//! The module driver: walks every declaration and statement of a module,
//! resolving type positions and value positions and running declaration checks.

use super::Resolver;
use crate::error::{ResolveError, Result};
use crate::loader::Module;
use crate::reference::DeclRef;
use fxhash::FxHashMap;
use larch_syntax::{NodeId, NodeKind};
use std::sync::Arc;

impl<'s> Resolver<'s> {
    /// Resolves a whole module, stopping at the first error.
    ///
    /// Path imports are loaded eagerly, so a module only succeeds once everything it
    /// imports has been loaded and resolved.
    pub fn resolve_module(&self, module: &Arc<Module>) -> Result<()> {
        self.modules.borrow_mut().insert(module.id, Arc::clone(module));
        log::debug!("Resolving declarations of {}", module.path.display());
        self.visit(module, module.tree.root())
    }

    fn visit(&self, module: &Module, id: NodeId) -> Result<()> {
        let tree = &module.tree;
        match tree.kind(id) {
            NodeKind::Module { items } | NodeKind::Body { items } => {
                self.check_duplicates(module, items)?;
                self.visit_all(module, items)
            }
            NodeKind::Using { path, packages } => {
                if let Some(path) = path {
                    self.import(module, path, id)?;
                }
                for package in packages {
                    if let NodeKind::Package { path } = tree.kind(*package) {
                        self.import(module, path, *package)?;
                    }
                }
                Ok(())
            }
            NodeKind::Package { .. } | NodeKind::Break | NodeKind::Continue => Ok(()),
            NodeKind::Class { generics, heritages, members } => self.visit_class(module, id, generics, heritages, members),
            NodeKind::Function { generics, parameters, result, body }
            | NodeKind::Lambda { generics, parameters, result, body } => {
                let mut signature = generics.clone();
                signature.extend(parameters);
                self.check_duplicates(module, &signature)?;
                self.visit_all(module, &signature)?;
                if let Some(result) = result {
                    self.check_type(module, *result)?;
                }
                if let Some(body) = body {
                    self.visit(module, *body)?;
                }
                Ok(())
            }
            NodeKind::Variable { ty, value, entities } => {
                self.visit_all(module, entities)?;
                self.visit_holder(module, *ty, *value)
            }
            NodeKind::Property { ty, value } | NodeKind::Parameter { ty, value } => self.visit_holder(module, *ty, *value),
            NodeKind::Entity { ty } => self.visit_holder(module, *ty, None),
            NodeKind::Generic { bound, default } => {
                if bound.is_some() {
                    self.bound_of(DeclRef::new(module.id, id))?;
                }
                if let Some(default) = default {
                    self.check_type(module, *default)?;
                }
                Ok(())
            }
            NodeKind::Heritage { .. } => {
                let base = self.heritage_base(DeclRef::new(module.id, id))?;
                let class = tree.parent(id).map(|class| DeclRef::new(module.id, class));
                if Some(base.target) == class {
                    return Err(ResolveError::typing("a class cannot inherit from itself", tree.node(id).span));
                }
                Ok(())
            }
            NodeKind::For { bindings, condition, step, body } => {
                self.check_duplicates(module, bindings)?;
                self.visit_all(module, bindings)?;
                if let Some(condition) = condition {
                    self.visit_value(module, *condition)?;
                }
                if let Some(step) = step {
                    self.visit_value(module, *step)?;
                }
                self.visit(module, *body)
            }
            NodeKind::Catch { parameters, body } => {
                self.check_duplicates(module, parameters)?;
                self.visit_all(module, parameters)?;
                self.visit(module, *body)
            }
            NodeKind::Try { body, catches, finally } => {
                self.visit(module, *body)?;
                self.visit_all(module, catches)?;
                if let Some(finally) = finally {
                    self.visit(module, *finally)?;
                }
                Ok(())
            }
            NodeKind::If { condition, then, otherwise } => {
                self.visit_value(module, *condition)?;
                self.visit(module, *then)?;
                if let Some(otherwise) = otherwise {
                    self.visit(module, *otherwise)?;
                }
                Ok(())
            }
            NodeKind::While { condition, body } => {
                self.visit_value(module, *condition)?;
                self.visit(module, *body)
            }
            NodeKind::Return { value } => match value {
                Some(value) => self.visit_value(module, *value),
                None => Ok(()),
            },
            NodeKind::Throw { value } | NodeKind::Expression { value } => self.visit_value(module, *value),
            _ => self.visit_value(module, id),
        }
    }

    fn visit_all(&self, module: &Module, ids: &[NodeId]) -> Result<()> {
        for id in ids {
            self.visit(module, *id)?;
        }
        Ok(())
    }

    fn visit_holder(&self, module: &Module, ty: Option<NodeId>, value: Option<NodeId>) -> Result<()> {
        if let Some(ty) = ty {
            self.check_type(module, ty)?;
        }
        if let Some(value) = value {
            self.visit_value(module, value)?;
        }
        Ok(())
    }

    fn visit_class(
        &self,
        module: &Module,
        id: NodeId,
        generics: &[NodeId],
        heritages: &[NodeId],
        members: &[NodeId],
    ) -> Result<()> {
        let tree = &module.tree;
        let node = tree.node(id);
        let name = node.name_str().unwrap_or_default();

        if node.modifiers.is_static() {
            if !generics.is_empty() {
                return Err(ResolveError::StaticClassShape {
                    name: name.to_string(),
                    reason: "cannot declare generic parameters".to_string(),
                    span: node.span,
                });
            }
            if !heritages.is_empty() {
                return Err(ResolveError::StaticClassShape {
                    name: name.to_string(),
                    reason: "cannot inherit from other classes".to_string(),
                    span: node.span,
                });
            }
            if let Some(member) = members.iter().map(|member| tree.node(*member)).find(|member| !member.modifiers.is_static()) {
                return Err(ResolveError::NonStatic {
                    name: member.name_str().unwrap_or_default().to_string(),
                    span: member.span,
                });
            }
        }

        let mut declarations = generics.to_vec();
        declarations.extend(heritages);
        declarations.extend(members);
        self.check_duplicates(module, &declarations)?;
        self.visit_all(module, &declarations)
    }

    /// A type position must name a type, never a value.
    fn check_type(&self, module: &Module, ty: NodeId) -> Result<()> {
        let candidates = self.resolve_type(module, ty)?;
        let span = module.tree.node(ty).span;
        if candidates.is_empty() {
            return Err(ResolveError::typing("this expression does not name a type", span));
        }
        for candidate in &candidates {
            let target = self.module(candidate.target.module)?;
            if candidate.is_instance() || target.tree.kind(candidate.target.node).is_value_holder() {
                return Err(ResolveError::typing(
                    format!("`{}` is a value, not a type", self.display_name(candidate.target)?),
                    span,
                ));
            }
        }
        self.visit_nested(module, ty)
    }

    fn visit_value(&self, module: &Module, expr: NodeId) -> Result<()> {
        self.resolve_value(module, expr)?;
        self.visit_nested(module, expr)
    }

    /// Visits the lambdas nested anywhere inside an expression.
    fn visit_nested(&self, module: &Module, expr: NodeId) -> Result<()> {
        let mut pending = vec![expr];
        while let Some(current) = pending.pop() {
            let kind = module.tree.kind(current);
            if let NodeKind::Lambda { .. } = kind {
                self.visit(module, current)?;
                continue;
            }
            pending.extend(kind.children().into_iter().rev());
        }
        Ok(())
    }

    /// Two declarations of one binding scope may share a name only when both are
    /// functions (overloads).
    fn check_duplicates(&self, module: &Module, ids: &[NodeId]) -> Result<()> {
        let tree = &module.tree;
        let mut bindings = Vec::with_capacity(ids.len());
        for id in ids {
            match tree.kind(*id) {
                NodeKind::Variable { entities, .. } if !entities.is_empty() => bindings.extend(entities),
                NodeKind::Using { packages, .. } => bindings.extend(packages),
                _ => bindings.push(*id),
            }
        }

        let mut first: FxHashMap<&str, NodeId> = FxHashMap::default();
        for id in bindings {
            let node = tree.node(id);
            let binds = matches!(
                node.kind,
                NodeKind::Class { .. }
                    | NodeKind::Function { .. }
                    | NodeKind::Variable { .. }
                    | NodeKind::Property { .. }
                    | NodeKind::Parameter { .. }
                    | NodeKind::Generic { .. }
                    | NodeKind::Heritage { .. }
                    | NodeKind::Entity { .. }
                    | NodeKind::Package { .. }
            );
            let Some(name) = node.name_str().filter(|_| binds) else {
                continue;
            };
            let Some(previous) = first.get(name).copied() else {
                first.insert(name, id);
                continue;
            };
            let overload = matches!(tree.kind(previous), NodeKind::Function { .. }) && matches!(node.kind, NodeKind::Function { .. });
            if !overload {
                return Err(ResolveError::AlreadyDefined {
                    name: name.to_string(),
                    span: node.span,
                    previous: self.location(DeclRef::new(module.id, previous))?,
                });
            }
        }
        Ok(())
    }
}
