//! The scope walker: bare-name lookup through lexical frames, class members,
//! heritage chains and modules.

use super::Resolver;
use crate::error::{ResolveError, Result};
use crate::loader::Module;
use crate::reference::{Candidates, DeclRef, Resolved};
use crate::scope::{Access, Scope};
use fxhash::FxHashSet;
use larch_syntax::identity::{is_named, names_itself};
use larch_syntax::{Modifiers, NodeId, NodeKind};
use miette::SourceSpan;

/// A name being looked up and where it was written.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lookup<'n> {
    pub name: &'n str,
    pub site: DeclRef,
    pub span: SourceSpan,
}

impl<'s> Resolver<'s> {
    /// Walks outward from `scope` until a frame yields `lookup.name`.
    ///
    /// Returns whether anything was appended to `out`. With `stop` set, only the
    /// first frame is searched. Leaving a class frame outward turns an `Own` access
    /// into a foreign access originating from that class.
    pub(crate) fn select(
        &self,
        scope: Scope,
        lookup: &Lookup<'_>,
        access: Access,
        stop: bool,
        out: &mut Candidates,
    ) -> Result<bool> {
        let mut scope = scope;
        let mut access = access;
        loop {
            let module = self.module(scope.frame.module)?;
            log::trace!("select `{}` in {} frame {}", lookup.name, module.tree.kind(scope.frame.node).describe(), scope.frame);
            if self.select_frame(&module, scope, lookup, access, out)? {
                return Ok(true);
            }
            if stop {
                return Ok(false);
            }
            if !scope.header && matches!(module.tree.kind(scope.frame.node), NodeKind::Class { .. }) {
                access = access.leaving(scope.frame);
            }
            match scope.parent(&module) {
                Some(parent) => scope = parent,
                None => return Ok(false),
            }
        }
    }

    fn select_frame(
        &self,
        module: &Module,
        scope: Scope,
        lookup: &Lookup<'_>,
        access: Access,
        out: &mut Candidates,
    ) -> Result<bool> {
        let frame = scope.frame;
        match module.tree.kind(frame.node) {
            NodeKind::Class { generics, .. } if scope.header => Ok(self.push_named(module, generics, lookup, out)),
            NodeKind::Class { .. } => {
                let mut visited = FxHashSet::default();
                self.select_in_class(frame, lookup, access, false, out, &mut visited)
            }
            NodeKind::Module { items } => self.select_in_module(module, items, lookup, access, out),
            NodeKind::Function { generics, parameters, .. } | NodeKind::Lambda { generics, parameters, .. } => {
                Ok(self.push_named(module, generics, lookup, out) || self.push_named(module, parameters, lookup, out))
            }
            NodeKind::Body { items } => Ok(self.select_in_bindings(module, items, lookup, out)),
            NodeKind::For { bindings, .. } => Ok(self.select_in_bindings(module, bindings, lookup, out)),
            NodeKind::Catch { parameters, .. } => Ok(self.push_named(module, parameters, lookup, out)),
            NodeKind::Package { .. } => self.select_in_package(frame, lookup, out),
            _ => Ok(false),
        }
    }

    /// Appends the first of `ids` named `lookup.name`.
    fn push_named(&self, module: &Module, ids: &[NodeId], lookup: &Lookup<'_>, out: &mut Candidates) -> bool {
        match ids.iter().find(|id| is_named(&module.tree, **id, lookup.name)) {
            Some(id) => {
                out.push(Resolved::declaration(DeclRef::new(module.id, *id)));
                true
            }
            None => false,
        }
    }

    /// Statement-level bindings: variables, destructured entities, local classes and
    /// local functions (all overloads).
    fn select_in_bindings(&self, module: &Module, items: &[NodeId], lookup: &Lookup<'_>, out: &mut Candidates) -> bool {
        let tree = &module.tree;
        let mut found_function = false;
        for item in items {
            let node = tree.node(*item);
            match &node.kind {
                NodeKind::Variable { entities, .. } if !entities.is_empty() => {
                    if self.push_named(module, entities, lookup, out) {
                        return true;
                    }
                }
                NodeKind::Variable { .. } | NodeKind::Class { .. } if node.name_str() == Some(lookup.name) => {
                    out.push(Resolved::declaration(DeclRef::new(module.id, *item)));
                    return true;
                }
                NodeKind::Function { .. } if node.name_str() == Some(lookup.name) => {
                    out.push(Resolved::declaration(DeclRef::new(module.id, *item)));
                    found_function = true;
                }
                _ => {}
            }
        }
        found_function
    }

    /// Searches a class: generics, heritage clause names and members, then its
    /// bases. With `members_only`, generics and heritage names are skipped (member
    /// selection through `a.b`).
    ///
    /// A private class or property hit under a foreign access is an error; private
    /// functions are skipped instead, since another overload may still match.
    pub(crate) fn select_in_class(
        &self,
        class: DeclRef,
        lookup: &Lookup<'_>,
        access: Access,
        members_only: bool,
        out: &mut Candidates,
        visited: &mut FxHashSet<DeclRef>,
    ) -> Result<bool> {
        if !visited.insert(class) {
            return Ok(false);
        }
        let module = self.module(class.module)?;
        let tree = &module.tree;
        let NodeKind::Class { generics, heritages, members } = tree.kind(class.node) else {
            return Ok(false);
        };

        if !members_only
            && (self.push_named(&module, generics, lookup, out) || self.push_named(&module, heritages, lookup, out))
        {
            return Ok(true);
        }

        let before = out.len();
        for member in members {
            let node = tree.node(*member);
            if node.name_str() != Some(lookup.name) {
                continue;
            }
            let member_ref = DeclRef::new(class.module, *member);
            let visible = self.member_visible(node.modifiers, class, access)?;
            if let NodeKind::Function { .. } = node.kind {
                if visible {
                    out.push(Resolved::declaration(member_ref));
                }
                continue;
            }
            if !visible {
                return Err(ResolveError::PrivateAccess {
                    name: lookup.name.to_string(),
                    span: lookup.span,
                    declared_at: self.location(member_ref)?,
                });
            }
            out.push(Resolved::declaration(member_ref));
            return Ok(true);
        }
        if out.len() > before {
            return Ok(true);
        }

        let inherited = access.leaving(class);
        let class_name = tree.name(class.node);
        for heritage in heritages {
            let NodeKind::Heritage { ty } = tree.kind(*heritage) else {
                continue;
            };
            if class_name.is_some_and(|name| names_itself(tree, *ty, name)) {
                continue;
            }
            let heritage_ref = DeclRef::new(class.module, *heritage);
            if self.heritage_in_progress.borrow().contains(&heritage_ref) {
                continue;
            }
            let base = self.heritage_base(heritage_ref)?;
            if self.select_in_class(base.target, lookup, inherited, members_only, out, visited)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn member_visible(&self, modifiers: Modifiers, owner: DeclRef, access: Access) -> Result<bool> {
        match access {
            Access::Own => Ok(true),
            Access::Foreign { .. } if modifiers.is_export() => Ok(true),
            Access::Foreign { from: Some(origin) } if modifiers.is_protected() => {
                Ok(origin == owner || self.inherits(origin, owner)?)
            }
            Access::Foreign { .. } => Ok(false),
        }
    }

    /// Whether `class` inherits from `ancestor`, directly or transitively.
    pub(crate) fn inherits(&self, class: DeclRef, ancestor: DeclRef) -> Result<bool> {
        let mut pending = vec![class];
        let mut seen = FxHashSet::default();
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            let module = self.module(current.module)?;
            let NodeKind::Class { heritages, .. } = module.tree.kind(current.node) else {
                continue;
            };
            for heritage in heritages {
                let heritage_ref = DeclRef::new(current.module, *heritage);
                if self.heritage_in_progress.borrow().contains(&heritage_ref) {
                    continue;
                }
                let base = self.heritage_base(heritage_ref)?;
                if base.target == ancestor {
                    return Ok(true);
                }
                pending.push(base.target);
            }
        }
        Ok(false)
    }

    /// Module frame: imports first, then the module's own top-level declarations,
    /// then the prelude.
    fn select_in_module(
        &self,
        module: &Module,
        items: &[NodeId],
        lookup: &Lookup<'_>,
        access: Access,
        out: &mut Candidates,
    ) -> Result<bool> {
        let tree = &module.tree;
        for item in items {
            let NodeKind::Using { path, packages } = tree.kind(*item) else {
                continue;
            };
            if self.push_named(module, packages, lookup, out) {
                return Ok(true);
            }
            if let Some(path) = path {
                let target = self.import(module, path, *item)?;
                if self.select_exported(&target, lookup, true, out)? {
                    return Ok(true);
                }
            }
        }

        let restricted = lookup.site.module != module.id || matches!(access, Access::Foreign { .. });
        let mut found_function = false;
        for item in items {
            let node = tree.node(*item);
            let hit = DeclRef::new(module.id, *item);
            match &node.kind {
                NodeKind::Class { .. } if node.name_str() == Some(lookup.name) => {
                    if restricted && !node.modifiers.is_export() && !self.export_exempt(hit, lookup, access)? {
                        return Err(ResolveError::PrivateAccess {
                            name: lookup.name.to_string(),
                            span: lookup.span,
                            declared_at: self.location(hit)?,
                        });
                    }
                    out.push(Resolved::declaration(hit));
                    return Ok(true);
                }
                NodeKind::Variable { entities, .. } if !entities.is_empty() => {
                    if self.push_named(module, entities, lookup, out) {
                        return Ok(true);
                    }
                }
                NodeKind::Variable { .. } if node.name_str() == Some(lookup.name) => {
                    out.push(Resolved::declaration(hit));
                    return Ok(true);
                }
                NodeKind::Function { .. } if node.name_str() == Some(lookup.name) => {
                    out.push(Resolved::declaration(hit));
                    found_function = true;
                }
                _ => {}
            }
        }
        if found_function {
            return Ok(true);
        }

        if let Some(prelude) = self.prelude()? {
            if prelude.id != module.id && self.select_exported(&prelude, lookup, false, out)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// A private class stays reachable from itself, from its subclasses and from
    /// code nested inside it.
    fn export_exempt(&self, hit: DeclRef, lookup: &Lookup<'_>, access: Access) -> Result<bool> {
        if let Some(origin) = access.origin() {
            if origin == hit || self.inherits(origin, hit)? {
                return Ok(true);
            }
        }
        if lookup.site.module == hit.module {
            let module = self.module(hit.module)?;
            return Ok(module.tree.ancestors(lookup.site.node).any(|ancestor| ancestor == hit.node));
        }
        Ok(false)
    }

    /// Exported top-level classes of another module. With `strict`, a private
    /// class of that name is an error rather than a miss.
    pub(crate) fn select_exported(
        &self,
        target: &Module,
        lookup: &Lookup<'_>,
        strict: bool,
        out: &mut Candidates,
    ) -> Result<bool> {
        for item in target.tree.items() {
            let node = target.tree.node(*item);
            if !matches!(node.kind, NodeKind::Class { .. }) || node.name_str() != Some(lookup.name) {
                continue;
            }
            let hit = DeclRef::new(target.id, *item);
            if node.modifiers.is_export() {
                out.push(Resolved::declaration(hit));
                return Ok(true);
            }
            if strict {
                return Err(ResolveError::PrivateAccess {
                    name: lookup.name.to_string(),
                    span: lookup.span,
                    declared_at: self.location(hit)?,
                });
            }
        }
        Ok(false)
    }

    /// The exported classes of the module a package alias points to.
    pub(crate) fn select_in_package(&self, package: DeclRef, lookup: &Lookup<'_>, out: &mut Candidates) -> Result<bool> {
        let module = self.module(package.module)?;
        let NodeKind::Package { path } = module.tree.kind(package.node) else {
            return Ok(false);
        };
        let target = self.import(&module, path, package.node)?;
        self.select_exported(&target, lookup, true, out)
    }
}
