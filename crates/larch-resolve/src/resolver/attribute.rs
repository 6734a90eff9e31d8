//! Member selection: `left.name`.

use super::{Lookup, Resolver};
use crate::error::{ResolveError, Result};
use crate::loader::Module;
use crate::reference::{Candidates, DeclRef, Position, Resolved};
use crate::scope::{enclosing_class, Access};
use fxhash::FxHashSet;
use larch_syntax::{NodeId, NodeKind};

impl<'s> Resolver<'s> {
    pub(crate) fn resolve_attribute(&self, module: &Module, expr: DeclRef, left: NodeId, out: &mut Candidates) -> Result<()> {
        let node = module.tree.node(expr.node);
        let name = node.name_str().unwrap_or_default();

        let mut bases = Candidates::new();
        self.resolve_expr(DeclRef::new(expr.module, left), Position::Value, &mut bases)?;
        if bases.is_empty() {
            return Err(ResolveError::BaseHasNoResult { name: name.to_string(), span: node.span });
        }

        let lookup = Lookup { name, site: expr, span: node.span };
        for base in bases {
            self.select_attribute(base, &lookup, out)?;
        }
        Ok(())
    }

    fn select_attribute(&self, base: Resolved, lookup: &Lookup<'_>, out: &mut Candidates) -> Result<()> {
        let module = self.module(base.target.module)?;
        match module.tree.kind(base.target.node) {
            NodeKind::Class { .. } => self.select_member(base, lookup, out),
            NodeKind::Generic { .. } => self.select_through_generic(base.target, lookup, out),
            NodeKind::Heritage { .. } => {
                let class = self.heritage_base(base.target)?;
                self.select_member(class, lookup, out)
            }
            NodeKind::Package { path } => {
                if !self.select_in_package(base.target, lookup, out)? {
                    return Err(self.no_such_attribute(lookup, format!("package `{path}`")));
                }
                Ok(())
            }
            NodeKind::Object { .. } => self.select_field(base.target, lookup, out),
            kind if kind.is_value_holder() => {
                let value = self.value_of(base.target)?;
                self.select_in_value(value, lookup, out)
            }
            other => Err(self.no_such_attribute(lookup, other.describe().to_string())),
        }
    }

    fn select_in_value(&self, value: Resolved, lookup: &Lookup<'_>, out: &mut Candidates) -> Result<()> {
        let module = self.module(value.target.module)?;
        match module.tree.kind(value.target.node) {
            NodeKind::Class { .. } => self.select_member(value, lookup, out),
            NodeKind::Object { .. } => self.select_field(value.target, lookup, out),
            NodeKind::Generic { .. } => self.select_through_generic(value.target, lookup, out),
            other => Err(self.no_such_attribute(lookup, format!("a value of {}", other.describe()))),
        }
    }

    fn select_through_generic(&self, generic: DeclRef, lookup: &Lookup<'_>, out: &mut Candidates) -> Result<()> {
        match self.unwrap_generic(generic)? {
            Some(class) => self.select_member(class, lookup, out),
            None => Err(ResolveError::ReferenceNotFound { name: self.display_name(generic)?, span: lookup.span }),
        }
    }

    /// Selects a member of a class (own or inherited). Through the class
    /// declaration itself only static members are reachable.
    fn select_member(&self, class: Resolved, lookup: &Lookup<'_>, out: &mut Candidates) -> Result<()> {
        let access = self.access_at(lookup.site, class.target)?;
        let before = out.len();
        let mut visited = FxHashSet::default();
        if !self.select_in_class(class.target, lookup, access, true, out, &mut visited)? {
            let on = format!("class `{}`", self.display_name(class.target)?);
            return Err(self.no_such_attribute(lookup, on));
        }
        if class.is_instance() {
            return Ok(());
        }
        for hit in &out[before..] {
            let module = self.module(hit.target.module)?;
            let node = module.tree.node(hit.target.node);
            let instance_only = matches!(node.kind, NodeKind::Property { .. } | NodeKind::Function { .. })
                && !node.modifiers.is_static();
            if instance_only {
                return Err(ResolveError::NonStatic { name: lookup.name.to_string(), span: lookup.span });
            }
        }
        Ok(())
    }

    /// `Own` when the selection is written inside the selected class.
    fn access_at(&self, site: DeclRef, class: DeclRef) -> Result<Access> {
        let module = self.module(site.module)?;
        Ok(match enclosing_class(&module, site.node) {
            Some(enclosing) if enclosing == class => Access::Own,
            from => Access::Foreign { from },
        })
    }

    /// Structural selection of a field of an object literal.
    fn select_field(&self, object: DeclRef, lookup: &Lookup<'_>, out: &mut Candidates) -> Result<()> {
        let module = self.module(object.module)?;
        let NodeKind::Object { entries } = module.tree.kind(object.node) else {
            return Err(self.no_such_attribute(lookup, "a non-object value".to_string()));
        };
        let field = entries.iter().find(|entry| {
            matches!(module.tree.kind(**entry), NodeKind::Pair { .. }) && module.tree.node(**entry).name_str() == Some(lookup.name)
        });
        match field {
            Some(field) => {
                out.push(Resolved::declaration(DeclRef::new(object.module, *field)));
                Ok(())
            }
            None => Err(self.no_such_attribute(lookup, "the object literal".to_string())),
        }
    }

    fn no_such_attribute(&self, lookup: &Lookup<'_>, on: String) -> ResolveError {
        ResolveError::NoSuchAttribute { name: lookup.name.to_string(), on, span: lookup.span }
    }
}
