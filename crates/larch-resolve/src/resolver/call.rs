//! Calls and constructor matching: `callee(arguments)`.

use super::Resolver;
use crate::error::{ResolveError, Result};
use crate::loader::Module;
use crate::reference::{Candidates, DeclRef, Position, Resolved};
use larch_syntax::identity::syntactic_name;
use larch_syntax::{NodeId, NodeKind};

impl<'s> Resolver<'s> {
    /// Resolves a call. The first callee candidate whose signature accepts the
    /// arguments wins; no attempt is made to rank several matching overloads.
    pub(crate) fn resolve_call(
        &self,
        module: &Module,
        expr: DeclRef,
        callee: NodeId,
        arguments: &[NodeId],
        out: &mut Candidates,
    ) -> Result<()> {
        let span = module.tree.node(expr.node).span;
        let name = match syntactic_name(&module.tree, callee) {
            Some(ident) => ident.name.clone(),
            None => module.tree.kind(callee).describe().to_string(),
        };

        let mut callees = Candidates::new();
        self.resolve_expr(DeclRef::new(expr.module, callee), Position::Value, &mut callees)?;
        self.resolve_operands(module, arguments)?;
        if callees.is_empty() {
            return Err(ResolveError::ReferenceNotFound { name, span });
        }

        for candidate in callees {
            if self.try_call(module, candidate, arguments, out)? {
                log::trace!("call {expr} matched {}", candidate.target);
                return Ok(());
            }
        }
        Err(ResolveError::WrongCall { name, span })
    }

    fn try_call(&self, site: &Module, candidate: Resolved, arguments: &[NodeId], out: &mut Candidates) -> Result<bool> {
        let module = self.module(candidate.target.module)?;
        match module.tree.kind(candidate.target.node) {
            NodeKind::Class { .. } if candidate.is_instance() => Ok(false),
            NodeKind::Class { .. } => self.construct(candidate.target, site, arguments, out),
            NodeKind::Function { .. } | NodeKind::Lambda { .. } => self.invoke(candidate.target, site, arguments, out),
            NodeKind::Generic { .. } => match self.unwrap_generic(candidate.target)? {
                Some(class) => self.construct(class.target, site, arguments, out),
                None => Ok(false),
            },
            NodeKind::Heritage { .. } => {
                let base = self.heritage_base(candidate.target)?;
                self.construct(base.target, site, arguments, out)
            }
            kind if kind.is_value_holder() => {
                let value = self.value_of(candidate.target)?;
                match self.module(value.target.module)?.tree.kind(value.target.node) {
                    NodeKind::Function { .. } | NodeKind::Lambda { .. } => self.invoke(value.target, site, arguments, out),
                    _ => Ok(false),
                }
            }
            _ => Ok(false),
        }
    }

    /// Matches the arguments against the constructors of `class`. A class without
    /// constructors accepts an empty argument list.
    fn construct(&self, class: DeclRef, site: &Module, arguments: &[NodeId], out: &mut Candidates) -> Result<bool> {
        let module = self.module(class.module)?;
        let tree = &module.tree;
        let NodeKind::Class { members, .. } = tree.kind(class.node) else {
            return Ok(false);
        };
        let marker = self.session.config().constructor.as_str();
        let constructors: Vec<&NodeId> = members
            .iter()
            .filter(|member| matches!(tree.kind(**member), NodeKind::Function { .. }) && tree.node(**member).name_str() == Some(marker))
            .collect();

        let mut matched = constructors.is_empty() && arguments.is_empty();
        for constructor in constructors {
            let NodeKind::Function { parameters, .. } = tree.kind(*constructor) else {
                continue;
            };
            if self.matches(self.session.matcher().parameters(tree, parameters, &site.tree, arguments))? {
                matched = true;
                break;
            }
        }
        if matched {
            out.push(self.fresh_instance(class));
        }
        Ok(matched)
    }

    /// Matches a function or lambda signature. A matching signature without a
    /// result type succeeds without producing a candidate.
    fn invoke(&self, signature: DeclRef, site: &Module, arguments: &[NodeId], out: &mut Candidates) -> Result<bool> {
        let module = self.module(signature.module)?;
        let (NodeKind::Function { parameters, result, .. } | NodeKind::Lambda { parameters, result, .. }) =
            module.tree.kind(signature.node)
        else {
            return Ok(false);
        };
        if !self.matches(self.session.matcher().parameters(&module.tree, parameters, &site.tree, arguments))? {
            return Ok(false);
        }
        if let Some(result) = result {
            let result = DeclRef::new(signature.module, *result);
            let mut found = Candidates::new();
            self.resolve_expr(result, Position::Type, &mut found)?;
            let Some(ty) = found.first().copied() else {
                return Err(ResolveError::ReferenceNotFound { name: self.display_name(result)?, span: self.span(result)? });
            };
            out.push(self.call_result(ty, result)?);
        }
        Ok(true)
    }

    /// A call produces an instance of its declared result class. Primitives stand
    /// in for classes; a generic result must be bounded by one.
    fn call_result(&self, ty: Resolved, result: DeclRef) -> Result<Resolved> {
        let module = self.module(ty.target.module)?;
        match module.tree.kind(ty.target.node) {
            NodeKind::Class { .. } | NodeKind::Primitive(_) => Ok(self.fresh_instance(ty.target)),
            NodeKind::Generic { .. } => match self.unwrap_generic(ty.target)? {
                Some(instance) => Ok(instance),
                None => Err(ResolveError::typing(
                    format!("the result type `{}` has no class bound", self.display_name(ty.target)?),
                    self.span(result)?,
                )),
            },
            other => Err(ResolveError::typing(
                format!("a call result must be a class, found {}", other.describe()),
                self.span(result)?,
            )),
        }
    }
}
