//! Generic instantiation: `callee<arguments>`.

use super::Resolver;
use crate::error::{ResolveError, Result};
use crate::loader::Module;
use crate::matcher::argument_name;
use crate::reference::{Candidates, DeclRef, Position};
use fxhash::FxHashSet;
use larch_syntax::identity::syntactic_name;
use larch_syntax::{NodeId, NodeKind};
use miette::SourceSpan;

impl<'s> Resolver<'s> {
    /// Appends every callee candidate whose generic parameters accept the type
    /// arguments.
    pub(crate) fn resolve_pseudonym(
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
        validate_type_arguments(module, &name, arguments, span)?;

        for argument in arguments {
            let mut ignored = Candidates::new();
            self.resolve_expr(DeclRef::new(expr.module, *argument), Position::Type, &mut ignored)?;
        }

        let mut callees = Candidates::new();
        self.resolve_expr(DeclRef::new(expr.module, callee), Position::Value, &mut callees)?;
        if callees.is_empty() {
            return Err(ResolveError::ReferenceNotFound { name, span });
        }

        let before = out.len();
        for candidate in callees {
            let owner = {
                let target = self.module(candidate.target.module)?;
                match target.tree.kind(candidate.target.node) {
                    NodeKind::Generic { .. } | NodeKind::Heritage { .. } => {
                        return Err(ResolveError::NonGeneric {
                            name,
                            reason: format!("a {} takes no type arguments", target.tree.kind(candidate.target.node).describe()),
                            span,
                        });
                    }
                    NodeKind::Class { .. } | NodeKind::Function { .. } | NodeKind::Lambda { .. } | NodeKind::Package { .. } => {
                        candidate.target
                    }
                    kind if kind.is_value_holder() => self.value_of(candidate.target)?.target,
                    _ => continue,
                }
            };

            let owner_module = self.module(owner.module)?;
            let generics: &[NodeId] = match owner_module.tree.kind(owner.node) {
                NodeKind::Class { generics, .. } | NodeKind::Function { generics, .. } | NodeKind::Lambda { generics, .. } => {
                    generics
                }
                NodeKind::Package { .. } => &[],
                _ => continue,
            };
            if self.matches(self.session.matcher().generics(&owner_module.tree, generics, &module.tree, arguments))? {
                out.push(candidate);
            }
        }

        if out.len() == before {
            return Err(ResolveError::NonGeneric {
                name,
                reason: "no declaration accepts these type arguments".to_string(),
                span,
            });
        }
        Ok(())
    }
}

/// Named type arguments must be unique and may not follow positional ones.
fn validate_type_arguments(module: &Module, name: &str, arguments: &[NodeId], span: SourceSpan) -> Result<()> {
    let mut seen = FxHashSet::default();
    let mut positional_seen = false;
    for argument in arguments {
        match argument_name(&module.tree, *argument) {
            None => positional_seen = true,
            Some(_) if positional_seen => {
                return Err(ResolveError::NonGeneric {
                    name: name.to_string(),
                    reason: "a named type argument cannot follow a positional one".to_string(),
                    span,
                });
            }
            Some(argument_name) => {
                if !seen.insert(argument_name) {
                    return Err(ResolveError::NonGeneric {
                        name: name.to_string(),
                        reason: format!("type argument `{argument_name}` is given twice"),
                        span,
                    });
                }
            }
        }
    }
    Ok(())
}
