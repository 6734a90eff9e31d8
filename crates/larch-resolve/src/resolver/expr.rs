//! Expression dispatch.

use super::{Lookup, Resolver};
use crate::error::{ResolveError, Result};
use crate::loader::Module;
use crate::reference::{Candidates, DeclRef, Position, Resolved};
use crate::scope::{Access, Scope};
use larch_syntax::{NodeId, NodeKind};

/// The shape an object literal takes from its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// `{1, 2, 3}`
    Set,
    /// `{"a": 1, 2: 3}`
    Dictionary,
    /// `{a: 1, b: 2}`
    Object,
}

impl Shape {
    fn describe(self) -> &'static str {
        match self {
            Shape::Set => "set entries",
            Shape::Dictionary => "dictionary entries",
            Shape::Object => "object fields",
        }
    }
}

impl<'s> Resolver<'s> {
    /// Resolves an expression and appends its candidates to `out`.
    ///
    /// Results are memoized per expression and position, so resolving the same
    /// node again yields the same candidates and creates no new instances.
    pub(crate) fn resolve_expr(&self, expr: DeclRef, position: Position, out: &mut Candidates) -> Result<()> {
        if let Some(cached) = self.session.cache().candidates(expr, position) {
            out.extend(cached);
            return Ok(());
        }
        let mut local = Candidates::new();
        self.dispatch(expr, position, &mut local)?;
        let stored = self.session.cache().store_candidates(expr, position, local);
        out.extend(stored);
        Ok(())
    }

    fn dispatch(&self, expr: DeclRef, position: Position, out: &mut Candidates) -> Result<()> {
        let module = self.module(expr.module)?;
        let node = module.tree.node(expr.node);
        log::trace!("resolve {} {expr} as {position:?}", node.kind.describe());

        match &node.kind {
            NodeKind::Identifier => {
                let name = node.name_str().unwrap_or_default();
                let scope = Scope::enclosing(&module, expr.node)
                    .ok_or_else(|| ResolveError::internal("identifier outside of any module"))?;
                let lookup = Lookup { name, site: expr, span: node.span };
                if !self.select(scope, &lookup, Access::Own, false, out)? {
                    return Err(ResolveError::ReferenceNotFound { name: name.to_string(), span: node.span });
                }
                Ok(())
            }
            NodeKind::Primitive(_) => {
                out.push(match position {
                    Position::Type => Resolved::declaration(expr),
                    Position::Value => self.fresh_instance(expr),
                });
                Ok(())
            }
            NodeKind::Literal(_) => {
                out.push(Resolved::value(expr));
                Ok(())
            }
            NodeKind::This => self.resolve_this(&module, expr, out),
            NodeKind::SelfRef => self.resolve_self(&module, expr, out),
            NodeKind::Tuple { elements } => {
                if elements.is_empty() || !self.uniform_instance(&module, elements, position)? {
                    out.push(Resolved::declaration(expr));
                    return Ok(());
                }
                self.container(&module, expr, "Array", true, out)
            }
            NodeKind::Object { entries } => self.resolve_object(&module, expr, entries, out),
            NodeKind::Lambda { body: Some(_), .. } => {
                out.push(self.fresh_instance(expr));
                Ok(())
            }
            NodeKind::Lambda { body: None, .. } => {
                out.push(Resolved::declaration(expr));
                Ok(())
            }
            NodeKind::Parenthesis { inner } => match position {
                Position::Type => {
                    Err(ResolveError::typing("a parenthesized expression cannot be used as a type", node.span))
                }
                Position::Value => self.resolve_expr(DeclRef::new(expr.module, *inner), Position::Value, out),
            },
            NodeKind::Attribute { left } => self.resolve_attribute(&module, expr, *left, out),
            NodeKind::Call { callee, arguments } => self.resolve_call(&module, expr, *callee, arguments, out),
            NodeKind::Pseudonym { callee, arguments } => self.resolve_pseudonym(&module, expr, *callee, arguments, out),
            NodeKind::Subscript { base, arguments } => {
                let mut bases = Candidates::new();
                self.resolve_expr(DeclRef::new(expr.module, *base), Position::Value, &mut bases)?;
                if bases.is_empty() {
                    return Err(ResolveError::BaseHasNoResult { name: "[]".to_string(), span: node.span });
                }
                self.resolve_operands(&module, arguments)?;
                out.push(Resolved::value(expr));
                Ok(())
            }
            NodeKind::Binary { left, right, .. } => {
                self.resolve_operands(&module, &[*left, *right])?;
                out.push(Resolved::value(expr));
                Ok(())
            }
            NodeKind::Unary { operand, .. } => {
                self.resolve_operands(&module, &[*operand])?;
                out.push(Resolved::value(expr));
                Ok(())
            }
            NodeKind::Pair { value, .. } => self.resolve_expr(DeclRef::new(expr.module, *value), position, out),
            other => Err(ResolveError::internal(format!("{} is not an expression", other.describe()))),
        }
    }

    /// Resolves each operand as a value, requiring a result from each.
    pub(crate) fn resolve_operands(&self, module: &Module, operands: &[NodeId]) -> Result<()> {
        for operand in operands {
            let operand = DeclRef::new(module.id, *operand);
            let mut found = Candidates::new();
            self.resolve_expr(operand, Position::Value, &mut found)?;
            if found.is_empty() {
                return Err(ResolveError::typing("this expression has no result", self.span(operand)?));
            }
        }
        Ok(())
    }

    fn resolve_this(&self, module: &Module, expr: DeclRef, out: &mut Candidates) -> Result<()> {
        let tree = &module.tree;
        for ancestor in tree.ancestors(expr.node) {
            match tree.kind(ancestor) {
                NodeKind::Function { .. } => {
                    let Some(class) = tree.parent(ancestor).filter(|p| matches!(tree.kind(*p), NodeKind::Class { .. }))
                    else {
                        continue;
                    };
                    if tree.node(ancestor).modifiers.is_static() {
                        return Err(ResolveError::InvalidContext {
                            keyword: "this",
                            reason: "cannot be used inside a static function".to_string(),
                            span: tree.node(expr.node).span,
                        });
                    }
                    out.push(self.receiver(DeclRef::new(module.id, class)));
                    return Ok(());
                }
                NodeKind::Class { .. } => break,
                _ => {}
            }
        }
        Err(ResolveError::InvalidContext {
            keyword: "this",
            reason: "is only available inside a non-static method".to_string(),
            span: tree.node(expr.node).span,
        })
    }

    fn resolve_self(&self, module: &Module, expr: DeclRef, out: &mut Candidates) -> Result<()> {
        let tree = &module.tree;
        let function = tree.ancestors(expr.node).find(|ancestor| {
            matches!(
                tree.kind(*ancestor),
                NodeKind::Function { body: Some(_), .. } | NodeKind::Lambda { body: Some(_), .. }
            )
        });
        match function {
            Some(function) => {
                out.push(self.receiver(DeclRef::new(module.id, function)));
                Ok(())
            }
            None => Err(ResolveError::InvalidContext {
                keyword: "self",
                reason: "is only available inside a function or lambda body".to_string(),
                span: tree.node(expr.node).span,
            }),
        }
    }

    /// Resolves every element and checks that they agree on the instance flag.
    /// Returns that flag.
    fn uniform_instance(&self, module: &Module, elements: &[NodeId], position: Position) -> Result<bool> {
        let mut expected = None;
        for element in elements {
            let element = DeclRef::new(module.id, *element);
            let mut found = Candidates::new();
            self.resolve_expr(element, position, &mut found)?;
            let Some(first) = found.first() else {
                return Err(ResolveError::typing("this element has no result", self.span(element)?));
            };
            match expected {
                None => expected = Some(first.is_instance()),
                Some(flag) if flag != first.is_instance() => {
                    return Err(ResolveError::typing("a literal cannot mix values and types", self.span(element)?));
                }
                Some(_) => {}
            }
        }
        Ok(expected.unwrap_or(false))
    }

    fn resolve_object(&self, module: &Module, expr: DeclRef, entries: &[NodeId], out: &mut Candidates) -> Result<()> {
        let tree = &module.tree;
        let mut shape = None;
        let mut values = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry_shape = match tree.kind(*entry) {
                NodeKind::Pair { key, value } => {
                    values.push(*value);
                    if matches!(tree.kind(*key), NodeKind::Identifier) {
                        Shape::Object
                    } else {
                        self.resolve_operands(module, &[*key])?;
                        Shape::Dictionary
                    }
                }
                _ => {
                    values.push(*entry);
                    Shape::Set
                }
            };
            match shape {
                None => shape = Some(entry_shape),
                Some(seen) if seen != entry_shape => {
                    return Err(ResolveError::typing(
                        format!("an object literal cannot mix {} with {}", seen.describe(), entry_shape.describe()),
                        tree.node(*entry).span,
                    ));
                }
                Some(_) => {}
            }
        }

        let instance = self.uniform_instance(module, &values, Position::Value)?;
        match shape {
            None | Some(Shape::Object) => {
                out.push(Resolved::value(expr));
                Ok(())
            }
            Some(Shape::Set) => self.container(module, expr, "Set", instance, out),
            Some(Shape::Dictionary) => self.container(module, expr, "Map", instance, out),
        }
    }

    /// Looks up a built-in container class from the literal's scope.
    fn container(&self, module: &Module, expr: DeclRef, name: &str, instance: bool, out: &mut Candidates) -> Result<()> {
        let span = module.tree.node(expr.node).span;
        let scope = Scope::enclosing(module, expr.node)
            .ok_or_else(|| ResolveError::internal("literal outside of any module"))?;
        let lookup = Lookup { name, site: expr, span };
        let mut found = Candidates::new();
        if !self.select(scope, &lookup, Access::Own, false, &mut found)? {
            return Err(ResolveError::ReferenceNotFound { name: name.to_string(), span });
        }
        let before = out.len();
        for candidate in found {
            if !matches!(self.module(candidate.target.module)?.tree.kind(candidate.target.node), NodeKind::Class { .. }) {
                continue;
            }
            out.push(if instance { self.fresh_instance(candidate.target) } else { candidate });
        }
        if out.len() == before {
            return Err(ResolveError::typing(format!("`{name}` is not a class"), span));
        }
        Ok(())
    }
}
