//! Construction of [`SyntaxTree`]s.
//!
//! The builder is the boundary between an external parser and the resolver:
//! nodes are allocated bottom-up (children before parents), and
//! [`TreeBuilder::finish`] links parents and validates the shape.
//!
//! ```rust,ignore
//! let mut b = TreeBuilder::new();
//! let int = b.primitive(PrimitiveKind::Int);
//! let count = b.property("count", Modifiers::EXPORT, Some(int), None);
//! let counter = b.class("Counter", Modifiers::EXPORT, vec![], vec![], vec![count]);
//! let root = b.module(vec![counter]);
//! let tree = b.finish(root)?;
//! ```

use crate::ast::{BinaryOp, Ident, Literal, Modifiers, Node, NodeId, NodeKind, PrimitiveKind, UnaryOp};
use crate::error::SyntaxError;
use crate::identity::syntactic_name;
use crate::tree::SyntaxTree;
use miette::SourceSpan;

#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    offset: usize,
    line: u32,
    column: u32,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), offset: 0, line: 1, column: 1 }
    }

    /// Sets the source position recorded for the nodes allocated next.
    pub fn at(&mut self, line: u32, column: u32) -> &mut Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn ident(&mut self, name: &str) -> Ident {
        let span = SourceSpan::from((self.offset, name.len()));
        Ident::at(name, span, self.line, self.column)
    }

    /// Allocates a raw node. Parent links are filled in by [`finish`](Self::finish).
    pub fn alloc(&mut self, kind: NodeKind, name: Option<&str>, modifiers: Modifiers) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let name = name.map(|name| self.ident(name));
        let length = name.as_ref().map_or(0, |ident| ident.name.len());
        let span = SourceSpan::from((self.offset, length));
        self.offset += length.max(1);
        self.nodes.push(Node { kind, name, modifiers, parent: None, span });
        id
    }

    // --- Expressions ---

    pub fn identifier(&mut self, name: &str) -> NodeId {
        self.alloc(NodeKind::Identifier, Some(name), Modifiers::empty())
    }

    pub fn primitive(&mut self, kind: PrimitiveKind) -> NodeId {
        self.alloc(NodeKind::Primitive(kind), Some(kind.keyword()), Modifiers::empty())
    }

    pub fn literal(&mut self, literal: Literal) -> NodeId {
        self.alloc(NodeKind::Literal(literal), None, Modifiers::empty())
    }

    pub fn int(&mut self, value: i64) -> NodeId {
        self.literal(Literal::Int(value))
    }

    pub fn string(&mut self, value: &str) -> NodeId {
        self.literal(Literal::String(value.to_string()))
    }

    pub fn this(&mut self) -> NodeId {
        self.alloc(NodeKind::This, Some("this"), Modifiers::empty())
    }

    pub fn self_ref(&mut self) -> NodeId {
        self.alloc(NodeKind::SelfRef, Some("self"), Modifiers::empty())
    }

    pub fn tuple(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Tuple { elements }, None, Modifiers::empty())
    }

    pub fn object(&mut self, entries: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Object { entries }, None, Modifiers::empty())
    }

    pub fn pair(&mut self, key: NodeId, value: NodeId) -> NodeId {
        let name = match &self.nodes[key.index()] {
            node if node.kind == NodeKind::Identifier => node.name.as_ref().map(|ident| ident.name.clone()),
            _ => None,
        };
        self.alloc(NodeKind::Pair { key, value }, name.as_deref(), Modifiers::empty())
    }

    /// `name: value` with an identifier key: an object field or a named argument.
    pub fn named(&mut self, name: &str, value: NodeId) -> NodeId {
        let key = self.identifier(name);
        self.pair(key, value)
    }

    pub fn parenthesis(&mut self, inner: NodeId) -> NodeId {
        self.alloc(NodeKind::Parenthesis { inner }, None, Modifiers::empty())
    }

    pub fn attribute(&mut self, left: NodeId, member: &str) -> NodeId {
        self.alloc(NodeKind::Attribute { left }, Some(member), Modifiers::empty())
    }

    pub fn call(&mut self, callee: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Call { callee, arguments }, None, Modifiers::empty())
    }

    pub fn subscript(&mut self, base: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Subscript { base, arguments }, None, Modifiers::empty())
    }

    pub fn pseudonym(&mut self, callee: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Pseudonym { callee, arguments }, None, Modifiers::empty())
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(NodeKind::Binary { op, left, right }, None, Modifiers::empty())
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.alloc(NodeKind::Unary { op, operand }, None, Modifiers::empty())
    }

    // --- Declarations ---

    pub fn class(
        &mut self,
        name: &str,
        modifiers: Modifiers,
        generics: Vec<NodeId>,
        heritages: Vec<NodeId>,
        members: Vec<NodeId>,
    ) -> NodeId {
        self.alloc(NodeKind::Class { generics, heritages, members }, Some(name), modifiers)
    }

    pub fn function(
        &mut self,
        name: &str,
        modifiers: Modifiers,
        generics: Vec<NodeId>,
        parameters: Vec<NodeId>,
        result: Option<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        self.alloc(NodeKind::Function { generics, parameters, result, body }, Some(name), modifiers)
    }

    /// A lambda value (`body` present) or a function signature type (`body` absent).
    pub fn lambda(
        &mut self,
        generics: Vec<NodeId>,
        parameters: Vec<NodeId>,
        result: Option<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        self.alloc(NodeKind::Lambda { generics, parameters, result, body }, None, Modifiers::empty())
    }

    pub fn variable(&mut self, name: &str, modifiers: Modifiers, ty: Option<NodeId>, value: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::Variable { ty, value, entities: Vec::new() }, Some(name), modifiers)
    }

    /// A destructuring variable: `var { a, b } = value`.
    pub fn destructure(&mut self, entities: Vec<NodeId>, ty: Option<NodeId>, value: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::Variable { ty, value, entities }, None, Modifiers::empty())
    }

    pub fn entity(&mut self, name: &str, ty: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::Entity { ty }, Some(name), Modifiers::empty())
    }

    pub fn property(&mut self, name: &str, modifiers: Modifiers, ty: Option<NodeId>, value: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::Property { ty, value }, Some(name), modifiers)
    }

    pub fn parameter(&mut self, name: &str, ty: Option<NodeId>, value: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::Parameter { ty, value }, Some(name), Modifiers::empty())
    }

    pub fn generic(&mut self, name: &str, bound: Option<NodeId>, default: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::Generic { bound, default }, Some(name), Modifiers::empty())
    }

    /// A heritage clause. Without an explicit name the clause is named after the
    /// base type expression (`extends Base` is the clause `Base`).
    pub fn heritage(&mut self, name: Option<&str>, ty: NodeId) -> NodeId {
        let name = match name {
            Some(name) => Some(name.to_string()),
            None => syntactic_name(&self.nodes, ty).map(|ident| ident.name.clone()),
        };
        self.alloc(NodeKind::Heritage { ty }, name.as_deref(), Modifiers::empty())
    }

    pub fn using(&mut self, path: &str) -> NodeId {
        self.alloc(NodeKind::Using { path: Some(path.to_string()), packages: Vec::new() }, None, Modifiers::empty())
    }

    pub fn using_packages(&mut self, packages: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Using { path: None, packages }, None, Modifiers::empty())
    }

    pub fn package(&mut self, alias: &str, path: &str) -> NodeId {
        self.alloc(NodeKind::Package { path: path.to_string() }, Some(alias), Modifiers::empty())
    }

    pub fn module(&mut self, items: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Module { items }, None, Modifiers::empty())
    }

    // --- Statements ---

    pub fn body(&mut self, items: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Body { items }, None, Modifiers::empty())
    }

    pub fn for_loop(
        &mut self,
        bindings: Vec<NodeId>,
        condition: Option<NodeId>,
        step: Option<NodeId>,
        body: NodeId,
    ) -> NodeId {
        self.alloc(NodeKind::For { bindings, condition, step, body }, None, Modifiers::empty())
    }

    pub fn catch(&mut self, parameters: Vec<NodeId>, body: NodeId) -> NodeId {
        self.alloc(NodeKind::Catch { parameters, body }, None, Modifiers::empty())
    }

    pub fn try_catch(&mut self, body: NodeId, catches: Vec<NodeId>, finally: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::Try { body, catches, finally }, None, Modifiers::empty())
    }

    pub fn if_else(&mut self, condition: NodeId, then: NodeId, otherwise: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::If { condition, then, otherwise }, None, Modifiers::empty())
    }

    pub fn while_loop(&mut self, condition: NodeId, body: NodeId) -> NodeId {
        self.alloc(NodeKind::While { condition, body }, None, Modifiers::empty())
    }

    pub fn return_(&mut self, value: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::Return { value }, None, Modifiers::empty())
    }

    pub fn throw(&mut self, value: NodeId) -> NodeId {
        self.alloc(NodeKind::Throw { value }, None, Modifiers::empty())
    }

    pub fn break_(&mut self) -> NodeId {
        self.alloc(NodeKind::Break, None, Modifiers::empty())
    }

    pub fn continue_(&mut self) -> NodeId {
        self.alloc(NodeKind::Continue, None, Modifiers::empty())
    }

    pub fn expression(&mut self, value: NodeId) -> NodeId {
        self.alloc(NodeKind::Expression { value }, None, Modifiers::empty())
    }

    /// Links parents and validates the tree rooted at `root`.
    pub fn finish(mut self, root: NodeId) -> Result<SyntaxTree, SyntaxError> {
        let count = self.nodes.len() as u32;
        match self.nodes.get(root.index()) {
            Some(node) if matches!(node.kind, NodeKind::Module { .. }) => {}
            Some(node) => return Err(SyntaxError::RootNotModule { found: node.kind.describe() }),
            None => return Err(SyntaxError::DanglingNode { node: root.0, child: root.0 }),
        }

        for index in 0..self.nodes.len() {
            let parent = NodeId(index as u32);
            for child in self.nodes[index].kind.children() {
                if child.0 >= count {
                    return Err(SyntaxError::DanglingNode { node: parent.0, child: child.0 });
                }
                let slot = &mut self.nodes[child.index()].parent;
                if slot.is_some() || child == root {
                    return Err(SyntaxError::SharedNode { node: child.0 });
                }
                *slot = Some(parent);
            }
        }

        Ok(SyntaxTree { nodes: self.nodes, root })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_links_parents() {
        let mut b = TreeBuilder::new();
        let base = b.identifier("Base");
        let heritage = b.heritage(None, base);
        let class = b.class("Derived", Modifiers::EXPORT, vec![], vec![heritage], vec![]);
        let root = b.module(vec![class]);
        let tree = b.finish(root).unwrap();

        assert_eq!(tree.parent(base), Some(heritage));
        assert_eq!(tree.parent(heritage), Some(class));
        assert_eq!(tree.parent(class), Some(root));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.name(heritage).map(|i| i.as_str()), Some("Base"));
    }

    #[test]
    fn finish_rejects_shared_children() {
        let mut b = TreeBuilder::new();
        let x = b.identifier("x");
        let first = b.expression(x);
        let second = b.expression(x);
        let root = b.module(vec![first, second]);
        assert_eq!(b.finish(root).unwrap_err(), SyntaxError::SharedNode { node: x.0 });
    }

    #[test]
    fn finish_requires_module_root() {
        let mut b = TreeBuilder::new();
        let x = b.identifier("x");
        assert_eq!(b.finish(x).unwrap_err(), SyntaxError::RootNotModule { found: "identifier" });
    }

    #[test]
    fn positions_are_recorded_on_names() {
        let mut b = TreeBuilder::new();
        b.at(7, 3);
        let class = b.class("Point", Modifiers::empty(), vec![], vec![], vec![]);
        let root = b.module(vec![class]);
        let tree = b.finish(root).unwrap();
        let name = tree.name(class).unwrap();
        assert_eq!((name.line, name.column), (7, 3));
    }
}
