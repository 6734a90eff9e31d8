//! Literal name-token equality.
//!
//! Names are compared by their token text only; spans and positions never take
//! part in identity.

use crate::ast::{Ident, Node, NodeId, NodeKind};
use crate::tree::SyntaxTree;

/// Anything nodes can be looked up in: a finished tree or a builder's buffer.
pub trait NodeLookup {
    fn lookup(&self, id: NodeId) -> Option<&Node>;
}

impl NodeLookup for SyntaxTree {
    fn lookup(&self, id: NodeId) -> Option<&Node> {
        self.get(id)
    }
}

impl NodeLookup for Vec<Node> {
    fn lookup(&self, id: NodeId) -> Option<&Node> {
        self.get(id.index())
    }
}

pub fn same_name(a: &Ident, b: &Ident) -> bool {
    a.name == b.name
}

/// Whether the node's name token is exactly `name`.
pub fn is_named<T: NodeLookup + ?Sized>(nodes: &T, id: NodeId, name: &str) -> bool {
    nodes.lookup(id).and_then(|node| node.name.as_ref()).is_some_and(|ident| ident.name == name)
}

/// The name an expression spells out syntactically: an identifier's own name, the
/// member of an attribute, or the callee of a generic instantiation.
pub fn syntactic_name<T: NodeLookup + ?Sized>(nodes: &T, expr: NodeId) -> Option<&Ident> {
    let node = nodes.lookup(expr)?;
    match &node.kind {
        NodeKind::Identifier | NodeKind::Attribute { .. } => node.name.as_ref(),
        NodeKind::Pseudonym { callee, .. } => syntactic_name(nodes, *callee),
        _ => None,
    }
}

/// Whether `expr` is syntactically the bare identifier `name`, or an
/// instantiation of it (`name<...>`).
pub fn names_itself<T: NodeLookup + ?Sized>(nodes: &T, expr: NodeId, name: &Ident) -> bool {
    let Some(node) = nodes.lookup(expr) else {
        return false;
    };
    match &node.kind {
        NodeKind::Identifier => node.name.as_ref().is_some_and(|own| same_name(own, name)),
        NodeKind::Pseudonym { callee, .. } => names_itself(nodes, *callee, name),
        _ => false,
    }
}
