//! The immutable node arena produced for one source module.

use crate::ast::{Ident, Node, NodeId, NodeKind};

/// All nodes of one parsed module, addressed by [`NodeId`].
///
/// A tree is only constructed through [`TreeBuilder`](crate::TreeBuilder), which
/// links every node to its parent and checks that the root is a module. After
/// that the tree is never mutated; resolution results live in side tables.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn name(&self, id: NodeId) -> Option<&Ident> {
        self.node(id).name.as_ref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over every node id in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Walks the parent chain, starting with the parent of `id`.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors { tree: self, next: self.parent(id) }
    }

    /// The nearest enclosing scope frame of `id` (excluding `id` itself).
    pub fn enclosing_frame(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|ancestor| self.kind(*ancestor).is_frame())
    }

    /// Top-level items of the module root.
    pub fn items(&self) -> &[NodeId] {
        match self.kind(self.root) {
            NodeKind::Module { items } => items,
            _ => &[],
        }
    }
}

pub struct Ancestors<'t> {
    tree: &'t SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
