//! Scope frames and lookup origin.

use crate::loader::Module;
use crate::reference::DeclRef;
use larch_syntax::{NodeId, NodeKind};

/// A frame of the scope chain.
///
/// `header` marks the declaration header of a class: generic bounds and heritage
/// type expressions see the class's generics but none of its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope {
    pub frame: DeclRef,
    pub header: bool,
}

impl Scope {
    pub fn body(frame: DeclRef) -> Self {
        Self { frame, header: false }
    }

    pub fn header(frame: DeclRef) -> Self {
        Self { frame, header: true }
    }

    /// The innermost frame enclosing `node` (excluding `node` itself).
    pub fn enclosing(module: &Module, node: NodeId) -> Option<Scope> {
        let tree = &module.tree;
        let mut child = node;
        for ancestor in tree.ancestors(node) {
            let kind = tree.kind(ancestor);
            if let NodeKind::Class { generics, heritages, .. } = kind {
                if generics.contains(&child) || heritages.contains(&child) {
                    return Some(Scope::header(DeclRef::new(module.id, ancestor)));
                }
            }
            if kind.is_frame() {
                return Some(Scope::body(DeclRef::new(module.id, ancestor)));
            }
            child = ancestor;
        }
        None
    }

    /// The frame the walk moves to after this one.
    pub fn parent(&self, module: &Module) -> Option<Scope> {
        Scope::enclosing(module, self.frame.node)
    }
}

/// Where a lookup originates relative to the class being searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// From inside the class: private members are visible.
    Own,
    /// From outside; `from` is the class the lookup started in, if any.
    Foreign { from: Option<DeclRef> },
}

impl Access {
    pub fn origin(&self) -> Option<DeclRef> {
        match self {
            Access::Own => None,
            Access::Foreign { from } => *from,
        }
    }

    /// The access used once the walk leaves `class` outward or into its bases.
    pub fn leaving(self, class: DeclRef) -> Access {
        match self {
            Access::Own => Access::Foreign { from: Some(class) },
            foreign => foreign,
        }
    }
}

/// The class whose body (not header) encloses `node`, if any.
pub fn enclosing_class(module: &Module, node: NodeId) -> Option<DeclRef> {
    let mut scope = Scope::enclosing(module, node);
    while let Some(current) = scope {
        if !current.header && matches!(module.tree.kind(current.frame.node), NodeKind::Class { .. }) {
            return Some(current.frame);
        }
        scope = current.parent(module);
    }
    None
}
