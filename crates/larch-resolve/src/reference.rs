//! Resolved references and instance identities.

use larch_syntax::NodeId;
use std::fmt;

/// Index of a module in the loader registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable identity of a node across modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclRef {
    pub module: ModuleId,
    pub node: NodeId,
}

impl DeclRef {
    pub fn new(module: ModuleId, node: NodeId) -> Self {
        Self { module, node }
    }
}

impl fmt::Display for DeclRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}:n{}", self.module.0, self.node.0)
    }
}

/// Synthetic identity of one instantiation.
///
/// Two instantiations of the same declaration never share an id, even when they
/// are structurally identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u32);

/// What a resolved reference stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Denotes {
    /// The declaration itself: a type, or a named declaration.
    Declaration,
    /// A value by nature: literals, object literals, operator and subscript results.
    Value,
    /// An instantiated value of the target type.
    Instance(InstanceId),
}

/// One entry of a candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolved {
    pub target: DeclRef,
    pub denotes: Denotes,
}

impl Resolved {
    pub fn declaration(target: DeclRef) -> Self {
        Self { target, denotes: Denotes::Declaration }
    }

    pub fn value(target: DeclRef) -> Self {
        Self { target, denotes: Denotes::Value }
    }

    pub fn instance(target: DeclRef, id: InstanceId) -> Self {
        Self { target, denotes: Denotes::Instance(id) }
    }

    /// The instance flag: true for values and instantiations.
    pub fn is_instance(&self) -> bool {
        !matches!(self.denotes, Denotes::Declaration)
    }

    pub fn instance_id(&self) -> Option<InstanceId> {
        match self.denotes {
            Denotes::Instance(id) => Some(id),
            _ => None,
        }
    }
}

/// Ordered, append-only, caller-owned results of one resolver call.
pub type Candidates = Vec<Resolved>;

/// Where an expression appears; parenthesized expressions and primitive keywords
/// behave differently in the two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Type,
    Value,
}
