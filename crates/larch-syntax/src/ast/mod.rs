pub mod common;
pub mod node;

pub use common::{BinaryOp, Ident, Literal, Modifiers, PrimitiveKind, UnaryOp};
pub use node::{Node, NodeId, NodeKind};
