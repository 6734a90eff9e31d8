//! Syntax tree model for the Larch compiler front-end.
//!
//! This crate does not parse. It defines the tree shape an external parser hands
//! to the resolver:
//! - [`SyntaxTree`]: an immutable arena of [`Node`]s addressed by [`NodeId`]
//! - [`TreeBuilder`]: bottom-up construction with parent linking and validation
//! - [`identity`]: literal name-token equality helpers

pub mod ast;
pub mod builder;
pub mod error;
pub mod identity;
pub mod tree;

pub use ast::{BinaryOp, Ident, Literal, Modifiers, Node, NodeId, NodeKind, PrimitiveKind, UnaryOp};
pub use builder::TreeBuilder;
pub use error::SyntaxError;
pub use tree::SyntaxTree;
