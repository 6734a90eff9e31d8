use super::common::{BinaryOp, Ident, Literal, Modifiers, PrimitiveKind, UnaryOp};
use miette::SourceSpan;

/// Index of a node inside its [`SyntaxTree`](crate::SyntaxTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A declaration, statement or expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// The name token: declared name, identifier text, or attribute member.
    pub name: Option<Ident>,
    pub modifiers: Modifiers,
    /// Enclosing node; `None` only for the module root.
    pub parent: Option<NodeId>,
    pub span: SourceSpan,
}

impl Node {
    pub fn name_str(&self) -> Option<&str> {
        self.name.as_ref().map(|ident| ident.name.as_str())
    }
}

/// The closed set of node kinds produced by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // --- Declarations ---
    Module {
        items: Vec<NodeId>,
    },
    /// `using "path"` (path form) or `using { Alias: "path", ... }` (packages).
    Using {
        path: Option<String>,
        packages: Vec<NodeId>,
    },
    /// A namespace alias introduced by a braced `using`.
    Package {
        path: String,
    },
    Class {
        generics: Vec<NodeId>,
        heritages: Vec<NodeId>,
        members: Vec<NodeId>,
    },
    Function {
        generics: Vec<NodeId>,
        parameters: Vec<NodeId>,
        result: Option<NodeId>,
        body: Option<NodeId>,
    },
    /// A lambda value when it has a body, a function signature type otherwise.
    Lambda {
        generics: Vec<NodeId>,
        parameters: Vec<NodeId>,
        result: Option<NodeId>,
        body: Option<NodeId>,
    },
    /// A variable; destructuring variables carry their bindings in `entities`.
    Variable {
        ty: Option<NodeId>,
        value: Option<NodeId>,
        entities: Vec<NodeId>,
    },
    Property {
        ty: Option<NodeId>,
        value: Option<NodeId>,
    },
    Parameter {
        ty: Option<NodeId>,
        value: Option<NodeId>,
    },
    Generic {
        bound: Option<NodeId>,
        default: Option<NodeId>,
    },
    Heritage {
        ty: NodeId,
    },
    /// A binding inside a destructuring variable pattern.
    Entity {
        ty: Option<NodeId>,
    },
    /// `key: value` inside an object literal, or a named argument.
    Pair {
        key: NodeId,
        value: NodeId,
    },

    // --- Statements ---
    Body {
        items: Vec<NodeId>,
    },
    For {
        bindings: Vec<NodeId>,
        condition: Option<NodeId>,
        step: Option<NodeId>,
        body: NodeId,
    },
    Catch {
        parameters: Vec<NodeId>,
        body: NodeId,
    },
    Try {
        body: NodeId,
        catches: Vec<NodeId>,
        finally: Option<NodeId>,
    },
    If {
        condition: NodeId,
        then: NodeId,
        otherwise: Option<NodeId>,
    },
    While {
        condition: NodeId,
        body: NodeId,
    },
    Return {
        value: Option<NodeId>,
    },
    Throw {
        value: NodeId,
    },
    Break,
    Continue,
    Expression {
        value: NodeId,
    },

    // --- Expressions ---
    Identifier,
    Primitive(PrimitiveKind),
    Literal(Literal),
    This,
    SelfRef,
    Tuple {
        elements: Vec<NodeId>,
    },
    Object {
        entries: Vec<NodeId>,
    },
    Parenthesis {
        inner: NodeId,
    },
    /// `left.name`; the member name is the node's name token.
    Attribute {
        left: NodeId,
    },
    Call {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    Subscript {
        base: NodeId,
        arguments: Vec<NodeId>,
    },
    /// `callee<arguments>`.
    Pseudonym {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
}

impl NodeKind {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodeKind::Module { items } | NodeKind::Body { items } => out.extend(items),
            NodeKind::Using { packages, .. } => out.extend(packages),
            NodeKind::Class { generics, heritages, members } => {
                out.extend(generics);
                out.extend(heritages);
                out.extend(members);
            }
            NodeKind::Function { generics, parameters, result, body }
            | NodeKind::Lambda { generics, parameters, result, body } => {
                out.extend(generics);
                out.extend(parameters);
                out.extend(result);
                out.extend(body);
            }
            NodeKind::Variable { ty, value, entities } => {
                out.extend(entities);
                out.extend(ty);
                out.extend(value);
            }
            NodeKind::Property { ty, value } | NodeKind::Parameter { ty, value } => {
                out.extend(ty);
                out.extend(value);
            }
            NodeKind::Generic { bound, default } => {
                out.extend(bound);
                out.extend(default);
            }
            NodeKind::Heritage { ty } => out.push(*ty),
            NodeKind::Entity { ty } => out.extend(ty),
            NodeKind::Pair { key, value } => {
                out.push(*key);
                out.push(*value);
            }
            NodeKind::For { bindings, condition, step, body } => {
                out.extend(bindings);
                out.extend(condition);
                out.extend(step);
                out.push(*body);
            }
            NodeKind::Catch { parameters, body } => {
                out.extend(parameters);
                out.push(*body);
            }
            NodeKind::Try { body, catches, finally } => {
                out.push(*body);
                out.extend(catches);
                out.extend(finally);
            }
            NodeKind::If { condition, then, otherwise } => {
                out.push(*condition);
                out.push(*then);
                out.extend(otherwise);
            }
            NodeKind::While { condition, body } => {
                out.push(*condition);
                out.push(*body);
            }
            NodeKind::Return { value } => out.extend(value),
            NodeKind::Throw { value } | NodeKind::Expression { value } => out.push(*value),
            NodeKind::Tuple { elements } => out.extend(elements),
            NodeKind::Object { entries } => out.extend(entries),
            NodeKind::Parenthesis { inner } => out.push(*inner),
            NodeKind::Attribute { left } => out.push(*left),
            NodeKind::Call { callee, arguments } | NodeKind::Pseudonym { callee, arguments } => {
                out.push(*callee);
                out.extend(arguments);
            }
            NodeKind::Subscript { base, arguments } => {
                out.push(*base);
                out.extend(arguments);
            }
            NodeKind::Binary { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::Unary { operand, .. } => out.push(*operand),
            NodeKind::Package { .. }
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Identifier
            | NodeKind::Primitive(_)
            | NodeKind::Literal(_)
            | NodeKind::This
            | NodeKind::SelfRef => {}
        }
        out
    }

    /// Short lowercase label used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            NodeKind::Module { .. } => "module",
            NodeKind::Using { .. } => "using",
            NodeKind::Package { .. } => "package",
            NodeKind::Class { .. } => "class",
            NodeKind::Function { .. } => "function",
            NodeKind::Lambda { .. } => "lambda",
            NodeKind::Variable { .. } => "variable",
            NodeKind::Property { .. } => "property",
            NodeKind::Parameter { .. } => "parameter",
            NodeKind::Generic { .. } => "generic",
            NodeKind::Heritage { .. } => "heritage",
            NodeKind::Entity { .. } => "entity",
            NodeKind::Pair { .. } => "pair",
            NodeKind::Body { .. } => "body",
            NodeKind::For { .. } => "for",
            NodeKind::Catch { .. } => "catch",
            NodeKind::Try { .. } => "try",
            NodeKind::If { .. } => "if",
            NodeKind::While { .. } => "while",
            NodeKind::Return { .. } => "return",
            NodeKind::Throw { .. } => "throw",
            NodeKind::Break => "break",
            NodeKind::Continue => "continue",
            NodeKind::Expression { .. } => "expression statement",
            NodeKind::Identifier => "identifier",
            NodeKind::Primitive(_) => "primitive type",
            NodeKind::Literal(_) => "literal",
            NodeKind::This => "this",
            NodeKind::SelfRef => "self",
            NodeKind::Tuple { .. } => "tuple",
            NodeKind::Object { .. } => "object",
            NodeKind::Parenthesis { .. } => "parenthesis",
            NodeKind::Attribute { .. } => "attribute",
            NodeKind::Call { .. } => "call",
            NodeKind::Subscript { .. } => "subscript",
            NodeKind::Pseudonym { .. } => "pseudonym",
            NodeKind::Binary { .. } => "binary operator",
            NodeKind::Unary { .. } => "unary operator",
        }
    }

    /// Nodes that open a lexical scope frame.
    pub fn is_frame(&self) -> bool {
        matches!(
            self,
            NodeKind::Module { .. }
                | NodeKind::Class { .. }
                | NodeKind::Function { .. }
                | NodeKind::Lambda { .. }
                | NodeKind::Body { .. }
                | NodeKind::For { .. }
                | NodeKind::Catch { .. }
                | NodeKind::Package { .. }
        )
    }

    /// Declarations that carry a value slot (initializer and/or declared type).
    pub fn is_value_holder(&self) -> bool {
        matches!(
            self,
            NodeKind::Variable { .. }
                | NodeKind::Entity { .. }
                | NodeKind::Property { .. }
                | NodeKind::Parameter { .. }
                | NodeKind::Pair { .. }
        )
    }
}
