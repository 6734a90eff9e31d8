use miette::SourceSpan;

/// A name token as produced by the parser.
///
/// Besides the byte span, the token keeps its 1-based line and column so
/// diagnostics can point at a conflicting declaration without re-reading the
/// source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: SourceSpan,
    pub line: u32,
    pub column: u32,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: SourceSpan) -> Self {
        Self { name: name.into(), span, line: 0, column: 0 }
    }

    pub fn at(name: impl Into<String>, span: SourceSpan, line: u32, column: u32) -> Self {
        Self { name: name.into(), span, line, column }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

bitflags::bitflags! {
    /// Declaration modifiers. The empty set is the `none` modifier.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const EXPORT = 1 << 0;
        const STATIC = 1 << 1;
        const READONLY = 1 << 2;
        const REFERENCE = 1 << 3;
        const PROTECT = 1 << 4;
        const ASYNC = 1 << 5;
    }
}

impl Modifiers {
    pub fn is_export(self) -> bool {
        self.contains(Modifiers::EXPORT)
    }

    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    pub fn is_protected(self) -> bool {
        self.contains(Modifiers::PROTECT)
    }
}

/// Built-in primitive type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    Float,
    Char,
    String,
    Bool,
}

impl PrimitiveKind {
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Char => "char",
            PrimitiveKind::String => "string",
            PrimitiveKind::Bool => "bool",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Char(char),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Assign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}
