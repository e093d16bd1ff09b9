//! Syntax tree nodes produced by the PHP-subset parser.
//!
//! Nodes record the 1-based start line where the closure locator or the
//! resolver needs it; everything else is position-free.

use std::fmt;

use bitflags::bitflags;
use smallvec::SmallVec;

/// A possibly-qualified symbolic name such as `Foo\Bar` or `\strlen`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub segments: SmallVec<[String; 4]>,
    /// True when the source spelled a leading backslash; such names are
    /// already root-qualified and never rewritten.
    pub fully_qualified: bool,
}

impl Name {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            fully_qualified: false,
        }
    }

    pub fn qualified<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            fully_qualified: true,
        }
    }

    /// Parses a backslash-separated dotted path, e.g. `Vendor\Pkg\Type`.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.strip_prefix('\\');
        Self {
            segments: trimmed
                .unwrap_or(path)
                .split('\\')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            fully_qualified: trimmed.is_some(),
        }
    }

    pub fn first(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or("")
    }

    pub fn last(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1 && !self.fully_qualified
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fully_qualified {
            write!(f, "\\")?;
        }
        write!(f, "{}", self.segments.join("\\"))
    }
}

/// A fully parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
}

/// Top-level declarations and statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Namespace(NamespaceDecl),
    Use(UseDecl),
    Function(FunctionDecl),
    Class(ClassDecl),
    Const(ConstDecl),
    Stmt(Stmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    pub name: Name,
    pub line: usize,
}

/// One `use` statement. Group uses (`use A\{B, C as D};`) are expanded into
/// one entry per braced member at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct UseDecl {
    pub entries: Vec<UseEntry>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UseEntry {
    pub path: Name,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: String,
    pub value: Expr,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<TypeHint>,
    pub body: Vec<Stmt>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub parent: Option<Name>,
    pub members: Vec<ClassMember>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Const(ConstDecl),
    Property(PropertyDecl),
    Method(MethodDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub name: String,
    pub default: Option<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub is_static: bool,
    pub params: Vec<Param>,
    pub return_type: Option<TypeHint>,
    pub body: Vec<Stmt>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_hint: Option<TypeHint>,
    pub by_ref: bool,
    pub variadic: bool,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeHint {
    Name(Name),
    Nullable(Box<TypeHint>),
    Union(Vec<TypeHint>),
}

bitflags! {
    /// Modifiers spelled before a closure or arrow function.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClosureFlags: u8 {
        const STATIC = 1;
        const BY_REF = 1 << 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosureUse {
    pub name: String,
    pub by_ref: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosureExpr {
    pub flags: ClosureFlags,
    pub params: Vec<Param>,
    pub uses: Vec<ClosureUse>,
    pub return_type: Option<TypeHint>,
    pub body: Vec<Stmt>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFnExpr {
    pub flags: ClosureFlags,
    pub params: Vec<Param>,
    pub return_type: Option<TypeHint>,
    pub body: Box<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Return(Option<Expr>),
    If {
        cond: Expr,
        then: Vec<Stmt>,
        elseifs: Vec<(Expr, Vec<Stmt>)>,
        otherwise: Option<Vec<Stmt>>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    Foreach {
        subject: Expr,
        key_var: Option<String>,
        by_ref: bool,
        value_var: String,
        body: Vec<Stmt>,
    },
    Echo(Vec<Expr>),
    Break,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Concat,
    Eq,
    Identical,
    NotEq,
    NotIdentical,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Coalesce,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Concat => ".",
            BinOp::Eq => "==",
            BinOp::Identical => "===",
            BinOp::NotEq => "!=",
            BinOp::NotIdentical => "!==",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Coalesce => "??",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
    Neg,
    Plus,
    BitNot,
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Not => "!",
            UnOp::Neg => "-",
            UnOp::Plus => "+",
            UnOp::BitNot => "~",
        }
    }
}

/// Callee of a function call: a bare name or a computed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
    Name(Name),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayEntry {
    pub key: Option<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    /// Numeric literal kept as its source lexeme; the exporter never computes
    /// with it, so re-rendering the lexeme is exact.
    Number(String),
    Str(String),
    MagicFile,
    MagicDir,
    MagicClass,
    Variable(String),
    ConstFetch(Name),
    ClassConst {
        class: Name,
        constant: String,
    },
    Call {
        callee: CallTarget,
        args: Vec<Expr>,
    },
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    StaticCall {
        class: Name,
        method: String,
        args: Vec<Expr>,
    },
    New {
        class: Name,
        args: Vec<Expr>,
    },
    PropFetch {
        object: Box<Expr>,
        prop: String,
    },
    Index {
        base: Box<Expr>,
        index: Option<Box<Expr>>,
    },
    ArrayLit(Vec<ArrayEntry>),
    Assign {
        target: Box<Expr>,
        op: Option<BinOp>,
        value: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnOp,
        expr: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then: Option<Box<Expr>>,
        otherwise: Box<Expr>,
    },
    Instanceof {
        expr: Box<Expr>,
        class: Name,
    },
    Spread(Box<Expr>),
    Closure(ClosureExpr),
    ArrowFn(ArrowFnExpr),
}

#[cfg(test)]
mod tests {
    use super::Name;

    #[test]
    fn name_from_path_detects_leading_backslash() {
        let plain = Name::from_path("Foo\\Bar");
        assert!(!plain.fully_qualified);
        assert_eq!(plain.segments.as_slice(), ["Foo", "Bar"]);

        let rooted = Name::from_path("\\Foo\\Bar");
        assert!(rooted.fully_qualified);
        assert_eq!(rooted.to_string(), "\\Foo\\Bar");
    }
}
