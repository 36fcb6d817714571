//! Abstract Syntax Tree types

use std::fmt;

use crate::util::span::Span;

/// Identifier with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Double(f64),
    Bool(bool),
    String(String),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl fmt::Display for BinOp {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        f.write_str(s)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Lit(Literal, Span),
    Name(Ident),
    Unary {
        op: UnOp,
        expr: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    /// `target.member`
    Member {
        target: Box<Expr>,
        member: Ident,
        span: Span,
    },
    /// `callee(args)`; the callee is a `Member` or a `Name`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Lit(_, span) => *span,
            Expr::Name(ident) => ident.span,
            Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Member { span, .. }
            | Expr::Call { span, .. } => *span,
        }
    }
}

/// Type written in source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    Var,
    Int,
    Double,
    String,
    Bool,
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
}

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `using A.B;`
    Using { path: Vec<Ident> },
    /// `#r "target"`
    Reference { target: String, target_span: Span },
    /// `int x = 1;`
    VarDecl {
        ty: TypeName,
        ty_span: Span,
        name: Ident,
        init: Option<Expr>,
    },
    /// `x = 1;`, `x += 1;`
    Assign {
        target: Ident,
        op: AssignOp,
        value: Expr,
    },
    /// `expr;`
    Expr(Expr),
    /// Trailing expression of a script line; its value is the line's result
    Result(Expr),
    Block(Block),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Empty,
}

/// Block
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// `Type Name() { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub return_type: TypeName,
    pub name: Ident,
    pub body: Block,
    pub span: Span,
}

/// `class Name { methods }`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Ident,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

/// `namespace A.B { classes }`
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    pub path: Vec<Ident>,
    pub usings: Vec<Stmt>,
    pub classes: Vec<ClassDecl>,
    pub span: Span,
}

/// Top-level item
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Stmt(Stmt),
    Namespace(NamespaceDecl),
}

/// Dotted path as text
pub fn path_to_string(path: &[Ident]) -> String {
    path.iter()
        .map(|i| i.name.as_str())
        .collect::<Vec<_>>()
        .join(".")
}
