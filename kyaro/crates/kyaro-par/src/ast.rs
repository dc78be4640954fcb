//! AST node definitions for Kyaro.
//!
//! Nodes are immutable after parsing; the evaluator walks them by
//! reference. Operator nodes carry a [`Span`] so runtime faults can point
//! back into the source; literals do not need one.

use kyaro_lex::TokenKind;
use kyaro_util::Span;

/// A parsed program: the top-level statement block.
pub type Program = Block;

/// A sequence of statements.
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

/// Statement
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `let name = expr` - always defines in the current frame
    Let(LetStmt),

    /// `name = expr` - assigns through the scope chain
    Assign(AssignStmt),

    /// `name op= expr`
    CompoundAssign(CompoundAssignStmt),

    /// `func name(params) { body }`
    Func(FuncStmt),

    /// `return expr?`
    Return(ReturnStmt),

    /// `if cond { } elif cond { } else { }`
    If(IfStmt),

    /// `while cond { body }`
    While(WhileStmt),

    /// `for var in iterable { body }`
    For(ForStmt),

    /// `break`
    Break(Span),

    /// `continue`
    Continue(Span),

    /// A bare expression evaluated for its value/effects
    Expr(Expr),
}

/// Let binding
#[derive(Debug, Clone)]
pub struct LetStmt {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// Assignment to an existing (or newly created top-of-chain) name
#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// Compound assignment; `op` is the underlying binary operator
#[derive(Debug, Clone)]
pub struct CompoundAssignStmt {
    pub name: String,
    pub op: BinOp,
    pub value: Expr,
    pub span: Span,
}

/// Function definition
#[derive(Debug, Clone)]
pub struct FuncStmt {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
    pub span: Span,
}

/// Return statement; a missing value yields null
#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// If statement with elif chain and optional else
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_block: Block,
    pub elif_branches: Vec<(Expr, Block)>,
    pub else_block: Option<Block>,
}

/// While loop
#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Block,
}

/// For loop over a list or string
#[derive(Debug, Clone)]
pub struct ForStmt {
    pub var: String,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

/// Expression
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Ident(IdentExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Call(CallExpr),
    Index(IndexExpr),
    Member(MemberExpr),
    List(ListExpr),
}

impl Expr {
    /// The source span of this expression, if it carries one.
    pub fn span(&self) -> Option<Span> {
        match self {
            Expr::Literal(_) => None,
            Expr::Ident(e) => Some(e.span),
            Expr::Binary(e) => Some(e.span),
            Expr::Unary(e) => Some(e.span),
            Expr::Call(e) => Some(e.span),
            Expr::Index(e) => Some(e.span),
            Expr::Member(e) => Some(e.span),
            Expr::List(e) => Some(e.span),
        }
    }
}

/// Literal expression
#[derive(Debug, Clone)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
}

/// Identifier reference
#[derive(Debug, Clone)]
pub struct IdentExpr {
    pub name: String,
    pub span: Span,
}

/// Binary operation
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: BinOp,
    pub right: Box<Expr>,
    pub span: Span,
}

/// Unary operation
#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub expr: Box<Expr>,
    pub span: Span,
}

/// Function or intrinsic call
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// Index expression `obj[idx]`
#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub object: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

/// Member access `obj.name`
#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub member: String,
    pub span: Span,
}

/// List literal `[e1, e2, ...]`
#[derive(Debug, Clone)]
pub struct ListExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinOp {
    /// Maps an operator token to its binary operator, if it is one.
    pub fn from_token(kind: &TokenKind) -> Option<BinOp> {
        let op = match kind {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Mod,
            TokenKind::Power => BinOp::Pow,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::NotEq => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::LtEq => BinOp::Le,
            TokenKind::GtEq => BinOp::Ge,
            TokenKind::And => BinOp::And,
            TokenKind::Or => BinOp::Or,
            _ => return None,
        };
        Some(op)
    }

    /// Maps a compound-assignment token to the underlying operator.
    pub fn from_compound_token(kind: &TokenKind) -> Option<BinOp> {
        let op = match kind {
            TokenKind::PlusEq => BinOp::Add,
            TokenKind::MinusEq => BinOp::Sub,
            TokenKind::StarEq => BinOp::Mul,
            TokenKind::SlashEq => BinOp::Div,
            _ => return None,
        };
        Some(op)
    }

    /// The surface syntax of this operator, for error messages.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

impl UnOp {
    /// The surface syntax of this operator, for error messages.
    pub fn symbol(&self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Not => "not",
        }
    }
}
