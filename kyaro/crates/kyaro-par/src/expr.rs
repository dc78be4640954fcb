//! Expression parsing using Pratt parsing (top-down operator precedence).
//!
//! # Operator precedence (lowest to highest)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 | `or` | Left |
//! | 2 | `and` | Left |
//! | 3 | `==`, `!=` | Left |
//! | 4 | `<`, `>`, `<=`, `>=` | Left |
//! | 5 | `+`, `-` | Left |
//! | 6 | `*`, `/`, `%` | Left |
//! | 7 | `**` | Right |
//! | 8 | unary `-`, `not` | Prefix |
//! | 9 | call `(...)`, index `[...]`, member `.name` | Postfix |
//!
//! Left-associative operators use `(lbp, lbp + 1)` binding powers;
//! the right-associative `**` uses `(lbp, lbp)` so the right-hand side
//! re-enters at the same level.

use kyaro_lex::TokenKind;
use kyaro_util::{KyaroError, Result, Span};

use crate::ast::{
    BinOp, BinaryExpr, CallExpr, Expr, IdentExpr, IndexExpr, ListExpr, Literal, MemberExpr,
    UnOp, UnaryExpr,
};
use crate::Parser;

/// Binding power levels. Higher numbers bind tighter.
pub(crate) mod bp {
    /// Minimum binding power (start of expression).
    pub const MIN: u8 = 0;
    /// Logical `or`.
    pub const OR: u8 = 2;
    /// Logical `and`.
    pub const AND: u8 = 4;
    /// `==`, `!=`.
    pub const EQUALITY: u8 = 6;
    /// `<`, `>`, `<=`, `>=`.
    pub const COMPARISON: u8 = 8;
    /// `+`, `-`.
    pub const ADDITIVE: u8 = 10;
    /// `*`, `/`, `%`.
    pub const MULTIPLICATIVE: u8 = 12;
    /// `**` (right-associative).
    pub const POWER: u8 = 14;
    /// Prefix `-` and `not`.
    pub const UNARY: u8 = 16;
}

/// Returns the operator and `(left, right)` binding powers for an infix
/// token, or `None` for tokens that do not continue an expression.
fn infix_op(kind: &TokenKind) -> Option<(BinOp, u8, u8)> {
    let entry = match kind {
        TokenKind::Or => (BinOp::Or, bp::OR, bp::OR + 1),
        TokenKind::And => (BinOp::And, bp::AND, bp::AND + 1),
        TokenKind::EqEq => (BinOp::Eq, bp::EQUALITY, bp::EQUALITY + 1),
        TokenKind::NotEq => (BinOp::Ne, bp::EQUALITY, bp::EQUALITY + 1),
        TokenKind::Lt => (BinOp::Lt, bp::COMPARISON, bp::COMPARISON + 1),
        TokenKind::Gt => (BinOp::Gt, bp::COMPARISON, bp::COMPARISON + 1),
        TokenKind::LtEq => (BinOp::Le, bp::COMPARISON, bp::COMPARISON + 1),
        TokenKind::GtEq => (BinOp::Ge, bp::COMPARISON, bp::COMPARISON + 1),
        TokenKind::Plus => (BinOp::Add, bp::ADDITIVE, bp::ADDITIVE + 1),
        TokenKind::Minus => (BinOp::Sub, bp::ADDITIVE, bp::ADDITIVE + 1),
        TokenKind::Star => (BinOp::Mul, bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1),
        TokenKind::Slash => (BinOp::Div, bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1),
        TokenKind::Percent => (BinOp::Mod, bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1),
        // Right-associative: rbp == lbp.
        TokenKind::Power => (BinOp::Pow, bp::POWER, bp::POWER),
        _ => return None,
    };
    Some(entry)
}

/// The span of an expression, falling back to the given operator span
/// for span-less literals.
fn expr_span_or(expr: &Expr, fallback: Span) -> Span {
    expr.span().unwrap_or(fallback)
}

impl Parser {
    /// Parses a complete expression.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(bp::MIN)
    }

    /// The Pratt core: parses an expression consuming only operators
    /// whose left binding power is at least `min_bp`.
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_prefix()?;

        while let Some((op, lbp, rbp)) = infix_op(self.current_kind()) {
            if lbp < min_bp {
                break;
            }
            let op_span = self.advance().span;
            let rhs = self.parse_expr_bp(rbp)?;
            let span = expr_span_or(&lhs, op_span).to(expr_span_or(&rhs, op_span));
            lhs = Expr::Binary(BinaryExpr {
                left: Box::new(lhs),
                op,
                right: Box::new(rhs),
                span,
            });
        }

        Ok(lhs)
    }

    /// Parses a prefix operator or falls through to a postfix chain.
    fn parse_prefix(&mut self) -> Result<Expr> {
        match self.current_kind() {
            TokenKind::Minus | TokenKind::Not => {
                let token = self.advance();
                let op = if matches!(token.kind, TokenKind::Minus) {
                    UnOp::Neg
                } else {
                    UnOp::Not
                };
                let operand = self.parse_expr_bp(bp::UNARY)?;
                let span = token.span.to(expr_span_or(&operand, token.span));
                Ok(Expr::Unary(UnaryExpr {
                    op,
                    expr: Box::new(operand),
                    span,
                }))
            }
            _ => self.parse_postfix(),
        }
    }

    /// Parses a primary expression followed by any chain of calls,
    /// index accesses, and member accesses.
    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current_kind() {
                TokenKind::LParen => {
                    let open = self.advance().span;
                    let mut args = Vec::new();
                    while !matches!(self.current_kind(), TokenKind::RParen) {
                        args.push(self.parse_expr()?);
                        if matches!(self.current_kind(), TokenKind::Comma) {
                            self.advance();
                        }
                    }
                    let close = self.expect(TokenKind::RParen)?.span;
                    let span = expr_span_or(&expr, open).to(close);
                    expr = Expr::Call(CallExpr {
                        callee: Box::new(expr),
                        args,
                        span,
                    });
                }
                TokenKind::LBracket => {
                    let open = self.advance().span;
                    let index = self.parse_expr()?;
                    let close = self.expect(TokenKind::RBracket)?.span;
                    let span = expr_span_or(&expr, open).to(close);
                    expr = Expr::Index(IndexExpr {
                        object: Box::new(expr),
                        index: Box::new(index),
                        span,
                    });
                }
                TokenKind::Dot => {
                    let dot = self.advance().span;
                    let (member, member_span) = self.expect_ident()?;
                    let span = expr_span_or(&expr, dot).to(member_span);
                    expr = Expr::Member(MemberExpr {
                        object: Box::new(expr),
                        member,
                        span,
                    });
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Parses a primary expression: a literal, identifier, parenthesised
    /// expression, or list literal.
    fn parse_primary(&mut self) -> Result<Expr> {
        match self.current_kind() {
            TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::Ident(_) => {
                let token = self.advance();
                let expr = match token.kind {
                    TokenKind::Int(value) => Expr::Literal(Literal::Int(value)),
                    TokenKind::Float(value) => Expr::Literal(Literal::Float(value)),
                    TokenKind::Str(value) => Expr::Literal(Literal::Str(value)),
                    TokenKind::True => Expr::Literal(Literal::Bool(true)),
                    TokenKind::False => Expr::Literal(Literal::Bool(false)),
                    TokenKind::Null => Expr::Literal(Literal::Null),
                    TokenKind::Ident(name) => Expr::Ident(IdentExpr {
                        name,
                        span: token.span,
                    }),
                    _ => unreachable!("guarded by the outer match"),
                };
                Ok(expr)
            }

            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }

            TokenKind::LBracket => {
                let open = self.advance().span;
                let mut elements = Vec::new();
                while !matches!(self.current_kind(), TokenKind::RBracket) {
                    elements.push(self.parse_expr()?);
                    if matches!(self.current_kind(), TokenKind::Comma) {
                        self.advance();
                    }
                }
                let close = self.expect(TokenKind::RBracket)?.span;
                Ok(Expr::List(ListExpr {
                    elements,
                    span: open.to(close),
                }))
            }

            _ => {
                let token = self.current();
                Err(KyaroError::parse(
                    format!("Unexpected token: {}", token.kind),
                    token.span,
                ))
            }
        }
    }
}
