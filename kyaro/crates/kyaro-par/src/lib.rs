//! kyaro-par - Recursive-descent parser for Kyaro.
//!
//! The parser consumes the token stream produced by `kyaro-lex` and
//! builds the AST defined in [`ast`]. Statements are parsed by plain
//! recursive descent; expressions use Pratt parsing (top-down operator
//! precedence) in the [`expr`] module.
//!
//! Newlines and semicolons are soft separators: they are skipped between
//! statements and around block boundaries but are not permitted inside
//! an expression.
//!
//! Errors are fatal. The parser stops at the first unexpected token and
//! returns a [`KyaroError::Parse`] carrying the token's position.

pub mod ast;
mod expr;

pub use ast::*;

use kyaro_lex::{Token, TokenKind};
use kyaro_util::{KyaroError, Result, Span};

/// The Kyaro parser.
///
/// Holds the token stream and a monotonically advancing cursor. Tokens
/// are owned by the parser and discarded once the AST is built.
///
/// # Example
///
/// ```
/// use kyaro_lex::Lexer;
/// use kyaro_par::Parser;
///
/// let tokens = Lexer::new("let x = 1 + 2").tokenize().unwrap();
/// let program = Parser::new(tokens).parse().unwrap();
/// assert_eq!(program.stmts.len(), 1);
/// ```
pub struct Parser {
    /// Token stream from the lexer, terminated by `Eof`.
    tokens: Vec<Token>,

    /// Current position in the token stream.
    position: usize,
}

impl Parser {
    /// Creates a parser over a token stream.
    ///
    /// The lexer always terminates the stream with `Eof`; one is added
    /// here if the caller hands over an empty vector.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, Span::DUMMY));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses a complete program: statements until `Eof`.
    pub fn parse(mut self) -> Result<Program> {
        let mut stmts = Vec::new();
        self.skip_separators();

        while !matches!(self.current_kind(), TokenKind::Eof) {
            stmts.push(self.parse_stmt()?);
            self.skip_separators();
        }

        Ok(Block { stmts })
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    /// Parses a single statement.
    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.current_kind() {
            TokenKind::Let => self.parse_let_stmt(),
            TokenKind::Func => self.parse_func_stmt(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Break => {
                let span = self.advance().span;
                Ok(Stmt::Break(span))
            }
            TokenKind::Continue => {
                let span = self.advance().span;
                Ok(Stmt::Continue(span))
            }
            TokenKind::Class | TokenKind::Import => {
                let token = self.current();
                Err(KyaroError::parse(
                    format!("{} is reserved but not yet supported", token.kind),
                    token.span,
                ))
            }
            _ => self.parse_expr_stmt(),
        }
    }

    /// `let` IDENT `=` expression
    fn parse_let_stmt(&mut self) -> Result<Stmt> {
        let span = self.advance().span;
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        Ok(Stmt::Let(LetStmt { name, value, span }))
    }

    /// `func` IDENT `(` params `)` `{` body `}`
    fn parse_func_stmt(&mut self) -> Result<Stmt> {
        let span = self.advance().span;
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;

        let mut params = Vec::new();
        while !matches!(self.current_kind(), TokenKind::RParen) {
            let (param, _) = self.expect_ident()?;
            params.push(param);
            if matches!(self.current_kind(), TokenKind::Comma) {
                self.advance();
            }
        }
        self.expect(TokenKind::RParen)?;

        let body = self.parse_brace_block()?;
        Ok(Stmt::Func(FuncStmt {
            name,
            params,
            body,
            span,
        }))
    }

    /// `if` expr block (`elif` expr block)* (`else` block)?
    fn parse_if_stmt(&mut self) -> Result<Stmt> {
        self.advance();
        let cond = self.parse_expr()?;
        let then_block = self.parse_brace_block()?;
        self.skip_separators();

        let mut elif_branches = Vec::new();
        while matches!(self.current_kind(), TokenKind::Elif) {
            self.advance();
            let elif_cond = self.parse_expr()?;
            let elif_block = self.parse_brace_block()?;
            self.skip_separators();
            elif_branches.push((elif_cond, elif_block));
        }

        let else_block = if matches!(self.current_kind(), TokenKind::Else) {
            self.advance();
            Some(self.parse_brace_block()?)
        } else {
            None
        };

        Ok(Stmt::If(IfStmt {
            cond,
            then_block,
            elif_branches,
            else_block,
        }))
    }

    /// `while` expr block
    fn parse_while_stmt(&mut self) -> Result<Stmt> {
        self.advance();
        let cond = self.parse_expr()?;
        let body = self.parse_brace_block()?;
        Ok(Stmt::While(WhileStmt { cond, body }))
    }

    /// `for` IDENT `in` expr block
    fn parse_for_stmt(&mut self) -> Result<Stmt> {
        let span = self.advance().span;
        let (var, _) = self.expect_ident()?;
        self.expect(TokenKind::In)?;
        let iterable = self.parse_expr()?;
        let body = self.parse_brace_block()?;
        Ok(Stmt::For(ForStmt {
            var,
            iterable,
            body,
            span,
        }))
    }

    /// `return` expression?
    ///
    /// The expression is absent when the statement ends at a separator,
    /// a closing brace, or end of input; the call then yields null.
    fn parse_return_stmt(&mut self) -> Result<Stmt> {
        let span = self.advance().span;
        let value = match self.current_kind() {
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => None,
            _ => Some(self.parse_expr()?),
        };
        Ok(Stmt::Return(ReturnStmt { value, span }))
    }

    /// An expression statement, possibly rewritten into an assignment.
    ///
    /// If the parsed expression is a bare identifier immediately followed
    /// by `=` or a compound-assignment operator, the statement becomes an
    /// assignment to that name. Any other assignment target is rejected.
    fn parse_expr_stmt(&mut self) -> Result<Stmt> {
        let expr = self.parse_expr()?;

        if let Expr::Ident(ident) = &expr {
            if matches!(self.current_kind(), TokenKind::Eq) {
                self.advance();
                let value = self.parse_expr()?;
                return Ok(Stmt::Assign(AssignStmt {
                    name: ident.name.clone(),
                    value,
                    span: ident.span,
                }));
            }
            if let Some(op) = BinOp::from_compound_token(self.current_kind()) {
                self.advance();
                let value = self.parse_expr()?;
                return Ok(Stmt::CompoundAssign(CompoundAssignStmt {
                    name: ident.name.clone(),
                    op,
                    value,
                    span: ident.span,
                }));
            }
        } else if matches!(
            self.current_kind(),
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
        ) {
            // Assignment into index or member targets is not part of the
            // language yet.
            let token = self.current();
            return Err(KyaroError::parse("Invalid assignment target", token.span));
        }

        Ok(Stmt::Expr(expr))
    }

    /// `{` statements `}` with separators skipped around statements.
    fn parse_brace_block(&mut self) -> Result<Block> {
        self.expect(TokenKind::LBrace)?;
        self.skip_separators();

        let mut stmts = Vec::new();
        while !matches!(self.current_kind(), TokenKind::RBrace) {
            if matches!(self.current_kind(), TokenKind::Eof) {
                let token = self.current();
                return Err(KyaroError::parse(
                    format!("Expected {}, got {}", TokenKind::RBrace, token.kind),
                    token.span,
                ));
            }
            stmts.push(self.parse_stmt()?);
            self.skip_separators();
        }

        self.expect(TokenKind::RBrace)?;
        Ok(Block { stmts })
    }

    // =========================================================================
    // TOKEN CURSOR HELPERS
    // =========================================================================

    /// The current token. The stream is `Eof`-terminated, so the cursor
    /// never runs past the end.
    pub(crate) fn current(&self) -> &Token {
        let index = self.position.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// The kind of the current token.
    pub(crate) fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    /// Consumes and returns the current token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    /// Consumes the expected token or fails with a parse error at the
    /// actual one.
    pub(crate) fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.current().kind == expected {
            Ok(self.advance())
        } else {
            let token = self.current();
            Err(KyaroError::parse(
                format!("Expected {}, got {}", expected, token.kind),
                token.span,
            ))
        }
    }

    /// Consumes an identifier token, returning its name and span.
    pub(crate) fn expect_ident(&mut self) -> Result<(String, Span)> {
        if let TokenKind::Ident(name) = self.current_kind() {
            let name = name.clone();
            let span = self.advance().span;
            Ok((name, span))
        } else {
            let token = self.current();
            Err(KyaroError::parse(
                format!("Expected identifier, got {}", token.kind),
                token.span,
            ))
        }
    }

    /// Skips newline and semicolon separator tokens.
    pub(crate) fn skip_separators(&mut self) {
        while matches!(
            self.current_kind(),
            TokenKind::Newline | TokenKind::Semicolon
        ) {
            self.advance();
        }
    }
}
