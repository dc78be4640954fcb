//! The Kyaro lexer.
//!
//! Transforms source text into tokens by dispatching on the first
//! character of each lexeme. Multi-character operators are matched
//! longest-first. The stream always ends with exactly one `Eof` token.

use kyaro_util::{KyaroError, Result, Span};

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, Token, TokenKind};

/// The lexer for Kyaro source code.
///
/// # Example
///
/// ```
/// use kyaro_lex::{Lexer, TokenKind};
///
/// let tokens = Lexer::new("let x = 42").tokenize().unwrap();
/// assert_eq!(tokens[0].kind, TokenKind::Let);
/// assert_eq!(tokens[2].kind, TokenKind::Eq);
/// assert_eq!(tokens[3].kind, TokenKind::Int(42));
/// assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
/// ```
pub struct Lexer<'a> {
    /// Character cursor over the source.
    cursor: Cursor<'a>,

    /// Start byte offset of the current token.
    token_start: usize,

    /// Start line of the current token.
    token_start_line: u32,

    /// Start column of the current token.
    token_start_column: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Lexes the entire source into a token vector.
    ///
    /// The result is terminated by a single `Eof` token. Lexing stops at
    /// the first malformed token and returns its error.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Ok(self.make(TokenKind::Eof));
        }

        match self.cursor.current_char() {
            '\n' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::Newline))
            }

            c if c.is_ascii_digit() => self.lex_number(),
            c @ ('"' | '\'') => self.lex_string(c),
            c if c.is_alphabetic() || c == '_' => Ok(self.lex_identifier()),

            '+' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make(TokenKind::PlusEq))
                } else {
                    Ok(self.make(TokenKind::Plus))
                }
            }
            '-' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make(TokenKind::MinusEq))
                } else if self.cursor.match_char('>') {
                    Ok(self.make(TokenKind::Arrow))
                } else {
                    Ok(self.make(TokenKind::Minus))
                }
            }
            '*' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make(TokenKind::StarEq))
                } else if self.cursor.match_char('*') {
                    Ok(self.make(TokenKind::Power))
                } else {
                    Ok(self.make(TokenKind::Star))
                }
            }
            '/' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make(TokenKind::SlashEq))
                } else {
                    Ok(self.make(TokenKind::Slash))
                }
            }
            '%' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::Percent))
            }
            '=' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make(TokenKind::EqEq))
                } else {
                    Ok(self.make(TokenKind::Eq))
                }
            }
            '!' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make(TokenKind::NotEq))
                } else {
                    // Negation is spelled `not`; a lone `!` is not a token.
                    Err(self.error("Unexpected character: !"))
                }
            }
            '<' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make(TokenKind::LtEq))
                } else {
                    Ok(self.make(TokenKind::Lt))
                }
            }
            '>' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make(TokenKind::GtEq))
                } else {
                    Ok(self.make(TokenKind::Gt))
                }
            }

            '(' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::LParen))
            }
            ')' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::RParen))
            }
            '{' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::LBrace))
            }
            '}' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::RBrace))
            }
            '[' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::LBracket))
            }
            ']' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::RBracket))
            }
            ',' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::Comma))
            }
            '.' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::Dot))
            }
            ':' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::Colon))
            }
            ';' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::Semicolon))
            }

            c => {
                self.cursor.advance();
                Err(self.error(format!("Unexpected character: {c}")))
            }
        }
    }

    /// Skips spaces, tabs, carriage returns, and `#` line comments.
    ///
    /// Newlines are significant (they separate statements) and are left
    /// for `next_token` to emit.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' => self.cursor.advance(),
                '#' => {
                    while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Lexes an identifier or keyword.
    fn lex_identifier(&mut self) -> Token {
        loop {
            let c = self.cursor.current_char();
            if !c.is_alphanumeric() && c != '_' {
                break;
            }
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);
        let kind = keyword_from_ident(text).unwrap_or_else(|| TokenKind::Ident(text.to_string()));
        self.make(kind)
    }

    /// Lexes a number literal.
    ///
    /// A run of decimal digits with at most one `.`; a dot makes the
    /// literal a float. A second dot in the same literal is an error.
    fn lex_number(&mut self) -> Result<Token> {
        let mut has_dot = false;

        loop {
            let c = self.cursor.current_char();
            if c == '.' {
                if has_dot {
                    return Err(self.error("Invalid number format"));
                }
                has_dot = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);
        let kind = if has_dot {
            let value = text
                .parse::<f64>()
                .map_err(|_| self.error("Invalid number format"))?;
            TokenKind::Float(value)
        } else {
            match text.parse::<i64>() {
                Ok(value) => TokenKind::Int(value),
                // A literal wider than i64 falls back to a float.
                Err(_) => {
                    let value = text
                        .parse::<f64>()
                        .map_err(|_| self.error("Invalid number format"))?;
                    TokenKind::Float(value)
                }
            }
        };

        Ok(self.make(kind))
    }

    /// Lexes a string literal delimited by `quote`.
    ///
    /// Recognised escapes: `\n`, `\t`, `\r`, `\\`, and the matching
    /// quote. Any other escaped character stands for itself. Reaching
    /// end of input first is an error at the opening quote.
    fn lex_string(&mut self, quote: char) -> Result<Token> {
        self.cursor.advance(); // opening quote

        let mut value = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(self.error("Unterminated string"));
            }
            let c = self.cursor.current_char();
            if c == quote {
                break;
            }
            if c == '\\' {
                self.cursor.advance();
                if self.cursor.is_at_end() {
                    return Err(self.error("Unterminated string"));
                }
                let escaped = self.cursor.current_char();
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    c if c == quote => quote,
                    other => other,
                });
                self.cursor.advance();
            } else {
                value.push(c);
                self.cursor.advance();
            }
        }

        self.cursor.advance(); // closing quote
        Ok(self.make(TokenKind::Str(value)))
    }

    /// Builds a token spanning from the recorded start to the cursor.
    fn make(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.span())
    }

    /// The span from the recorded token start to the current position.
    fn span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        )
    }

    /// Builds a lex error at the current token's start.
    fn error(&self, message: impl Into<String>) -> KyaroError {
        KyaroError::lex(message, self.span())
    }
}
