//! kyaro-lex - Lexical analysis for the Kyaro scripting language.
//!
//! The lexer turns source text into a flat token stream terminated by a
//! single [`TokenKind::Eof`]. Each token carries a [`kyaro_util::Span`]
//! locating it in the source.
//!
//! Lexical rules in brief:
//!
//! - Spaces, tabs, and carriage returns are skipped; a newline emits a
//!   [`TokenKind::Newline`] token (the parser treats it as a soft
//!   statement separator).
//! - `#` starts a comment running to the end of the line.
//! - Numbers are runs of decimal digits with at most one `.`; a dot makes
//!   the literal a float.
//! - Strings are delimited by `"` or `'` with `\n`, `\t`, `\r`, `\\`, and
//!   `\<quote>` escapes; any other escaped character stands for itself.
//! - Identifiers start with a letter or `_` and are checked against the
//!   keyword table.
//! - Operators lex by longest match (`**` before `*`, `+=` before `+`,
//!   and so on). A bare `!` is an error; Kyaro spells negation `not`.
//!
//! Errors are fatal: lexing stops at the first malformed token and
//! returns a [`kyaro_util::KyaroError::Lex`] pointing at it.

pub mod cursor;
mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{keyword_from_ident, Token, TokenKind};
