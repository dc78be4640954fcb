//! Property tests for the lexer.
//!
//! Two stream-level invariants hold for every input the lexer accepts:
//!
//! 1. Token spans are non-overlapping, in-bounds slices of the source
//!    (the lexer never invents characters).
//! 2. Pretty-printing a token stream and re-lexing it yields the same
//!    sequence of token kinds (the token stream is a fixed point).

use kyaro_lex::{Lexer, Token, TokenKind};
use proptest::prelude::*;

/// Renders a token back to surface syntax.
fn render(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Int(n) => n.to_string(),
        // Force a decimal point so the literal re-lexes as a float.
        TokenKind::Float(f) => {
            if f.fract() == 0.0 {
                format!("{f:.1}")
            } else {
                format!("{f}")
            }
        }
        TokenKind::Str(s) => {
            let mut out = String::from("\"");
            for c in s.chars() {
                match c {
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    '\r' => out.push_str("\\r"),
                    '\\' => out.push_str("\\\\"),
                    '"' => out.push_str("\\\""),
                    other => out.push(other),
                }
            }
            out.push('"');
            out
        }
        TokenKind::Ident(name) => name.clone(),
        TokenKind::Let => "let".into(),
        TokenKind::Func => "func".into(),
        TokenKind::If => "if".into(),
        TokenKind::Else => "else".into(),
        TokenKind::Elif => "elif".into(),
        TokenKind::While => "while".into(),
        TokenKind::For => "for".into(),
        TokenKind::In => "in".into(),
        TokenKind::Return => "return".into(),
        TokenKind::Break => "break".into(),
        TokenKind::Continue => "continue".into(),
        TokenKind::True => "true".into(),
        TokenKind::False => "false".into(),
        TokenKind::Null => "null".into(),
        TokenKind::And => "and".into(),
        TokenKind::Or => "or".into(),
        TokenKind::Not => "not".into(),
        TokenKind::Class => "class".into(),
        TokenKind::Import => "import".into(),
        TokenKind::Plus => "+".into(),
        TokenKind::Minus => "-".into(),
        TokenKind::Star => "*".into(),
        TokenKind::Slash => "/".into(),
        TokenKind::Percent => "%".into(),
        TokenKind::Power => "**".into(),
        TokenKind::Eq => "=".into(),
        TokenKind::PlusEq => "+=".into(),
        TokenKind::MinusEq => "-=".into(),
        TokenKind::StarEq => "*=".into(),
        TokenKind::SlashEq => "/=".into(),
        TokenKind::EqEq => "==".into(),
        TokenKind::NotEq => "!=".into(),
        TokenKind::Lt => "<".into(),
        TokenKind::Gt => ">".into(),
        TokenKind::LtEq => "<=".into(),
        TokenKind::GtEq => ">=".into(),
        TokenKind::LParen => "(".into(),
        TokenKind::RParen => ")".into(),
        TokenKind::LBrace => "{".into(),
        TokenKind::RBrace => "}".into(),
        TokenKind::LBracket => "[".into(),
        TokenKind::RBracket => "]".into(),
        TokenKind::Comma => ",".into(),
        TokenKind::Dot => ".".into(),
        TokenKind::Colon => ":".into(),
        TokenKind::Semicolon => ";".into(),
        TokenKind::Arrow => "->".into(),
        TokenKind::Newline => "\n".into(),
        TokenKind::Eof => String::new(),
    }
}

/// Pretty-prints a token stream with spaces between tokens.
fn pretty_print(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| render(&t.kind))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A generator for small well-formed-ish Kyaro snippets. Drawn from the
/// language's own surface so most samples lex successfully.
fn source_strategy() -> impl Strategy<Value = String> {
    let atom = prop_oneof![
        "[a-z_][a-z0-9_]{0,6}",
        "(0|[1-9][0-9]{0,6})",
        "(0|[1-9][0-9]{0,3})\\.[0-9]{1,4}",
        Just("\"hello\\nworld\"".to_string()),
        Just("'it''".to_string()),
        Just("let x = 1".to_string()),
        Just("func f(a, b) { return a + b }".to_string()),
        Just("while x <= 10 { x += 1 }".to_string()),
        Just("for c in \"ab\" { print(c) }".to_string()),
        Just("[1, 2.5, \"three\"]".to_string()),
        Just("# comment\n".to_string()),
        Just("a ** b ** c".to_string()),
        Just("not x or y and z".to_string()),
    ];
    prop::collection::vec(atom, 0..8).prop_map(|parts| parts.join("\n"))
}

proptest! {
    /// The lexer never panics, whatever the input.
    #[test]
    fn lexing_never_panics(source in "\\PC{0,200}") {
        let _ = Lexer::new(&source).tokenize();
    }

    /// Token spans are in-bounds, non-overlapping, and in source order.
    #[test]
    fn spans_are_ordered_subslices(source in source_strategy()) {
        if let Ok(tokens) = Lexer::new(&source).tokenize() {
            let mut last_end = 0;
            for token in &tokens {
                prop_assert!(token.span.start <= token.span.end);
                prop_assert!(token.span.end <= source.len());
                prop_assert!(token.span.start >= last_end);
                prop_assert!(source.is_char_boundary(token.span.start));
                prop_assert!(source.is_char_boundary(token.span.end));
                last_end = token.span.end;
            }
        }
    }

    /// Pretty-printing and re-lexing reproduces the same token kinds.
    #[test]
    fn pretty_print_roundtrip_is_stable(source in source_strategy()) {
        if let Ok(tokens) = Lexer::new(&source).tokenize() {
            let printed = pretty_print(&tokens);
            let relexed = Lexer::new(&printed)
                .tokenize()
                .expect("pretty-printed stream must lex");
            let kinds: Vec<_> = tokens.iter().map(|t| &t.kind).collect();
            let rekinds: Vec<_> = relexed.iter().map(|t| &t.kind).collect();
            prop_assert_eq!(kinds, rekinds);
        }
    }
}
