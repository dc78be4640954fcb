//! kyaro-drv - Driver for the Kyaro interpreter.
//!
//! Orchestrates the pipeline (lex → parse → evaluate) for the two entry
//! points the `kyaro` binary exposes:
//!
//! - **batch mode**: read a source file, run it, exit non-zero on any
//!   interpreter error;
//! - **REPL mode**: evaluate one line at a time against a long-lived
//!   interpreter, printing non-null results and continuing after
//!   errors.
//!
//! Interpreter errors are user-facing and go to stdout in their
//! `Error at line L, column C: <message>` form; logging goes to stderr
//! through `tracing`.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use kyaro_eval::{Interpreter, Value};
use kyaro_lex::Lexer;
use kyaro_par::Parser;
use kyaro_util::KyaroError;

/// Runs a complete source text through the pipeline on the given
/// interpreter, yielding the program's final value.
pub fn run_source(interpreter: &mut Interpreter, source: &str) -> Result<Value, KyaroError> {
    let tokens = Lexer::new(source).tokenize()?;
    debug!(tokens = tokens.len(), "lexing finished");

    let program = Parser::new(tokens).parse()?;
    debug!(statements = program.stmts.len(), "parsing finished");

    let value = interpreter.interpret(&program)?;
    debug!(kind = value.type_name(), "evaluation finished");
    Ok(value)
}

/// Executes a source file, reporting errors to stdout.
///
/// Returns the process exit code: 0 on success, 1 on a missing file or
/// any interpreter error.
pub fn run_file(path: &Path) -> i32 {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(_) => {
            println!("Error: File '{}' not found", path.display());
            return 1;
        }
    };

    let mut interpreter = Interpreter::new();
    match run_source(&mut interpreter, &source) {
        Ok(_) => 0,
        Err(err) => {
            println!("{err}");
            1
        }
    }
}

/// The interactive read-eval-print loop.
///
/// One interpreter lives for the whole session, so bindings and
/// function definitions persist across inputs.
pub struct Repl {
    interpreter: Interpreter,
}

impl Repl {
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }

    /// Evaluates a single line of input.
    pub fn eval_line(&mut self, line: &str) -> Result<Value, KyaroError> {
        run_source(&mut self.interpreter, line)
    }

    /// Runs the loop until end of input.
    pub fn run(&mut self) -> anyhow::Result<()> {
        println!("Kyaro {}", env!("CARGO_PKG_VERSION"));
        println!("Type exit() to quit");

        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            print!("kyaro> ");
            io::stdout().flush().context("failed to flush stdout")?;

            line.clear();
            let read = stdin
                .lock()
                .read_line(&mut line)
                .context("failed to read from stdin")?;
            if read == 0 {
                // EOF exits cleanly.
                println!();
                return Ok(());
            }

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            match self.eval_line(input) {
                Ok(Value::Null) => {}
                Ok(value) => println!("{value}"),
                Err(err) => println!("{err}"),
            }
        }
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_source_pipeline() {
        let mut interpreter = Interpreter::new();
        let value = run_source(&mut interpreter, "let x = 2\nx * 21").unwrap();
        assert_eq!(value, Value::Int(42));
    }

    #[test]
    fn test_run_source_reports_lex_errors() {
        let mut interpreter = Interpreter::new();
        let err = run_source(&mut interpreter, "let s = \"open").unwrap_err();
        assert!(matches!(err, KyaroError::Lex { .. }));
    }

    #[test]
    fn test_run_source_reports_parse_errors() {
        let mut interpreter = Interpreter::new();
        let err = run_source(&mut interpreter, "let = 3").unwrap_err();
        assert!(matches!(err, KyaroError::Parse { .. }));
    }

    #[test]
    fn test_repl_state_persists_across_lines() {
        let mut repl = Repl::new();
        repl.eval_line("let x = 10").unwrap();
        repl.eval_line("func double(n) { return n * 2 }").unwrap();
        assert_eq!(repl.eval_line("double(x)").unwrap(), Value::Int(20));
    }

    #[test]
    fn test_repl_continues_after_error() {
        let mut repl = Repl::new();
        assert!(repl.eval_line("boom +").is_err());
        assert_eq!(repl.eval_line("1 + 1").unwrap(), Value::Int(2));
    }

    #[test]
    fn test_run_file_missing() {
        assert_eq!(run_file(Path::new("/no/such/file.kyaro")), 1);
    }
}
