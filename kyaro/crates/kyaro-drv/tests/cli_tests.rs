//! CLI end-to-end tests.
//!
//! Each test writes a program to a temp file, runs the `kyaro` binary
//! on it, and checks stdout and the exit code.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn kyaro() -> Command {
    Command::cargo_bin("kyaro").expect("kyaro binary builds")
}

/// Writes a program to a temp file and returns the handle (the file is
/// removed when the handle drops).
fn script(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(source.as_bytes()).expect("write program");
    file
}

#[test]
fn test_addition_program() {
    let file = script("let x = 10\nlet y = 20\nprint(x + y)\n");
    kyaro().arg(file.path()).assert().success().stdout("30\n");
}

#[test]
fn test_string_concatenation() {
    let file = script("print(\"a\" + \"b\")\n");
    kyaro().arg(file.path()).assert().success().stdout("ab\n");
}

#[test]
fn test_while_factorial() {
    let file = script(
        "let n = 5\nlet f = 1\nlet i = 1\nwhile i <= n { f = f * i; i = i + 1 }\nprint(f)\n",
    );
    kyaro().arg(file.path()).assert().success().stdout("120\n");
}

#[test]
fn test_function_call() {
    let file = script("func add(a, b) { return a + b }\nprint(add(2, 3))\n");
    kyaro().arg(file.path()).assert().success().stdout("5\n");
}

#[test]
fn test_closure_captures_definition_site() {
    let file = script(
        "func mk(x) {\n  func inner() { return x }\n  return inner\n}\nlet g = mk(42)\nprint(g())\n",
    );
    kyaro().arg(file.path()).assert().success().stdout("42\n");
}

#[test]
fn test_for_over_string() {
    let file = script("for c in \"ab\" { print(c) }\n");
    kyaro().arg(file.path()).assert().success().stdout("a\nb\n");
}

#[test]
fn test_division_by_zero_exits_nonzero() {
    let file = script("print(1 / 0)\n");
    kyaro()
        .arg(file.path())
        .assert()
        .failure()
        .stdout(
            predicate::str::contains("Division by zero")
                .and(predicate::str::starts_with("Error")),
        );
}

#[test]
fn test_precedence_outputs() {
    let file = script("print(2 + 3 * 4)\nprint(2 ** 3 ** 2)\nprint(not 0 or 0)\n");
    kyaro()
        .arg(file.path())
        .assert()
        .success()
        .stdout("14\n512\ntrue\n");
}

#[test]
fn test_float_and_list_formatting() {
    let file = script("print(1 / 2)\nprint(4 / 2)\nprint([1, \"two\", true, null, [3.5]])\n");
    kyaro()
        .arg(file.path())
        .assert()
        .success()
        .stdout("0.5\n2.0\n[1, two, true, null, [3.5]]\n");
}

#[test]
fn test_print_joins_arguments_with_spaces() {
    let file = script("print(\"total:\", 1 + 2)\n");
    kyaro()
        .arg(file.path())
        .assert()
        .success()
        .stdout("total: 3\n");
}

#[test]
fn test_lex_error_has_position() {
    let file = script("let s = \"unterminated\n");
    kyaro()
        .arg(file.path())
        .assert()
        .failure()
        .stdout("Error at line 1, column 9: Unterminated string\n");
}

#[test]
fn test_parse_error_has_position() {
    let file = script("let x = 1\nlet = 2\n");
    kyaro()
        .arg(file.path())
        .assert()
        .failure()
        .stdout("Error at line 2, column 5: Expected identifier, got '='\n");
}

#[test]
fn test_runtime_error_stops_execution() {
    let file = script("print(\"before\")\nprint(missing)\nprint(\"after\")\n");
    kyaro()
        .arg(file.path())
        .assert()
        .failure()
        .stdout(
            predicate::str::contains("before")
                .and(predicate::str::contains("Undefined variable: missing"))
                .and(predicate::str::contains("after").not()),
        );
}

#[test]
fn test_missing_file() {
    kyaro()
        .arg("/no/such/kyaro/program.kyaro")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Error: File '/no/such/kyaro/program.kyaro' not found",
        ));
}

#[test]
fn test_extra_arguments_rejected() {
    kyaro()
        .args(["one.kyaro", "two.kyaro"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_help_and_version() {
    kyaro()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage").and(predicate::str::contains("kyaro")));
    kyaro()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kyaro"));
}

#[test]
fn test_repl_session() {
    kyaro()
        .write_stdin("let x = 5\nx * 2\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("kyaro> ")
                .and(predicate::str::contains("10")),
        );
}

#[test]
fn test_repl_ignores_empty_lines_and_recovers_from_errors() {
    kyaro()
        .write_stdin("\n\nnope +\n1 + 1\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Error")
                .and(predicate::str::contains("2")),
        );
}

#[test]
fn test_repl_does_not_print_null_results() {
    kyaro()
        .write_stdin("print(\"hi\")\n")
        .assert()
        .success()
        // `print` returns null, so only the printed text appears.
        .stdout(predicate::str::contains("hi").and(predicate::str::contains("null").not()));
}
