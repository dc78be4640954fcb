//! Core intrinsics: I/O, conversions, and process control.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use kyaro_util::{KyaroError, Result};

use super::{check_arity, check_arity_range, integer, number, Registry};
use crate::interp::Interpreter;
use crate::value::Value;

pub(super) fn register(registry: &mut Registry) {
    registry.add("print", print);
    registry.add("input", input);
    registry.add("len", len);
    registry.add("str", to_str);
    registry.add("int", to_int);
    registry.add("float", to_float);
    registry.add("type", type_of);
    registry.add("exit", exit);
    registry.add("time", time);
    registry.add("sleep", sleep);
}

/// Prints the arguments joined by spaces, followed by a newline.
fn print(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    let line = args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    println!("{line}");
    Ok(Value::Null)
}

/// Reads one line from stdin, optionally printing a prompt first.
fn input(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity_range("input", &args, 0, 1)?;
    if let Some(prompt) = args.first() {
        print!("{prompt}");
        io::stdout()
            .flush()
            .map_err(|e| KyaroError::runtime_plain(format!("Cannot read input: {e}")))?;
    }

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| KyaroError::runtime_plain(format!("Cannot read input: {e}")))?;
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Value::str(line))
}

/// The element count of a list or the character count of a string.
fn len(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("len", &args, 1)?;
    match &args[0] {
        Value::List(items) => Ok(Value::Int(items.borrow().len() as i64)),
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(KyaroError::runtime_plain(format!(
            "len() not supported for type {}",
            other.type_name()
        ))),
    }
}

/// Converts any value to its display string.
fn to_str(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("str", &args, 1)?;
    Ok(Value::str(args[0].to_string()))
}

/// Converts to an integer: floats truncate, strings parse, booleans map
/// to 0/1.
fn to_int(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("int", &args, 1)?;
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(f) => Ok(Value::Int(*f as i64)),
        Value::Bool(b) => Ok(Value::Int(*b as i64)),
        Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            KyaroError::runtime_plain(format!("Cannot convert '{s}' to integer"))
        }),
        other => Err(KyaroError::runtime_plain(format!(
            "int() cannot convert {}",
            other.type_name()
        ))),
    }
}

/// Converts to a float: integers widen, strings parse, booleans map to
/// 0.0/1.0.
fn to_float(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("float", &args, 1)?;
    match &args[0] {
        Value::Int(n) => Ok(Value::Float(*n as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Bool(b) => Ok(Value::Float(*b as i64 as f64)),
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            KyaroError::runtime_plain(format!("Cannot convert '{s}' to float"))
        }),
        other => Err(KyaroError::runtime_plain(format!(
            "float() cannot convert {}",
            other.type_name()
        ))),
    }
}

/// The value's type name.
fn type_of(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("type", &args, 1)?;
    Ok(Value::str(args[0].type_name()))
}

/// Terminates the process with the given exit code (default 0).
fn exit(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity_range("exit", &args, 0, 1)?;
    let code = match args.first() {
        Some(value) => integer("exit", value)?,
        None => 0,
    };
    std::process::exit(code as i32);
}

/// Seconds since the Unix epoch, as a float.
fn time(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("time", &args, 0)?;
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    Ok(Value::Float(seconds))
}

/// Blocks the interpreter for the given number of seconds.
fn sleep(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("sleep", &args, 1)?;
    let seconds = number("sleep", &args[0])?;
    if seconds > 0.0 {
        thread::sleep(Duration::from_secs_f64(seconds));
    }
    Ok(Value::Null)
}
