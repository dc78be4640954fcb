//! File-system intrinsics.
//!
//! Thin wrappers over `std::fs`; host failures surface as runtime
//! errors with the operation named.

use std::fs;
use std::io::Write;
use std::path::Path;

use kyaro_util::{KyaroError, Result};

use super::{check_arity, check_arity_range, string, Registry};
use crate::interp::Interpreter;
use crate::value::Value;

pub(super) fn register(registry: &mut Registry) {
    registry.add("read_file", read_file);
    registry.add("read_lines", read_lines);
    registry.add("write_file", write_file);
    registry.add("append_file", append_file);
    registry.add("exists", exists);
    registry.add("is_file", is_file);
    registry.add("is_dir", is_dir);
    registry.add("delete_file", delete_file);
    registry.add("create_dir", create_dir);
    registry.add("list_dir", list_dir);
}

fn read_file(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("read_file", &args, 1)?;
    let path = string("read_file", &args[0])?;
    fs::read_to_string(&*path)
        .map(Value::str)
        .map_err(|e| KyaroError::runtime_plain(format!("Cannot read file: {e}")))
}

/// Reads a file as a list of lines, each keeping its terminator.
fn read_lines(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("read_lines", &args, 1)?;
    let path = string("read_lines", &args[0])?;
    let content = fs::read_to_string(&*path)
        .map_err(|e| KyaroError::runtime_plain(format!("Cannot read file: {e}")))?;
    Ok(Value::list(
        content.split_inclusive('\n').map(Value::str).collect(),
    ))
}

fn write_file(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("write_file", &args, 2)?;
    let path = string("write_file", &args[0])?;
    let content = string("write_file", &args[1])?;
    fs::write(&*path, content.as_bytes())
        .map_err(|e| KyaroError::runtime_plain(format!("Cannot write file: {e}")))?;
    Ok(Value::Null)
}

fn append_file(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("append_file", &args, 2)?;
    let path = string("append_file", &args[0])?;
    let content = string("append_file", &args[1])?;
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&*path)
        .and_then(|mut file| file.write_all(content.as_bytes()))
        .map_err(|e| KyaroError::runtime_plain(format!("Cannot append to file: {e}")))?;
    Ok(Value::Null)
}

fn exists(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("exists", &args, 1)?;
    let path = string("exists", &args[0])?;
    Ok(Value::Bool(Path::new(&*path).exists()))
}

fn is_file(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("is_file", &args, 1)?;
    let path = string("is_file", &args[0])?;
    Ok(Value::Bool(Path::new(&*path).is_file()))
}

fn is_dir(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("is_dir", &args, 1)?;
    let path = string("is_dir", &args[0])?;
    Ok(Value::Bool(Path::new(&*path).is_dir()))
}

fn delete_file(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("delete_file", &args, 1)?;
    let path = string("delete_file", &args[0])?;
    fs::remove_file(&*path)
        .map_err(|e| KyaroError::runtime_plain(format!("Cannot delete file: {e}")))?;
    Ok(Value::Null)
}

/// `create_dir(path)` creates one level; `create_dir(path, true)` also
/// creates missing parents.
fn create_dir(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity_range("create_dir", &args, 1, 2)?;
    let path = string("create_dir", &args[0])?;
    let parents = args.get(1).map(Value::is_truthy).unwrap_or(false);
    let result = if parents {
        fs::create_dir_all(&*path)
    } else {
        fs::create_dir(&*path)
    };
    result.map_err(|e| KyaroError::runtime_plain(format!("Cannot create directory: {e}")))?;
    Ok(Value::Null)
}

/// Directory entry names, sorted for stable output.
fn list_dir(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("list_dir", &args, 1)?;
    let path = string("list_dir", &args[0])?;
    let entries = fs::read_dir(&*path)
        .map_err(|e| KyaroError::runtime_plain(format!("Cannot list directory: {e}")))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| KyaroError::runtime_plain(format!("Cannot list directory: {e}")))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(Value::list(names.into_iter().map(Value::str).collect()))
}
