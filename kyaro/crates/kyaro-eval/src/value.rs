//! Runtime values.
//!
//! Kyaro values are dynamically typed. Most kinds behave as values from
//! a program's viewpoint; lists are reference types shared by identity,
//! so mutations through one handle are visible through all of them.
//! Functions carry the environment captured at their definition site.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use kyaro_par::Block;
use kyaro_util::Result;

use crate::env::Env;
use crate::interp::Interpreter;

/// Shared handle to a mutable list.
pub type ListRef = Rc<RefCell<Vec<Value>>>;

/// The signature of a host-provided callable.
///
/// Intrinsics receive the interpreter so higher-order ones (`map`,
/// `filter`, `reduce`) can call user functions back through it.
pub type NativeFn = dyn Fn(&mut Interpreter, Vec<Value>) -> Result<Value>;

/// A tagged runtime value.
#[derive(Clone)]
pub enum Value {
    /// The absent value, `null`.
    Null,
    /// `true` or `false`.
    Bool(bool),
    /// Host-word integer. Arithmetic that would overflow promotes to
    /// `Float` instead of wrapping.
    Int(i64),
    /// IEEE-754 binary64 float.
    Float(f64),
    /// Immutable UTF-8 text.
    Str(Rc<str>),
    /// Mutable list, shared by identity.
    List(ListRef),
    /// User-defined function closure.
    Func(Rc<Function>),
    /// Host-provided callable.
    Intrinsic(Rc<Intrinsic>),
}

/// A user-defined function plus its captured environment.
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
    /// The environment in effect when the `func` statement was
    /// evaluated, not the caller's environment.
    pub closure: Env,
}

/// A host-provided callable installed under a fixed name.
pub struct Intrinsic {
    pub name: String,
    func: Box<NativeFn>,
}

impl Intrinsic {
    /// Wraps a native function as an intrinsic.
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&mut Interpreter, Vec<Value>) -> Result<Value> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    /// Invokes the native function.
    pub fn call(&self, interp: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
        (self.func)(interp, args)
    }
}

impl Value {
    /// Creates a string value.
    pub fn str(s: impl AsRef<str>) -> Value {
        Value::Str(Rc::from(s.as_ref()))
    }

    /// Creates a list value from a vector.
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// The type name reported by the `type` intrinsic and used in error
    /// messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Func(_) | Value::Intrinsic(_) => "function",
        }
    }

    /// Truthiness: `null` is false, booleans are themselves, zero and
    /// the empty string are false, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Func(_) | Value::Intrinsic(_) => true,
        }
    }

    /// The value as an `f64`, for numeric kinds.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Equality is deep for lists, numeric across the int/float divide, and
/// identity-based for functions. Cross-kind comparisons are false.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            (Value::Intrinsic(a), Value::Intrinsic(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Formats a float the way `print` shows it: integral values keep a
/// trailing `.0`, non-finite values print as `inf`/`-inf`/`nan`.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(true) => f.write_str("true"),
            Value::Bool(false) => f.write_str("false"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Func(func) => write!(f, "<function {}>", func.name),
            Value::Intrinsic(intrinsic) => write!(f, "<function {}>", intrinsic.name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
