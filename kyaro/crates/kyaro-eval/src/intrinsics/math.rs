//! Mathematical intrinsics.
//!
//! Functions that are integral in, integral out (`abs`, `factorial`,
//! `gcd`) keep integer results, promoting to float on overflow like the
//! arithmetic operators do. The rest work in binary64.

use kyaro_util::{KyaroError, Result};

use super::{check_arity, check_arity_range, integer, list, number, Registry};
use crate::interp::{binary_op, compare_values};
use crate::value::Value;
use kyaro_par::BinOp;

pub(super) fn register(registry: &mut Registry) {
    registry.add("abs", abs);
    registry.add("min", |interp, args| extremum("min", interp, args, false));
    registry.add("max", |interp, args| extremum("max", interp, args, true));
    registry.add("sum", sum);
    registry.add("pow", pow);
    registry.add("log", log);
    registry.add("floor", |_, args| to_integral("floor", args, f64::floor));
    registry.add("ceil", |_, args| to_integral("ceil", args, f64::ceil));
    registry.add("trunc", |_, args| to_integral("trunc", args, f64::trunc));
    registry.add("round", round);
    registry.add("atan2", atan2);
    registry.add("hypot", hypot);
    registry.add("factorial", factorial);
    registry.add("gcd", gcd_of);
    registry.add("lcm", lcm_of);
    registry.add("isnan", |_, args| predicate("isnan", args, f64::is_nan));
    registry.add("isinf", |_, args| predicate("isinf", args, f64::is_infinite));
    registry.add("isfinite", |_, args| predicate("isfinite", args, f64::is_finite));

    unary(registry, "sqrt", f64::sqrt);
    unary(registry, "exp", f64::exp);
    unary(registry, "log10", f64::log10);
    unary(registry, "log2", f64::log2);
    unary(registry, "ln", f64::ln);
    unary(registry, "sin", f64::sin);
    unary(registry, "cos", f64::cos);
    unary(registry, "tan", f64::tan);
    unary(registry, "asin", f64::asin);
    unary(registry, "acos", f64::acos);
    unary(registry, "atan", f64::atan);
    unary(registry, "sinh", f64::sinh);
    unary(registry, "cosh", f64::cosh);
    unary(registry, "tanh", f64::tanh);
    unary(registry, "asinh", f64::asinh);
    unary(registry, "acosh", f64::acosh);
    unary(registry, "atanh", f64::atanh);
    unary(registry, "degrees", f64::to_degrees);
    unary(registry, "radians", f64::to_radians);

    constant(registry, "pi", std::f64::consts::PI);
    constant(registry, "e", std::f64::consts::E);
    constant(registry, "tau", std::f64::consts::TAU);
    constant(registry, "inf", f64::INFINITY);
    constant(registry, "nan", f64::NAN);
}

/// Registers a one-argument float function.
fn unary(registry: &mut Registry, name: &'static str, f: fn(f64) -> f64) {
    registry.add(name, move |_, args| {
        check_arity(name, &args, 1)?;
        Ok(Value::Float(f(number(name, &args[0])?)))
    });
}

/// Registers a zero-argument constant.
fn constant(registry: &mut Registry, name: &'static str, value: f64) {
    registry.add(name, move |_, args| {
        check_arity(name, &args, 0)?;
        Ok(Value::Float(value))
    });
}

fn abs(_: &mut crate::Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("abs", &args, 1)?;
    match &args[0] {
        Value::Int(n) => Ok(n
            .checked_abs()
            .map(Value::Int)
            .unwrap_or(Value::Float((*n as f64).abs()))),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(KyaroError::runtime_plain(format!(
            "abs() requires a number, got {}",
            other.type_name()
        ))),
    }
}

/// `min`/`max` over either the argument list or a single list argument.
fn extremum(
    name: &str,
    _: &mut crate::Interpreter,
    args: Vec<Value>,
    want_greater: bool,
) -> Result<Value> {
    let items: Vec<Value> = match args.as_slice() {
        [Value::List(items)] => items.borrow().clone(),
        [] => {
            return Err(KyaroError::runtime_plain(format!(
                "{name}() expects at least 1 argument, got 0"
            )))
        }
        _ => args,
    };

    let mut items = items.into_iter();
    let mut best = items.next().ok_or_else(|| {
        KyaroError::runtime_plain(format!("{name}() arg is an empty sequence"))
    })?;
    for item in items {
        let ord = compare_values(&item, &best)?;
        if (ord == std::cmp::Ordering::Greater) == want_greater && ord != std::cmp::Ordering::Equal
        {
            best = item;
        }
    }
    Ok(best)
}

/// Sums a list with the `+` operator, so integer data stays integral.
fn sum(_: &mut crate::Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("sum", &args, 1)?;
    let items = list("sum", &args[0])?;
    let items = items.borrow().clone();
    let mut total = Value::Int(0);
    for item in items {
        total = binary_op(BinOp::Add, total, item)?;
    }
    Ok(total)
}

fn pow(_: &mut crate::Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("pow", &args, 2)?;
    binary_op(BinOp::Pow, args[0].clone(), args[1].clone())
}

/// `log(x)` is the natural log; `log(x, base)` changes base.
fn log(_: &mut crate::Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity_range("log", &args, 1, 2)?;
    let x = number("log", &args[0])?;
    match args.get(1) {
        Some(base) => Ok(Value::Float(x.log(number("log", base)?))),
        None => Ok(Value::Float(x.ln())),
    }
}

/// Shared body for `floor`, `ceil`, and `trunc`: integral results come
/// back as integers when they fit.
fn to_integral(name: &str, args: Vec<Value>, f: fn(f64) -> f64) -> Result<Value> {
    check_arity(name, &args, 1)?;
    Ok(integral_value(f(number(name, &args[0])?)))
}

/// `round(x)` yields an integer; `round(x, digits)` a float. Ties round
/// to even.
fn round(_: &mut crate::Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity_range("round", &args, 1, 2)?;
    let x = number("round", &args[0])?;
    let digits = match args.get(1) {
        Some(value) => integer("round", value)?,
        None => 0,
    };
    if digits == 0 {
        Ok(integral_value(x.round_ties_even()))
    } else {
        let scale = 10f64.powi(digits as i32);
        Ok(Value::Float((x * scale).round_ties_even() / scale))
    }
}

fn atan2(_: &mut crate::Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("atan2", &args, 2)?;
    let y = number("atan2", &args[0])?;
    let x = number("atan2", &args[1])?;
    Ok(Value::Float(y.atan2(x)))
}

fn hypot(_: &mut crate::Interpreter, args: Vec<Value>) -> Result<Value> {
    if args.is_empty() {
        return Err(KyaroError::runtime_plain(
            "hypot() expects at least 1 argument, got 0",
        ));
    }
    let mut total = 0.0;
    for arg in &args {
        let x = number("hypot", arg)?;
        total += x * x;
    }
    Ok(Value::Float(total.sqrt()))
}

fn factorial(_: &mut crate::Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("factorial", &args, 1)?;
    let n = integer("factorial", &args[0])?;
    if n < 0 {
        return Err(KyaroError::runtime_plain(
            "factorial() not defined for negative values",
        ));
    }

    let mut result = Value::Int(1);
    for k in 2..=n {
        result = binary_op(BinOp::Mul, result, Value::Int(k))?;
    }
    Ok(result)
}

/// Greatest common divisor of any number of integers.
fn gcd_of(_: &mut crate::Interpreter, args: Vec<Value>) -> Result<Value> {
    let mut acc: i64 = 0;
    for arg in &args {
        let n = integer("gcd", arg)?.unsigned_abs().min(i64::MAX as u64) as i64;
        acc = gcd(acc, n);
    }
    Ok(Value::Int(acc))
}

/// Least common multiple of any number of integers, promoting to float
/// when the result exceeds the integer range.
fn lcm_of(_: &mut crate::Interpreter, args: Vec<Value>) -> Result<Value> {
    let mut acc: i128 = 1;
    if args.is_empty() {
        return Ok(Value::Int(1));
    }
    for arg in &args {
        let n = integer("lcm", arg)?.unsigned_abs() as i128;
        if n == 0 {
            return Ok(Value::Int(0));
        }
        acc = acc / gcd128(acc, n) * n;
    }
    if acc <= i64::MAX as i128 {
        Ok(Value::Int(acc as i64))
    } else {
        Ok(Value::Float(acc as f64))
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn gcd128(a: i128, b: i128) -> i128 {
    if b == 0 {
        a
    } else {
        gcd128(b, a % b)
    }
}

fn predicate(name: &str, args: Vec<Value>, f: fn(f64) -> bool) -> Result<Value> {
    check_arity(name, &args, 1)?;
    Ok(Value::Bool(f(number(name, &args[0])?)))
}

/// Converts an integral float back to an integer when it fits.
fn integral_value(f: f64) -> Value {
    if f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Value::Int(f as i64)
    } else {
        Value::Float(f)
    }
}
