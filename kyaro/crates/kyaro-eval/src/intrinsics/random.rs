//! Random-number intrinsics.
//!
//! All functions draw from one thread-local generator so `seed(n)`
//! makes a whole run reproducible.

use std::cell::RefCell;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use kyaro_util::{KyaroError, Result};

use super::{check_arity, check_arity_range, integer, list, number, Registry};
use crate::interp::Interpreter;
use crate::value::Value;

thread_local! {
    static RNG: RefCell<StdRng> = RefCell::new(StdRng::from_entropy());
}

fn with_rng<T>(f: impl FnOnce(&mut StdRng) -> T) -> T {
    RNG.with(|rng| f(&mut rng.borrow_mut()))
}

pub(super) fn register(registry: &mut Registry) {
    registry.add("random", random);
    registry.add("randint", randint);
    registry.add("uniform", uniform);
    registry.add("choice", choice);
    registry.add("shuffle", shuffle);
    registry.add("seed", seed);
}

/// A float in `[0, 1)`.
fn random(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("random", &args, 0)?;
    Ok(Value::Float(with_rng(|rng| rng.gen::<f64>())))
}

/// An integer in the inclusive range `[a, b]`.
fn randint(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("randint", &args, 2)?;
    let a = integer("randint", &args[0])?;
    let b = integer("randint", &args[1])?;
    if a > b {
        return Err(KyaroError::runtime_plain("randint() requires a <= b"));
    }
    Ok(Value::Int(with_rng(|rng| rng.gen_range(a..=b))))
}

/// A float between `a` and `b`, in either order.
fn uniform(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("uniform", &args, 2)?;
    let a = number("uniform", &args[0])?;
    let b = number("uniform", &args[1])?;
    let t = with_rng(|rng| rng.gen::<f64>());
    Ok(Value::Float(a + (b - a) * t))
}

/// A uniformly chosen element of a non-empty list.
fn choice(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("choice", &args, 1)?;
    let items = list("choice", &args[0])?;
    let items = items.borrow();
    if items.is_empty() {
        return Err(KyaroError::runtime_plain(
            "choice() requires a non-empty list",
        ));
    }
    let index = with_rng(|rng| rng.gen_range(0..items.len()));
    Ok(items[index].clone())
}

/// Shuffles a list in place.
fn shuffle(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("shuffle", &args, 1)?;
    let items = list("shuffle", &args[0])?;
    with_rng(|rng| items.borrow_mut().shuffle(rng));
    Ok(Value::Null)
}

/// Reseeds the generator: `seed(n)` makes runs reproducible, `seed()`
/// returns to entropy.
fn seed(_: &mut Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity_range("seed", &args, 0, 1)?;
    let rng = match args.first() {
        Some(value) => StdRng::seed_from_u64(integer("seed", value)? as u64),
        None => StdRng::from_entropy(),
    };
    RNG.with(|cell| *cell.borrow_mut() = rng);
    Ok(Value::Null)
}
