//! The intrinsic registry: host-provided callables visible to programs.
//!
//! At interpreter construction the registry's entries are installed into
//! the global frame under their fixed names. Each intrinsic receives the
//! interpreter (so higher-order ones can call back into user code) and a
//! positional argument list, and returns a value or a runtime error.
//!
//! The table is injectable: tests and embedders can build a
//! [`Registry`] with a restricted set of names.

use std::rc::Rc;

use indexmap::IndexMap;

use kyaro_util::{KyaroError, Result};

use crate::env::Env;
use crate::interp::Interpreter;
use crate::value::{Intrinsic, ListRef, Value};

mod core;
mod fs;
mod list;
mod math;
mod random;
mod stats;

/// An ordered table of named intrinsics.
pub struct Registry {
    entries: IndexMap<String, Rc<Intrinsic>>,
}

impl Registry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// The standard library: core, math, statistics, random, list, and
    /// file-system families.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        core::register(&mut registry);
        math::register(&mut registry);
        stats::register(&mut registry);
        random::register(&mut registry);
        list::register(&mut registry);
        fs::register(&mut registry);
        registry
    }

    /// Adds an intrinsic, replacing any existing entry with that name.
    pub fn add(
        &mut self,
        name: &str,
        func: impl Fn(&mut Interpreter, Vec<Value>) -> Result<Value> + 'static,
    ) {
        self.entries
            .insert(name.to_string(), Rc::new(Intrinsic::new(name, func)));
    }

    /// Installs every entry into the given (global) frame.
    pub fn install(&self, env: &Env) {
        for (name, intrinsic) in &self.entries {
            env.define(name.clone(), Value::Intrinsic(Rc::clone(intrinsic)));
        }
    }

    /// The registered names, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

// =============================================================================
// ARGUMENT HELPERS
// =============================================================================

/// Fails unless exactly `expected` arguments were passed.
pub(crate) fn check_arity(name: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(KyaroError::runtime_plain(format!(
            "{name}() expects {expected} arguments, got {}",
            args.len()
        )))
    }
}

/// Fails unless between `min` and `max` arguments were passed.
pub(crate) fn check_arity_range(
    name: &str,
    args: &[Value],
    min: usize,
    max: usize,
) -> Result<()> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(KyaroError::runtime_plain(format!(
            "{name}() expects {min} to {max} arguments, got {}",
            args.len()
        )))
    }
}

/// Extracts a numeric argument as `f64`.
pub(crate) fn number(name: &str, value: &Value) -> Result<f64> {
    value.as_number().ok_or_else(|| {
        KyaroError::runtime_plain(format!(
            "{name}() requires a number, got {}",
            value.type_name()
        ))
    })
}

/// Extracts an integer argument, truncating floats.
pub(crate) fn integer(name: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Float(f) => Ok(*f as i64),
        other => Err(KyaroError::runtime_plain(format!(
            "{name}() requires a number, got {}",
            other.type_name()
        ))),
    }
}

/// Extracts a list argument.
pub(crate) fn list(name: &str, value: &Value) -> Result<ListRef> {
    match value {
        Value::List(items) => Ok(Rc::clone(items)),
        _ => Err(KyaroError::runtime_plain(format!("{name}() requires a list"))),
    }
}

/// Extracts a string argument.
pub(crate) fn string(name: &str, value: &Value) -> Result<Rc<str>> {
    match value {
        Value::Str(s) => Ok(Rc::clone(s)),
        other => Err(KyaroError::runtime_plain(format!(
            "{name}() requires a string, got {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: Vec<Value>) -> Result<Value> {
        let mut interp = Interpreter::new();
        let callee = interp
            .globals()
            .get(name)
            .unwrap_or_else(|| panic!("intrinsic {name} not installed"));
        interp.call_value(callee, args)
    }

    fn call_ok(name: &str, args: Vec<Value>) -> Value {
        call(name, args).expect("intrinsic call failed")
    }

    // =========================================================================
    // REGISTRY
    // =========================================================================

    #[test]
    fn test_standard_registry_contains_canonical_names() {
        let registry = Registry::standard();
        for name in [
            "print", "input", "len", "str", "int", "float", "type", "range", "append",
            "pop", "push", "exit", "time", "sleep", "sqrt", "sin", "mean", "median",
            "random", "randint", "sort", "map", "filter", "reduce", "read_file",
            "write_file",
        ] {
            assert!(registry.contains(name), "missing intrinsic {name}");
        }
    }

    #[test]
    fn test_restricted_registry() {
        let mut registry = Registry::empty();
        registry.add("answer", |_, _| Ok(Value::Int(42)));
        let mut interp = Interpreter::with_registry(&registry);
        assert!(interp.globals().get("print").is_none());
        let answer = interp.globals().get("answer").unwrap();
        assert_eq!(interp.call_value(answer, vec![]).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_registry_names_are_ordered() {
        let mut registry = Registry::empty();
        registry.add("b", |_, _| Ok(Value::Null));
        registry.add("a", |_, _| Ok(Value::Null));
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    // =========================================================================
    // CORE FAMILY
    // =========================================================================

    #[test]
    fn test_len() {
        assert_eq!(
            call_ok("len", vec![Value::list(vec![Value::Int(1), Value::Int(2)])]),
            Value::Int(2)
        );
        assert_eq!(call_ok("len", vec![Value::str("héllo")]), Value::Int(5));
        assert_eq!(
            call("len", vec![Value::Int(3)]).unwrap_err().message(),
            "len() not supported for type integer"
        );
    }

    #[test]
    fn test_str_conversion() {
        assert_eq!(call_ok("str", vec![Value::Null]), Value::str("null"));
        assert_eq!(call_ok("str", vec![Value::Bool(true)]), Value::str("true"));
        assert_eq!(call_ok("str", vec![Value::Float(2.0)]), Value::str("2.0"));
        assert_eq!(call_ok("str", vec![Value::Int(-3)]), Value::str("-3"));
    }

    #[test]
    fn test_int_conversion() {
        assert_eq!(call_ok("int", vec![Value::Float(3.9)]), Value::Int(3));
        assert_eq!(call_ok("int", vec![Value::Float(-3.9)]), Value::Int(-3));
        assert_eq!(call_ok("int", vec![Value::str("42")]), Value::Int(42));
        assert_eq!(call_ok("int", vec![Value::Bool(true)]), Value::Int(1));
        assert_eq!(
            call("int", vec![Value::str("4.2")]).unwrap_err().message(),
            "Cannot convert '4.2' to integer"
        );
    }

    #[test]
    fn test_float_conversion() {
        assert_eq!(call_ok("float", vec![Value::Int(2)]), Value::Float(2.0));
        assert_eq!(
            call_ok("float", vec![Value::str("2.5")]),
            Value::Float(2.5)
        );
        assert_eq!(
            call("float", vec![Value::str("two")]).unwrap_err().message(),
            "Cannot convert 'two' to float"
        );
    }

    #[test]
    fn test_type() {
        assert_eq!(call_ok("type", vec![Value::Int(1)]), Value::str("integer"));
        assert_eq!(call_ok("type", vec![Value::Null]), Value::str("null"));
        let f = Interpreter::new().globals().get("print").unwrap();
        assert_eq!(call_ok("type", vec![f]), Value::str("function"));
    }

    // =========================================================================
    // MATH FAMILY
    // =========================================================================

    #[test]
    fn test_math_basics() {
        assert_eq!(call_ok("abs", vec![Value::Int(-5)]), Value::Int(5));
        assert_eq!(call_ok("sqrt", vec![Value::Int(9)]), Value::Float(3.0));
        assert_eq!(
            call_ok("pow", vec![Value::Int(2), Value::Int(8)]),
            Value::Int(256)
        );
        assert_eq!(call_ok("floor", vec![Value::Float(2.7)]), Value::Int(2));
        assert_eq!(call_ok("ceil", vec![Value::Float(2.1)]), Value::Int(3));
        assert_eq!(call_ok("trunc", vec![Value::Float(-2.7)]), Value::Int(-2));
    }

    #[test]
    fn test_round_uses_bankers_rounding() {
        assert_eq!(call_ok("round", vec![Value::Float(2.5)]), Value::Int(2));
        assert_eq!(call_ok("round", vec![Value::Float(3.5)]), Value::Int(4));
        assert_eq!(
            call_ok("round", vec![Value::Float(2.675), Value::Int(1)]),
            Value::Float(2.7)
        );
    }

    #[test]
    fn test_min_max_over_args_and_lists() {
        assert_eq!(
            call_ok("min", vec![Value::Int(3), Value::Int(1), Value::Int(2)]),
            Value::Int(1)
        );
        assert_eq!(
            call_ok(
                "max",
                vec![Value::list(vec![Value::Int(3), Value::Int(9), Value::Int(2)])]
            ),
            Value::Int(9)
        );
        assert_eq!(
            call("min", vec![Value::list(vec![])]).unwrap_err().message(),
            "min() arg is an empty sequence"
        );
    }

    #[test]
    fn test_sum_keeps_integers_integral() {
        assert_eq!(
            call_ok(
                "sum",
                vec![Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])]
            ),
            Value::Int(6)
        );
        assert_eq!(
            call_ok(
                "sum",
                vec![Value::list(vec![Value::Int(1), Value::Float(0.5)])]
            ),
            Value::Float(1.5)
        );
    }

    #[test]
    fn test_factorial_and_gcd() {
        assert_eq!(call_ok("factorial", vec![Value::Int(5)]), Value::Int(120));
        assert_eq!(
            call("factorial", vec![Value::Int(-1)]).unwrap_err().message(),
            "factorial() not defined for negative values"
        );
        assert_eq!(
            call_ok("gcd", vec![Value::Int(12), Value::Int(18)]),
            Value::Int(6)
        );
        assert_eq!(
            call_ok("lcm", vec![Value::Int(4), Value::Int(6)]),
            Value::Int(12)
        );
    }

    #[test]
    fn test_math_constants_and_predicates() {
        assert_eq!(
            call_ok("pi", vec![]),
            Value::Float(std::f64::consts::PI)
        );
        assert_eq!(
            call_ok("isnan", vec![Value::Float(f64::NAN)]),
            Value::Bool(true)
        );
        assert_eq!(
            call_ok("isfinite", vec![Value::Float(1.0)]),
            Value::Bool(true)
        );
        assert_eq!(
            call_ok("isinf", vec![call_ok("inf", vec![])]),
            Value::Bool(true)
        );
    }

    // =========================================================================
    // STATISTICS FAMILY
    // =========================================================================

    #[test]
    fn test_mean_median() {
        let data = Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]);
        assert_eq!(call_ok("mean", vec![data.clone()]), Value::Float(2.5));
        assert_eq!(call_ok("median", vec![data]), Value::Float(2.5));
        let odd = Value::list(vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
        assert_eq!(call_ok("median", vec![odd]), Value::Int(2));
        assert_eq!(
            call("mean", vec![Value::list(vec![])]).unwrap_err().message(),
            "mean() requires at least one data point"
        );
    }

    #[test]
    fn test_variance_and_stdev() {
        let data = Value::list(vec![
            Value::Int(2),
            Value::Int(4),
            Value::Int(4),
            Value::Int(4),
            Value::Int(5),
            Value::Int(5),
            Value::Int(7),
            Value::Int(9),
        ]);
        assert_eq!(call_ok("pvariance", vec![data.clone()]), Value::Float(4.0));
        assert_eq!(call_ok("pstdev", vec![data]), Value::Float(2.0));
        assert_eq!(
            call("stdev", vec![Value::list(vec![Value::Int(1)])])
                .unwrap_err()
                .message(),
            "stdev() requires at least two data points"
        );
    }

    #[test]
    fn test_cumulative_functions() {
        let data = Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(
            call_ok("cumsum", vec![data.clone()]),
            Value::list(vec![Value::Int(1), Value::Int(3), Value::Int(6)])
        );
        assert_eq!(
            call_ok("cumprod", vec![data.clone()]),
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(6)])
        );
        assert_eq!(
            call_ok("diff", vec![data]),
            Value::list(vec![Value::Int(1), Value::Int(1)])
        );
        assert_eq!(
            call_ok(
                "product",
                vec![Value::list(vec![Value::Int(2), Value::Int(5)])]
            ),
            Value::Int(10)
        );
    }

    // =========================================================================
    // RANDOM FAMILY
    // =========================================================================

    #[test]
    fn test_random_is_reproducible_after_seed() {
        call_ok("seed", vec![Value::Int(7)]);
        let first = call_ok("random", vec![]);
        call_ok("seed", vec![Value::Int(7)]);
        let second = call_ok("random", vec![]);
        assert_eq!(first, second);
        assert!(matches!(first, Value::Float(f) if (0.0..1.0).contains(&f)));
    }

    #[test]
    fn test_randint_bounds() {
        call_ok("seed", vec![Value::Int(1)]);
        for _ in 0..50 {
            let v = call_ok("randint", vec![Value::Int(2), Value::Int(4)]);
            match v {
                Value::Int(n) => assert!((2..=4).contains(&n)),
                other => panic!("randint returned {other:?}"),
            }
        }
        assert_eq!(
            call("randint", vec![Value::Int(4), Value::Int(2)])
                .unwrap_err()
                .message(),
            "randint() requires a <= b"
        );
    }

    #[test]
    fn test_choice_and_shuffle() {
        let items = Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let picked = call_ok("choice", vec![items.clone()]);
        assert!(matches!(picked, Value::Int(1..=3)));
        call_ok("shuffle", vec![items.clone()]);
        // Shuffling preserves the multiset of elements.
        let sorted = call_ok("sorted", vec![items]);
        assert_eq!(
            sorted,
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(
            call("choice", vec![Value::list(vec![])]).unwrap_err().message(),
            "choice() requires a non-empty list"
        );
    }

    // =========================================================================
    // LIST FAMILY
    // =========================================================================

    #[test]
    fn test_range_forms() {
        assert_eq!(
            call_ok("range", vec![Value::Int(3)]),
            Value::list(vec![Value::Int(0), Value::Int(1), Value::Int(2)])
        );
        assert_eq!(
            call_ok("range", vec![Value::Int(2), Value::Int(5)]),
            Value::list(vec![Value::Int(2), Value::Int(3), Value::Int(4)])
        );
        assert_eq!(
            call_ok(
                "range",
                vec![Value::Int(5), Value::Int(0), Value::Int(-2)]
            ),
            Value::list(vec![Value::Int(5), Value::Int(3), Value::Int(1)])
        );
        assert_eq!(
            call("range", vec![Value::Int(0), Value::Int(5), Value::Int(0)])
                .unwrap_err()
                .message(),
            "range() step must not be zero"
        );
    }

    #[test]
    fn test_append_pop_mutate_in_place() {
        let items = Value::list(vec![Value::Int(1)]);
        call_ok("append", vec![items.clone(), Value::Int(2)]);
        assert_eq!(
            items,
            Value::list(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(call_ok("pop", vec![items.clone()]), Value::Int(2));
        assert_eq!(
            call_ok("pop", vec![items.clone(), Value::Int(0)]),
            Value::Int(1)
        );
        assert_eq!(
            call("pop", vec![items]).unwrap_err().message(),
            "pop from empty list"
        );
    }

    #[test]
    fn test_sort_and_sorted() {
        let items = Value::list(vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
        let fresh = call_ok("sorted", vec![items.clone()]);
        assert_eq!(
            fresh,
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        // sorted() leaves the original untouched; sort() mutates it.
        assert_eq!(
            items,
            Value::list(vec![Value::Int(3), Value::Int(1), Value::Int(2)])
        );
        call_ok("sort", vec![items.clone()]);
        assert_eq!(
            items,
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(
            call(
                "sort",
                vec![Value::list(vec![Value::Int(1), Value::str("x")])]
            )
            .unwrap_err()
            .message(),
            "Cannot compare integer and string"
        );
    }

    #[test]
    fn test_list_queries() {
        let items = Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(2)]);
        assert_eq!(
            call_ok("count", vec![items.clone(), Value::Int(2)]),
            Value::Int(2)
        );
        assert_eq!(
            call_ok("index", vec![items.clone(), Value::Int(2)]),
            Value::Int(1)
        );
        assert_eq!(
            call("index", vec![items, Value::Int(9)]).unwrap_err().message(),
            "index(): item not found"
        );
        assert_eq!(
            call_ok("count", vec![Value::str("banana"), Value::str("an")]),
            Value::Int(2)
        );
    }

    #[test]
    fn test_zip_enumerate_unique_flatten() {
        let a = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::list(vec![Value::str("x"), Value::str("y"), Value::str("z")]);
        assert_eq!(
            call_ok("zip", vec![a.clone(), b]),
            Value::list(vec![
                Value::list(vec![Value::Int(1), Value::str("x")]),
                Value::list(vec![Value::Int(2), Value::str("y")]),
            ])
        );
        assert_eq!(
            call_ok("enumerate", vec![a, Value::Int(10)]),
            Value::list(vec![
                Value::list(vec![Value::Int(10), Value::Int(1)]),
                Value::list(vec![Value::Int(11), Value::Int(2)]),
            ])
        );
        assert_eq!(
            call_ok(
                "unique",
                vec![Value::list(vec![Value::Int(1), Value::Int(1), Value::Int(2)])]
            ),
            Value::list(vec![Value::Int(1), Value::Int(2)])
        );
        let nested = Value::list(vec![
            Value::Int(1),
            Value::list(vec![Value::Int(2), Value::list(vec![Value::Int(3)])]),
        ]);
        assert_eq!(
            call_ok("flatten", vec![nested]),
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    // =========================================================================
    // FILE SYSTEM FAMILY
    // =========================================================================

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("note.txt");
        let path_value = Value::str(path.to_string_lossy());

        call_ok(
            "write_file",
            vec![path_value.clone(), Value::str("line one\nline two\n")],
        );
        assert_eq!(call_ok("exists", vec![path_value.clone()]), Value::Bool(true));
        assert_eq!(
            call_ok("read_file", vec![path_value.clone()]),
            Value::str("line one\nline two\n")
        );
        assert_eq!(
            call_ok("read_lines", vec![path_value.clone()]),
            Value::list(vec![Value::str("line one\n"), Value::str("line two\n")])
        );
        call_ok(
            "append_file",
            vec![path_value.clone(), Value::str("line three")],
        );
        assert_eq!(
            call_ok("read_file", vec![path_value.clone()]),
            Value::str("line one\nline two\nline three")
        );
        call_ok("delete_file", vec![path_value.clone()]);
        assert_eq!(call_ok("exists", vec![path_value]), Value::Bool(false));
    }

    #[test]
    fn test_read_missing_file_fails() {
        let err = call("read_file", vec![Value::str("/no/such/kyaro/file")]).unwrap_err();
        assert!(err.message().starts_with("Cannot read file:"));
    }

    #[test]
    fn test_list_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        let names = call_ok(
            "list_dir",
            vec![Value::str(dir.path().to_string_lossy())],
        );
        assert_eq!(
            names,
            Value::list(vec![Value::str("a.txt"), Value::str("b.txt")])
        );
    }
}
