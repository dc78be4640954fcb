//! kyaro-eval - Tree-walking evaluator for Kyaro.
//!
//! The evaluator walks the AST produced by `kyaro-par` with a chain of
//! lexically scoped environment frames. Non-local control flow
//! (`return`, `break`, `continue`) is carried by the [`Flow`] sum type
//! returned from statement evaluation rather than by unwinding, so every
//! node propagates escapes with an ordinary `match`.
//!
//! Host functionality reaches programs through the intrinsic
//! [`Registry`]: a table of named native callables installed into the
//! global frame when an [`Interpreter`] is built. The registry is
//! injectable, so tests can run against a restricted table.

pub mod env;
pub mod intrinsics;
mod interp;
mod value;

pub use env::Env;
pub use interp::{Flow, Interpreter};
pub use intrinsics::Registry;
pub use value::{Function, Intrinsic, ListRef, Value};
