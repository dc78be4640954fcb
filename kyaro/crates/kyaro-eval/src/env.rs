//! Lexically scoped environments.
//!
//! An environment is a chain of frames, each mapping names to values.
//! Frames are created at program start (the global frame), on entry to a
//! user function call, and on entry to a `for` loop body. Closures hold
//! a handle to their defining frame, which keeps it alive for as long as
//! the closure does.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::value::Value;

/// A handle to an environment frame.
///
/// Cloning the handle shares the frame; definitions made through one
/// clone are visible through all of them.
#[derive(Clone)]
pub struct Env(Rc<RefCell<Frame>>);

struct Frame {
    bindings: FxHashMap<String, Value>,
    parent: Option<Env>,
}

impl Env {
    /// Creates a parentless frame (the global environment).
    pub fn global() -> Self {
        Env(Rc::new(RefCell::new(Frame {
            bindings: FxHashMap::default(),
            parent: None,
        })))
    }

    /// Creates a child frame of `parent`.
    pub fn with_parent(parent: &Env) -> Self {
        Env(Rc::new(RefCell::new(Frame {
            bindings: FxHashMap::default(),
            parent: Some(parent.clone()),
        })))
    }

    /// Defines `name` in this frame, overwriting an existing binding at
    /// this level. Never touches parent frames.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Looks `name` up through the frame chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut env = self.clone();
        loop {
            if let Some(value) = env.0.borrow().bindings.get(name) {
                return Some(value.clone());
            }
            let parent = env.0.borrow().parent.clone();
            match parent {
                Some(p) => env = p,
                None => return None,
            }
        }
    }

    /// Writes into the nearest frame that already holds `name`.
    ///
    /// Returns false if no frame holds it; assignment never creates a
    /// shadowing binding in an inner scope.
    pub fn set(&self, name: &str, value: Value) -> bool {
        let mut env = self.clone();
        loop {
            {
                let mut frame = env.0.borrow_mut();
                if let Some(slot) = frame.bindings.get_mut(name) {
                    *slot = value;
                    return true;
                }
            }
            let parent = env.0.borrow().parent.clone();
            match parent {
                Some(p) => env = p,
                None => return false,
            }
        }
    }

    /// Probes the chain for `name` without failing.
    pub fn exists(&self, name: &str) -> bool {
        let mut env = self.clone();
        loop {
            if env.0.borrow().bindings.contains_key(name) {
                return true;
            }
            let parent = env.0.borrow().parent.clone();
            match parent {
                Some(p) => env = p,
                None => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let env = Env::global();
        env.define("x", Value::Int(1));
        assert_eq!(env.get("x"), Some(Value::Int(1)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn test_get_walks_chain() {
        let outer = Env::global();
        outer.define("x", Value::Int(1));
        let inner = Env::with_parent(&outer);
        assert_eq!(inner.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_define_shadows_outer() {
        let outer = Env::global();
        outer.define("x", Value::Int(1));
        let inner = Env::with_parent(&outer);
        inner.define("x", Value::Int(2));
        assert_eq!(inner.get("x"), Some(Value::Int(2)));
        assert_eq!(outer.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_set_writes_into_owning_frame() {
        let outer = Env::global();
        outer.define("x", Value::Int(1));
        let inner = Env::with_parent(&outer);
        assert!(inner.set("x", Value::Int(9)));
        assert_eq!(outer.get("x"), Some(Value::Int(9)));
        // The inner frame gained no binding of its own.
        let deeper = Env::with_parent(&inner);
        deeper.define("x", Value::Int(3));
        assert_eq!(outer.get("x"), Some(Value::Int(9)));
    }

    #[test]
    fn test_set_unknown_name_fails() {
        let env = Env::global();
        assert!(!env.set("missing", Value::Null));
    }

    #[test]
    fn test_exists_probes_chain() {
        let outer = Env::global();
        outer.define("x", Value::Int(1));
        let inner = Env::with_parent(&outer);
        assert!(inner.exists("x"));
        assert!(!inner.exists("y"));
    }

    #[test]
    fn test_shared_frame_visibility() {
        let env = Env::global();
        let alias = env.clone();
        env.define("x", Value::Int(5));
        assert_eq!(alias.get("x"), Some(Value::Int(5)));
    }
}
