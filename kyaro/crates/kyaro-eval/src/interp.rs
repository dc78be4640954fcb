//! The tree-walking evaluator.
//!
//! Statements evaluate to a [`Flow`]: either a normal value or one of
//! the three non-local escapes (`return`, `break`, `continue`). Each
//! composite node propagates escapes upward with a `match`; the nodes
//! that own them (function calls for `return`, loops for `break` and
//! `continue`) consume them. An escape that reaches somewhere with no
//! owner is a runtime error at the node that raised it.
//!
//! The evaluator keeps a single mutable cursor, the current environment
//! handle. It moves to a child frame on function entry and `for`-loop
//! entry and is restored on every exit path, including escapes and
//! errors.

use std::cmp::Ordering;
use std::rc::Rc;

use kyaro_par::{
    BinOp, BinaryExpr, Block, CallExpr, Expr, IndexExpr, Literal, MemberExpr, Stmt, UnOp,
    UnaryExpr,
};
use kyaro_util::{KyaroError, Result, Span};

use crate::env::Env;
use crate::intrinsics::Registry;
use crate::value::{Function, Intrinsic, Value};

/// The result of evaluating a statement or block.
pub enum Flow {
    /// Ordinary completion with a value.
    Normal(Value),
    /// A `return` travelling to the innermost function call.
    Return(Value, Span),
    /// A `break` travelling to the innermost loop.
    Break(Span),
    /// A `continue` travelling to the innermost loop body.
    Continue(Span),
}

/// The Kyaro evaluator.
///
/// Holds the global frame (pre-populated with intrinsics) and the
/// current-environment cursor. One interpreter lives for a whole REPL
/// session, so definitions persist across inputs.
pub struct Interpreter {
    globals: Env,
    env: Env,
}

impl Interpreter {
    /// Creates an interpreter with the standard intrinsic table.
    pub fn new() -> Self {
        Self::with_registry(&Registry::standard())
    }

    /// Creates an interpreter with a caller-supplied intrinsic table.
    pub fn with_registry(registry: &Registry) -> Self {
        let globals = Env::global();
        registry.install(&globals);
        Self {
            env: globals.clone(),
            globals,
        }
    }

    /// The global environment frame.
    pub fn globals(&self) -> &Env {
        &self.globals
    }

    /// Evaluates a program, yielding the value of its last statement.
    ///
    /// An escape reaching the top level is a runtime error: `return`
    /// makes sense only inside a function, `break`/`continue` only
    /// inside a loop.
    pub fn interpret(&mut self, program: &Block) -> Result<Value> {
        match self.eval_block(program)? {
            Flow::Normal(value) => Ok(value),
            Flow::Return(_, span) => Err(KyaroError::runtime("'return' outside function", span)),
            Flow::Break(span) => Err(KyaroError::runtime("'break' outside loop", span)),
            Flow::Continue(span) => Err(KyaroError::runtime("'continue' outside loop", span)),
        }
    }

    /// Calls a callable value with already-evaluated arguments.
    ///
    /// This is the dispatch point shared by call expressions and
    /// higher-order intrinsics such as `map` and `reduce`.
    pub fn call_value(&mut self, callee: Value, args: Vec<Value>) -> Result<Value> {
        match callee {
            Value::Func(func) => {
                if args.len() != func.params.len() {
                    return Err(KyaroError::runtime_plain(format!(
                        "Function {} expects {} arguments, got {}",
                        func.name,
                        func.params.len(),
                        args.len()
                    )));
                }

                // Lexical scoping: the frame chains to the closure
                // environment, not the caller's.
                let frame = Env::with_parent(&func.closure);
                for (param, arg) in func.params.iter().zip(args) {
                    frame.define(param, arg);
                }

                let flow = self.with_env(frame, |interp| interp.eval_block(&func.body))?;
                match flow {
                    // No explicit return: the call yields null, not the
                    // body's block value.
                    Flow::Normal(_) => Ok(Value::Null),
                    Flow::Return(value, _) => Ok(value),
                    Flow::Break(span) => Err(KyaroError::runtime("'break' outside loop", span)),
                    Flow::Continue(span) => {
                        Err(KyaroError::runtime("'continue' outside loop", span))
                    }
                }
            }
            Value::Intrinsic(intrinsic) => intrinsic.call(self, args),
            other => Err(KyaroError::runtime_plain(format!(
                "Cannot call non-function type: {}",
                other.type_name()
            ))),
        }
    }

    /// Runs `f` with `env` as the current environment, restoring the
    /// previous one on every exit path.
    fn with_env<T>(&mut self, env: Env, f: impl FnOnce(&mut Self) -> T) -> T {
        let prev = std::mem::replace(&mut self.env, env);
        let result = f(self);
        self.env = prev;
        result
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    fn eval_block(&mut self, block: &Block) -> Result<Flow> {
        let mut result = Value::Null;
        for stmt in &block.stmts {
            match self.eval_stmt(stmt)? {
                Flow::Normal(value) => result = value,
                escape => return Ok(escape),
            }
        }
        Ok(Flow::Normal(result))
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Let(s) => {
                let value = self.eval_expr(&s.value)?;
                self.env.define(&s.name, value.clone());
                Ok(Flow::Normal(value))
            }

            Stmt::Assign(s) => {
                let value = self.eval_expr(&s.value)?;
                // Assign through the chain when the name is bound
                // anywhere; otherwise create it here.
                if !self.env.set(&s.name, value.clone()) {
                    self.env.define(&s.name, value.clone());
                }
                Ok(Flow::Normal(value))
            }

            Stmt::CompoundAssign(s) => {
                let current = self.env.get(&s.name).ok_or_else(|| {
                    KyaroError::runtime(format!("Undefined variable: {}", s.name), s.span)
                })?;
                let operand = self.eval_expr(&s.value)?;
                let value =
                    binary_op(s.op, current, operand).map_err(|e| e.with_span(s.span))?;
                self.env.set(&s.name, value.clone());
                Ok(Flow::Normal(value))
            }

            Stmt::Func(s) => {
                let func = Value::Func(Rc::new(Function {
                    name: s.name.clone(),
                    params: s.params.clone(),
                    body: s.body.clone(),
                    closure: self.env.clone(),
                }));
                self.env.define(&s.name, func.clone());
                Ok(Flow::Normal(func))
            }

            Stmt::Return(s) => {
                let value = match &s.value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value, s.span))
            }

            Stmt::If(s) => {
                if self.eval_expr(&s.cond)?.is_truthy() {
                    return self.eval_block(&s.then_block);
                }
                for (cond, block) in &s.elif_branches {
                    if self.eval_expr(cond)?.is_truthy() {
                        return self.eval_block(block);
                    }
                }
                match &s.else_block {
                    Some(block) => self.eval_block(block),
                    None => Ok(Flow::Normal(Value::Null)),
                }
            }

            Stmt::While(s) => {
                let mut result = Value::Null;
                loop {
                    if !self.eval_expr(&s.cond)?.is_truthy() {
                        break;
                    }
                    match self.eval_block(&s.body)? {
                        Flow::Normal(value) => result = value,
                        Flow::Continue(_) => continue,
                        Flow::Break(_) => break,
                        escape @ Flow::Return(..) => return Ok(escape),
                    }
                }
                Ok(Flow::Normal(result))
            }

            Stmt::For(s) => {
                let iterable = self.eval_expr(&s.iterable)?;
                let items: Vec<Value> = match &iterable {
                    Value::List(list) => list.borrow().clone(),
                    Value::Str(text) => {
                        text.chars().map(|c| Value::str(c.to_string())).collect()
                    }
                    _ => {
                        return Err(KyaroError::runtime(
                            "For loop requires an iterable (list or string)",
                            s.span,
                        ))
                    }
                };

                // Iteration runs in a fresh frame; the loop variable is
                // rebound there each time round, never in the parent.
                let loop_env = Env::with_parent(&self.env);
                self.with_env(loop_env.clone(), |interp| {
                    let mut result = Value::Null;
                    for item in items {
                        loop_env.define(&s.var, item);
                        match interp.eval_block(&s.body)? {
                            Flow::Normal(value) => result = value,
                            Flow::Continue(_) => continue,
                            Flow::Break(_) => break,
                            escape @ Flow::Return(..) => return Ok(escape),
                        }
                    }
                    Ok(Flow::Normal(result))
                })
            }

            Stmt::Break(span) => Ok(Flow::Break(*span)),
            Stmt::Continue(span) => Ok(Flow::Continue(*span)),
            Stmt::Expr(expr) => Ok(Flow::Normal(self.eval_expr(expr)?)),
        }
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(lit) => Ok(match lit {
                Literal::Int(n) => Value::Int(*n),
                Literal::Float(f) => Value::Float(*f),
                Literal::Str(s) => Value::str(s),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Null => Value::Null,
            }),

            Expr::Ident(ident) => self.env.get(&ident.name).ok_or_else(|| {
                KyaroError::runtime(format!("Undefined variable: {}", ident.name), ident.span)
            }),

            Expr::Binary(binary) => self.eval_binary(binary),
            Expr::Unary(unary) => self.eval_unary(unary),
            Expr::Call(call) => self.eval_call(call),
            Expr::Index(index) => self.eval_index(index),
            Expr::Member(member) => self.eval_member(member),

            Expr::List(list) => {
                let mut elements = Vec::with_capacity(list.elements.len());
                for element in &list.elements {
                    elements.push(self.eval_expr(element)?);
                }
                Ok(Value::list(elements))
            }
        }
    }

    fn eval_binary(&mut self, binary: &BinaryExpr) -> Result<Value> {
        match binary.op {
            // `and` and `or` short-circuit. `and` yields a boolean from
            // truthiness; `or` yields the actual operand value.
            BinOp::And => {
                let left = self.eval_expr(&binary.left)?;
                if !left.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let right = self.eval_expr(&binary.right)?;
                Ok(Value::Bool(right.is_truthy()))
            }
            BinOp::Or => {
                let left = self.eval_expr(&binary.left)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.eval_expr(&binary.right)
            }
            op => {
                let left = self.eval_expr(&binary.left)?;
                let right = self.eval_expr(&binary.right)?;
                binary_op(op, left, right).map_err(|e| e.with_span(binary.span))
            }
        }
    }

    fn eval_unary(&mut self, unary: &UnaryExpr) -> Result<Value> {
        let operand = self.eval_expr(&unary.expr)?;
        match unary.op {
            UnOp::Not => Ok(Value::Bool(!operand.is_truthy())),
            UnOp::Neg => match operand {
                Value::Int(n) => Ok(n
                    .checked_neg()
                    .map(Value::Int)
                    .unwrap_or(Value::Float(-(n as f64)))),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(KyaroError::runtime(
                    format!("Unsupported operand type for -: {}", other.type_name()),
                    unary.span,
                )),
            },
        }
    }

    fn eval_call(&mut self, call: &CallExpr) -> Result<Value> {
        let callee = self.eval_expr(&call.callee)?;
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.eval_expr(arg)?);
        }
        self.call_value(callee, args)
            .map_err(|e| e.with_span(call.span))
    }

    fn eval_index(&mut self, index: &IndexExpr) -> Result<Value> {
        let object = self.eval_expr(&index.object)?;
        let idx = match self.eval_expr(&index.index)? {
            Value::Int(n) => n,
            // Fractional indices truncate toward zero.
            Value::Float(f) => f as i64,
            other => {
                return Err(KyaroError::runtime(
                    format!("Index must be a number, got {}", other.type_name()),
                    index.span,
                ))
            }
        };

        match object {
            Value::List(list) => {
                let list = list.borrow();
                let pos = normalize_index(idx, list.len()).ok_or_else(|| {
                    KyaroError::runtime("Index out of range", index.span)
                })?;
                Ok(list[pos].clone())
            }
            Value::Str(text) => {
                let chars: Vec<char> = text.chars().collect();
                let pos = normalize_index(idx, chars.len()).ok_or_else(|| {
                    KyaroError::runtime("Index out of range", index.span)
                })?;
                Ok(Value::str(chars[pos].to_string()))
            }
            other => Err(KyaroError::runtime(
                format!("Cannot index type {}", other.type_name()),
                index.span,
            )),
        }
    }

    /// Member access is defined only on strings, where `upper`, `lower`,
    /// and `split` yield bound callables over the receiver.
    fn eval_member(&mut self, member: &MemberExpr) -> Result<Value> {
        let object = self.eval_expr(&member.object)?;

        if let Value::Str(text) = &object {
            match member.member.as_str() {
                "upper" => {
                    let text = Rc::clone(text);
                    return Ok(Value::Intrinsic(Rc::new(Intrinsic::new(
                        "upper",
                        move |_, args| {
                            if !args.is_empty() {
                                return Err(KyaroError::runtime_plain(
                                    "upper() takes no arguments",
                                ));
                            }
                            Ok(Value::str(text.to_uppercase()))
                        },
                    ))));
                }
                "lower" => {
                    let text = Rc::clone(text);
                    return Ok(Value::Intrinsic(Rc::new(Intrinsic::new(
                        "lower",
                        move |_, args| {
                            if !args.is_empty() {
                                return Err(KyaroError::runtime_plain(
                                    "lower() takes no arguments",
                                ));
                            }
                            Ok(Value::str(text.to_lowercase()))
                        },
                    ))));
                }
                "split" => {
                    let text = Rc::clone(text);
                    return Ok(Value::Intrinsic(Rc::new(Intrinsic::new(
                        "split",
                        move |_, args| {
                            let sep: Rc<str> = match args.len() {
                                0 => Rc::from(" "),
                                1 => match &args[0] {
                                    Value::Str(sep) => Rc::clone(sep),
                                    other => {
                                        return Err(KyaroError::runtime_plain(format!(
                                            "split() separator must be a string, got {}",
                                            other.type_name()
                                        )))
                                    }
                                },
                                n => {
                                    return Err(KyaroError::runtime_plain(format!(
                                        "split() takes at most 1 argument, got {n}"
                                    )))
                                }
                            };
                            if sep.is_empty() {
                                return Err(KyaroError::runtime_plain(
                                    "split() separator must not be empty",
                                ));
                            }
                            Ok(Value::list(text.split(&*sep).map(Value::str).collect()))
                        },
                    ))));
                }
                _ => {}
            }
        }

        Err(KyaroError::runtime(
            format!(
                "Type {} has no member '{}'",
                object.type_name(),
                member.member
            ),
            member.span,
        ))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// OPERATOR SEMANTICS
// =============================================================================

/// Applies a binary operator to two evaluated operands.
///
/// Errors carry no position; call sites attach their span.
pub(crate) fn binary_op(op: BinOp, left: Value, right: Value) -> Result<Value> {
    match op {
        BinOp::Add => add_values(left, right),
        BinOp::Sub => arith(op, left, right, |a, b| a.checked_sub(b), |a, b| a - b),
        BinOp::Mul => arith(op, left, right, |a, b| a.checked_mul(b), |a, b| a * b),
        BinOp::Div => {
            let (x, y) = numeric_operands(op, &left, &right)?;
            if y == 0.0 {
                return Err(KyaroError::runtime_plain("Division by zero"));
            }
            // Division always yields a float.
            Ok(Value::Float(x / y))
        }
        BinOp::Mod => modulo(left, right),
        BinOp::Pow => power(left, right),

        BinOp::Eq => Ok(Value::Bool(left == right)),
        BinOp::Ne => Ok(Value::Bool(left != right)),

        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => ordering(op, left, right),

        // Short-circuit forms are handled before operand evaluation.
        BinOp::And | BinOp::Or => unreachable!("logical operators evaluate lazily"),
    }
}

/// `+`: numeric addition, string concatenation, or list concatenation.
fn add_values(left: Value, right: Value) -> Result<Value> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => Ok(int_result(a.checked_add(*b), || {
            *a as f64 + *b as f64
        })),
        (Value::Str(a), Value::Str(b)) => {
            let mut out = String::with_capacity(a.len() + b.len());
            out.push_str(a);
            out.push_str(b);
            Ok(Value::str(out))
        }
        (Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        _ => {
            let (x, y) = numeric_operands(BinOp::Add, &left, &right)?;
            Ok(Value::Float(x + y))
        }
    }
}

/// Shared integer/float arithmetic for `-` and `*`.
fn arith(
    op: BinOp,
    left: Value,
    right: Value,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
) -> Result<Value> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => {
            Ok(int_result(int_op(*a, *b), || float_op(*a as f64, *b as f64)))
        }
        _ => {
            let (x, y) = numeric_operands(op, &left, &right)?;
            Ok(Value::Float(float_op(x, y)))
        }
    }
}

/// `%` is floored: the result takes the sign of the divisor.
fn modulo(left: Value, right: Value) -> Result<Value> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => {
            if *b == 0 {
                return Err(KyaroError::runtime_plain("Division by zero"));
            }
            // checked_rem only fails on MIN % -1, which is 0.
            let r = a.checked_rem(*b).unwrap_or(0);
            let r = if r != 0 && (r < 0) != (*b < 0) { r + b } else { r };
            Ok(Value::Int(r))
        }
        _ => {
            let (x, y) = numeric_operands(BinOp::Mod, &left, &right)?;
            if y == 0.0 {
                return Err(KyaroError::runtime_plain("Division by zero"));
            }
            Ok(Value::Float(x - y * (x / y).floor()))
        }
    }
}

/// `**`: integral when both operands are integers and the exponent is
/// non-negative, float otherwise. Overflow promotes to float.
fn power(left: Value, right: Value) -> Result<Value> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) if *b >= 0 => {
            let int_pow = u32::try_from(*b).ok().and_then(|exp| a.checked_pow(exp));
            Ok(int_result(int_pow, || (*a as f64).powf(*b as f64)))
        }
        _ => {
            let (x, y) = numeric_operands(BinOp::Pow, &left, &right)?;
            Ok(Value::Float(x.powf(y)))
        }
    }
}

/// Ordering comparisons for numeric or string operand pairs.
fn ordering(op: BinOp, left: Value, right: Value) -> Result<Value> {
    let result = match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => apply_ordering(op, a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => apply_ordering(op, a.cmp(b)),
        _ => {
            let (x, y) = numeric_operands(op, &left, &right)?;
            // NaN compares false under every ordering operator.
            match x.partial_cmp(&y) {
                Some(ord) => apply_ordering(op, ord),
                None => false,
            }
        }
    };
    Ok(Value::Bool(result))
}

fn apply_ordering(op: BinOp, ord: Ordering) -> bool {
    match op {
        BinOp::Lt => ord == Ordering::Less,
        BinOp::Le => ord != Ordering::Greater,
        BinOp::Gt => ord == Ordering::Greater,
        BinOp::Ge => ord != Ordering::Less,
        _ => unreachable!("not an ordering operator"),
    }
}

/// Compares two values for sorting and min/max, failing on kinds that
/// have no defined order.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Result<Ordering> {
    let ord = match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    };
    ord.ok_or_else(|| {
        KyaroError::runtime_plain(format!(
            "Cannot compare {} and {}",
            a.type_name(),
            b.type_name()
        ))
    })
}

/// Keeps an integer result when the checked operation succeeded,
/// otherwise promotes through the float fallback.
fn int_result(checked: Option<i64>, fallback: impl FnOnce() -> f64) -> Value {
    match checked {
        Some(n) => Value::Int(n),
        None => Value::Float(fallback()),
    }
}

/// Extracts two numeric operands or fails with the operator's name.
fn numeric_operands(op: BinOp, left: &Value, right: &Value) -> Result<(f64, f64)> {
    match (left.as_number(), right.as_number()) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(KyaroError::runtime_plain(format!(
            "Unsupported operand types for {}: {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Resolves an index against a sequence length, counting from the end
/// when negative.
fn normalize_index(idx: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let idx = if idx < 0 { idx + len } else { idx };
    if (0..len).contains(&idx) {
        Some(idx as usize)
    } else {
        None
    }
}
