#![allow(clippy::cast_possible_truncation)]

use std::{cell::RefCell, io::Write as _, rc::Rc};

use crate::{
    ast::{BinaryOp, Expr},
    error::{Error, RuntimeError},
    interpreter::{
        evaluator::{assign, binary, builtins, call, coerce, env::Env, subset, unary},
        parser,
        value::core::{Closure, PromiseState, PromiseValue, Value},
    },
};

/// A non-local control event travelling up the evaluation stack.
///
/// Errors and the loop/return control signals share one channel; loops
/// catch `Break`/`Next`, closure calls catch `Return`, and `tryCatch`
/// catches `Error` only. A control signal that escapes its natural scope is
/// converted into the corresponding error at the boundary.
#[derive(Debug, Clone)]
pub enum Signal {
    /// An evaluation error.
    Error(RuntimeError),
    /// `break` unwinding to the nearest loop.
    Break {
        /// Line of the `break` expression.
        line: usize,
    },
    /// `next` unwinding to the nearest loop.
    Next {
        /// Line of the `next` expression.
        line: usize,
    },
    /// `return(...)` unwinding to the nearest closure call.
    Return {
        /// The returned value.
        value: Value,
    },
}

impl From<RuntimeError> for Signal {
    fn from(e: RuntimeError) -> Self {
        Self::Error(e)
    }
}

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// [`Signal`] describing an error or an in-flight control transfer.
pub type EvalResult<T> = Result<T, Signal>;

/// Where printed output goes.
#[derive(Debug)]
enum OutputSink {
    /// Straight to standard output.
    Stdout,
    /// Into an in-memory buffer (installed for the duration of
    /// [`Context::eval_source`]).
    Capture(String),
}

/// Stores the runtime evaluation state: the global environment and the
/// output sink.
///
/// A `Context` is created once and reused across evaluations; its global
/// environment comes pre-populated with the builtin library and constants.
#[derive(Debug)]
pub struct Context {
    /// The global environment.
    pub global: Rc<Env>,
    output:     RefCell<OutputSink>,
}

/// The result of evaluating source text: the last expression's value and
/// everything that was printed while it ran.
#[derive(Debug)]
pub struct EvalOutcome {
    /// The value of the last top-level expression.
    pub value:  Value,
    /// The accumulated printed output.
    pub output: String,
}

/// A failed evaluation, still carrying the output accumulated before the
/// error and the last successfully produced value.
#[derive(Debug)]
pub struct EvalError {
    /// What went wrong.
    pub error:  Error,
    /// The last value produced before the error.
    pub value:  Value,
    /// The output accumulated before the error.
    pub output: String,
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for EvalError {}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Creates a new evaluation context with the builtin library installed
    /// into a fresh global environment. Output goes to standard output
    /// until an evaluation installs a capture buffer.
    #[must_use]
    pub fn new() -> Self {
        let global = Env::new(None);
        builtins::install_builtins(&global);
        Self { global,
               output: RefCell::new(OutputSink::Stdout) }
    }

    /// Appends text to the current output sink.
    pub fn write_output(&self, s: &str) {
        match &mut *self.output.borrow_mut() {
            OutputSink::Stdout => {
                print!("{s}");
                let _ = std::io::stdout().flush();
            },
            OutputSink::Capture(buf) => buf.push_str(s),
        }
    }

    /// Appends a line to the current output sink.
    pub fn println(&self, s: &str) {
        self.write_output(s);
        self.write_output("\n");
    }

    /// Parses and evaluates source text in this context.
    ///
    /// A capture buffer replaces the output sink for the duration of the
    /// call and is restored on exit, so everything the program printed is
    /// returned as a single string together with the last expression's
    /// value. An error aborts the remainder of the program; the output and
    /// last value produced before the error are returned inside the
    /// [`EvalError`].
    ///
    /// # Errors
    /// Returns an [`EvalError`] when the source fails to parse or an
    /// evaluation error reaches the top level.
    ///
    /// # Example
    /// ```
    /// use vectra::Context;
    ///
    /// let ctx = Context::new();
    /// let out = ctx.eval_source("x <- 1:5\nsum(x)").unwrap();
    /// assert_eq!(out.value.to_string(), "15");
    /// assert_eq!(out.output, "");
    /// ```
    pub fn eval_source(&self, src: &str) -> Result<EvalOutcome, EvalError> {
        let prev = self.output.replace(OutputSink::Capture(String::new()));
        let result = self.eval_program(src);
        let output = match self.output.replace(prev) {
            OutputSink::Capture(buf) => buf,
            OutputSink::Stdout => String::new(),
        };
        match result {
            Ok(value) => Ok(EvalOutcome { value, output }),
            Err((error, value)) => Err(EvalError { error, value, output }),
        }
    }

    /// Runs every top-level expression, threading the last value through.
    fn eval_program(&self, src: &str) -> Result<Value, (Error, Value)> {
        let program = match parser::core::parse(src) {
            Ok(p) => p,
            Err(e) => return Err((Error::Parse(e), Value::Null)),
        };
        let mut last = Value::Null;
        for expr in &program.exprs {
            // Forcing here keeps promises from leaking out as program
            // results (a bare identifier can evaluate to one).
            match eval(self, &self.global, expr).and_then(|v| force(self, v)) {
                Ok(v) => last = v,
                // A top-level return ends the program with its value.
                Err(Signal::Return { value }) => return Ok(value),
                Err(sig) => return Err((Error::Runtime(signal_into_error(sig)), last)),
            }
        }
        Ok(last)
    }
}

/// Converts an escaped control signal into the error it means at a scope
/// that cannot absorb it.
pub fn signal_into_error(sig: Signal) -> RuntimeError {
    match sig {
        Signal::Error(e) => e,
        Signal::Break { line } => RuntimeError::BreakOutsideLoop { line },
        Signal::Next { line } => RuntimeError::NextOutsideLoop { line },
        Signal::Return { .. } => RuntimeError::InvalidArgument { details: "unexpected return"
                                                                              .to_string(),
                                                                 line:    0, },
    }
}

/// Resolves a promise if the value is one; other values pass through.
///
/// A promise is marked as being forced before its body runs, so that
/// re-entering it during its own evaluation reports an error instead of
/// recursing forever. Both the produced value and a produced error are
/// memoized.
pub fn force(ctx: &Context, value: Value) -> EvalResult<Value> {
    let Value::Promise(p) = &value else {
        return Ok(value);
    };
    let state = p.state.borrow().clone();
    match state {
        PromiseState::Done(res) => res,
        PromiseState::Forcing => Err(RuntimeError::PromiseCycle { line: p.expr.line() }.into()),
        PromiseState::Pending => {
            *p.state.borrow_mut() = PromiseState::Forcing;
            let res = eval(ctx, &p.env, &p.expr);
            *p.state.borrow_mut() = PromiseState::Done(res.clone());
            res
        },
    }
}

/// Evaluates an AST node in the given environment.
///
/// This is the main dispatch of the interpreter. Literals build scalar
/// vectors, identifiers walk the environment chain, operators delegate to
/// the vectorized kernels, and the control forms manage the signal channel.
pub fn eval(ctx: &Context, env: &Rc<Env>, expr: &Expr) -> EvalResult<Value> {
    match expr {
        Expr::Ident { name, pos } => {
            env.get(name)
               .ok_or_else(|| {
                   Signal::from(RuntimeError::ObjectNotFound { name: name.clone(),
                                                               line: pos.line, })
               })
        },
        Expr::Number { value, is_int, .. } => {
            if *is_int {
                Ok(Value::int_scalar(*value as i64))
            } else {
                Ok(Value::double_scalar(*value))
            }
        },
        Expr::Str { value, .. } => Ok(Value::char_scalar(value.clone())),
        Expr::Bool { value, .. } => Ok(Value::logical_scalar(*value)),
        Expr::Null { .. } => Ok(Value::Null),
        Expr::Na { .. } => Ok(Value::logical_na()),

        Expr::Unary { op, operand, pos } => {
            let v = force(ctx, eval(ctx, env, operand)?)?;
            unary::apply_unary(ctx, *op, &v, pos.line)
        },

        Expr::Binary { op, left, right, pos } => match op {
            BinaryOp::AndAnd | BinaryOp::OrOr => {
                binary::eval_short_circuit(ctx, env, *op, left, right, pos.line)
            },
            _ => {
                let a = force(ctx, eval(ctx, env, left)?)?;
                let b = force(ctx, eval(ctx, env, right)?)?;
                binary::eval_binary(ctx, *op, &a, &b, pos.line)
            },
        },

        Expr::Assign { op, target, value, pos } => {
            assign::eval_assign(ctx, env, *op, target, value, pos.line)
        },

        Expr::Block { exprs, .. } => {
            let mut last = Value::Null;
            for e in exprs {
                last = eval(ctx, env, e)?;
            }
            Ok(last)
        },

        Expr::If { cond,
                   then_branch,
                   else_branch,
                   pos, } => {
            let condv = force(ctx, eval(ctx, env, cond)?)?;
            match coerce::as_logical_scalar(ctx, &condv, pos.line)? {
                None => Err(RuntimeError::NaCondition { line: pos.line }.into()),
                Some(true) => eval(ctx, env, then_branch),
                Some(false) => match else_branch {
                    Some(e) => eval(ctx, env, e),
                    None => Ok(Value::Null),
                },
            }
        },

        Expr::For { var, seq, body, pos } => {
            let seqv = force(ctx, eval(ctx, env, seq)?)?;
            let n = seqv.len();
            let mut last = Value::Null;
            for i in 0..n {
                let elem = subset::vector_element(ctx, &seqv, i, pos.line)?;
                env.assign(var, elem);
                match eval(ctx, env, body) {
                    Ok(v) => last = v,
                    Err(Signal::Next { .. }) => {},
                    Err(Signal::Break { .. }) => break,
                    Err(sig) => return Err(sig),
                }
            }
            Ok(last)
        },

        Expr::While { cond, body, pos } => {
            let mut last = Value::Null;
            loop {
                let condv = force(ctx, eval(ctx, env, cond)?)?;
                match coerce::as_logical_scalar(ctx, &condv, pos.line)? {
                    None => return Err(RuntimeError::NaCondition { line: pos.line }.into()),
                    Some(false) => break,
                    Some(true) => {},
                }
                match eval(ctx, env, body) {
                    Ok(v) => last = v,
                    Err(Signal::Next { .. }) => {},
                    Err(Signal::Break { .. }) => break,
                    Err(sig) => return Err(sig),
                }
            }
            Ok(last)
        },

        Expr::Repeat { body, .. } => {
            let mut last = Value::Null;
            loop {
                match eval(ctx, env, body) {
                    Ok(v) => last = v,
                    Err(Signal::Next { .. }) => {},
                    Err(Signal::Break { .. }) => break,
                    Err(sig) => return Err(sig),
                }
            }
            Ok(last)
        },

        Expr::Break { pos } => Err(Signal::Break { line: pos.line }),
        Expr::Next { pos } => Err(Signal::Next { line: pos.line }),

        Expr::Return { value, .. } => {
            let v = match value {
                Some(e) => force(ctx, eval(ctx, env, e)?)?,
                None => Value::Null,
            };
            Err(Signal::Return { value: v })
        },

        Expr::Function { params, body, .. } => {
            Ok(Value::Closure(Rc::new(Closure { params: params.clone(),
                                                body:   body.clone(),
                                                env:    env.clone(), })))
        },

        Expr::Call { callee, args, pos } => call::eval_call(ctx, env, callee, args, pos.line),

        Expr::Index { target,
                      index,
                      double,
                      pos, } => {
            let x = force(ctx, eval(ctx, env, target)?)?;
            let idx = force(ctx, eval(ctx, env, index)?)?;
            subset::subset(ctx, &x, &idx, *double, pos.line)
        },

        Expr::Dollar { target, member, pos } => {
            let x = force(ctx, eval(ctx, env, target)?)?;
            subset::dollar(&x, member, pos.line)
        },
    }
}

/// Wraps an argument expression into a fresh promise over `env`.
pub fn promise_of(expr: &Rc<Expr>, env: &Rc<Env>) -> Value {
    Value::Promise(Rc::new(PromiseValue { expr:  expr.clone(),
                                          env:   env.clone(),
                                          state: RefCell::new(PromiseState::Pending), }))
}
