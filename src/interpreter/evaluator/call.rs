use std::rc::Rc;

use crate::{
    ast::{Arg, Expr},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{eval, force, promise_of, Context, EvalResult, Signal},
            env::Env,
        },
        value::core::{ArgValue, Closure, DotsValue, ExprValue, Value},
    },
};

/// Evaluates a call expression.
///
/// The callee evaluates eagerly; every argument expression is wrapped in a
/// promise over the caller's environment. A bare `...` argument splices the
/// captured dots of the calling function into the argument list, names
/// preserved. `quote` and `missing` are special forms dispatched on the
/// callee name before any evaluation happens.
pub fn eval_call(ctx: &Context,
                 env: &Rc<Env>,
                 callee: &Rc<Expr>,
                 args: &[Arg],
                 line: usize)
                 -> EvalResult<Value> {
    if let Expr::Ident { name, .. } = &**callee {
        match name.as_str() {
            "quote" => return special_quote(args, line),
            "missing" => return special_missing(env, args, line),
            _ => {},
        }
    }

    let callable = force(ctx, eval(ctx, env, callee)?)?;

    let mut arg_values = Vec::with_capacity(args.len());
    for a in args {
        if a.name.is_none() {
            if let Expr::Ident { name, .. } = &*a.value {
                if name == "..." {
                    if let Some(dv) = env.get("...") {
                        if let Value::Dots(dots) = force(ctx, dv)? {
                            arg_values.extend(dots.args.iter().cloned());
                            continue;
                        }
                    }
                }
            }
        }
        arg_values.push(ArgValue { name:  a.name.clone(),
                                   value: promise_of(&a.value, env), });
    }

    call_value(ctx, &callable, &arg_values, line)
}

/// Invokes an already-forced callable value with prepared arguments.
///
/// This is also the entry point the apply-family builtins use.
pub fn call_value(ctx: &Context,
                  callable: &Value,
                  args: &[ArgValue],
                  line: usize)
                  -> EvalResult<Value> {
    match callable {
        Value::Builtin(b) => (b.imp)(ctx, args, line),
        Value::Closure(c) => call_closure(ctx, c, args, line),
        _ => Err(RuntimeError::NotAFunction { line }.into()),
    }
}

/// `quote(expr)`: capture the single argument unevaluated.
fn special_quote(args: &[Arg], line: usize) -> EvalResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeError::InvalidArgument { details: "quote() expects 1 argument"
                                                                .to_string(),
                                                   line }.into());
    }
    Ok(Value::Expr(Rc::new(ExprValue { expr: args[0].value.clone() })))
}

/// `missing(sym)`: whether the named local is unbound or bound to the
/// missing sentinel.
fn special_missing(env: &Rc<Env>, args: &[Arg], line: usize) -> EvalResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeError::InvalidArgument { details: "missing() expects 1 argument"
                                                                .to_string(),
                                                   line }.into());
    }
    let Expr::Ident { name, .. } = &*args[0].value else {
        return Err(RuntimeError::InvalidArgument { details: "missing() expects a symbol"
                                                                .to_string(),
                                                   line }.into());
    };
    let missing = match env.get_local(name) {
        None | Some(Value::Missing) => true,
        Some(_) => false,
    };
    Ok(Value::logical_scalar(missing))
}

/// Binds actual arguments to a closure's formals and evaluates its body.
///
/// Matching proceeds in three phases: exact names first, then positional
/// matching of the remaining unnamed actuals against unfilled non-dots
/// formals, then collection of everything left into `...` (in original
/// call order). Unfilled formals bind their default as a promise over the
/// callee environment, or the missing sentinel without one.
fn call_closure(ctx: &Context,
                closure: &Closure,
                args: &[ArgValue],
                line: usize)
                -> EvalResult<Value> {
    let call_env = Env::new(Some(closure.env.clone()));
    let params = &closure.params;

    let mut bound: Vec<Option<Value>> = vec![None; params.len()];
    let mut used = vec![false; args.len()];
    let has_dots = params.iter().any(|p| p.dots);

    // Phase 1: exact-name matching against non-dots formals.
    for (ai, a) in args.iter().enumerate() {
        let Some(name) = &a.name else { continue };
        if let Some(pi) = params.iter().position(|p| !p.dots && p.name == *name) {
            if bound[pi].is_some() {
                return Err(RuntimeError::DuplicateArgument { name: name.clone(),
                                                             line }.into());
            }
            bound[pi] = Some(a.value.clone());
            used[ai] = true;
        } else if !has_dots {
            return Err(RuntimeError::UnusedArgument { name: Some(name.clone()),
                                                      line }.into());
        }
    }

    // Phase 2: positional matching of the remaining unnamed actuals.
    let mut pi = 0;
    for (ai, a) in args.iter().enumerate() {
        if a.name.is_some() {
            continue;
        }
        while pi < params.len() && (params[pi].dots || bound[pi].is_some()) {
            pi += 1;
        }
        if pi < params.len() {
            bound[pi] = Some(a.value.clone());
            used[ai] = true;
            pi += 1;
        } else if !has_dots {
            return Err(RuntimeError::UnusedArgument { name: None, line }.into());
        }
    }

    // Phase 3: everything unmatched lands in dots, in call order.
    if has_dots {
        let dots_args: Vec<ArgValue> = args.iter()
                                           .zip(&used)
                                           .filter(|(_, u)| !**u)
                                           .map(|(a, _)| a.clone())
                                           .collect();
        call_env.set_local("...", Value::Dots(Rc::new(DotsValue { args: dots_args })));
    }

    for (pi, p) in params.iter().enumerate() {
        if p.dots {
            continue;
        }
        match bound[pi].take() {
            Some(v) => call_env.set_local(&p.name, v),
            None => match &p.default {
                Some(default) => call_env.set_local(&p.name, promise_of(default, &call_env)),
                None => call_env.set_local(&p.name, Value::Missing),
            },
        }
    }

    match eval(ctx, &call_env, &closure.body) {
        // The body of `function(x) x` evaluates to the parameter's
        // promise; force it so callers see the value.
        Ok(v) => force(ctx, v),
        Err(Signal::Return { value }) => Ok(value),
        Err(Signal::Break { line }) => Err(RuntimeError::BreakOutsideLoop { line }.into()),
        Err(Signal::Next { line }) => Err(RuntimeError::NextOutsideLoop { line }.into()),
        Err(sig) => Err(sig),
    }
}
