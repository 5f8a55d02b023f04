#![allow(clippy::cast_possible_truncation)]

use std::{cmp::Ordering, collections::HashSet, rc::Rc};

use crate::{
    ast::{BinaryOp, Expr},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            coerce::{
                as_char_vec, as_double_scalar, as_double_vec, as_logical_scalar, as_logical_vec,
                render_elements,
            },
            core::{eval, force, Context, EvalResult},
            env::Env,
        },
        value::core::Value,
    },
};

/// Evaluates the short-circuit operators `&&` and `||`.
///
/// The left side always evaluates. When it decides the answer (`FALSE` for
/// `&&`, `TRUE` for `||`) the right side is never forced. An NA left side
/// does force the right side, because the right may still resolve the NA
/// (`NA && FALSE` is `FALSE`, `NA || TRUE` is `TRUE`).
pub fn eval_short_circuit(ctx: &Context,
                          env: &Rc<Env>,
                          op: BinaryOp,
                          left: &Rc<Expr>,
                          right: &Rc<Expr>,
                          line: usize)
                          -> EvalResult<Value> {
    let lv = force(ctx, eval(ctx, env, left)?)?;
    let l = as_logical_scalar(ctx, &lv, line)?;

    match op {
        BinaryOp::AndAnd => {
            if l == Some(false) {
                return Ok(Value::logical_scalar(false));
            }
            let rv = force(ctx, eval(ctx, env, right)?)?;
            let r = as_logical_scalar(ctx, &rv, line)?;
            match (l, r) {
                (_, Some(false)) => Ok(Value::logical_scalar(false)),
                (None, _) | (_, None) => Ok(Value::logical_na()),
                _ => Ok(Value::logical_scalar(true)),
            }
        },
        BinaryOp::OrOr => {
            if l == Some(true) {
                return Ok(Value::logical_scalar(true));
            }
            let rv = force(ctx, eval(ctx, env, right)?)?;
            let r = as_logical_scalar(ctx, &rv, line)?;
            match (l, r) {
                (_, Some(true)) => Ok(Value::logical_scalar(true)),
                (None, _) | (_, None) => Ok(Value::logical_na()),
                _ => Ok(Value::logical_scalar(false)),
            }
        },
        other => Err(RuntimeError::UnsupportedOperator { op:   other.to_string(),
                                                         line, }.into()),
    }
}

/// Evaluates a (non-short-circuit) binary operator over forced operands.
pub fn eval_binary(ctx: &Context,
                   op: BinaryOp,
                   a: &Value,
                   b: &Value,
                   line: usize)
                   -> EvalResult<Value> {
    match op {
        BinaryOp::Seq => colon_sequence(ctx, a, b, line),
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::Pow
        | BinaryOp::Mod
        | BinaryOp::IntDiv => numeric_binary(ctx, op, a, b, line),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne => {
            compare(ctx, op, a, b, line)
        },
        BinaryOp::And | BinaryOp::Or => logical_binary(ctx, op, a, b, line),
        BinaryOp::In => membership(a, b),
        BinaryOp::AndAnd | BinaryOp::OrOr => {
            Err(RuntimeError::UnsupportedOperator { op:   op.to_string(),
                                                    line, }.into())
        },
    }
}

/// The `:` operator: an integer sequence from floor(start) to floor(end)
/// inclusive, stepping toward the end. Any NA endpoint yields a length-1
/// NA.
fn colon_sequence(ctx: &Context, a: &Value, b: &Value, line: usize) -> EvalResult<Value> {
    let af = as_double_scalar(ctx, a, line)?;
    let bf = as_double_scalar(ctx, b, line)?;
    let (Some(av), Some(bv)) = (af, bf) else {
        return Ok(Value::double_na());
    };
    let start = av.floor() as i64;
    let end = bv.floor() as i64;
    let step = if end < start { -1 } else { 1 };
    let mut out = Vec::with_capacity(start.abs_diff(end) as usize + 1);
    let mut x = start;
    loop {
        out.push(Some(x));
        if x == end {
            break;
        }
        x += step;
    }
    Ok(Value::int_vec(out))
}

/// Elementwise arithmetic over double-coerced operands with modular
/// recycling. NA in, NA out; the result is always double.
fn numeric_binary(ctx: &Context,
                  op: BinaryOp,
                  a: &Value,
                  b: &Value,
                  line: usize)
                  -> EvalResult<Value> {
    let av = as_double_vec(ctx, a, line)?;
    let bv = as_double_vec(ctx, b, line)?;
    if av.is_empty() || bv.is_empty() {
        return Ok(Value::double_vec(Vec::new()));
    }
    let n = av.len().max(bv.len());
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let (Some(x), Some(y)) = (av[i % av.len()], bv[i % bv.len()]) else {
            out.push(None);
            continue;
        };
        let r = match op {
            BinaryOp::Add => x + y,
            BinaryOp::Sub => x - y,
            BinaryOp::Mul => x * y,
            BinaryOp::Div => x / y,
            BinaryOp::Pow => x.powf(y),
            BinaryOp::Mod => x % y,
            BinaryOp::IntDiv => (x / y).floor(),
            other => {
                return Err(RuntimeError::UnsupportedOperator { op:   other.to_string(),
                                                               line, }.into())
            },
        };
        out.push(Some(r));
    }
    Ok(Value::double_vec(out))
}

const fn ordering_matches(op: BinaryOp, ord: Ordering) -> bool {
    match op {
        BinaryOp::Lt => matches!(ord, Ordering::Less),
        BinaryOp::Le => matches!(ord, Ordering::Less | Ordering::Equal),
        BinaryOp::Gt => matches!(ord, Ordering::Greater),
        BinaryOp::Ge => matches!(ord, Ordering::Greater | Ordering::Equal),
        BinaryOp::Eq => matches!(ord, Ordering::Equal),
        _ => !matches!(ord, Ordering::Equal),
    }
}

/// Vectorized comparison. Character operands win the coercion (both sides
/// compare lexicographically); otherwise both sides coerce to double, with
/// a logical-logical fallback. NA in either operand propagates.
fn compare(ctx: &Context, op: BinaryOp, a: &Value, b: &Value, line: usize) -> EvalResult<Value> {
    if matches!(a, Value::Char(_)) || matches!(b, Value::Char(_)) {
        let av = as_char_vec(ctx, a, line)?;
        let bv = as_char_vec(ctx, b, line)?;
        if av.is_empty() || bv.is_empty() {
            return Ok(Value::logical_vec(Vec::new()));
        }
        let n = av.len().max(bv.len());
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            match (&av[i % av.len()], &bv[i % bv.len()]) {
                (Some(x), Some(y)) => out.push(Some(ordering_matches(op, x.cmp(y)))),
                _ => out.push(None),
            }
        }
        return Ok(Value::logical_vec(out));
    }

    let (av, bv) = match as_double_vec(ctx, a, line) {
        Ok(av) => (av, as_double_vec(ctx, b, line)?),
        Err(e) => {
            // Not numeric-coercible; try logical-logical before giving up.
            let Ok(al) = as_logical_vec(ctx, a, line) else {
                return Err(e);
            };
            let bl = as_logical_vec(ctx, b, line)?;
            let to_num =
                |v: Vec<Option<bool>>| -> Vec<Option<f64>> {
                    v.into_iter()
                     .map(|e| e.map(|b| if b { 1.0 } else { 0.0 }))
                     .collect()
                };
            (to_num(al), to_num(bl))
        },
    };
    if av.is_empty() || bv.is_empty() {
        return Ok(Value::logical_vec(Vec::new()));
    }
    let n = av.len().max(bv.len());
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        match (av[i % av.len()], bv[i % bv.len()]) {
            (Some(x), Some(y)) => {
                let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
                let matched = if x.is_nan() || y.is_nan() {
                    matches!(op, BinaryOp::Ne)
                } else {
                    ordering_matches(op, ord)
                };
                out.push(Some(matched));
            },
            _ => out.push(None),
        }
    }
    Ok(Value::logical_vec(out))
}

/// Vectorized `&` and `|` with recycled three-valued logic:
/// `NA & FALSE` is `FALSE`, `NA & TRUE` is `NA`, `NA | TRUE` is `TRUE`,
/// `NA | FALSE` is `NA`.
fn logical_binary(ctx: &Context,
                  op: BinaryOp,
                  a: &Value,
                  b: &Value,
                  line: usize)
                  -> EvalResult<Value> {
    let av = as_logical_vec(ctx, a, line)?;
    let bv = as_logical_vec(ctx, b, line)?;
    if av.is_empty() || bv.is_empty() {
        return Ok(Value::logical_vec(Vec::new()));
    }
    let n = av.len().max(bv.len());
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let x = av[i % av.len()];
        let y = bv[i % bv.len()];
        let r = match op {
            BinaryOp::And => match (x, y) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            _ => match (x, y) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
        };
        out.push(r);
    }
    Ok(Value::logical_vec(out))
}

/// The `%in%` operator: elementwise membership of the left operand in the
/// right, keyed by the same rendering `match` uses.
fn membership(a: &Value, b: &Value) -> EvalResult<Value> {
    let table: HashSet<String> = render_elements(b).into_iter().collect();
    let out = render_elements(a).into_iter()
                                .map(|k| Some(table.contains(&k)))
                                .collect();
    Ok(Value::logical_vec(out))
}
