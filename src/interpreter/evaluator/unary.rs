use crate::{
    ast::UnaryOp,
    interpreter::{
        evaluator::{
            coerce::{as_double_scalar, as_double_vec, as_logical_scalar, as_logical_vec},
            core::{Context, EvalResult},
        },
        value::core::Value,
    },
};

/// Applies a unary operator to an already-forced value.
pub fn apply_unary(ctx: &Context, op: UnaryOp, v: &Value, line: usize) -> EvalResult<Value> {
    match op {
        UnaryOp::Not => unary_not(ctx, v, line),
        UnaryOp::Plus => unary_plus(ctx, v, line),
        UnaryOp::Minus => unary_minus(ctx, v, line),
    }
}

/// Logical negation, vectorized over longer operands.
fn unary_not(ctx: &Context, v: &Value, line: usize) -> EvalResult<Value> {
    if v.len() != 1 {
        let lv = as_logical_vec(ctx, v, line)?;
        return Ok(Value::logical_vec(lv.iter().map(|e| e.map(|b| !b)).collect()));
    }
    match as_logical_scalar(ctx, v, line)? {
        None => Ok(Value::logical_na()),
        Some(b) => Ok(Value::logical_scalar(!b)),
    }
}

/// Numeric identity: a no-op numerically, but coerces to double.
fn unary_plus(ctx: &Context, v: &Value, line: usize) -> EvalResult<Value> {
    match as_double_scalar(ctx, v, line)? {
        None => Ok(Value::double_na()),
        Some(x) => Ok(Value::double_scalar(x)),
    }
}

/// Numeric negation, vectorized over longer operands.
fn unary_minus(ctx: &Context, v: &Value, line: usize) -> EvalResult<Value> {
    if v.len() == 1 {
        return match as_double_scalar(ctx, v, line)? {
                   None => Ok(Value::double_na()),
                   Some(x) => Ok(Value::double_scalar(-x)),
               };
    }
    let dv = as_double_vec(ctx, v, line)?;
    Ok(Value::double_vec(dv.iter().map(|e| e.map(|x| -x)).collect()))
}
