#![allow(clippy::cast_sign_loss)]

use std::rc::Rc;

use crate::{
    ast::{AssignOp, Expr},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            coerce::{as_char_vec, as_double_vec, as_int_vec, as_logical_vec},
            core::{eval, force, Context, EvalResult},
            env::Env,
            subset::normalize_index,
        },
        value::{
            attrs::names_of,
            core::{CharVec, Value},
        },
    },
};

/// Evaluates an assignment expression.
///
/// `<-` and `=` bind in the current environment, `<<-` walks the parent
/// chain, and `->` was normalized by the parser so its target is already on
/// the target side. Indexed and `$` targets clone the current value, apply
/// the update and rebind the name, which is what gives assignment its
/// copy-on-write behavior.
pub fn eval_assign(ctx: &Context,
                   env: &Rc<Env>,
                   op: AssignOp,
                   target: &Rc<Expr>,
                   value: &Rc<Expr>,
                   line: usize)
                   -> EvalResult<Value> {
    let val = force(ctx, eval(ctx, env, value)?)?;

    match &**target {
        Expr::Ident { name, .. } => {
            match op {
                AssignOp::Super => env.assign_super(name, val.clone()),
                _ => env.assign(name, val.clone()),
            }
            Ok(val)
        },

        Expr::Index { target: inner,
                      index,
                      double,
                      pos, } => {
            let Expr::Ident { name, .. } = &**inner else {
                return Err(RuntimeError::InvalidAssignTarget { line }.into());
            };
            let cur = env.get(name)
                         .ok_or(RuntimeError::ObjectNotFound { name: name.clone(),
                                                               line: pos.line, })?;
            let cur = force(ctx, cur)?;
            let idx = force(ctx, eval(ctx, env, index)?)?;
            let updated = set_subset(ctx, &cur, &idx, &val, *double, line)?;
            env.assign(name, updated);
            Ok(val)
        },

        Expr::Dollar { target: inner,
                       member,
                       pos, } => {
            let Expr::Ident { name, .. } = &**inner else {
                return Err(RuntimeError::InvalidAssignTarget { line }.into());
            };
            let cur = env.get(name)
                         .ok_or(RuntimeError::ObjectNotFound { name: name.clone(),
                                                               line: pos.line, })?;
            let cur = force(ctx, cur)?;
            let updated = set_dollar(ctx, &cur, member, &val, line)?;
            env.assign(name, updated);
            Ok(val)
        },

        _ => Err(RuntimeError::InvalidAssignTarget { line }.into()),
    }
}

/// A subset write: clones the target, recycles the replacement across the
/// normalized positions (skipping NA and dropped zeros) and extends the
/// length when a position lies past the end. The atomic element type is
/// preserved by coercing the replacement to it.
pub fn set_subset(ctx: &Context,
                  x: &Value,
                  idx: &Value,
                  rhs: &Value,
                  double: bool,
                  line: usize)
                  -> EvalResult<Value> {
    let rhs = force(ctx, rhs.clone())?;

    if double {
        let positions = as_int_vec(ctx, idx, line)?;
        let valid = positions.len() == 1 && positions[0].is_some_and(|v| v >= 1);
        if !valid {
            return Err(RuntimeError::InvalidArgument { details: "invalid subscript in [[<-"
                                                                    .to_string(),
                                                       line }.into());
        }
        let i = positions[0].unwrap_or(1) as usize - 1;
        let Value::List(l) = x else {
            return Err(RuntimeError::IndexAssignUnsupported { op: "[[<-".to_string(),
                                                              ty: x.type_name().to_string(),
                                                              line }.into());
        };
        let mut out = (**l).clone();
        while out.data.len() <= i {
            out.data.push(Value::Null);
        }
        out.data[i] = rhs;
        return Ok(Value::List(Rc::new(out)));
    }

    let (indices, na_mask) = normalize_index(ctx, x, idx, line)?;
    let positions: Vec<usize> = indices.iter()
                                       .zip(&na_mask)
                                       .filter(|(_, &masked)| !masked)
                                       .map(|(&i, _)| i)
                                       .collect();

    fn write<T: Clone>(data: &mut Vec<Option<T>>, positions: &[usize], rv: &[Option<T>]) {
        for (k, &p) in positions.iter().enumerate() {
            while data.len() <= p {
                data.push(None);
            }
            data[p] = rv[k % rv.len()].clone();
        }
    }

    match x {
        Value::Double(v) => {
            let rv = as_double_vec(ctx, &rhs, line)?;
            let mut out = (**v).clone();
            if !rv.is_empty() {
                write(&mut out.data, &positions, &rv);
            }
            Ok(Value::Double(Rc::new(out)))
        },
        Value::Int(v) => {
            let rv = as_int_vec(ctx, &rhs, line)?;
            let mut out = (**v).clone();
            if !rv.is_empty() {
                write(&mut out.data, &positions, &rv);
            }
            Ok(Value::Int(Rc::new(out)))
        },
        Value::Logical(v) => {
            let rv = as_logical_vec(ctx, &rhs, line)?;
            let mut out = (**v).clone();
            if !rv.is_empty() {
                write(&mut out.data, &positions, &rv);
            }
            Ok(Value::Logical(Rc::new(out)))
        },
        Value::Char(v) => {
            let rv = as_char_vec(ctx, &rhs, line)?;
            let mut out = (**v).clone();
            if !rv.is_empty() {
                write(&mut out.data, &positions, &rv);
            }
            Ok(Value::Char(Rc::new(out)))
        },
        Value::List(l) => {
            let replacement: Vec<Value> = match &rhs {
                Value::List(r) => r.data.clone(),
                other => vec![other.clone()],
            };
            if replacement.is_empty() {
                return Ok(x.clone());
            }
            let mut out = (**l).clone();
            for (k, &p) in positions.iter().enumerate() {
                while out.data.len() <= p {
                    out.data.push(Value::Null);
                }
                out.data[p] = replacement[k % replacement.len()].clone();
            }
            Ok(Value::List(Rc::new(out)))
        },
        other => Err(RuntimeError::IndexAssignUnsupported { op: "[<-".to_string(),
                                                            ty: other.type_name().to_string(),
                                                            line }.into()),
    }
}

/// A `$` write on a list: replaces the named slot or appends a new one,
/// keeping the `names` attribute in lockstep.
pub fn set_dollar(ctx: &Context,
                  x: &Value,
                  name: &str,
                  rhs: &Value,
                  line: usize)
                  -> EvalResult<Value> {
    let rhs = force(ctx, rhs.clone())?;
    let Value::List(l) = x else {
        return Err(RuntimeError::IndexAssignUnsupported { op: "$<-".to_string(),
                                                          ty: x.type_name().to_string(),
                                                          line }.into());
    };
    let mut out = (**l).clone();
    let mut names = match names_of(x) {
        Some(n) if n.len() == out.data.len() => n,
        _ => vec![None; out.data.len()],
    };
    match names.iter().position(|n| n.as_deref() == Some(name)) {
        Some(p) => out.data[p] = rhs,
        None => {
            out.data.push(rhs);
            names.push(Some(name.to_string()));
        },
    }
    out.attrs
       .insert("names".to_string(), Value::Char(Rc::new(CharVec::new(names))));
    Ok(Value::List(Rc::new(out)))
}
