#![allow(clippy::cast_sign_loss)]

use std::collections::HashSet;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            coerce::as_int_vec,
            core::{force, Context, EvalResult},
        },
        value::{attrs::names_of, core::Value},
    },
};

/// Extracts the `i`-th element of a vector as a length-1 value of the same
/// type; list elements come back whole. Loop variables and the apply
/// family bind elements through this.
pub fn vector_element(ctx: &Context, v: &Value, i: usize, line: usize) -> EvalResult<Value> {
    let v = force(ctx, v.clone())?;
    if i >= v.len() {
        return Err(RuntimeError::SubscriptOutOfBounds { line }.into());
    }
    match &v {
        Value::Logical(d) => Ok(match d.data[i] {
                                    Some(b) => Value::logical_scalar(b),
                                    None => Value::logical_na(),
                                }),
        Value::Int(d) => Ok(match d.data[i] {
                                Some(x) => Value::int_scalar(x),
                                None => Value::int_na(),
                            }),
        Value::Double(d) => Ok(match d.data[i] {
                                   Some(x) => Value::double_scalar(x),
                                   None => Value::double_na(),
                               }),
        Value::Char(d) => Ok(match &d.data[i] {
                                 Some(s) => Value::char_scalar(s.clone()),
                                 None => Value::char_na(),
                             }),
        Value::List(l) => Ok(l.data[i].clone()),
        other => Err(RuntimeError::NotSubsettable { ty:   other.type_name().to_string(),
                                                    line, }.into()),
    }
}

/// Normalizes a single-bracket index into zero-based positions plus a
/// parallel NA mask.
///
/// Positive numbers select (1-based), zeros drop, negatives exclude, and
/// mixing positive with negative is an error. Logical indices recycle over
/// the target length. Character indices match the target's `names`
/// attribute; unmatched names become NA positions.
pub fn normalize_index(ctx: &Context,
                       x: &Value,
                       idx: &Value,
                       line: usize)
                       -> EvalResult<(Vec<usize>, Vec<bool>)> {
    let n = x.len();
    match idx {
        Value::Int(_) | Value::Double(_) => {
            let data = as_int_vec(ctx, idx, line)?;
            normalize_int_index(&data, n, line)
        },
        Value::Logical(d) => {
            if d.data.is_empty() {
                return Ok((Vec::new(), Vec::new()));
            }
            let mut out = Vec::new();
            let mut na = Vec::new();
            for i in 0..n {
                match d.data[i % d.data.len()] {
                    None => {
                        out.push(i);
                        na.push(true);
                    },
                    Some(true) => {
                        out.push(i);
                        na.push(false);
                    },
                    Some(false) => {},
                }
            }
            Ok((out, na))
        },
        Value::Char(d) => {
            let names = names_of(x);
            let mut out = Vec::new();
            let mut na = Vec::new();
            for e in &d.data {
                let found = match (e, &names) {
                    (Some(key), Some(names)) => {
                        names.iter().position(|n| n.as_deref() == Some(key.as_str()))
                    },
                    _ => None,
                };
                match found {
                    Some(p) => {
                        out.push(p);
                        na.push(false);
                    },
                    None => {
                        out.push(0);
                        na.push(true);
                    },
                }
            }
            Ok((out, na))
        },
        other => Err(RuntimeError::InvalidSubscriptType { ty:   other.type_name().to_string(),
                                                          line, }.into()),
    }
}

fn normalize_int_index(data: &[Option<i64>],
                       n: usize,
                       line: usize)
                       -> EvalResult<(Vec<usize>, Vec<bool>)> {
    let has_neg = data.iter().flatten().any(|&v| v < 0);
    let has_pos = data.iter().flatten().any(|&v| v > 0);
    if has_neg && has_pos {
        return Err(RuntimeError::MixedSubscripts { line }.into());
    }
    if has_neg {
        let exclude: HashSet<usize> = data.iter()
                                          .flatten()
                                          .filter(|&&v| v < 0)
                                          .map(|&v| (-v) as usize - 1)
                                          .collect();
        let mut out = Vec::new();
        let mut na = Vec::new();
        for i in 0..n {
            if !exclude.contains(&i) {
                out.push(i);
                na.push(false);
            }
        }
        return Ok((out, na));
    }
    let mut out = Vec::new();
    let mut na = Vec::new();
    for e in data {
        match e {
            None => {
                out.push(0);
                na.push(true);
            },
            Some(0) => {},
            Some(v) => {
                out.push(*v as usize - 1);
                na.push(false);
            },
        }
    }
    Ok((out, na))
}

fn subset_data<T: Clone>(data: &[Option<T>], indices: &[usize], na: &[bool]) -> Vec<Option<T>> {
    indices.iter()
           .zip(na)
           .map(|(&i, &masked)| {
               if masked || i >= data.len() {
                   None
               } else {
                   data[i].clone()
               }
           })
           .collect()
}

/// A subset read: `x[i]` (vectorized, type preserving) or `x[[i]]`
/// (scalar, unwrapping list elements).
pub fn subset(ctx: &Context,
              x: &Value,
              idx: &Value,
              double: bool,
              line: usize)
              -> EvalResult<Value> {
    if double {
        return subset_double(ctx, x, idx, line);
    }
    let (indices, na_mask) = normalize_index(ctx, x, idx, line)?;
    match x {
        Value::Logical(v) => Ok(Value::logical_vec(subset_data(&v.data, &indices, &na_mask))),
        Value::Int(v) => Ok(Value::int_vec(subset_data(&v.data, &indices, &na_mask))),
        Value::Double(v) => Ok(Value::double_vec(subset_data(&v.data, &indices, &na_mask))),
        Value::Char(v) => Ok(Value::char_vec(subset_data(&v.data, &indices, &na_mask))),
        Value::List(l) => {
            let out = indices.iter()
                             .zip(&na_mask)
                             .map(|(&i, &masked)| {
                                 if masked || i >= l.data.len() {
                                     Value::Null
                                 } else {
                                     l.data[i].clone()
                                 }
                             })
                             .collect();
            Ok(Value::list(out))
        },
        other => Err(RuntimeError::NotSubsettable { ty:   other.type_name().to_string(),
                                                    line, }.into()),
    }
}

/// A double-bracket read: a single 1-based position, out of range is an
/// error. On a list the contained value is returned directly; a character
/// index dispatches like `$`.
fn subset_double(ctx: &Context, x: &Value, idx: &Value, line: usize) -> EvalResult<Value> {
    match idx {
        Value::Int(_) | Value::Double(_) => {
            if idx.len() != 1 {
                return Err(RuntimeError::SingleIndexExpected { line }.into());
            }
            let Some(v) = as_int_vec(ctx, idx, line)?[0] else {
                return Err(RuntimeError::SubscriptOutOfBounds { line }.into());
            };
            if v < 1 {
                return Err(RuntimeError::SubscriptOutOfBounds { line }.into());
            }
            let i = v as usize - 1;
            match x {
                Value::List(l) => {
                    l.data
                     .get(i)
                     .cloned()
                     .ok_or_else(|| RuntimeError::SubscriptOutOfBounds { line }.into())
                },
                _ => {
                    if i >= x.len() {
                        return Err(RuntimeError::SubscriptOutOfBounds { line }.into());
                    }
                    vector_element(ctx, x, i, line)
                },
            }
        },
        Value::Char(c) => {
            if c.data.len() != 1 {
                return Err(RuntimeError::SingleIndexExpected { line }.into());
            }
            match &c.data[0] {
                Some(name) => dollar(x, name, line),
                None => Err(RuntimeError::SubscriptOutOfBounds { line }.into()),
            }
        },
        other => Err(RuntimeError::InvalidSubscriptType { ty:   other.type_name().to_string(),
                                                          line, }.into()),
    }
}

/// A `$` read on a list: the element at the first `names` match, else
/// `NULL`. Atomic vectors reject `$`.
pub fn dollar(x: &Value, name: &str, line: usize) -> EvalResult<Value> {
    match x {
        Value::List(l) => {
            if let Some(names) = names_of(x) {
                if let Some(p) = names.iter()
                                      .position(|n| n.as_deref() == Some(name))
                {
                    if let Some(elem) = l.data.get(p) {
                        return Ok(elem.clone());
                    }
                }
            }
            Ok(Value::Null)
        },
        _ => Err(RuntimeError::DollarOnAtomic { line }.into()),
    }
}
