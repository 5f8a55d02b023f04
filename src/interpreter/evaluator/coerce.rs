#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{force, Context, EvalResult, Signal},
        value::core::{format_double, ListVec, Value},
    },
};

use std::rc::Rc;

fn coerce_err(from: &Value, to: &str, line: usize) -> Signal {
    RuntimeError::CannotCoerce { from: from.type_name().to_string(),
                                 to: to.to_string(),
                                 line }.into()
}

/// Coerces a value to raw double elements, forcing it first.
///
/// Logical and integer vectors widen; anything else is a coercion error.
pub fn as_double_vec(ctx: &Context, value: &Value, line: usize) -> EvalResult<Vec<Option<f64>>> {
    let v = force(ctx, value.clone())?;
    match &v {
        Value::Double(d) => Ok(d.data.clone()),
        Value::Int(d) => Ok(d.data.iter().map(|e| e.map(|i| i as f64)).collect()),
        Value::Logical(d) => Ok(d.data
                                 .iter()
                                 .map(|e| e.map(|b| if b { 1.0 } else { 0.0 }))
                                 .collect()),
        other => Err(coerce_err(other, "double", line)),
    }
}

/// Coerces a value to raw integer elements, truncating doubles.
pub fn as_int_vec(ctx: &Context, value: &Value, line: usize) -> EvalResult<Vec<Option<i64>>> {
    let v = force(ctx, value.clone())?;
    match &v {
        Value::Int(d) => Ok(d.data.clone()),
        Value::Double(d) => Ok(d.data.iter().map(|e| e.map(|x| x as i64)).collect()),
        Value::Logical(d) => Ok(d.data
                                 .iter()
                                 .map(|e| e.map(i64::from))
                                 .collect()),
        other => Err(coerce_err(other, "integer", line)),
    }
}

/// Coerces a value to raw logical elements; numbers map zero to false.
pub fn as_logical_vec(ctx: &Context, value: &Value, line: usize) -> EvalResult<Vec<Option<bool>>> {
    let v = force(ctx, value.clone())?;
    match &v {
        Value::Logical(d) => Ok(d.data.clone()),
        Value::Int(d) => Ok(d.data.iter().map(|e| e.map(|i| i != 0)).collect()),
        Value::Double(d) => Ok(d.data.iter().map(|e| e.map(|x| x != 0.0)).collect()),
        other => Err(coerce_err(other, "logical", line)),
    }
}

/// Coerces a value to raw character elements.
pub fn as_char_vec(ctx: &Context, value: &Value, line: usize) -> EvalResult<Vec<Option<String>>> {
    let v = force(ctx, value.clone())?;
    match &v {
        Value::Char(d) => Ok(d.data.clone()),
        Value::Double(d) => Ok(d.data
                                .iter()
                                .map(|e| e.map(format_double))
                                .collect()),
        Value::Int(d) => Ok(d.data
                             .iter()
                             .map(|e| e.map(|i| i.to_string()))
                             .collect()),
        Value::Logical(d) => Ok(d.data
                                 .iter()
                                 .map(|e| e.map(|b| if b { "TRUE" } else { "FALSE" }.to_string()))
                                 .collect()),
        other => Err(coerce_err(other, "character", line)),
    }
}

/// Extracts a length-1 logical; `None` is NA.
///
/// Numbers coerce through zero/non-zero; the strings `TRUE`/`T`/`true`/`1`
/// and their false counterparts coerce as the reference dialect does.
pub fn as_logical_scalar(ctx: &Context, value: &Value, line: usize) -> EvalResult<Option<bool>> {
    let v = force(ctx, value.clone())?;
    if v.len() != 1 {
        return Err(RuntimeError::ScalarLogicalExpected { len: v.len(), line }.into());
    }
    match &v {
        Value::Logical(d) => Ok(d.data[0]),
        Value::Int(d) => Ok(d.data[0].map(|i| i != 0)),
        Value::Double(d) => Ok(d.data[0].map(|x| x != 0.0)),
        Value::Char(d) => match &d.data[0] {
            None => Ok(None),
            Some(s) => match s.as_str() {
                "TRUE" | "T" | "true" | "1" => Ok(Some(true)),
                "FALSE" | "F" | "false" | "0" => Ok(Some(false)),
                _ => Err(RuntimeError::CannotCoerceValue { value: s.clone(),
                                                           to: "logical".to_string(),
                                                           line }.into()),
            },
        },
        other => Err(coerce_err(other, "logical", line)),
    }
}

/// Extracts a length-1 double; `None` is NA. Character scalars parse.
pub fn as_double_scalar(ctx: &Context, value: &Value, line: usize) -> EvalResult<Option<f64>> {
    let v = force(ctx, value.clone())?;
    if v.len() != 1 {
        return Err(RuntimeError::ScalarExpected { len: v.len(), line }.into());
    }
    match &v {
        Value::Double(d) => Ok(d.data[0]),
        Value::Int(d) => Ok(d.data[0].map(|i| i as f64)),
        Value::Logical(d) => Ok(d.data[0].map(|b| if b { 1.0 } else { 0.0 })),
        Value::Char(d) => match &d.data[0] {
            None => Ok(None),
            Some(s) => match s.parse::<f64>() {
                Ok(x) => Ok(Some(x)),
                Err(_) => Err(RuntimeError::CannotCoerceValue { value: s.clone(),
                                                                to: "double".to_string(),
                                                                line }.into()),
            },
        },
        other => Err(coerce_err(other, "double", line)),
    }
}

/// Renders each element of a vector as plain (unquoted) text, with `NA`
/// for NA elements. Non-vector values render as their printed form.
///
/// This keying is shared by `cat`, `paste`, `match`, `%in%` and `table`.
#[must_use]
pub fn render_elements(value: &Value) -> Vec<String> {
    match value {
        Value::Char(d) => d.data
                           .iter()
                           .map(|e| e.clone().unwrap_or_else(|| "NA".to_string()))
                           .collect(),
        Value::Double(d) => d.data
                             .iter()
                             .map(|e| e.map_or_else(|| "NA".to_string(), format_double))
                             .collect(),
        Value::Int(d) => d.data
                          .iter()
                          .map(|e| e.map_or_else(|| "NA".to_string(), |i| i.to_string()))
                          .collect(),
        Value::Logical(d) => {
            d.data
             .iter()
             .map(|e| match e {
                 Some(true) => "TRUE".to_string(),
                 Some(false) => "FALSE".to_string(),
                 None => "NA".to_string(),
             })
             .collect()
        },
        other => vec![other.to_string()],
    }
}

/// Recycles a vector to exactly `n` elements by modular indexing.
///
/// # Errors
/// Recycling a length-0 vector to a positive length is an error, as is
/// recycling a value that is not a vector or list.
pub fn recycle_to(value: &Value, n: usize, line: usize) -> EvalResult<Value> {
    fn cycle<T: Clone>(data: &[Option<T>], n: usize) -> Vec<Option<T>> {
        (0..n).map(|i| data[i % data.len()].clone()).collect()
    }
    if n == 0 {
        return Ok(match value {
                      Value::Double(_) => Value::double_vec(Vec::new()),
                      Value::Int(_) => Value::int_vec(Vec::new()),
                      Value::Logical(_) => Value::logical_vec(Vec::new()),
                      Value::Char(_) => Value::char_vec(Vec::new()),
                      _ => Value::list(Vec::new()),
                  });
    }
    if value.is_empty() {
        return Err(RuntimeError::InvalidArgument { details: "cannot recycle length-0 vector"
                                                                .to_string(),
                                                   line }.into());
    }
    match value {
        Value::Double(d) => Ok(Value::double_vec(cycle(&d.data, n))),
        Value::Int(d) => Ok(Value::int_vec(cycle(&d.data, n))),
        Value::Logical(d) => Ok(Value::logical_vec(cycle(&d.data, n))),
        Value::Char(d) => Ok(Value::char_vec(cycle(&d.data, n))),
        Value::List(l) => {
            let data = (0..n).map(|i| l.data[i % l.data.len()].clone()).collect();
            Ok(Value::List(Rc::new(ListVec::new(data))))
        },
        other => Err(RuntimeError::InvalidArgument { details: format!("cannot recycle type {}",
                                                                      other.type_name()),
                                                     line }.into()),
    }
}
