#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use std::rc::Rc;

use crate::{
    interpreter::{
        evaluator::{
            builtins::{builtin_table, check_arity, force_args, get_named, install_table, invalid},
            coerce::{as_double_scalar, recycle_to},
            core::{force, Context, EvalResult},
            env::Env,
            subset,
        },
        value::core::{ArgValue, CharVec, IntVec, ListVec, Value},
    },
};

builtin_table! {
    "data.frame"    => data_frame,
    "is.data.frame" => is_data_frame_fn,
    "nrow"          => nrow,
    "ncol"          => ncol,
    "dim"           => dim,
    "head"          => head,
    "tail"          => tail,
}

pub(crate) fn install(env: &Env) {
    install_table(env, TABLE);
}

/// Whether a value carries `"data.frame"` in its `class` attribute.
pub(crate) fn is_data_frame(v: &Value) -> bool {
    let Some(Value::Char(cls)) = v.get_attr("class") else {
        return false;
    };
    cls.data
       .iter()
       .flatten()
       .any(|c| c == "data.frame")
}

fn is_data_frame_fn(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 1, "is.data.frame(x)", line)?;
    let v = force(ctx, args[0].value.clone())?;
    Ok(Value::logical_scalar(is_data_frame(&v)))
}

/// Builds a data frame: a list of equal-length columns tagged with
/// `names`, `class` and `row.names`. NULL columns are dropped, unnamed
/// columns are auto-named `V1`, `V2`, ... and shorter columns recycle to
/// the longest.
fn data_frame(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let fargs = force_args(ctx, args)?;

    let mut cols = Vec::new();
    let mut col_names = Vec::new();
    let mut row_names = None;
    let mut auto = 1;

    for a in &fargs {
        match a.name.as_deref() {
            Some("stringsAsFactors" | "check.names") => continue,
            Some("row.names") => {
                row_names = Some(a.value.clone());
                continue;
            },
            _ => {},
        }
        if matches!(a.value, Value::Null) {
            continue;
        }
        cols.push(a.value.clone());
        match &a.name {
            Some(name) => col_names.push(Some(name.clone())),
            None => {
                col_names.push(Some(format!("V{auto}")));
                auto += 1;
            },
        }
    }

    let nrow = cols.iter().map(Value::len).max().unwrap_or(0);
    for col in &mut cols {
        if col.len() != nrow {
            *col = recycle_to(col, nrow, line)?;
        }
    }

    let mut frame = ListVec::new(cols);
    frame.attrs
         .insert("names".to_string(), Value::Char(Rc::new(CharVec::new(col_names))));
    frame.attrs
         .insert("class".to_string(), Value::char_scalar("data.frame"));
    let row_names = row_names.unwrap_or_else(|| {
                                 Value::Int(Rc::new(IntVec::new((1..=nrow as i64).map(Some)
                                                                                 .collect())))
                             });
    frame.attrs.insert("row.names".to_string(), row_names);
    Ok(Value::List(Rc::new(frame)))
}

/// The row count of a data frame: the length of its first column.
fn frame_rows(v: &Value) -> i64 {
    match v {
        Value::List(l) => l.data.first().map_or(0, |c| c.len() as i64),
        _ => 0,
    }
}

fn nrow(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 1, "nrow(x)", line)?;
    let v = force(ctx, args[0].value.clone())?;
    if is_data_frame(&v) {
        return Ok(Value::int_scalar(frame_rows(&v)));
    }
    Ok(Value::Null)
}

fn ncol(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 1, "ncol(x)", line)?;
    let v = force(ctx, args[0].value.clone())?;
    if is_data_frame(&v) {
        return Ok(Value::int_scalar(v.len() as i64));
    }
    Ok(Value::Null)
}

fn dim(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 1, "dim(x)", line)?;
    let v = force(ctx, args[0].value.clone())?;
    if is_data_frame(&v) {
        return Ok(Value::int_vec(vec![Some(frame_rows(&v)), Some(v.len() as i64)]));
    }
    Ok(Value::Null)
}

/// Reads the `n` option of `head`/`tail` (named or second positional,
/// default 6, clamped at zero).
fn head_count(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<usize> {
    let arg = get_named(args, "n").or_else(|| {
                                      args.get(1)
                                          .filter(|a| a.name.is_none())
                                          .map(|a| &a.value)
                                  });
    let Some(v) = arg else {
        return Ok(6);
    };
    let v = force(ctx, v.clone())?;
    match as_double_scalar(ctx, &v, line)? {
        Some(x) => Ok(x.max(0.0) as usize),
        None => Ok(6),
    }
}

fn head(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    head_tail(ctx, args, true, line)
}

fn tail(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    head_tail(ctx, args, false, line)
}

/// `head(x, n=6)` / `tail(x, n=6)`: for data frames a row subset of every
/// column, for vectors a prefix or suffix.
fn head_tail(ctx: &Context, args: &[ArgValue], from_start: bool, line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("head() expects at least 1 argument", line));
    }
    let x = force(ctx, args[0].value.clone())?;
    let n = head_count(ctx, args, line)?;

    if is_data_frame(&x) {
        return frame_head_tail(ctx, &x, n, from_start, line);
    }

    if x.is_empty() {
        return Ok(x);
    }
    let n = n.min(x.len());
    let start = if from_start { 0 } else { x.len() - n };
    let index = row_index(start, n);
    subset::subset(ctx, &x, &index, false, line)
}

fn frame_head_tail(ctx: &Context,
                   x: &Value,
                   n: usize,
                   from_start: bool,
                   line: usize)
                   -> EvalResult<Value> {
    let Value::List(l) = x else {
        return Err(invalid("expected data.frame to be a list", line));
    };
    let nrow = frame_rows(x) as usize;
    let n = n.min(nrow);
    let start = if from_start { 0 } else { nrow - n };
    let index = row_index(start, n);

    let mut cols = Vec::with_capacity(l.data.len());
    for col in &l.data {
        cols.push(subset::subset(ctx, col, &index, false, line)?);
    }
    let mut out = ListVec::new(cols);
    out.attrs = l.attrs.clone();
    Ok(Value::List(Rc::new(out)))
}

/// A 1-based integer index covering `start..start+n`.
fn row_index(start: usize, n: usize) -> Value {
    Value::int_vec((0..n).map(|i| Some((start + i) as i64 + 1)).collect())
}
