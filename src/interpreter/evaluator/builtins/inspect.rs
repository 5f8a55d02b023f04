use std::rc::Rc;

use crate::{
    interpreter::{
        evaluator::{
            builtins::{builtin_table, check_arity, install_table, invalid},
            coerce::{as_char_vec, as_double_vec, as_int_vec, as_logical_vec},
            core::{force, Context, EvalResult},
            env::Env,
        },
        value::core::{ArgValue, CharVec, ListVec, Value},
    },
};

builtin_table! {
    "typeof"        => type_of,
    "class"         => class,
    "attr"          => attr,
    "attributes"    => attributes,
    "names"         => names,
    "length"        => length,
    "identical"     => identical,
    "exists"        => exists,
    "as.integer"    => as_integer,
    "as.numeric"    => as_numeric,
    "as.character"  => as_character,
    "as.logical"    => as_logical,
    "is.na"         => is_na,
    "is.null"       => is_null,
    "is.list"       => is_list,
    "is.vector"     => is_vector,
    "is.function"   => is_function,
    "is.numeric"    => is_numeric,
    "is.integer"    => is_integer,
    "is.double"     => is_double,
    "is.character"  => is_character,
    "is.logical"    => is_logical,
    "is.finite"     => is_finite,
    "is.nan"        => is_nan,
    "is.infinite"   => is_infinite,
}

pub(crate) fn install(env: &Env) {
    install_table(env, TABLE);
}

fn single(ctx: &Context, args: &[ArgValue], usage: &str, line: usize) -> EvalResult<Value> {
    check_arity(args, 1, usage, line)?;
    force(ctx, args[0].value.clone())
}

fn type_of(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let v = single(ctx, args, "typeof(x)", line)?;
    Ok(Value::char_scalar(v.type_name()))
}

/// The `class` attribute when present, else the type name.
fn class(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let v = single(ctx, args, "class(x)", line)?;
    match v.get_attr("class") {
        Some(cls) => Ok(cls),
        None => Ok(Value::char_scalar(v.type_name())),
    }
}

/// `attr(x, which)`: the named attribute or `NULL`.
fn attr(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 2, "attr(x, which)", line)?;
    let x = force(ctx, args[0].value.clone())?;
    let which = force(ctx, args[1].value.clone())?;
    let Value::Char(c) = &which else {
        return Err(invalid("attr: 'which' must be character", line));
    };
    let Some(Some(name)) = c.data.first() else {
        return Err(invalid("attr: 'which' must be character", line));
    };
    Ok(x.get_attr(name).unwrap_or(Value::Null))
}

/// `attributes(x)`: every attribute as a named list, or `NULL` when there
/// are none.
fn attributes(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let v = single(ctx, args, "attributes(x)", line)?;
    let Some(attrs) = v.attrs() else {
        return Ok(Value::Null);
    };
    if attrs.is_empty() {
        return Ok(Value::Null);
    }
    let mut data = Vec::with_capacity(attrs.len());
    let mut keys = Vec::with_capacity(attrs.len());
    for (k, a) in attrs {
        keys.push(Some(k.clone()));
        data.push(a.clone());
    }
    let mut list = ListVec::new(data);
    list.attrs
        .insert("names".to_string(), Value::Char(Rc::new(CharVec::new(keys))));
    Ok(Value::List(Rc::new(list)))
}

/// `names(x)`: the `names` attribute or `NULL`.
fn names(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let v = single(ctx, args, "names(x)", line)?;
    Ok(v.get_attr("names").unwrap_or(Value::Null))
}

#[allow(clippy::cast_possible_wrap)]
fn length(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let v = single(ctx, args, "length(x)", line)?;
    Ok(Value::int_scalar(v.len() as i64))
}

/// Shallow identity: same type tag and same printed rendering.
fn identical(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 2, "identical(x, y)", line)?;
    let x = force(ctx, args[0].value.clone())?;
    let y = force(ctx, args[1].value.clone())?;
    let same = x.type_name() == y.type_name() && x.to_string() == y.to_string();
    Ok(Value::logical_scalar(same))
}

/// `exists("name")`: whether the name resolves in the global environment.
fn exists(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("exists(x) expects at least 1 argument", line));
    }
    let v = force(ctx, args[0].value.clone())?;
    let Value::Char(c) = &v else {
        return Err(invalid("exists: argument must be a character string", line));
    };
    let Some(Some(name)) = c.data.first() else {
        return Err(invalid("exists: argument must be a character string", line));
    };
    Ok(Value::logical_scalar(ctx.global.get(name).is_some()))
}

fn as_integer(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let v = single(ctx, args, "as.integer(x)", line)?;
    Ok(Value::int_vec(as_int_vec(ctx, &v, line)?))
}

fn as_numeric(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let v = single(ctx, args, "as.numeric(x)", line)?;
    Ok(Value::double_vec(as_double_vec(ctx, &v, line)?))
}

fn as_character(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let v = single(ctx, args, "as.character(x)", line)?;
    Ok(Value::char_vec(as_char_vec(ctx, &v, line)?))
}

fn as_logical(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let v = single(ctx, args, "as.logical(x)", line)?;
    Ok(Value::logical_vec(as_logical_vec(ctx, &v, line)?))
}

/// Per-element NA test; values without elements test false.
fn is_na(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let v = single(ctx, args, "is.na(x)", line)?;
    fn mask<T>(data: &[Option<T>]) -> Vec<Option<bool>> {
        data.iter().map(|e| Some(e.is_none())).collect()
    }
    match &v {
        Value::Logical(d) => Ok(Value::logical_vec(mask(&d.data))),
        Value::Int(d) => Ok(Value::logical_vec(mask(&d.data))),
        Value::Double(d) => Ok(Value::logical_vec(mask(&d.data))),
        Value::Char(d) => Ok(Value::logical_vec(mask(&d.data))),
        _ => Ok(Value::logical_scalar(false)),
    }
}

fn type_check(ctx: &Context,
              args: &[ArgValue],
              usage: &str,
              f: impl Fn(&Value) -> bool,
              line: usize)
              -> EvalResult<Value> {
    let v = single(ctx, args, usage, line)?;
    Ok(Value::logical_scalar(f(&v)))
}

fn is_null(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    type_check(ctx, args, "is.null(x)", |v| matches!(v, Value::Null), line)
}

fn is_list(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    type_check(ctx, args, "is.list(x)", |v| matches!(v, Value::List(_)), line)
}

fn is_vector(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    type_check(ctx,
               args,
               "is.vector(x)",
               |v| {
                   matches!(v,
                            Value::Logical(_)
                            | Value::Int(_)
                            | Value::Double(_)
                            | Value::Char(_)
                            | Value::List(_))
               },
               line)
}

fn is_function(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    type_check(ctx,
               args,
               "is.function(x)",
               |v| matches!(v, Value::Builtin(_) | Value::Closure(_)),
               line)
}

fn is_numeric(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    type_check(ctx,
               args,
               "is.numeric(x)",
               |v| matches!(v, Value::Int(_) | Value::Double(_)),
               line)
}

fn is_integer(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    type_check(ctx, args, "is.integer(x)", |v| matches!(v, Value::Int(_)), line)
}

fn is_double(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    type_check(ctx, args, "is.double(x)", |v| matches!(v, Value::Double(_)), line)
}

fn is_character(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    type_check(ctx, args, "is.character(x)", |v| matches!(v, Value::Char(_)), line)
}

fn is_logical(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    type_check(ctx, args, "is.logical(x)", |v| matches!(v, Value::Logical(_)), line)
}

fn float_test(ctx: &Context,
              args: &[ArgValue],
              usage: &str,
              f: impl Fn(f64) -> bool,
              line: usize)
              -> EvalResult<Value> {
    check_arity(args, 1, usage, line)?;
    let v = force(ctx, args[0].value.clone())?;
    let dv = as_double_vec(ctx, &v, line)?;
    let out = dv.iter()
                .map(|e| Some(e.map(&f).unwrap_or(false)))
                .collect();
    Ok(Value::logical_vec(out))
}

fn is_finite(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    float_test(ctx, args, "is.finite(x)", f64::is_finite, line)
}

fn is_nan(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    float_test(ctx, args, "is.nan(x)", f64::is_nan, line)
}

fn is_infinite(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    float_test(ctx, args, "is.infinite(x)", f64::is_infinite, line)
}
