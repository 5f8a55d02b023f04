use crate::{
    interpreter::{
        evaluator::{
            builtins::{builtin_table, check_arity, get_named, install_table, invalid},
            call::call_value,
            coerce::as_logical_scalar,
            core::{force, Context, EvalResult},
            env::Env,
            subset::vector_element,
        },
        value::{
            attrs::names_of,
            core::{ArgValue, Value},
        },
    },
};

builtin_table! {
    "lapply"  => lapply,
    "sapply"  => sapply,
    "vapply"  => vapply,
    "Map"     => map_over,
    "Reduce"  => reduce,
    "Filter"  => filter,
    "do.call" => do_call,
}

pub(crate) fn install(env: &Env) {
    install_table(env, TABLE);
}

/// `lapply(X, FUN, ...)`: FUN applied to every element of X, extra
/// arguments forwarded unevaluated; always returns a list.
fn lapply(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.len() < 2 {
        return Err(invalid("lapply(X, FUN) expects at least 2 arguments", line));
    }
    let x = force(ctx, args[0].value.clone())?;
    let fun = force(ctx, args[1].value.clone())?;
    let extra = &args[2..];

    let n = x.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let elem = vector_element(ctx, &x, i, line)?;
        let mut call_args = Vec::with_capacity(1 + extra.len());
        call_args.push(ArgValue { name:  None,
                                  value: elem, });
        call_args.extend(extra.iter().cloned());
        out.push(call_value(ctx, &fun, &call_args, line)?);
    }
    Ok(Value::list(out))
}

/// `sapply(X, FUN, ...)`: `lapply` plus simplification to a vector when
/// every result is a length-1 of one type.
fn sapply(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let result = lapply(ctx, args, line)?;
    let Value::List(l) = &result else {
        return Ok(result);
    };
    Ok(simplify(&l.data).unwrap_or(result))
}

/// `vapply(X, FUN, FUN.VALUE, ...)`: the shape argument only documents
/// intent here; simplification works as in `sapply`.
fn vapply(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.len() < 3 {
        return Err(invalid("vapply(X, FUN, FUN.VALUE) expects at least 3 arguments", line));
    }
    let mut trimmed = Vec::with_capacity(args.len() - 1);
    trimmed.push(args[0].clone());
    trimmed.push(args[1].clone());
    trimmed.extend(args[3..].iter().cloned());
    sapply(ctx, &trimmed, line)
}

/// Collapses a list of same-typed scalars into one atomic vector.
fn simplify(data: &[Value]) -> Option<Value> {
    if data.is_empty() {
        return None;
    }
    let first = data[0].type_name();
    if data.iter().any(|v| v.len() != 1 || v.type_name() != first) {
        return None;
    }
    match first {
        "double" => {
            let out = data.iter()
                          .map(|v| match v {
                              Value::Double(d) => d.data[0],
                              _ => None,
                          })
                          .collect();
            Some(Value::double_vec(out))
        },
        "integer" => {
            let out = data.iter()
                          .map(|v| match v {
                              Value::Int(d) => d.data[0],
                              _ => None,
                          })
                          .collect();
            Some(Value::int_vec(out))
        },
        "logical" => {
            let out = data.iter()
                          .map(|v| match v {
                              Value::Logical(d) => d.data[0],
                              _ => None,
                          })
                          .collect();
            Some(Value::logical_vec(out))
        },
        "character" => {
            let out = data.iter()
                          .map(|v| match v {
                              Value::Char(d) => d.data[0].clone(),
                              _ => None,
                          })
                          .collect();
            Some(Value::char_vec(out))
        },
        _ => None,
    }
}

/// `Map(f, ...)`: f applied to corresponding elements, shorter vectors
/// recycled against the longest.
fn map_over(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.len() < 2 {
        return Err(invalid("Map(f, ...) expects at least 2 arguments", line));
    }
    let fun = force(ctx, args[0].value.clone())?;
    let mut vecs = Vec::with_capacity(args.len() - 1);
    for a in &args[1..] {
        vecs.push(force(ctx, a.value.clone())?);
    }
    let n = vecs.iter().map(Value::len).max().unwrap_or(0);
    if n > 0 && vecs.iter().any(Value::is_empty) {
        return Err(invalid("Map: zero-length argument mixed with longer ones", line));
    }

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let mut call_args = Vec::with_capacity(vecs.len());
        for v in &vecs {
            let elem = vector_element(ctx, v, i % v.len(), line)?;
            call_args.push(ArgValue { name:  None,
                                      value: elem, });
        }
        out.push(call_value(ctx, &fun, &call_args, line)?);
    }
    Ok(Value::list(out))
}

/// `Reduce(f, x, init?)`: left fold; without an initial value the first
/// element seeds the accumulator.
fn reduce(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.len() < 2 {
        return Err(invalid("Reduce(f, x) expects at least 2 arguments", line));
    }
    let fun = force(ctx, args[0].value.clone())?;
    let x = force(ctx, args[1].value.clone())?;

    let init = match get_named(args, "init") {
        Some(v) => Some(force(ctx, v.clone())?),
        None => match args.get(2) {
            Some(a) if a.name.is_none() => Some(force(ctx, a.value.clone())?),
            _ => None,
        },
    };

    let (mut acc, start) = match init {
        Some(v) => (v, 0),
        None => {
            if x.is_empty() {
                return Err(invalid("Reduce: empty sequence with no init", line));
            }
            (vector_element(ctx, &x, 0, line)?, 1)
        },
    };

    for i in start..x.len() {
        let elem = vector_element(ctx, &x, i, line)?;
        acc = call_value(ctx,
                         &fun,
                         &[ArgValue { name:  None,
                                      value: acc, },
                           ArgValue { name:  None,
                                      value: elem, }],
                         line)?;
    }
    Ok(acc)
}

/// `Filter(f, x)`: the elements whose predicate result is TRUE, as a
/// list.
fn filter(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 2, "Filter(f, x)", line)?;
    let fun = force(ctx, args[0].value.clone())?;
    let x = force(ctx, args[1].value.clone())?;

    let mut out = Vec::new();
    for i in 0..x.len() {
        let elem = vector_element(ctx, &x, i, line)?;
        let keep = call_value(ctx,
                              &fun,
                              &[ArgValue { name:  None,
                                           value: elem.clone(), }],
                              line)?;
        if as_logical_scalar(ctx, &keep, line)? == Some(true) {
            out.push(elem);
        }
    }
    Ok(Value::list(out))
}

/// `do.call(fun, arglist)`: expands a list into an argument list,
/// preserving names.
fn do_call(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.len() < 2 {
        return Err(invalid("do.call(fun, args) expects 2 arguments", line));
    }
    let fun = force(ctx, args[0].value.clone())?;
    let arg_list = force(ctx, args[1].value.clone())?;

    let Value::List(l) = &arg_list else {
        return call_value(ctx,
                          &fun,
                          &[ArgValue { name:  None,
                                       value: arg_list.clone(), }],
                          line);
    };

    let names = names_of(&arg_list);
    let call_args: Vec<ArgValue> =
        l.data
         .iter()
         .enumerate()
         .map(|(i, v)| {
             let name = names.as_ref()
                             .and_then(|n| n.get(i).cloned().flatten())
                             .filter(|n| !n.is_empty());
             ArgValue { name,
                        value: v.clone() }
         })
         .collect();
    call_value(ctx, &fun, &call_args, line)
}
