use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            builtins::{builtin_table, check_arity, force_args, get_named, install_table, invalid},
            call::call_value,
            coerce::{as_char_vec, as_double_vec, as_int_vec, as_logical_vec, render_elements},
            core::{force, Context, EvalResult, Signal},
            env::Env,
            subset::vector_element,
        },
        value::core::{ArgValue, Value},
    },
};

builtin_table! {
    "ifelse"   => ifelse,
    "switch"   => switch,
    "tryCatch" => try_catch,
    "stop"     => stop,
    "nargs"    => nargs,
}

pub(crate) fn install(env: &Env) {
    install_table(env, TABLE);
}

/// `ifelse(test, yes, no)`: vectorized selection recycled over the test
/// length; the result type follows `yes`.
fn ifelse(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    check_arity(args, 3, "ifelse(test, yes, no)", line)?;
    let test = force(ctx, args[0].value.clone())?;
    let yes = force(ctx, args[1].value.clone())?;
    let no = force(ctx, args[2].value.clone())?;

    let tv = as_logical_vec(ctx, &test, line)?;
    let n = tv.len();
    if n > 0 && (yes.is_empty() || no.is_empty()) {
        return Err(invalid("ifelse: zero-length yes or no", line));
    }

    match &yes {
        Value::Double(yv) => {
            let nv = as_double_vec(ctx, &no, line)?;
            let out = tv.iter()
                        .enumerate()
                        .map(|(i, t)| match t {
                            None => None,
                            Some(true) => yv.data[i % yv.data.len()],
                            Some(false) => nv[i % nv.len()],
                        })
                        .collect();
            Ok(Value::double_vec(out))
        },
        Value::Int(yv) => {
            let nv = as_int_vec(ctx, &no, line)?;
            let out = tv.iter()
                        .enumerate()
                        .map(|(i, t)| match t {
                            None => None,
                            Some(true) => yv.data[i % yv.data.len()],
                            Some(false) => nv[i % nv.len()],
                        })
                        .collect();
            Ok(Value::int_vec(out))
        },
        Value::Char(yv) => {
            let nv = as_char_vec(ctx, &no, line)?;
            let out = tv.iter()
                        .enumerate()
                        .map(|(i, t)| match t {
                            None => None,
                            Some(true) => yv.data[i % yv.data.len()].clone(),
                            Some(false) => nv[i % nv.len()].clone(),
                        })
                        .collect();
            Ok(Value::char_vec(out))
        },
        _ => {
            let mut out = Vec::with_capacity(n);
            for (i, t) in tv.iter().enumerate() {
                let v = match t {
                    None => Value::Null,
                    Some(true) => vector_element(ctx, &yes, i % yes.len(), line)?,
                    Some(false) => vector_element(ctx, &no, i % no.len(), line)?,
                };
                out.push(v);
            }
            Ok(Value::list(out))
        },
    }
}

/// `switch(key, ...)`: the value whose name equals the key; the first
/// unnamed trailing value is the default. Only the selected branch is
/// forced.
fn switch(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.len() < 2 {
        return Err(invalid("switch() expects at least 2 arguments", line));
    }
    let key_v = force(ctx, args[0].value.clone())?;
    let kv = as_char_vec(ctx, &key_v, line)?;
    let Some(Some(key)) = kv.first() else {
        return Ok(Value::Null);
    };

    let mut default = None;
    for a in &args[1..] {
        match &a.name {
            Some(name) if name == key => return force(ctx, a.value.clone()),
            None if default.is_none() => default = Some(a.value.clone()),
            _ => {},
        }
    }
    match default {
        Some(v) => force(ctx, v),
        None => Ok(Value::Null),
    }
}

/// `tryCatch(expr, error = handler)`: a failure while forcing `expr`
/// calls the handler with the error message as a length-1 character.
/// Control signals (`break`, `next`, `return`) pass through untouched.
fn try_catch(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid("tryCatch() expects at least 1 argument", line));
    }
    match force(ctx, args[0].value.clone()) {
        Ok(v) => Ok(v),
        Err(Signal::Error(e)) => {
            let Some(handler) = get_named(args, "error") else {
                return Err(Signal::Error(e));
            };
            let handler = force(ctx, handler.clone())?;
            call_value(ctx,
                       &handler,
                       &[ArgValue { name:  None,
                                    value: Value::char_scalar(e.message()), }],
                       line)
        },
        Err(sig) => Err(sig),
    }
}

/// `stop(...)`: raises a user error with the rendered message.
fn stop(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let fargs = force_args(ctx, args)?;
    let message = match fargs.first() {
        Some(a) => render_elements(&a.value).join(" "),
        None => "stopped".to_string(),
    };
    Err(RuntimeError::UserError { message, line }.into())
}

/// The number of arguments this call received.
#[allow(clippy::cast_possible_wrap)]
fn nargs(_ctx: &Context, args: &[ArgValue], _line: usize) -> EvalResult<Value> {
    Ok(Value::int_scalar(args.len() as i64))
}
