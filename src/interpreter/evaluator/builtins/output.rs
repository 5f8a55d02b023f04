use crate::{
    interpreter::{
        evaluator::{
            builtins::{builtin_table, check_arity, force_args, get_named, install_table},
            coerce::render_elements,
            core::{Context, EvalResult},
            env::Env,
        },
        value::core::{ArgValue, Value},
    },
};

builtin_table! {
    "print"   => print,
    "cat"     => cat,
    "str"     => str_dump,
    "warning" => warning,
    "message" => message,
}

pub(crate) fn install(env: &Env) {
    install_table(env, TABLE);
}

/// Prints each argument on its own line in its display form and returns
/// the first argument (or `NULL` when called without any).
fn print(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let _ = line;
    let fargs = force_args(ctx, args)?;
    if fargs.is_empty() {
        ctx.println("NULL");
        return Ok(Value::Null);
    }
    for a in &fargs {
        ctx.println(&a.value.to_string());
    }
    Ok(fargs[0].value.clone())
}

/// Concatenates the plain renderings of its arguments, joined with `sep`
/// (default a space) and terminated with `end` (default nothing).
fn cat(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let _ = line;
    let fargs = force_args(ctx, args)?;

    let option = |name: &str, default: &str| -> String {
        match get_named(&fargs, name) {
            Some(Value::Char(c)) if !c.data.is_empty() => {
                c.data[0].clone().unwrap_or_else(|| default.to_string())
            },
            _ => default.to_string(),
        }
    };
    let sep = option("sep", " ");
    let end = option("end", "");

    let mut parts = Vec::new();
    for a in &fargs {
        if matches!(a.name.as_deref(), Some("sep" | "end")) {
            continue;
        }
        parts.extend(render_elements(&a.value));
    }
    ctx.write_output(&(parts.join(&sep) + &end));
    Ok(Value::Null)
}

/// One-line structural dump: type, length, rendering and attributes.
fn str_dump(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let fargs = force_args(ctx, args)?;
    check_arity(&fargs, 1, "str(x)", line)?;
    let v = &fargs[0].value;
    let mut out = format!("Type={} Len={} Value={v}", v.type_name(), v.len());
    if let Some(attrs) = v.attrs() {
        if !attrs.is_empty() {
            let rendered: Vec<String> = attrs.iter()
                                             .map(|(k, a)| format!("{k}={a}"))
                                             .collect();
            out.push_str(&format!(" Attrs=[{}]", rendered.join(", ")));
        }
    }
    ctx.println(&out);
    Ok(v.clone())
}

/// Prints a warning line and returns `NULL`.
fn warning(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let _ = line;
    let fargs = force_args(ctx, args)?;
    let msg = match fargs.first() {
        Some(a) => render_elements(&a.value).join(" "),
        None => "warning".to_string(),
    };
    ctx.println(&format!("Warning: {msg}"));
    Ok(Value::Null)
}

/// Prints its arguments joined without separators, plus a newline.
fn message(ctx: &Context, args: &[ArgValue], line: usize) -> EvalResult<Value> {
    let _ = line;
    let fargs = force_args(ctx, args)?;
    let mut parts = Vec::new();
    for a in &fargs {
        parts.extend(render_elements(&a.value));
    }
    ctx.println(&parts.concat());
    Ok(Value::Null)
}
